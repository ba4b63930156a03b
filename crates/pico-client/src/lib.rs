//! Pico Client
//!
//! High-level session client for Simarine Pico devices.
//!
//! # Example
//!
//! ```ignore
//! use pico_client::PicoClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pico_client::ClientError> {
//!     // Waits for a UDP broadcast, then opens the TCP control session.
//!     let mut client = PicoClient::discover().await?;
//!
//!     let info = client.system_info().await?;
//!     println!("serial {} firmware {}", info.serial, info.firmware_version());
//!
//!     for sensor in client.inventory().await?.sensors {
//!         if let (Some(value), Some(unit)) = (sensor.value(), sensor.unit()) {
//!             println!("sensor {}: {} {}", sensor.info.sensor_id, value, unit);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod client;
pub mod error;

pub use builder::PicoClientBuilder;
pub use client::{Inventory, PicoClient, Sensor};
pub use error::{ClientError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::builder::PicoClientBuilder;
    pub use crate::client::{Inventory, PicoClient, Sensor};
    pub use crate::error::{ClientError, Result};
    pub use pico_core::{DeviceType, Message, MessageType, SensorType};
}
