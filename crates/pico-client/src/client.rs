//! Session client
//!
//! One TCP control session against a Pico device. The session is scoped:
//! the socket is opened by [`PicoClientBuilder::connect`] and released when
//! the client drops, on every exit path. Requests are strictly one at a
//! time; the device has no correlation mechanism beyond ordering.

use crate::builder::PicoClientBuilder;
use crate::error::Result;
use pico_core::{
    requests, sensor_states, DeviceInfo, DeviceSensorCount, IntBytes, MessageType, SensorInfo,
    SensorState, SystemInfo,
};
use pico_transport::TcpChannel;
use tracing::{debug, info};

/// A connected Pico control session
pub struct PicoClient {
    channel: TcpChannel,
}

impl PicoClient {
    /// Start building a client.
    pub fn builder() -> PicoClientBuilder {
        PicoClientBuilder::new()
    }

    /// Connect to a known host on the default ports.
    pub async fn connect(host: &str) -> Result<Self> {
        PicoClientBuilder::new().host(host).connect().await
    }

    /// Discover the device via its UDP broadcast, then connect.
    pub async fn discover() -> Result<Self> {
        PicoClientBuilder::new().connect().await
    }

    pub(crate) fn from_channel(channel: TcpChannel) -> Self {
        Self { channel }
    }

    /// Serial number and firmware version.
    pub async fn system_info(&mut self) -> Result<SystemInfo> {
        let response = self
            .channel
            .request_expecting(&requests::system_info(), MessageType::SystemInfo)
            .await?;
        Ok(SystemInfo::from_message(&response)?)
    }

    /// Last device id and last sensor id (both zero-indexed).
    pub async fn device_sensor_count(&mut self) -> Result<DeviceSensorCount> {
        let response = self
            .channel
            .request_expecting(
                &requests::device_sensor_count(),
                MessageType::DeviceSensorCount,
            )
            .await?;
        Ok(DeviceSensorCount::from_message(&response)?)
    }

    /// Descriptor of one device.
    pub async fn device_info(&mut self, device_id: u8) -> Result<DeviceInfo> {
        let response = self
            .channel
            .request_expecting(&requests::device_info(device_id), MessageType::DeviceInfo)
            .await?;
        Ok(DeviceInfo::from_message(&response)?)
    }

    /// Descriptor of one sensor.
    pub async fn sensor_info(&mut self, sensor_id: u8) -> Result<SensorInfo> {
        let response = self
            .channel
            .request_expecting(&requests::sensor_info(sensor_id), MessageType::SensorInfo)
            .await?;
        Ok(SensorInfo::from_message(&response)?)
    }

    /// One sweep of raw sensor states.
    pub async fn sensor_states(&mut self) -> Result<Vec<SensorState>> {
        let response = self
            .channel
            .request_expecting(&requests::sensor_state(), MessageType::SensorState)
            .await?;
        Ok(sensor_states(&response)?)
    }

    /// All device descriptors, by walking ids up to the reported last one.
    pub async fn devices(&mut self) -> Result<Vec<DeviceInfo>> {
        let counts = self.device_sensor_count().await?;
        info!("Device count: {}", counts.last_device_id + 1);

        let mut devices = Vec::new();
        for id in id_range(counts.last_device_id) {
            let device = self.device_info(id).await?;
            debug!(
                "Device id={} type={:?} name={:?}",
                device.device_id, device.device_type, device.name
            );
            devices.push(device);
        }
        Ok(devices)
    }

    /// All sensor descriptors, by walking ids up to the reported last one.
    pub async fn sensors(&mut self) -> Result<Vec<SensorInfo>> {
        let counts = self.device_sensor_count().await?;
        info!("Sensor count: {}", counts.last_sensor_id + 1);

        let mut sensors = Vec::new();
        for id in id_range(counts.last_sensor_id) {
            let sensor = self.sensor_info(id).await?;
            debug!(
                "Sensor id={} type={:?} device_id={}",
                sensor.sensor_id, sensor.sensor_type, sensor.device_id
            );
            sensors.push(sensor);
        }
        Ok(sensors)
    }

    /// Run the full enumeration sequence: system info, counts, every
    /// device, every sensor, one state sweep. States are attached to
    /// sensors by id.
    pub async fn inventory(&mut self) -> Result<Inventory> {
        let system = self.system_info().await?;
        let counts = self.device_sensor_count().await?;

        let mut devices = Vec::new();
        for id in id_range(counts.last_device_id) {
            devices.push(self.device_info(id).await?);
        }

        let mut sensors = Vec::new();
        for id in id_range(counts.last_sensor_id) {
            sensors.push(Sensor {
                info: self.sensor_info(id).await?,
                state: None,
            });
        }

        let states = self.sensor_states().await?;
        attach_states(&mut sensors, &states);

        Ok(Inventory {
            system,
            devices,
            sensors,
        })
    }

    /// Refresh the states of an already-enumerated sensor list.
    pub async fn update_sensor_states(&mut self, sensors: &mut [Sensor]) -> Result<()> {
        let states = self.sensor_states().await?;
        attach_states(sensors, &states);
        Ok(())
    }

    /// Close the session explicitly. Dropping the client has the same
    /// effect.
    pub async fn shutdown(self) -> Result<()> {
        Ok(self.channel.shutdown().await?)
    }
}

/// A sensor descriptor paired with its latest raw state.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub info: SensorInfo,
    pub state: Option<IntBytes>,
}

impl Sensor {
    /// The state projected onto physical units, when both the state and a
    /// projection for this sensor type exist.
    pub fn value(&self) -> Option<f64> {
        self.state.and_then(|raw| self.info.sensor_type.project(raw))
    }

    /// The unit of [`value`](Self::value).
    pub fn unit(&self) -> Option<&'static str> {
        self.info.sensor_type.unit()
    }
}

/// Everything one enumeration pass learns about a device.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    pub system: SystemInfo,
    pub devices: Vec<DeviceInfo>,
    pub sensors: Vec<Sensor>,
}

fn attach_states(sensors: &mut [Sensor], states: &[SensorState]) {
    for sensor in sensors.iter_mut() {
        sensor.state = states
            .iter()
            .find(|s| i32::from(s.sensor_id) == sensor.info.sensor_id)
            .map(|s| s.raw);
    }
}

/// Ids 0..=last, empty when the device reports a negative last id.
fn id_range(last_id: i32) -> impl Iterator<Item = u8> {
    (0..=last_id.clamp(-1, u8::MAX as i32))
        .filter_map(|id| u8::try_from(id).ok())
}
