//! Port abstraction for the radio modem link, so the uplink can be tested
//! without hardware.

use async_trait::async_trait;
use std::io;

/// Byte sink leading to the radio modem
#[async_trait]
pub trait UplinkPort: Send {
    /// Write one payload and flush it to the device
    async fn send(&mut self, payload: &[u8]) -> io::Result<()>;

    /// Device the port is attached to
    fn device_path(&self) -> &str;
}

/// Serial modem attached through `tokio-serial`
pub struct SerialModemPort {
    stream: tokio_serial::SerialStream,
    device_path: String,
}

impl SerialModemPort {
    pub fn new(stream: tokio_serial::SerialStream, device_path: impl Into<String>) -> Self {
        Self {
            stream,
            device_path: device_path.into(),
        }
    }
}

#[async_trait]
impl UplinkPort for SerialModemPort {
    async fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.stream.write_all(payload).await?;
        self.stream.flush().await
    }

    fn device_path(&self) -> &str {
        &self.device_path
    }
}
