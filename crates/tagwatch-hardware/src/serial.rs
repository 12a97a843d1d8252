//! Serial port transport.
//!
//! `serialport` is blocking, so every read and write runs on Tokio's
//! blocking pool with the port behind a shared lock.

use std::io::{ErrorKind, Read, Write};
use std::sync::Arc;

use bytes::BytesMut;
use serialport::{DataBits, Parity, SerialPort, StopBits};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::types::SerialSettings;
use crate::{HardwareError, Result, traits::Transport};

/// Largest chunk moved per blocking read.
const READ_CHUNK: usize = 256;

/// Reader link over a serial port, 8N1.
pub struct SerialTransport {
    port: Arc<Mutex<Box<dyn SerialPort>>>,
    settings: SerialSettings,
}

impl SerialTransport {
    /// Open the port described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::ConfigurationError`] if the port cannot be
    /// opened with these settings.
    pub fn open(settings: SerialSettings) -> Result<Self> {
        let port = serialport::new(&settings.port, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|err| {
                HardwareError::configuration(format!("cannot open {}: {err}", settings.port))
            })?;

        debug!(port = %settings.port, baud = settings.baud_rate, "serial port opened");
        Ok(Self {
            port: Arc::new(Mutex::new(port)),
            settings,
        })
    }

    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Transport for SerialTransport {
    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let port = Arc::clone(&self.port);
        let frame = bytes.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut port = port.blocking_lock();
            // Stale bytes from an earlier cycle would misalign the next frame.
            port.clear(serialport::ClearBuffer::Input)
                .map_err(|err| HardwareError::communication(err.to_string()))?;
            port.write_all(&frame)?;
            port.flush()?;
            Ok::<_, HardwareError>(())
        })
        .await
        .map_err(|err| HardwareError::communication(format!("write task failed: {err}")))??;

        trace!(len = bytes.len(), "request written");
        tokio::time::sleep(self.settings.settle_delay).await;
        Ok(())
    }

    async fn receive(&mut self, buf: &mut BytesMut) -> Result<usize> {
        let port = Arc::clone(&self.port);

        let chunk = tokio::task::spawn_blocking(move || {
            let mut chunk = vec![0u8; READ_CHUNK];
            match port.blocking_lock().read(&mut chunk) {
                Ok(n) => {
                    chunk.truncate(n);
                    Ok(chunk)
                }
                Err(err) if err.kind() == ErrorKind::TimedOut => Ok(Vec::new()),
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                    Err(HardwareError::disconnected(err.to_string()))
                }
                Err(err) => Err(HardwareError::transport_read(err.to_string())),
            }
        })
        .await
        .map_err(|err| HardwareError::communication(format!("read task failed: {err}")))??;

        buf.extend_from_slice(&chunk);
        Ok(chunk.len())
    }
}
