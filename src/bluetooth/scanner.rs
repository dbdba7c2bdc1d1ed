/// Serial transport for a BLED112 dongle that is already scanning
use log::{debug, error, info};
use serialport::{ClearBuffer, SerialPort};
use std::io::{ErrorKind, Read};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::config::ScannerConfig;

const READ_TIMEOUT_MS: u64 = 1000;
const READ_BUFFER_LEN: usize = 256;
const CHANNEL_CAPACITY: usize = 64;

/// Open and flush the configured serial port
pub fn open_port(config: &ScannerConfig) -> Result<Box<dyn SerialPort>, serialport::Error> {
    let port = serialport::new(&config.serial_port, config.baud_rate)
        .timeout(Duration::from_millis(READ_TIMEOUT_MS))
        .flow_control(serialport::FlowControl::None)
        .open()?;

    // Drop anything buffered before we started listening
    port.clear(ClearBuffer::All)?;

    info!(
        "Opened serial port {} at {} baud",
        config.serial_port, config.baud_rate
    );
    Ok(port)
}

/// Read bursts from `reader` on a blocking task and forward them in order
///
/// The task ends when the reader reports end of input or a hard error, or when
/// the receiving side is dropped. Read timeouts just mean the line was idle.
pub fn spawn_reader<R>(mut reader: R) -> (mpsc::Receiver<Vec<u8>>, JoinHandle<()>)
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    let handle = tokio::task::spawn_blocking(move || {
        let mut buf = [0u8; READ_BUFFER_LEN];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {
                    info!("Serial input closed");
                    break;
                }
                Ok(n) => {
                    if tx.blocking_send(buf[..n].to_vec()).is_err() {
                        debug!("Byte receiver dropped, stopping reader");
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::Interrupted => {
                    if tx.is_closed() {
                        debug!("Byte receiver dropped on idle line, stopping reader");
                        break;
                    }
                }
                Err(e) => {
                    error!("Serial read failed: {}", e);
                    break;
                }
            }
        }
    });

    (rx, handle)
}
