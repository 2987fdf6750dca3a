//! Outbound transports for the simulator

use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use log::{debug, info};
use tessera_core::traits::{Transport, TransportError};

/// How long a TCP post may take to connect or write
pub const TCP_TIMEOUT: Duration = Duration::from_secs(2);

/// Where the poster's requests go
#[derive(Debug, Clone)]
pub enum SimTransport {
    /// Log each request line
    Log,
    /// Open a TCP connection per request and write it
    Tcp(SocketAddr),
}

impl Transport for SimTransport {
    fn post(&mut self, request: &[u8]) -> Result<(), TransportError> {
        match self {
            SimTransport::Log => {
                info!("POST {}", String::from_utf8_lossy(request).trim_end());
                Ok(())
            }
            SimTransport::Tcp(addr) => {
                let mut stream = TcpStream::connect_timeout(addr, TCP_TIMEOUT)
                    .map_err(|_| TransportError::NotConnected)?;
                stream
                    .set_write_timeout(Some(TCP_TIMEOUT))
                    .map_err(|_| TransportError::Io)?;
                stream.write_all(request).map_err(|_| TransportError::Io)?;
                stream.flush().map_err(|_| TransportError::Io)?;
                debug!("Posted {} bytes to {}", request.len(), addr);
                Ok(())
            }
        }
    }
}
