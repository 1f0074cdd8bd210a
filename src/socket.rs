//! Raw TCP writer for line-protocol ingestion.

use crate::client::{DEFAULT_HOST, DEFAULT_PORT};
use crate::datum::Datum;
use crate::error::{ClientError, ClientResult};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct LineSocket {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
}

impl Default for LineSocket {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            stream: None,
        }
    }
}

impl LineSocket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_host(&mut self, host: impl Into<String>) -> &mut Self {
        self.host = host.into();
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn set_port(&mut self, port: u16) -> &mut Self {
        self.port = port;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub async fn connect(&mut self) -> ClientResult<&mut Self> {
        let addr = format!("{}:{}", self.host, self.port);
        match TcpStream::connect(&addr).await {
            Ok(stream) => {
                info!("Connected to {}", addr);
                self.stream = Some(stream);
                Ok(self)
            }
            Err(e) => {
                warn!("Failed to connect to {}: {}", addr, e);
                Err(ClientError::Io(e))
            }
        }
    }

    /// Writes `data` as-is.
    pub async fn write(&mut self, data: &str) -> ClientResult<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ClientError::not_initialized("cannot write, no socket connection"))?;
        let written = stream.write_all(data.as_bytes()).await;
        if let Err(e) = written {
            warn!("Socket write failed, dropping connection: {}", e);
            self.stream = None;
            return Err(ClientError::Io(e));
        }
        debug!("Wrote {} bytes", data.len());
        Ok(())
    }

    /// Sends one data point as a `put` command.
    pub async fn put(&mut self, datum: &Datum) -> ClientResult<()> {
        let line = format!("put {}\n", datum.to_line()?);
        self.write(&line).await
    }

    /// Sends several data points in a single write. Nothing is sent if any
    /// datum is incomplete.
    pub async fn put_batch(&mut self, data: &[Datum]) -> ClientResult<()> {
        let mut buffer = String::new();
        for datum in data {
            buffer.push_str("put ");
            buffer.push_str(&datum.to_line()?);
            buffer.push('\n');
        }
        self.write(&buffer).await
    }

    /// Flushes and shuts down the connection, if any.
    pub async fn close(&mut self) -> ClientResult<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await?;
            info!("Closed connection to {}:{}", self.host, self.port);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let socket = LineSocket::new();
        assert_eq!(socket.host(), "127.0.0.1");
        assert_eq!(socket.port(), 4242);
        assert!(!socket.is_connected());
    }

    #[tokio::test]
    async fn test_write_without_connection() {
        let mut socket = LineSocket::new();
        let err = socket.write("put m 1406003885818 1\n").await.unwrap_err();
        assert!(matches!(err, ClientError::NotInitialized { .. }));
        socket.close().await.unwrap();
    }
}
