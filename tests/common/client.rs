//! Test line-protocol client.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Connect and log in, waiting for the `OK` reply.
    pub async fn login(address: &str, name: &str, zone: &str) -> anyhow::Result<Self> {
        let mut client = Self::connect(address).await?;
        client.send(&format!("LOGIN {name} {zone}")).await?;
        let reply = client.recv().await?;
        anyhow::ensure!(reply == format!("OK {name}"), "login failed: {reply}");
        Ok(client)
    }

    /// Send one line.
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single line.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a line with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        anyhow::ensure!(read > 0, "connection closed");
        Ok(line.trim_end().to_string())
    }

    /// Receive lines until one contains `needle`. Returns that line.
    pub async fn recv_containing(&mut self, needle: &str) -> anyhow::Result<String> {
        loop {
            let line = self.recv().await?;
            if line.contains(needle) {
                return Ok(line);
            }
        }
    }

    /// Assert nothing arrives within `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) {
        if let Ok(line) = self.recv_timeout(dur).await {
            panic!("unexpected line: {line}");
        }
    }
}
