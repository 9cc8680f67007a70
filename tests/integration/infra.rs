//! Scripted UDP server and packet builders shared by the scenario tests.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use fecftp_core::config::ClientConfig;
use fecftp_core::fec;

/// One step of the server script, executed after the read request arrives.
pub enum ScriptStep {
    /// Send the datagram and immediately move on (final blocks, errors).
    Send(Vec<u8>),
    /// Send the datagram, then wait for one client reply before continuing.
    SendAwait(Vec<u8>),
}

pub struct ScriptedServer {
    pub addr: SocketAddr,
    handle: JoinHandle<Result<Vec<Vec<u8>>>>,
}

impl ScriptedServer {
    /// Bind an ephemeral 127.0.0.1 port and run `script` against the first
    /// client that sends a request.
    pub async fn spawn(script: Vec<ScriptStep>) -> Result<ScriptedServer> {
        let socket = UdpSocket::bind("127.0.0.1:0")
            .await
            .context("failed to bind scripted server")?;
        let addr = socket.local_addr()?;

        let handle = tokio::spawn(async move {
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];

            let (len, peer) = socket.recv_from(&mut buf).await?;
            received.push(buf[..len].to_vec());

            for step in script {
                match step {
                    ScriptStep::Send(packet) => {
                        socket.send_to(&packet, peer).await?;
                    }
                    ScriptStep::SendAwait(packet) => {
                        socket.send_to(&packet, peer).await?;
                        let (len, _) = socket.recv_from(&mut buf).await?;
                        received.push(buf[..len].to_vec());
                    }
                }
            }
            Ok(received)
        });

        Ok(ScriptedServer { addr, handle })
    }

    /// Wait for the script to finish and return every datagram the client
    /// sent, the read request first.
    pub async fn finish(self) -> Result<Vec<Vec<u8>>> {
        self.handle.await.context("server task panicked")?
    }
}

/// Client config pointed at the scripted server's port.
pub fn config_for(server: &ScriptedServer) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.network.port = server.addr.port();
    config
}

/// A fresh destination path under the system temp dir.
pub fn dest_path(test: &str) -> PathBuf {
    std::env::temp_dir().join(format!("fecftp-test-{}-{}", test, std::process::id()))
}

// ── Packet builders ───────────────────────────────────────────────────────────

/// FEC-encoded data packet: `[0x00, 0x03][block][encoded payload]`.
pub fn data_packet(block: u16, data: &[u8]) -> Vec<u8> {
    let mut raw = vec![0x00, 0x03, (block >> 8) as u8, block as u8];
    raw.extend_from_slice(&fec::encode_payload(data));
    raw
}

/// Data packet with two bit errors injected into its first codeword, making
/// that codeword uncorrectable.
pub fn corrupt_packet(block: u16, data: &[u8]) -> Vec<u8> {
    let mut raw = data_packet(block, data);
    raw[4] ^= 0b0000_0011;
    raw
}

/// Error packet: `[0x00, 0x05][code][message]`.
pub fn error_packet(code: u16, message: &str) -> Vec<u8> {
    let mut raw = vec![0x00, 0x05, (code >> 8) as u8, code as u8];
    raw.extend_from_slice(message.as_bytes());
    raw
}

/// 416 data bytes — exactly one full 512-byte wire block after encoding.
pub fn full_block_data(fill: u8) -> Vec<u8> {
    vec![fill; 416]
}
