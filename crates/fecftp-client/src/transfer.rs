//! Transport driver: one UDP socket, one file sink, one TransferSession.
//!
//! Strictly stop-and-wait — at most one outgoing message per received block,
//! sent before the next receive. The receive blocks indefinitely on a silent
//! server; timeout policy belongs to the caller, not here.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::net::{lookup_host, UdpSocket};

use fecftp_core::config::ClientConfig;
use fecftp_core::session::{Step, TransferSession};
use fecftp_core::wire::MAX_DATAGRAM;

/// Resolve a host name to its first usable address, preferring IPv4.
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .with_context(|| format!("failed to resolve {host}"))?
        .collect();
    addrs
        .iter()
        .copied()
        .find(SocketAddr::is_ipv4)
        .or_else(|| addrs.first().copied())
        .with_context(|| format!("no addresses for {host}"))
}

/// Download `remote` from `host` into the file at `dest`, truncating any
/// existing file. Returns the number of bytes written.
pub async fn download(
    host: &str,
    remote: &str,
    dest: &Path,
    noisy: bool,
    config: &ClientConfig,
) -> Result<u64> {
    let server = resolve(host, config.network.port).await?;
    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .context("failed to bind UDP socket")?;

    let mut session = TransferSession::new(remote, noisy, config.transfer.max_retries);
    socket
        .send_to(&session.request(), server)
        .await
        .context("failed to send read request")?;
    tracing::info!(%server, file = remote, noisy, "read request sent");

    let mut sink = File::create(dest)
        .await
        .with_context(|| format!("failed to create {}", dest.display()))?;
    let mut written = 0u64;
    let mut buf = [0u8; MAX_DATAGRAM];

    loop {
        let (len, _peer) = socket
            .recv_from(&mut buf)
            .await
            .context("receive failed")?;

        match session.handle(&buf[..len])? {
            Step::Deliver {
                block,
                data,
                ack,
                last,
            } => {
                sink.write_all(&data)
                    .await
                    .with_context(|| format!("failed to write block {block}"))?;
                sink.flush().await.context("failed to flush sink")?;
                written += data.len() as u64;
                tracing::info!(block, bytes = data.len(), last, "block received");

                if let Some(ack) = ack {
                    socket
                        .send_to(&ack, server)
                        .await
                        .context("failed to send ack")?;
                }
                if last {
                    break;
                }
            }
            Step::Nack { block, reply } => {
                tracing::warn!(block, "uncorrectable block, requesting resend");
                socket
                    .send_to(&reply, server)
                    .await
                    .context("failed to send nack")?;
            }
        }
    }

    tracing::info!(bytes = written, dest = %dest.display(), "transfer complete");
    Ok(written)
}
