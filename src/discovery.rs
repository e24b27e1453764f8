//! UDP announcement listener.
//!
//! The plugs broadcast a datagram on a well-known port every few seconds.
//! The payload is opaque vendor data; the sender address alone is the
//! announcement. Every sender ends up in the [`DeviceRegistry`], where the
//! poller picks it up on its next cycle.

use crate::registry::DeviceRegistry;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, error, info};

pub struct AnnouncementListener {
    socket: UdpSocket,
    registry: Arc<DeviceRegistry>,
}

impl AnnouncementListener {
    /// Binds the announcement socket. Failure here is fatal for the whole
    /// process; there is no point polling devices we can never discover.
    pub async fn bind(port: u16, registry: Arc<DeviceRegistry>) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("failed to bind announcement socket on udp/{port}"))?;
        Ok(Self { socket, registry })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receives announcements until the shutdown signal flips. A receive
    /// error ends this component (logged, socket dropped) without taking
    /// the rest of the process down; nothing in normal operation produces
    /// one.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut buf = [0u8; 1024];
        info!(
            "listening for device announcements on udp/{}",
            self.socket.local_addr().map(|a| a.port()).unwrap_or(0)
        );

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                recv = self.socket.recv_from(&mut buf) => match recv {
                    Ok((_, sender)) => {
                        let addr = sender.ip().to_string();
                        if self.registry.add(&addr) {
                            info!("discovered device {addr}");
                        } else {
                            debug!("re-announcement from {addr}");
                        }
                    }
                    Err(e) => {
                        error!("announcement socket failed, stopping discovery: {e}");
                        break;
                    }
                },
            }
        }
        info!("announcement listener stopped");
    }
}
