//! Name resolution for the crawl client
//!
//! The caller supplies a [`Dialer`] that owns DNS (and whatever tunnelling it
//! wants to hide behind resolution). The client wraps it so retries can rotate
//! through the addresses of a host instead of hammering the first one.

use async_trait::async_trait;
use hyper::client::connect::dns::Name;
use reqwest::dns::{Addrs, Resolve, Resolving};
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Hosts tracked before the rotation table is reset
const MAX_TRACKED_HOSTS: usize = 4096;

/// Resolves host names into candidate socket addresses
#[async_trait]
pub trait Dialer: Send + Sync + 'static {
    /// Returns every address `host` resolves to; ports are ignored
    async fn resolve(&self, host: &str) -> io::Result<Vec<SocketAddr>>;
}

/// Dialer backed by the system resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDialer;

#[async_trait]
impl Dialer for SystemDialer {
    async fn resolve(&self, host: &str) -> io::Result<Vec<SocketAddr>> {
        Ok(tokio::net::lookup_host((host, 0)).await?.collect())
    }
}

/// Per-host rotation offsets used to spread retries across addresses
#[derive(Debug, Default)]
pub struct HostSpray {
    offsets: Mutex<HashMap<String, usize>>,
}

impl HostSpray {
    /// Moves `host` on to its next resolved address
    pub fn advance(&self, host: &str) {
        let host = host.to_ascii_lowercase();
        let mut offsets = self.offsets.lock().unwrap_or_else(PoisonError::into_inner);
        if offsets.len() >= MAX_TRACKED_HOSTS && !offsets.contains_key(&host) {
            tracing::debug!("Host rotation table full, resetting {} entries", offsets.len());
            offsets.clear();
        }
        let offset = offsets.entry(host).or_insert(0);
        *offset = offset.wrapping_add(1);
    }

    /// How many times `host` has been moved on
    pub fn offset(&self, host: &str) -> usize {
        self.offsets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&host.to_ascii_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Rotates `addrs` so the address the host is currently on comes first
    pub fn arrange(&self, host: &str, mut addrs: Vec<SocketAddr>) -> Vec<SocketAddr> {
        if addrs.len() < 2 {
            return addrs;
        }
        let offset = self.offset(host);
        let len = addrs.len();
        addrs.rotate_left(offset % len);
        addrs
    }
}

/// Adapts a [`Dialer`] to reqwest's resolver hook
pub(crate) struct SprayResolver<D> {
    dialer: Arc<D>,
    spray: Arc<HostSpray>,
}

impl<D: Dialer> SprayResolver<D> {
    pub(crate) fn new(dialer: Arc<D>, spray: Arc<HostSpray>) -> Self {
        Self { dialer, spray }
    }
}

impl<D: Dialer> Resolve for SprayResolver<D> {
    fn resolve(&self, name: Name) -> Resolving {
        let dialer = Arc::clone(&self.dialer);
        let spray = Arc::clone(&self.spray);
        let host = name.as_str().to_string();

        Box::pin(async move {
            let addrs = dialer
                .resolve(&host)
                .await
                .map_err(|e| -> BoxError { Box::new(e) })?;
            let addrs = spray.arrange(&host, addrs);
            tracing::trace!("Resolved {} to {:?}", host, addrs);
            let addrs: Addrs = Box::new(addrs.into_iter());
            Ok::<Addrs, BoxError>(addrs)
        })
    }
}
