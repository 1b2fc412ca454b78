//! Crawl HTTP client module
//!
//! This module builds the client every fetch goes through:
//! - Connection pooling with certificate checks disabled (targets are untrusted)
//! - Optional proxy, with TLS capped at 1.2 behind interception proxies
//! - Retries that spread across the resolved addresses of a host
//! - Manual redirect following (max 10 hops) reporting the crawl depth

mod dialer;
mod factory;
mod options;
mod proxy;
mod redirect;
mod retry;

pub use dialer::{Dialer, HostSpray, SystemDialer};
pub use factory::{build_client, CrawlClient};
pub use options::ClientOptions;
pub use proxy::is_interception_proxy;
pub use redirect::{CrawlRequest, RedirectObserver, DEFAULT_REDIRECT_DEPTH, MAX_REDIRECTS};
