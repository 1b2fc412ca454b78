//! Crawl client construction and request dispatch

use crate::client::dialer::{Dialer, HostSpray, SprayResolver};
use crate::client::options::ClientOptions;
use crate::client::proxy::is_interception_proxy;
use crate::client::redirect::{
    next_hop, redirect_location, CrawlRequest, HopTemplate, RedirectObserver, MAX_REDIRECTS,
};
use crate::client::retry::{backoff, is_retryable_error, is_retryable_status};
use crate::ClientError;
use reqwest::{redirect::Policy, tls, Client, Method, Proxy, Request, RequestBuilder, Response};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Idle connections kept per host
const MAX_IDLE_CONNS_PER_HOST: usize = 10;

/// TCP keep-alive interval
const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

/// Builds the crawl client
///
/// # Behavior
///
/// - Certificate verification is disabled: crawl targets are untrusted anyway.
/// - A non-empty `options.proxy` that parses as a URL is used for every
///   scheme. When it turns out to be an interception proxy the maximum TLS
///   version is capped at 1.2. An unparsable proxy is skipped with a warning.
/// - Failed attempts are retried `options.retries` times, rotating through
///   the resolved addresses of the host.
/// - Redirects are followed by [`CrawlClient::execute`], at most 10 per chain,
///   and reported to `on_redirect`.
///
/// # Returns
///
/// * `Ok((CrawlClient, Arc<D>))` - The client and the dialer it was given
/// * `Err(ClientError)` - The TLS backend could not be initialized
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sumi_formfill::client::{build_client, ClientOptions, SystemDialer};
///
/// # async fn demo() -> Result<(), sumi_formfill::ClientError> {
/// let (client, _dialer) =
///     build_client(Arc::new(SystemDialer), &ClientOptions::default(), None).await?;
/// # Ok(()) }
/// ```
pub async fn build_client<D: Dialer>(
    dialer: Arc<D>,
    options: &ClientOptions,
    on_redirect: Option<RedirectObserver>,
) -> Result<(CrawlClient, Arc<D>), ClientError> {
    let spray = Arc::new(HostSpray::default());
    let resolver = SprayResolver::new(Arc::clone(&dialer), Arc::clone(&spray));

    let mut builder = Client::builder()
        .dns_resolver(Arc::new(resolver))
        .pool_max_idle_per_host(MAX_IDLE_CONNS_PER_HOST)
        .tcp_keepalive(TCP_KEEPALIVE)
        .danger_accept_invalid_certs(true)
        .redirect(Policy::none()); // Handle redirects manually

    if let Some(timeout) = options.timeout() {
        builder = builder.timeout(timeout);
    }

    let mut proxy = None;
    let mut tls_capped = false;
    if !options.proxy.is_empty() {
        match Url::parse(&options.proxy) {
            Ok(url) => match Proxy::all(url.as_str()) {
                Ok(p) => {
                    if is_interception_proxy(&url).await {
                        tracing::info!("Interception proxy detected at {}, capping TLS at 1.2", url);
                        builder = builder.max_tls_version(tls::Version::TLS_1_2);
                        tls_capped = true;
                    }
                    builder = builder.proxy(p);
                    proxy = Some(url);
                }
                Err(e) => tracing::warn!("Ignoring unusable proxy {}: {}", options.proxy, e),
            },
            Err(e) => tracing::warn!("Ignoring invalid proxy URL {}: {}", options.proxy, e),
        }
    }

    let inner = builder.build().map_err(ClientError::Build)?;

    let client = CrawlClient {
        inner,
        options: options.clone(),
        spray,
        on_redirect,
        proxy,
        tls_capped,
    };
    Ok((client, dialer))
}

/// Retrying, redirect-observing HTTP client shared by crawl tasks
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct CrawlClient {
    inner: Client,
    options: ClientOptions,
    spray: Arc<HostSpray>,
    on_redirect: Option<RedirectObserver>,
    proxy: Option<Url>,
    tls_capped: bool,
}

impl fmt::Debug for CrawlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlClient")
            .field("options", &self.options)
            .field("proxy", &self.proxy)
            .field("tls_capped", &self.tls_capped)
            .field("observes_redirects", &self.on_redirect.is_some())
            .finish()
    }
}

impl CrawlClient {
    /// Starts building a request on the underlying client
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner.request(method, url)
    }

    /// Starts building a `GET` request
    pub fn get(&self, url: Url) -> RequestBuilder {
        self.inner.get(url)
    }

    /// The options the client was built with
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The proxy in use, if one was configured and valid
    pub fn proxy(&self) -> Option<&Url> {
        self.proxy.as_ref()
    }

    /// Per-host address rotation advanced by failed attempts
    pub fn host_spray(&self) -> &HostSpray {
        &self.spray
    }

    /// True when TLS is capped at 1.2 for an interception proxy
    pub fn tls_capped(&self) -> bool {
        self.tls_capped
    }

    /// Sends a request, retrying failed attempts and following redirects
    ///
    /// # Redirect Handling
    ///
    /// Each 301/302/303/307/308 with a `Location` header is one hop. Once 10
    /// hops have been followed, the next redirect fails with
    /// [`ClientError::TooManyRedirects`] without reaching the observer.
    /// Otherwise the observer sees each redirect that is actually followed,
    /// with the request's depth (2 when none was attached). A 307/308 whose
    /// body cannot be replayed is returned as the final response unreported.
    ///
    /// # Returns
    ///
    /// * `Ok(Response)` - The final response, possibly a non-success status
    /// * `Err(ClientError)` - Transport failure after retries, or redirect failure
    pub async fn execute(&self, request: CrawlRequest) -> Result<Response, ClientError> {
        let (mut current, depth) = request.into_parts();
        let mut hops = 0usize;

        loop {
            let template = HopTemplate::capture(&current);
            let response = self.send_with_retry(current).await?;

            let Some(location) = redirect_location(&response).map(str::to_owned) else {
                return Ok(response);
            };

            if hops == MAX_REDIRECTS {
                return Err(ClientError::TooManyRedirects {
                    url: response.url().to_string(),
                });
            }

            match next_hop(&response, &location, template)? {
                Some(next) => {
                    if let Some(observer) = &self.on_redirect {
                        observer(&response, depth);
                    }
                    hops += 1;
                    tracing::debug!(
                        "Redirect {}/{} from {} to {} (depth {})",
                        hops,
                        MAX_REDIRECTS,
                        response.url(),
                        next.url(),
                        depth
                    );
                    current = next;
                }
                None => return Ok(response),
            }
        }
    }

    /// Sends a single hop, retrying per the retry policy
    async fn send_with_retry(&self, request: Request) -> Result<Response, ClientError> {
        let url = request.url().clone();
        let mut attempt = 0u32;
        let mut pending = request;

        loop {
            let replay = if attempt < self.options.retries {
                pending.try_clone()
            } else {
                None
            };

            let outcome = self.inner.execute(pending).await;
            let retryable = match &outcome {
                Ok(response) => is_retryable_status(response.status()),
                Err(e) => is_retryable_error(e),
            };

            match replay {
                Some(next) if retryable => {
                    attempt += 1;
                    if let Some(host) = url.host_str() {
                        self.spray.advance(host);
                    }
                    let wait = backoff(
                        attempt,
                        self.options.retry_wait_min_ms,
                        self.options.retry_wait_max_ms,
                    );
                    match &outcome {
                        Ok(response) => tracing::debug!(
                            "Retry {}/{} for {} after status {} (waiting {:?})",
                            attempt,
                            self.options.retries,
                            url,
                            response.status(),
                            wait
                        ),
                        Err(e) => tracing::debug!(
                            "Retry {}/{} for {} after error: {} (waiting {:?})",
                            attempt,
                            self.options.retries,
                            url,
                            e,
                            wait
                        ),
                    }
                    drop(outcome);
                    tokio::time::sleep(wait).await;
                    pending = next;
                }
                _ => {
                    return outcome.map_err(|source| ClientError::Http {
                        url: url.to_string(),
                        source,
                    })
                }
            }
        }
    }
}
