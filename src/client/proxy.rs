use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Page markers served by interception proxies on their own root URL
const INTERCEPTION_MARKERS: &[&str] = &["Burp Suite"];

const DETECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Checks whether `proxy_url` points at a local interception proxy
///
/// The proxy's own root page is fetched directly (not through any proxy) and
/// searched for known markers. Every failure counts as "not an interception
/// proxy".
pub async fn is_interception_proxy(proxy_url: &Url) -> bool {
    let client = match Client::builder().no_proxy().timeout(DETECT_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::debug!("Could not build proxy detection client: {}", e);
            return false;
        }
    };

    let body = match client.get(proxy_url.clone()).send().await {
        Ok(response) => match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Could not read proxy detection body from {}: {}", proxy_url, e);
                return false;
            }
        },
        Err(e) => {
            tracing::debug!("Proxy detection request to {} failed: {}", proxy_url, e);
            return false;
        }
    };

    INTERCEPTION_MARKERS.iter().any(|marker| body.contains(marker))
}
