//! Redirect following and crawl-depth observation
//!
//! The crawl client follows redirects itself instead of letting reqwest do
//! it, so that each hop can be reported together with the depth the
//! originating page sat at.

use crate::ClientError;
use reqwest::header::{
    HeaderMap, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, LOCATION, WWW_AUTHENTICATE,
};
use reqwest::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;

/// Hard cap on redirect hops in a single chain
pub const MAX_REDIRECTS: usize = 10;

/// Depth reported for requests that carry none
pub const DEFAULT_REDIRECT_DEPTH: u32 = 2;

/// Observer invoked on every followed redirect with the redirect response and depth
pub type RedirectObserver = Arc<dyn Fn(&Response, u32) + Send + Sync>;

/// A request plus the crawl depth of the page it originates from
#[derive(Debug)]
pub struct CrawlRequest {
    request: Request,
    depth: Option<u32>,
}

impl CrawlRequest {
    /// Wraps a request with no depth attached
    pub fn new(request: Request) -> Self {
        Self {
            request,
            depth: None,
        }
    }

    /// Attaches the crawl depth of the originating page
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    /// The attached depth, if any
    pub fn depth(&self) -> Option<u32> {
        self.depth
    }

    /// The depth reported to the redirect observer
    pub fn resolved_depth(&self) -> u32 {
        self.depth.unwrap_or(DEFAULT_REDIRECT_DEPTH)
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub(crate) fn into_parts(self) -> (Request, u32) {
        let depth = self.resolved_depth();
        (self.request, depth)
    }
}

impl From<Request> for CrawlRequest {
    fn from(request: Request) -> Self {
        Self::new(request)
    }
}

/// What the client needs from a sent request to build the next hop
pub(crate) struct HopTemplate {
    method: Method,
    headers: HeaderMap,
    timeout: Option<Duration>,
    replay: Option<Request>,
}

impl HopTemplate {
    /// Captures `request` before it is consumed by sending
    pub(crate) fn capture(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            headers: request.headers().clone(),
            timeout: request.timeout().copied(),
            replay: request.try_clone(),
        }
    }
}

/// Returns the `Location` of a response the client should follow, if any
pub(crate) fn redirect_location(response: &Response) -> Option<&str> {
    match response.status() {
        StatusCode::MOVED_PERMANENTLY
        | StatusCode::FOUND
        | StatusCode::SEE_OTHER
        | StatusCode::TEMPORARY_REDIRECT
        | StatusCode::PERMANENT_REDIRECT => {
            response.headers().get(LOCATION)?.to_str().ok()
        }
        _ => None,
    }
}

/// Builds the request for the next hop of a redirect chain
///
/// 301/302/303 switch to a body-less `GET` (`HEAD` stays `HEAD`); 307/308
/// resend the original method and body. Returns `Ok(None)` when the body of a
/// 307/308 cannot be replayed, in which case the redirect response is final.
pub(crate) fn next_hop(
    response: &Response,
    location: &str,
    template: HopTemplate,
) -> Result<Option<Request>, ClientError> {
    let next_url = response
        .url()
        .join(location)
        .map_err(|_| ClientError::InvalidRedirect {
            url: response.url().to_string(),
            location: location.to_string(),
        })?;

    let preserve_method = matches!(
        response.status(),
        StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT
    );

    let mut next = if preserve_method {
        match template.replay {
            Some(mut replay) => {
                *replay.url_mut() = next_url.clone();
                replay
            }
            None => return Ok(None),
        }
    } else {
        let method = if template.method == Method::HEAD {
            Method::HEAD
        } else {
            Method::GET
        };
        let mut request = Request::new(method, next_url.clone());
        *request.headers_mut() = template.headers;
        request.headers_mut().remove(CONTENT_TYPE);
        request.headers_mut().remove(CONTENT_LENGTH);
        *request.timeout_mut() = template.timeout;
        request
    };

    if response.url().host_str() != next_url.host_str() {
        for header in [AUTHORIZATION, COOKIE, WWW_AUTHENTICATE] {
            next.headers_mut().remove(header);
        }
    }

    Ok(Some(next))
}
