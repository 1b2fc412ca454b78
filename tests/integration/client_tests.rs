use async_trait::async_trait;
use reqwest::Response;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use sumi_formfill::client::{
    build_client, is_interception_proxy, ClientOptions, CrawlClient, CrawlRequest, Dialer,
    RedirectObserver, SystemDialer,
};
use sumi_formfill::ClientError;
use url::Url;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Options with fast retries for tests
fn test_options(retries: u32) -> ClientOptions {
    ClientOptions {
        retries,
        proxy: String::new(),
        timeout_secs: 5,
        retry_wait_min_ms: 1,
        retry_wait_max_ms: 5,
    }
}

/// Resolves `spray.test` to loopback and counts lookups
#[derive(Default)]
struct CountingDialer {
    lookups: AtomicUsize,
}

#[async_trait]
impl Dialer for CountingDialer {
    async fn resolve(&self, host: &str) -> io::Result<Vec<SocketAddr>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if host == "spray.test" {
            Ok(vec![SocketAddr::from(([127, 0, 0, 1], 0))])
        } else {
            Err(io::Error::new(io::ErrorKind::NotFound, host.to_string()))
        }
    }
}

/// Builds a client whose observer records every reported depth
async fn recording_client(options: ClientOptions) -> (CrawlClient, Arc<Mutex<Vec<u32>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let observer: RedirectObserver = Arc::new(move |response: &Response, depth: u32| {
        assert!(response.status().is_redirection());
        sink.lock().unwrap().push(depth);
    });

    let (client, _dialer) = build_client(Arc::new(SystemDialer), &options, Some(observer))
        .await
        .expect("Failed to build client");
    (client, seen)
}

fn get(client: &CrawlClient, url: &str) -> CrawlRequest {
    let request = client
        .get(Url::parse(url).unwrap())
        .build()
        .expect("Failed to build request");
    CrawlRequest::new(request)
}

/// Mounts a redirect chain /hop/0 -> /hop/1 -> ... -> /hop/{hops}, the last one serving 200
async fn mount_chain(server: &MockServer, hops: usize) {
    for i in 0..hops {
        Mock::given(method("GET"))
            .and(path(format!("/hop/{}", i)))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", format!("/hop/{}", i + 1).as_str()),
            )
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/hop/{}", hops)))
        .respond_with(ResponseTemplate::new(200).set_body_string("end"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_build_returns_dialer_unchanged() {
    let dialer = Arc::new(SystemDialer);
    let (client, returned) = build_client(Arc::clone(&dialer), &test_options(2), None)
        .await
        .expect("Failed to build client");

    assert!(Arc::ptr_eq(&dialer, &returned));
    assert_eq!(client.options().retries, 2);
    assert!(client.proxy().is_none());
    assert!(!client.tls_capped());
}

#[tokio::test]
async fn test_redirect_depth_defaults_to_two() {
    let mock_server = MockServer::start().await;
    mount_chain(&mock_server, 1).await;

    let (client, seen) = recording_client(test_options(0)).await;
    let response = client
        .execute(get(&client, &format!("{}/hop/0", mock_server.uri())))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), 200);
    assert!(response.url().path().ends_with("/hop/1"));
    assert_eq!(*seen.lock().unwrap(), vec![2]);
}

#[tokio::test]
async fn test_redirect_reports_attached_depth() {
    let mock_server = MockServer::start().await;
    mount_chain(&mock_server, 3).await;

    let (client, seen) = recording_client(test_options(0)).await;
    let request = get(&client, &format!("{}/hop/0", mock_server.uri())).with_depth(5);
    client.execute(request).await.expect("Request failed");

    assert_eq!(*seen.lock().unwrap(), vec![5, 5, 5]);
}

#[tokio::test]
async fn test_ten_redirects_are_followed() {
    let mock_server = MockServer::start().await;
    mount_chain(&mock_server, 10).await;

    let (client, seen) = recording_client(test_options(0)).await;
    let response = client
        .execute(get(&client, &format!("{}/hop/0", mock_server.uri())))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), 200);
    assert_eq!(seen.lock().unwrap().len(), 10);
}

#[tokio::test]
async fn test_eleventh_redirect_fails() {
    let mock_server = MockServer::start().await;
    mount_chain(&mock_server, 11).await;

    let (client, seen) = recording_client(test_options(3)).await;
    let result = client
        .execute(get(&client, &format!("{}/hop/0", mock_server.uri())))
        .await;

    match result {
        Err(ClientError::TooManyRedirects { url }) => assert!(url.ends_with("/hop/10")),
        other => panic!("Expected TooManyRedirects, got {:?}", other),
    }
    // The aborted hop is not observed
    assert_eq!(seen.lock().unwrap().len(), 10);
}

#[tokio::test]
async fn test_no_observer_still_follows() {
    let mock_server = MockServer::start().await;
    mount_chain(&mock_server, 2).await;

    let (client, _dialer) = build_client(Arc::new(SystemDialer), &test_options(0), None)
        .await
        .unwrap();
    let response = client
        .execute(get(&client, &format!("{}/hop/0", mock_server.uri())))
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "end");
}

#[tokio::test]
async fn test_see_other_switches_post_to_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(303).insert_header("location", "/done"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/done"))
        .respond_with(ResponseTemplate::new(200).set_body_string("thanks"))
        .mount(&mock_server)
        .await;

    let (client, seen) = recording_client(test_options(0)).await;
    let request = client
        .request(
            reqwest::Method::POST,
            Url::parse(&format!("{}/submit", mock_server.uri())).unwrap(),
        )
        .body("a=1")
        .build()
        .unwrap();
    let response = client.execute(CrawlRequest::new(request)).await.unwrap();

    assert_eq!(response.text().await.unwrap(), "thanks");
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_temporary_redirect_keeps_method_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(307).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/new"))
        .and(body_string("a=1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&mock_server)
        .await;

    let (client, _seen) = recording_client(test_options(0)).await;
    let request = client
        .request(
            reqwest::Method::POST,
            Url::parse(&format!("{}/old", mock_server.uri())).unwrap(),
        )
        .body("a=1")
        .build()
        .unwrap();
    let response = client.execute(CrawlRequest::new(request)).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "moved");
}

#[tokio::test]
async fn test_unreplayable_temporary_redirect_is_returned_unreported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(307).insert_header("location", "/elsewhere"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let payload = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(payload.path(), "a=1").unwrap();
    let file = tokio::fs::File::open(payload.path()).await.unwrap();

    let (client, seen) = recording_client(test_options(0)).await;
    let request = client
        .request(
            reqwest::Method::POST,
            Url::parse(&format!("{}/upload", mock_server.uri())).unwrap(),
        )
        .body(reqwest::Body::from(file))
        .build()
        .unwrap();
    let response = client.execute(CrawlRequest::new(request)).await.unwrap();

    // A streamed body cannot be sent twice, so the chain stops here
    assert_eq!(response.status(), 307);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_not_modified_is_not_followed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cached"))
        .respond_with(ResponseTemplate::new(304).insert_header("location", "/elsewhere"))
        .mount(&mock_server)
        .await;

    let (client, seen) = recording_client(test_options(0)).await;
    let response = client
        .execute(get(&client, &format!("{}/cached", mock_server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status(), 304);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&mock_server)
        .await;

    let (client, _seen) = recording_client(test_options(1)).await;
    let response = client
        .execute(get(&client, &format!("{}/flaky", mock_server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "recovered");
}

#[tokio::test]
async fn test_retry_resolves_through_dialer_and_rotates_host() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&mock_server)
        .await;

    let (client, dialer) =
        build_client(Arc::new(CountingDialer::default()), &test_options(1), None)
            .await
            .expect("Failed to build client");
    assert_eq!(client.host_spray().offset("spray.test"), 0);

    let url = format!("http://spray.test:{}/flaky", mock_server.address().port());
    let response = client.execute(get(&client, &url)).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "recovered");
    assert!(dialer.lookups.load(Ordering::SeqCst) >= 1);
    assert_eq!(client.host_spray().offset("spray.test"), 1);
    assert_eq!(client.host_spray().offset("SPRAY.test"), 1);
}

#[tokio::test]
async fn test_no_retries_returns_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _seen) = recording_client(test_options(0)).await;
    let response = client
        .execute(get(&client, &format!("{}/down", mock_server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let (client, _seen) = recording_client(test_options(2)).await;
    let response = client
        .execute(get(&client, &format!("{}/down", mock_server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn test_not_implemented_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nope"))
        .respond_with(ResponseTemplate::new(501))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _seen) = recording_client(test_options(3)).await;
    let response = client
        .execute(get(&client, &format!("{}/nope", mock_server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status(), 501);
}

#[tokio::test]
async fn test_connection_failure_surfaces_http_error() {
    let (client, _seen) = recording_client(test_options(1)).await;
    let result = client.execute(get(&client, "http://127.0.0.1:1/")).await;

    assert!(matches!(result, Err(ClientError::Http { .. })));
}

// Construction keeps the no-error contract for bad proxies: they are skipped.
#[tokio::test]
async fn test_invalid_proxy_is_skipped() {
    let mut options = test_options(0);
    options.proxy = "not a url".to_string();

    let (client, _dialer) = build_client(Arc::new(SystemDialer), &options, None)
        .await
        .expect("Invalid proxy must not fail construction");

    assert!(client.proxy().is_none());
    assert!(!client.tls_capped());
}

#[tokio::test]
async fn test_plain_proxy_is_attached_without_tls_cap() {
    let proxy_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>squid</html>"))
        .mount(&proxy_server)
        .await;

    let mut options = test_options(0);
    options.proxy = proxy_server.uri();

    let (client, _dialer) = build_client(Arc::new(SystemDialer), &options, None)
        .await
        .unwrap();

    assert!(client.proxy().is_some());
    assert!(!client.tls_capped());
}

#[tokio::test]
async fn test_interception_proxy_caps_tls() {
    let proxy_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Burp Suite Professional</title></head></html>"),
        )
        .mount(&proxy_server)
        .await;

    let proxy_url = Url::parse(&proxy_server.uri()).unwrap();
    assert!(is_interception_proxy(&proxy_url).await);

    let mut options = test_options(0);
    options.proxy = proxy_server.uri();
    let (client, _dialer) = build_client(Arc::new(SystemDialer), &options, None)
        .await
        .unwrap();

    assert_eq!(client.proxy(), Some(&proxy_url));
    assert!(client.tls_capped());
}

#[tokio::test]
async fn test_unreachable_proxy_is_not_interception() {
    let proxy_url = Url::parse("http://127.0.0.1:1").unwrap();
    assert!(!is_interception_proxy(&proxy_url).await);
}
