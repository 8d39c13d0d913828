//! Request dispatch module
//!
//! Entry point for HTTP request processing: picks the API or static handler,
//! runs the not-found fallback, then finishes the response (Server header,
//! HEAD body stripping, access log).

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{
    HeaderName, HeaderValue, HOST, IF_MODIFIED_SINCE, IF_NONE_MATCH, SERVER, USER_AGENT,
};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::handler::slot::{Outcome, ResponseSlot};
use crate::handler::{api, not_found, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub method: &'a Method,
    /// URL path component; query and fragment are not part of it
    pub path: &'a str,
    pub host: Option<&'a str>,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            method: req.method(),
            path: req.uri().path(),
            host: header_str(req, HOST),
            if_none_match: header_str(req, IF_NONE_MATCH),
            if_modified_since: header_str(req, IF_MODIFIED_SINCE),
        }
    }
}

fn header_str<B>(req: &Request<B>, name: HeaderName) -> Option<&str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let start = Instant::now();
    let ctx = RequestContext::from_request(&req);

    logger::log_debug(&format!(
        "{} {} (host: {})",
        ctx.method,
        ctx.path,
        ctx.host.unwrap_or("-")
    ));

    let (mut response, outcome) = dispatch(&ctx, &state).await;

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    // Headers, including Content-Length, stay as they would be for GET
    if *ctx.method == Method::HEAD {
        *response.body_mut() = Full::new(Bytes::new());
    }

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            ctx.method.to_string(),
            ctx.path.to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.host = ctx.host.map(ToString::to_string);
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.cache_status = outcome.as_str();
        entry.user_agent = header_str(&req, USER_AGENT).map(ToString::to_string);
        entry.request_time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route the request and return the response that filled the slot
///
/// The API handler owns paths under the API prefix, the static handler
/// everything else. The not-found handler always runs last and only answers
/// when the slot is still empty.
pub async fn dispatch(
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> (Response<Full<Bytes>>, Outcome) {
    let mut slot = ResponseSlot::new();

    if api::is_api_path(ctx.path, &state.config.static_files.api_prefix) {
        api::handle(ctx, state, &mut slot);
    } else {
        static_files::handle(ctx, state, &mut slot).await;
    }

    not_found::handle(state, &mut slot).await;

    slot.into_parts()
        .unwrap_or_else(|| (http::build_404_response(), Outcome::NotFound))
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Overrides};
    use crate::http::{fingerprint, FingerprintAlgorithm};
    use crate::strategy::CacheStrategy;
    use http_body_util::BodyExt;
    use hyper::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, ETAG, EXPIRES, LAST_MODIFIED};
    use hyper::StatusCode;
    use std::path::Path;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn state_for(root: &Path, strategy: CacheStrategy) -> Arc<AppState> {
        let overrides = Overrides {
            strategy: Some(strategy.name().to_string()),
            root: Some(root.to_string_lossy().into_owned()),
        };
        let mut config = Config::load_from("no-such-config-file", &overrides).unwrap();
        config.logging.access_log = false;
        Arc::new(AppState::new(config))
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "hello").unwrap();
        dir
    }

    async fn send(
        state: &Arc<AppState>,
        method: Method,
        uri: &str,
        headers: &[(HeaderName, &str)],
    ) -> Response<Full<Bytes>> {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        let req = builder.body(()).unwrap();
        let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        handle_request(req, Arc::clone(state), peer).await.unwrap()
    }

    async fn get(state: &Arc<AppState>, uri: &str, headers: &[(HeaderName, &str)]) -> Response<Full<Bytes>> {
        send(state, Method::GET, uri, headers).await
    }

    async fn body_of(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    fn header<'a>(response: &'a Response<Full<Bytes>>, name: &HeaderName) -> Option<&'a str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_etag_round_trip() {
        let dir = site();
        let state = state_for(dir.path(), CacheStrategy::MaxAgeEtag);

        let first = get(&state, "/", &[]).await;
        assert_eq!(first.status(), StatusCode::OK);
        let etag = header(&first, &ETAG).unwrap().to_string();
        assert_eq!(etag, fingerprint(b"hello", FingerprintAlgorithm::Sha256));
        assert_eq!(header(&first, &CACHE_CONTROL), Some("max-age=10"));
        assert_eq!(header(&first, &SERVER), Some("cachelab"));
        assert_eq!(body_of(first).await, "hello");

        let second = get(&state, "/", &[(IF_NONE_MATCH, etag.as_str())]).await;
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
        assert!(header(&second, &ETAG).is_none());
        assert!(header(&second, &CONTENT_TYPE).is_none());
        assert!(body_of(second).await.is_empty());
    }

    #[tokio::test]
    async fn test_etag_changes_with_content() {
        let dir = site();
        let state = state_for(dir.path(), CacheStrategy::NoCacheEtag);

        let first = get(&state, "/index.html", &[]).await;
        let etag = header(&first, &ETAG).unwrap().to_string();
        assert_eq!(header(&first, &CACHE_CONTROL), Some("no-cache"));

        std::fs::write(dir.path().join("index.html"), "hello again").unwrap();
        let second = get(&state, "/index.html", &[(IF_NONE_MATCH, etag.as_str())]).await;
        assert_eq!(second.status(), StatusCode::OK);
        assert_ne!(header(&second, &ETAG).unwrap(), etag);
        assert_eq!(body_of(second).await, "hello again");
    }

    #[tokio::test]
    async fn test_last_modified_round_trip() {
        let dir = site();
        let index = dir.path().join("index.html");
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        std::fs::File::options()
            .write(true)
            .open(&index)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
        let state = state_for(dir.path(), CacheStrategy::MaxAgeLastModified);

        let first = get(&state, "/", &[]).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(
            header(&first, &LAST_MODIFIED),
            Some("Sun, 09 Sep 2001 01:46:40 GMT")
        );
        assert!(header(&first, &ETAG).is_none());

        let second = get(
            &state,
            "/",
            &[(IF_MODIFIED_SINCE, "Sun, 09 Sep 2001 01:46:40 GMT")],
        )
        .await;
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
        assert!(body_of(second).await.is_empty());

        // A different mtime no longer matches
        std::fs::File::options()
            .write(true)
            .open(&index)
            .unwrap()
            .set_modified(mtime + Duration::from_secs(60))
            .unwrap();
        let third = get(
            &state,
            "/",
            &[(IF_MODIFIED_SINCE, "Sun, 09 Sep 2001 01:46:40 GMT")],
        )
        .await;
        assert_eq!(third.status(), StatusCode::OK);
        assert_eq!(
            header(&third, &LAST_MODIFIED),
            Some("Sun, 09 Sep 2001 01:47:40 GMT")
        );
    }

    #[tokio::test]
    async fn test_if_none_match_takes_precedence() {
        let dir = site();
        let state = state_for(dir.path(), CacheStrategy::MaxAgeLastModifiedEtag);

        let first = get(&state, "/", &[]).await;
        let etag = header(&first, &ETAG).unwrap().to_string();
        let last_modified = header(&first, &LAST_MODIFIED).unwrap().to_string();

        // Stale ETag wins over a matching date
        let changed = get(
            &state,
            "/",
            &[
                (IF_NONE_MATCH, "\"stale\""),
                (IF_MODIFIED_SINCE, last_modified.as_str()),
            ],
        )
        .await;
        assert_eq!(changed.status(), StatusCode::OK);

        // Matching ETag wins over a bogus date
        let unchanged = get(
            &state,
            "/",
            &[
                (IF_NONE_MATCH, etag.as_str()),
                (IF_MODIFIED_SINCE, "Thu, 01 Jan 1970 00:00:00 GMT"),
            ],
        )
        .await;
        assert_eq!(unchanged.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_unconditional_requests_always_fresh() {
        let dir = site();
        for strategy in CacheStrategy::ALL {
            let state = state_for(dir.path(), strategy);
            let response = get(&state, "/", &[]).await;
            assert_eq!(response.status(), StatusCode::OK, "{strategy}");
            assert_eq!(header(&response, &CONTENT_TYPE), Some("text/html; charset=utf-8"));
            assert_eq!(body_of(response).await, "hello", "{strategy}");
        }
    }

    #[tokio::test]
    async fn test_validators_ignored_without_support() {
        let dir = site();
        let state = state_for(dir.path(), CacheStrategy::Expires);

        let response = get(&state, "/", &[(IF_NONE_MATCH, "*")]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(header(&response, &CACHE_CONTROL).is_none());
        let expires = header(&response, &EXPIRES).unwrap();
        assert!(crate::http::date::parse_http_date(expires).is_some());
    }

    #[tokio::test]
    async fn test_not_found_document() {
        let dir = site();
        std::fs::write(dir.path().join("404.html"), "<h1>missing</h1>").unwrap();
        let state = state_for(dir.path(), CacheStrategy::MaxAgeEtag);

        let response = get(&state, "/nope.css", &[]).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(header(&response, &CONTENT_TYPE), Some("text/html; charset=utf-8"));
        assert!(header(&response, &ETAG).is_none());
        assert_eq!(body_of(response).await, "<h1>missing</h1>");
    }

    #[tokio::test]
    async fn test_not_found_without_document() {
        let dir = site();
        let state = state_for(dir.path(), CacheStrategy::MaxAge);

        let response = get(&state, "/missing/page", &[]).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await, "404 Not Found");
    }

    #[tokio::test]
    async fn test_traversal_is_not_served() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("static");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("index.html"), "hello").unwrap();
        std::fs::write(dir.path().join("secret.txt"), "secret").unwrap();
        let state = state_for(&root, CacheStrategy::MaxAge);

        for uri in ["/../secret.txt", "/%2e%2e/secret.txt", "/a/..%2f..%2fsecret.txt"] {
            let response = get(&state, uri, &[]).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_head_strips_body() {
        let dir = site();
        let state = state_for(dir.path(), CacheStrategy::MaxAgeEtag);

        let response = send(&state, Method::HEAD, "/", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, &CONTENT_LENGTH), Some("5"));
        assert!(header(&response, &ETAG).is_some());
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_api_endpoints() {
        let dir = site();
        let state = state_for(dir.path(), CacheStrategy::NoCacheLastModified);

        let response = get(&state, "/api/strategy", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, &CONTENT_TYPE), Some("application/json"));
        let json: serde_json::Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(json["name"], "no-cache-last-modified");
        assert_eq!(json["cache_control"], "no-cache");
        assert_eq!(json["validators"]["last_modified"], true);
        assert_eq!(json["validators"]["etag"], false);
        assert_eq!(json["fingerprint"], "sha256");

        let response = get(&state, "/api/strategies", &[]).await;
        let json: serde_json::Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(json["strategies"].as_array().unwrap().len(), 12);

        let response = get(&state, "/api/other", &[]).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_query_is_ignored() {
        let dir = site();
        let state = state_for(dir.path(), CacheStrategy::NoStore);

        let response = get(&state, "/index.html?v=3", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, &CACHE_CONTROL), Some("no-store"));
    }
}
