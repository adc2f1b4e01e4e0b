//! Integration tests for bucketview.
//!
//! Every test starts its own [`FixtureServer`]: a hyper server on
//! `127.0.0.1:0` that answers `GET /{bucket}/list?...` with listing documents
//! written by `bucketview-xml`, and records every request it receives so
//! tests can assert on what went over the wire.
//!
//! ```text
//! cargo test -p bucketview-integration
//! ```

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Once};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use parking_lot::Mutex;
use percent_encoding::percent_decode_str;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use bucketview_core::{BrowserConfig, HttpListingSource};
use bucketview_model::ListingPage;
use bucketview_xml::{ErrorBody, buckets_to_xml, error_to_xml, listing_to_xml};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Routes are keyed by bucket, prefix and continuation token.
type RouteKey = (String, String, Option<String>);

#[derive(Debug, Clone)]
struct Route {
    status: StatusCode,
    body: Bytes,
    delay: Duration,
}

/// A request the fixture server received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Request path, e.g. `/photos/list`.
    pub path: String,
    /// Decoded query parameters.
    pub query: HashMap<String, String>,
}

impl RecordedRequest {
    /// Value of one query parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

#[derive(Debug, Default)]
struct FixtureState {
    routes: Mutex<HashMap<RouteKey, Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FixtureState {
    async fn respond(&self, uri: Uri) -> Response<Full<Bytes>> {
        let recorded = RecordedRequest {
            path: uri.path().to_owned(),
            query: parse_query(uri.query().unwrap_or_default()),
        };
        debug!(path = %recorded.path, query = ?recorded.query, "fixture request");

        let route = recorded
            .path
            .strip_suffix("/list")
            .map(|bucket| {
                (
                    bucket.trim_start_matches('/').to_owned(),
                    recorded.param("prefix").unwrap_or_default().to_owned(),
                    recorded.param("continuation-token").map(ToOwned::to_owned),
                )
            })
            .and_then(|key| self.routes.lock().get(&key).cloned());
        self.requests.lock().push(recorded);

        let route = route.unwrap_or_else(|| Route {
            status: StatusCode::NOT_FOUND,
            body: error_to_xml(&ErrorBody {
                code: "NoSuchBucket".into(),
                message: Some(format!("no listing routed for {}", uri.path())),
            })
            .map(Bytes::from)
            .unwrap_or_default(),
            delay: Duration::ZERO,
        });

        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }

        let mut response = Response::new(Full::new(route.body));
        *response.status_mut() = route.status;
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/xml"),
        );
        response
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (
                percent_decode_str(name).decode_utf8_lossy().into_owned(),
                percent_decode_str(value).decode_utf8_lossy().into_owned(),
            )
        })
        .collect()
}

/// In-process listing endpoint.
#[derive(Debug)]
pub struct FixtureServer {
    addr: SocketAddr,
    state: Arc<FixtureState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FixtureServer {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("failed to bind fixture server: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("fixture server has no address: {e}"));
        let state = Arc::new(FixtureState::default());
        let (tx, rx) = oneshot::channel();

        tokio::spawn(serve(listener, Arc::clone(&state), rx));

        Self {
            addr,
            state,
            shutdown: Some(tx),
        }
    }

    /// Base URL of the server.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Browser configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> BrowserConfig {
        BrowserConfig::builder()
            .endpoint(self.endpoint())
            .request_timeout_secs(5)
            .build()
    }

    /// HTTP listing source pointing at this server.
    #[must_use]
    pub fn source(&self) -> HttpListingSource {
        HttpListingSource::new(&self.config())
            .unwrap_or_else(|e| panic!("failed to build listing source: {e}"))
    }

    /// Answer listings of `bucket` under `prefix` with `page`.
    ///
    /// An empty bucket serves a storage-root bucket listing.
    pub fn serve_listing(&self, bucket: &str, prefix: &str, token: Option<&str>, page: &ListingPage) {
        let body = if bucket.is_empty() {
            buckets_to_xml(page)
        } else {
            listing_to_xml(page, bucket, prefix)
        }
        .unwrap_or_else(|e| panic!("failed to write fixture listing: {e}"));
        self.route(bucket, prefix, token, StatusCode::OK, Bytes::from(body), Duration::ZERO);
    }

    /// Like [`Self::serve_listing`] but answers only after `delay`.
    pub fn serve_listing_after(&self, bucket: &str, prefix: &str, page: &ListingPage, delay: Duration) {
        let body = listing_to_xml(page, bucket, prefix)
            .unwrap_or_else(|e| panic!("failed to write fixture listing: {e}"));
        self.route(bucket, prefix, None, StatusCode::OK, Bytes::from(body), delay);
    }

    /// Answer listings of `bucket` under `prefix` with a raw status and body.
    pub fn serve_raw(&self, bucket: &str, prefix: &str, status: u16, body: impl Into<Bytes>) {
        let status = StatusCode::from_u16(status)
            .unwrap_or_else(|e| panic!("invalid fixture status {status}: {e}"));
        self.route(bucket, prefix, None, status, body.into(), Duration::ZERO);
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.state.requests.lock().len()
    }

    fn route(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<&str>,
        status: StatusCode,
        body: Bytes,
        delay: Duration,
    ) {
        self.state.routes.lock().insert(
            (bucket.to_owned(), prefix.to_owned(), token.map(ToOwned::to_owned)),
            Route {
                status,
                body,
                delay,
            },
        );
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Accept loop, serving connections until the fixture is dropped.
async fn serve(listener: TcpListener, state: Arc<FixtureState>, shutdown: oneshot::Receiver<()>) {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let state = Arc::clone(&state);
                let svc = service_fn(move |req: Request<Incoming>| {
                    let state = Arc::clone(&state);
                    let uri = req.uri().clone();
                    async move { Ok::<_, Infallible>(state.respond(uri).await) }
                });

                tokio::spawn(async move {
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), svc)
                        .await
                    {
                        debug!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            _ = &mut shutdown => break,
        }
    }
}

/// Endpoint that answers one request with `status` and a body cut off
/// partway through, as a proxy dropping the connection would.
pub async fn cut_off_error_endpoint(status: u16) -> String {
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|e| panic!("failed to bind raw server: {e}"));
    let addr = listener
        .local_addr()
        .unwrap_or_else(|e| panic!("raw server has no address: {e}"));

    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        let mut request = [0_u8; 4096];
        let _ = stream.read(&mut request).await;
        let head = format!(
            "HTTP/1.1 {status} Upstream\r\ncontent-type: application/xml\r\ncontent-length: 4096\r\n\r\n<Error><Code>Slow"
        );
        let _ = stream.write_all(head.as_bytes()).await;
        let _ = stream.shutdown().await;
    });

    format!("http://{addr}")
}

/// An address nothing is listening on.
#[must_use]
pub fn unused_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap_or_else(|e| panic!("failed to reserve a port: {e}"));
    let addr = listener
        .local_addr()
        .unwrap_or_else(|e| panic!("reserved port has no address: {e}"));
    drop(listener);
    format!("http://{addr}")
}

mod test_browse;
mod test_fetch;
