//! Listing fetcher: URL construction, the source trait, and the HTTP source.
//!
//! A [`ListingSource`] turns one [`ListingQuery`] into one [`ListingPage`].
//! [`HttpListingSource`] does that with a single GET against
//! `{endpoint}/{bucket}/list?list-type=2&delimiter=%2F[&prefix=..]`, checks
//! the status, parses the XML body and drops reserved asset keys so the
//! browser never lists itself.

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, warn};

use bucketview_model::{ListingPage, ListingQuery};
use bucketview_xml::{parse_error_body, parse_listing};

use crate::config::BrowserConfig;
use crate::error::ListingError;

/// Characters left alone by JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Same as [`COMPONENT`] but keeps `/` so keys stay readable path segments.
const KEY_PATH: &AsciiSet = &COMPONENT.remove(b'/');

/// Something that can answer listing queries.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch and parse one listing.
    async fn fetch(&self, query: &ListingQuery) -> Result<ListingPage, ListingError>;
}

/// Build the list request URL for `query`.
///
/// # Examples
///
/// ```
/// use bucketview_core::fetcher::listing_url;
/// use bucketview_model::{ListingQuery, Location};
///
/// let query = ListingQuery::for_location(&Location::new("b", "my docs"));
/// assert_eq!(
///     listing_url("https://s3.example.com", &query),
///     "https://s3.example.com/b/list?list-type=2&delimiter=%2F&prefix=my%20docs%2F",
/// );
/// ```
#[must_use]
pub fn listing_url(endpoint: &str, query: &ListingQuery) -> String {
    let mut url = String::from(endpoint.trim_end_matches('/'));
    if !query.bucket.is_empty() {
        url.push('/');
        url.extend(utf8_percent_encode(&query.bucket, COMPONENT));
    }

    let delimiter = query.delimiter.to_string();
    url.push_str("/list?list-type=2&delimiter=");
    url.extend(utf8_percent_encode(&delimiter, COMPONENT));

    if !query.prefix.is_empty() {
        url.push_str("&prefix=");
        url.extend(utf8_percent_encode(&query.prefix, COMPONENT));
    }
    if let Some(token) = &query.continuation_token {
        url.push_str("&continuation-token=");
        url.extend(utf8_percent_encode(token, COMPONENT));
    }

    url
}

/// Download link for an object.
#[must_use]
pub fn object_url(endpoint: &str, bucket: &str, key: &str) -> String {
    format!(
        "{}/{}/{}",
        endpoint.trim_end_matches('/'),
        utf8_percent_encode(bucket, COMPONENT),
        utf8_percent_encode(key, KEY_PATH)
    )
}

/// Hosted browser view of a bucket's root.
#[must_use]
pub fn bucket_view_url(endpoint: &str, bucket: &str) -> String {
    format!(
        "{}/{}/list/view",
        endpoint.trim_end_matches('/'),
        utf8_percent_encode(bucket, COMPONENT)
    )
}

/// Parse a listing body and drop any object whose key is reserved in `config`.
pub fn decode_listing(body: &[u8], config: &BrowserConfig) -> Result<ListingPage, ListingError> {
    let mut page = parse_listing(body).inspect_err(|err| {
        debug!(error = %err, wrong_document = err.is_wrong_document(), "body is not a listing");
    })?;
    let before = page.objects.len();
    page.objects.retain(|obj| !config.is_reserved(&obj.key));

    if page.objects.len() != before {
        debug!(
            hidden = before - page.objects.len(),
            "dropped reserved keys from listing"
        );
    }
    Ok(page)
}

/// [`ListingSource`] backed by the HTTP listing endpoint.
#[derive(Debug, Clone)]
pub struct HttpListingSource {
    client: reqwest::Client,
    config: BrowserConfig,
}

impl HttpListingSource {
    /// Create a source from the browser configuration.
    pub fn new(config: &BrowserConfig) -> Result<Self, ListingError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config: config.clone(),
        })
    }

    /// The endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.config.endpoint_base()
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch(&self, query: &ListingQuery) -> Result<ListingPage, ListingError> {
        let url = listing_url(self.endpoint(), query);
        debug!(%url, "fetching listing");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            // The status alone decides the error; the body only adds a code.
            let code = match response.bytes().await {
                Ok(body) => parse_error_body(&body)
                    .map(|b| b.code)
                    .filter(|c| !c.is_empty()),
                Err(e) => {
                    debug!(%url, error = %e, "failed to read error body");
                    None
                }
            };
            warn!(%url, status = status.as_u16(), code = ?code, "listing request failed");
            return Err(ListingError::Fetch {
                status: status.as_u16(),
                code,
            });
        }

        let body = response.bytes().await?;
        let page = decode_listing(&body, &self.config)?;
        debug!(
            %url,
            prefixes = page.prefixes.len(),
            objects = page.objects.len(),
            buckets = page.buckets.len(),
            has_more = page.has_more(),
            "listing parsed"
        );
        Ok(page)
    }
}
