//! Listing fetcher tests over real HTTP.

#[cfg(test)]
mod tests {
    use bucketview_core::{BrowserConfig, ErrorKind, HttpListingSource, ListingError, ListingSource};
    use bucketview_model::{BucketEntry, ListingPage, ListingQuery, Location, ObjectEntry};

    use crate::{FixtureServer, cut_off_error_endpoint, unused_endpoint};

    fn object(key: &str, size: u64) -> ObjectEntry {
        ObjectEntry {
            key: key.to_owned(),
            last_modified: None,
            size: Some(size),
        }
    }

    #[tokio::test]
    async fn test_should_send_delimiter_listing_request() {
        let server = FixtureServer::start().await;
        server.serve_listing(
            "photos",
            "2024/jan/",
            None,
            &ListingPage {
                prefixes: vec!["2024/jan/raw/".into()],
                objects: vec![object("2024/jan/a.jpg", 10)],
                ..ListingPage::default()
            },
        );

        let page = server
            .source()
            .fetch(&ListingQuery::for_location(&Location::new("photos", "2024/jan")))
            .await
            .expect("listing");

        assert_eq!(page.prefixes, vec!["2024/jan/raw/"]);
        assert_eq!(page.objects, vec![object("2024/jan/a.jpg", 10)]);
        assert!(!page.has_more());

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/photos/list");
        assert_eq!(requests[0].param("list-type"), Some("2"));
        assert_eq!(requests[0].param("delimiter"), Some("/"));
        assert_eq!(requests[0].param("prefix"), Some("2024/jan/"));
        assert_eq!(requests[0].param("continuation-token"), None);
    }

    #[tokio::test]
    async fn test_should_omit_prefix_at_bucket_root() {
        let server = FixtureServer::start().await;
        server.serve_listing("b", "", None, &ListingPage::default());

        let page = server
            .source()
            .fetch(&ListingQuery::for_location(&Location::root("b")))
            .await
            .expect("listing");

        assert!(page.is_empty());
        assert!(!server.requests()[0].query.contains_key("prefix"));
    }

    #[tokio::test]
    async fn test_should_list_buckets_at_storage_root() {
        let server = FixtureServer::start().await;
        server.serve_listing(
            "",
            "",
            None,
            &ListingPage {
                buckets: vec![
                    BucketEntry {
                        name: "alpha".into(),
                        created_at: None,
                    },
                    BucketEntry {
                        name: "beta".into(),
                        created_at: None,
                    },
                ],
                ..ListingPage::default()
            },
        );

        let page = server
            .source()
            .fetch(&ListingQuery::for_location(&Location::default()))
            .await
            .expect("listing");

        let names: Vec<_> = page.buckets.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(server.requests()[0].path, "/list");
    }

    #[tokio::test]
    async fn test_should_report_status_and_code_for_missing_bucket() {
        let server = FixtureServer::start().await;

        let err = server
            .source()
            .fetch(&ListingQuery::for_location(&Location::root("nope")))
            .await
            .expect_err("unknown bucket");

        assert_eq!(err.kind(), ErrorKind::FetchError);
        assert_eq!(err.status(), Some(404));
        assert!(matches!(
            &err,
            ListingError::Fetch { code: Some(code), .. } if code == "NoSuchBucket"
        ));
        assert!(err.banner().contains("404"));
    }

    #[tokio::test]
    async fn test_should_report_status_without_error_body() {
        let server = FixtureServer::start().await;
        server.serve_raw("b", "", 503, "upstream unavailable");

        let err = server
            .source()
            .fetch(&ListingQuery::for_location(&Location::root("b")))
            .await
            .expect_err("unavailable");

        assert!(matches!(err, ListingError::Fetch { status: 503, code: None }));
    }

    #[tokio::test]
    async fn test_should_keep_status_when_error_body_is_cut_off() {
        let config = BrowserConfig::builder()
            .endpoint(cut_off_error_endpoint(502).await)
            .request_timeout_secs(5)
            .build();
        let source = HttpListingSource::new(&config).expect("client");

        let err = source
            .fetch(&ListingQuery::for_location(&Location::root("b")))
            .await
            .expect_err("bad gateway");

        assert!(matches!(err, ListingError::Fetch { status: 502, code: None }));
        assert!(err.banner().contains("502"));
    }

    #[tokio::test]
    async fn test_should_reject_non_listing_body() {
        let server = FixtureServer::start().await;
        server.serve_raw("b", "", 200, "<html><body>login required</body></html>");
        server.serve_raw("b", "cut/", 200, "<ListBucketResult><Contents><Key>x");

        let source = server.source();
        for location in [Location::root("b"), Location::new("b", "cut/")] {
            let err = source
                .fetch(&ListingQuery::for_location(&location))
                .await
                .expect_err("not a listing");
            assert_eq!(err.kind(), ErrorKind::ParseError, "{location}");
        }
    }

    #[tokio::test]
    async fn test_should_hide_reserved_keys() {
        let server = FixtureServer::start().await;
        server.serve_listing(
            "site",
            "",
            None,
            &ListingPage {
                objects: vec![
                    object("index.html", 1),
                    object("s3.js", 2),
                    object("dark-mode.css", 3),
                    object("data.csv", 4),
                ],
                ..ListingPage::default()
            },
        );

        let page = server
            .source()
            .fetch(&ListingQuery::for_location(&Location::root("site")))
            .await
            .expect("listing");

        let keys: Vec<_> = page.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["data.csv"]);
    }

    #[tokio::test]
    async fn test_should_send_continuation_token() {
        let server = FixtureServer::start().await;
        server.serve_listing(
            "b",
            "logs/",
            Some("opaque/token=="),
            &ListingPage {
                objects: vec![object("logs/z.log", 1)],
                ..ListingPage::default()
            },
        );

        let query = ListingQuery::continue_from(&Location::new("b", "logs/"), "opaque/token==");
        let page = server.source().fetch(&query).await.expect("listing");

        assert_eq!(page.objects.len(), 1);
        assert_eq!(
            server.requests()[0].param("continuation-token"),
            Some("opaque/token==")
        );
    }

    #[tokio::test]
    async fn test_should_map_connection_failure_to_fetch_error() {
        let config = BrowserConfig::builder()
            .endpoint(unused_endpoint())
            .request_timeout_secs(2)
            .build();
        let source = HttpListingSource::new(&config).expect("client");

        let err = source
            .fetch(&ListingQuery::for_location(&Location::root("b")))
            .await
            .expect_err("nothing listening");

        assert!(matches!(err, ListingError::Transport(_)));
        assert_eq!(err.kind(), ErrorKind::FetchError);
    }
}
