//! End-to-end browsing tests: controller + HTTP source + fixture endpoint.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bucketview_core::view::RowKind;
    use bucketview_core::{BrowserController, ListingSource, Outcome, Step};
    use bucketview_model::{BucketEntry, ListingPage, Location, ObjectEntry};

    use crate::FixtureServer;

    fn objects(prefix: &str, range: std::ops::Range<usize>) -> Vec<ObjectEntry> {
        range
            .map(|i| ObjectEntry {
                key: format!("{prefix}item-{i:03}.bin"),
                last_modified: None,
                size: Some(1024),
            })
            .collect()
    }

    fn names(ctl: &BrowserController) -> Vec<String> {
        ctl.view().visible_rows().map(|r| r.name.clone()).collect()
    }

    #[tokio::test]
    async fn test_should_show_small_folder_on_one_page() {
        let server = FixtureServer::start().await;
        server.serve_listing(
            "b",
            "",
            None,
            &ListingPage {
                prefixes: vec!["a/".into(), "b/".into(), "c/".into()],
                objects: objects("", 0..2),
                ..ListingPage::default()
            },
        );
        let source = server.source();
        let mut ctl = BrowserController::new(&server.config(), Location::root("b"));

        assert_eq!(ctl.refresh(&source).await, Outcome::Applied);

        let view = ctl.view();
        assert_eq!(view.page.total_pages, 1);
        assert!(!view.has_next);
        assert_eq!(
            names(&ctl),
            vec!["a", "b", "c", "item-000.bin", "item-001.bin"]
        );
        assert_eq!(ctl.view().rows[3].size_text(), "1.00 KB");
    }

    #[tokio::test]
    async fn test_should_page_sixty_objects_with_one_request() {
        let server = FixtureServer::start().await;
        server.serve_listing(
            "b",
            "bulk/",
            None,
            &ListingPage {
                objects: objects("bulk/", 0..60),
                ..ListingPage::default()
            },
        );
        let source = server.source();
        let mut ctl = BrowserController::new(&server.config(), Location::root("b"));

        ctl.navigate(&source, Location::new("b", "bulk/")).await;
        assert_eq!(ctl.view().page.total_pages, 2);
        assert_eq!(ctl.view().rows.len(), 50);
        assert_eq!(ctl.view().rows[49].name, "item-049.bin");

        assert_eq!(ctl.next_page(&source).await, Some(Outcome::Applied));
        assert_eq!(ctl.view().page.current_page, 2);
        assert_eq!(ctl.view().rows.len(), 10);
        assert_eq!(ctl.view().rows[0].name, "item-050.bin");
        assert_eq!(ctl.next_page(&source).await, None);

        assert_eq!(server.request_count(), 1);
    }

    #[tokio::test]
    async fn test_should_keep_table_and_show_banner_on_404() {
        let server = FixtureServer::start().await;
        server.serve_listing(
            "b",
            "",
            None,
            &ListingPage {
                prefixes: vec!["gone/".into()],
                objects: objects("", 0..1),
                ..ListingPage::default()
            },
        );
        let source = server.source();
        let mut ctl = BrowserController::new(&server.config(), Location::root("b"));
        ctl.refresh(&source).await;
        let before = ctl.view().rows.clone();

        let outcome = ctl.open_row(&source, 0).await;

        assert_eq!(outcome, Some(Outcome::Failed));
        let view = ctl.view();
        assert!(!view.loading);
        let banner = view.error.as_deref().expect("banner");
        assert!(banner.starts_with("Error fetching objects: "));
        assert!(banner.contains("404"));
        assert_eq!(view.rows, before);
        assert!(ctl.location().is_bucket_root());
    }

    #[tokio::test]
    async fn test_should_never_list_reserved_asset() {
        let server = FixtureServer::start().await;
        server.serve_listing(
            "site",
            "",
            None,
            &ListingPage {
                objects: vec![
                    ObjectEntry {
                        key: "s3.js".into(),
                        last_modified: None,
                        size: Some(5),
                    },
                    ObjectEntry {
                        key: "photo.png".into(),
                        last_modified: None,
                        size: Some(5),
                    },
                ],
                ..ListingPage::default()
            },
        );
        let source = server.source();
        let mut ctl = BrowserController::new(&server.config(), Location::root("site"));

        ctl.refresh(&source).await;

        assert_eq!(names(&ctl), vec!["photo.png"]);
    }

    #[tokio::test]
    async fn test_should_filter_without_network_calls() {
        let server = FixtureServer::start().await;
        server.serve_listing(
            "b",
            "",
            None,
            &ListingPage {
                prefixes: vec!["Invoices/".into(), "photos/".into()],
                objects: vec![ObjectEntry {
                    key: "invoice-2024.pdf".into(),
                    last_modified: None,
                    size: None,
                }],
                ..ListingPage::default()
            },
        );
        let source = server.source();
        let mut ctl = BrowserController::new(&server.config(), Location::root("b"));
        ctl.refresh(&source).await;

        ctl.set_filter("INVOICE");
        assert_eq!(names(&ctl), vec!["Invoices", "invoice-2024.pdf"]);
        ctl.set_filter("");
        assert_eq!(names(&ctl).len(), 3);

        assert_eq!(server.request_count(), 1);
    }

    #[tokio::test]
    async fn test_should_fetch_next_remote_page_with_token() {
        let server = FixtureServer::start().await;
        server.serve_listing(
            "b",
            "",
            None,
            &ListingPage {
                objects: objects("", 0..50),
                next_continuation_token: Some("page-2".into()),
                is_truncated: true,
                ..ListingPage::default()
            },
        );
        server.serve_listing(
            "b",
            "",
            Some("page-2"),
            &ListingPage {
                objects: objects("", 50..75),
                ..ListingPage::default()
            },
        );
        let source = server.source();
        let mut ctl = BrowserController::new(&server.config(), Location::root("b"));
        ctl.refresh(&source).await;
        assert!(ctl.view().has_next);

        assert_eq!(ctl.next_page(&source).await, Some(Outcome::Applied));

        assert_eq!(ctl.view().page.current_page, 2);
        assert_eq!(ctl.view().rows.len(), 25);
        assert!(!ctl.view().has_next);
        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].param("continuation-token"), Some("page-2"));

        assert!(ctl.previous());
        assert_eq!(ctl.view().rows[0].name, "item-000.bin");
        assert_eq!(server.request_count(), 2);
    }

    #[tokio::test]
    async fn test_should_ignore_slow_superseded_response() {
        let server = FixtureServer::start().await;
        server.serve_listing_after(
            "b",
            "slow/",
            &ListingPage {
                objects: objects("slow/", 0..1),
                ..ListingPage::default()
            },
            Duration::from_millis(300),
        );
        server.serve_listing(
            "b",
            "fast/",
            None,
            &ListingPage {
                objects: objects("fast/", 0..2),
                ..ListingPage::default()
            },
        );
        let source = server.source();
        let mut ctl = BrowserController::new(&server.config(), Location::root("b"));

        let slow = ctl.begin_navigate(Location::new("b", "slow/"));
        let fast = ctl.begin_navigate(Location::new("b", "fast/"));
        let (slow_result, fast_result) =
            tokio::join!(source.fetch(slow.query()), source.fetch(fast.query()));

        assert_eq!(ctl.complete(fast, fast_result), Outcome::Applied);
        assert_eq!(ctl.complete(slow, slow_result), Outcome::Stale);

        assert_eq!(ctl.location(), &Location::new("b", "fast/"));
        assert_eq!(ctl.view().rows.len(), 2);
        assert!(!ctl.view().loading);
    }

    #[tokio::test]
    async fn test_should_walk_folders_and_breadcrumbs() {
        let server = FixtureServer::start().await;
        server.serve_listing(
            "b",
            "",
            None,
            &ListingPage {
                prefixes: vec!["docs/".into()],
                ..ListingPage::default()
            },
        );
        server.serve_listing(
            "b",
            "docs/",
            None,
            &ListingPage {
                prefixes: vec!["docs/".into(), "docs/2024/".into()],
                ..ListingPage::default()
            },
        );
        server.serve_listing(
            "b",
            "docs/2024/",
            None,
            &ListingPage {
                objects: objects("docs/2024/", 0..1),
                ..ListingPage::default()
            },
        );
        let source = server.source();
        let mut ctl = BrowserController::new(&server.config(), Location::root("b"));
        ctl.refresh(&source).await;

        ctl.open_row(&source, 0).await;
        assert_eq!(names(&ctl), vec!["2024"]);
        ctl.open_row(&source, 0).await;
        assert_eq!(ctl.location(), &Location::new("b", "docs/2024/"));

        let crumbs: Vec<_> = ctl
            .view()
            .breadcrumb
            .iter()
            .map(|c| (c.label.as_str(), c.path.as_deref()))
            .collect();
        assert_eq!(
            crumbs,
            vec![("b", Some("")), ("docs", Some("docs/")), ("2024", None)]
        );

        ctl.open_breadcrumb(&source, 1).await;
        assert_eq!(ctl.location(), &Location::new("b", "docs/"));
        assert_eq!(ctl.up(&source).await, Some(Outcome::Applied));
        assert!(ctl.location().is_bucket_root());

        let prefixes: Vec<_> = server
            .requests()
            .iter()
            .map(|r| r.param("prefix").unwrap_or_default().to_owned())
            .collect();
        assert_eq!(prefixes, vec!["", "docs/", "docs/2024/", "docs/", ""]);
    }

    #[tokio::test]
    async fn test_should_browse_from_storage_root_into_bucket() {
        let server = FixtureServer::start().await;
        server.serve_listing(
            "",
            "",
            None,
            &ListingPage {
                buckets: vec![BucketEntry {
                    name: "media".into(),
                    created_at: None,
                }],
                ..ListingPage::default()
            },
        );
        server.serve_listing(
            "media",
            "",
            None,
            &ListingPage {
                objects: objects("", 0..3),
                ..ListingPage::default()
            },
        );
        let source = server.source();
        let mut ctl = BrowserController::new(&server.config(), Location::default());

        ctl.refresh(&source).await;
        assert_eq!(ctl.view().rows[0].kind, RowKind::Bucket);
        assert_eq!(
            ctl.view().rows[0].target.url(),
            Some(format!("{}/media/list/view", server.endpoint()).as_str())
        );

        ctl.open_row(&source, 0).await;
        assert_eq!(ctl.location(), &Location::root("media"));
        assert_eq!(ctl.view().rows.len(), 3);

        assert_eq!(ctl.open_home(&source).await, Outcome::Applied);
        assert!(ctl.location().is_storage_root());
    }

    #[tokio::test]
    async fn test_should_render_same_view_on_repeat_navigation() {
        let server = FixtureServer::start().await;
        server.serve_listing(
            "b",
            "x/",
            None,
            &ListingPage {
                prefixes: vec!["x/y/".into()],
                objects: objects("x/", 0..70),
                ..ListingPage::default()
            },
        );
        let source = server.source();
        let mut ctl = BrowserController::new(&server.config(), Location::root("b"));

        ctl.navigate(&source, Location::new("b", "x/")).await;
        let first = ctl.view().clone();
        assert!(matches!(ctl.begin_next(), Step::Local));
        ctl.navigate(&source, Location::new("b", "x/")).await;

        assert_eq!(ctl.view(), &first);
    }
}
