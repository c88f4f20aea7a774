//! Integration tests for the grabber
//!
//! These tests use wiremock to create mock HTTP servers and run complete
//! rule sets end-to-end, including the download pool.

use grabber::config::{load_rules, Action, ActionKind, GrabberConfig, Mode, Target};
use grabber::crawler::{run_targets, Dispatcher, GrabContext, TargetScope};
use grabber::download::DownloadPool;
use grabber::output::{MemorySink, Stats};
use grabber::GrabError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a target downloading into `dir`
fn create_target(name: &str, url: String, dir: &Path, bail: i64, action: Action) -> Target {
    Target {
        name: name.to_string(),
        url,
        bail,
        path: dir.to_str().expect("non-UTF-8 temp dir").to_string(),
        action: Some(action),
    }
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, file: &str, size: usize) {
    Mock::given(method("GET"))
        .and(path(file))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; size]))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_every_download_all_anchors() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/files/",
        r#"<html><body>
            <a href="a.bin">A</a>
            <a href="/files/b.bin">B</a>
            <a href="/files/c%20d.bin">C</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_file(&mock_server, "/files/a.bin", 100).await;
    mount_file(&mock_server, "/files/b.bin", 200).await;
    mount_file(&mock_server, "/files/c%20d.bin", 300).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let target = create_target(
        "files",
        format!("{}/files/", mock_server.uri()),
        dir.path(),
        0,
        Action::new("//a/@href", Mode::Every, ActionKind::Download),
    );

    let report = run_targets(vec![target], &GrabberConfig::default(), Arc::new(MemorySink::new()))
        .await
        .expect("Run failed");

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.stats.count, 3);
    assert_eq!(report.stats.total_bytes, 600);
    assert!(report.summary.unwrap().starts_with("3 files for"));

    assert!(dir.path().join("a.bin").exists());
    assert!(dir.path().join("b.bin").exists());
    assert!(dir.path().join("c d.bin").exists());
}

#[tokio::test]
async fn test_paginated_listing() {
    let mock_server = MockServer::start().await;

    for page in 1..=3 {
        let next = if page < 3 {
            format!(r#"<a class="next" href="/list/{}">Next</a>"#, page + 1)
        } else {
            String::new()
        };
        mount_page(
            &mock_server,
            &format!("/list/{}", page),
            format!(
                r#"<html><body>
                    <ul class="items">
                        <li><a href="/img/{page}-1.jpg">1</a></li>
                        <li><a href="/img/{page}-2.jpg">2</a></li>
                    </ul>
                    {next}
                </body></html>"#
            ),
        )
        .await;
        mount_file(&mock_server, &format!("/img/{}-1.jpg", page), 10).await;
        mount_file(&mock_server, &format!("/img/{}-2.jpg", page), 10).await;
    }

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let action = Action::new("//a[@class='next']/@href", Mode::Follow, ActionKind::Noop).then(
        Action::new("ul.items a::attr(href)", Mode::Every, ActionKind::Download),
    );
    let target = create_target(
        "listing",
        format!("{}/list/1", mock_server.uri()),
        dir.path(),
        0,
        action,
    );

    let config = GrabberConfig {
        workers: 2,
        ..GrabberConfig::default()
    };
    let report = run_targets(vec![target], &config, Arc::new(MemorySink::new()))
        .await
        .expect("Run failed");

    // The chain ends on the page without a "next" link
    assert_eq!(report.failed, 1);
    assert_eq!(report.stats.count, 6);
    for page in 1..=3 {
        assert!(dir.path().join(format!("{}-1.jpg", page)).exists());
        assert!(dir.path().join(format!("{}-2.jpg", page)).exists());
    }
}

#[tokio::test]
async fn test_existing_files_are_not_downloaded_again() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><img src="/old.png"><img src="/new.png"></body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 50]))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_file(&mock_server, "/new.png", 25).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("old.png"), b"kept").expect("Failed to seed file");

    let target = create_target(
        "images",
        format!("{}/", mock_server.uri()),
        dir.path(),
        0,
        Action::new("img::attr(src)", Mode::Every, ActionKind::Download),
    );

    let report = run_targets(vec![target], &GrabberConfig::default(), Arc::new(MemorySink::new()))
        .await
        .expect("Run failed");

    assert_eq!(report.stats.count, 1);
    assert_eq!(report.stats.total_bytes, 25);
    assert_eq!(
        std::fs::read(dir.path().join("old.png")).expect("Missing file"),
        b"kept"
    );
}

#[tokio::test]
async fn test_bail_limit_of_one_stops_before_downloading() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/1.zip">1</a><a href="/2.zip">2</a></body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/1.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    // The start page already counts as one seen item
    let target = create_target(
        "bail",
        format!("{}/", mock_server.uri()),
        dir.path(),
        1,
        Action::new("//a/@href", Mode::Every, ActionKind::Download),
    );

    let report = run_targets(vec![target], &GrabberConfig::default(), Arc::new(MemorySink::new()))
        .await
        .expect("Run failed");

    assert_eq!(report.failed, 1);
    assert_eq!(report.stats.count, 0);
    assert_eq!(report.summary, None);
}

#[tokio::test]
async fn test_existing_files_trigger_bailout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("^/img/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 8]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for name in ["1.jpg", "2.jpg"] {
        std::fs::write(dir.path().join(name), b"old").expect("Failed to seed file");
    }

    let client = reqwest::Client::new();
    let stats = Arc::new(Stats::new());
    let (pool, queue) = DownloadPool::start(client.clone(), 1, Arc::clone(&stats));
    let ctx = GrabContext::new(client, queue, Arc::new(MemorySink::new()));
    let scope = TargetScope::new("bail", 3, dir.path().to_path_buf());
    let dispatcher = Dispatcher::new(&ctx, &scope);
    let base = Url::parse(&format!("{}/", mock_server.uri())).expect("Invalid server URL");
    let download = Action::new("//img/@src", Mode::Every, ActionKind::Download);

    for raw in ["/img/1.jpg", "/img/2.jpg"] {
        dispatcher
            .dispatch(&base, raw, &download)
            .await
            .expect("Dispatch failed");
    }

    // The worker finds both files on disk: 1 + 2 seen items reach the limit
    tokio::time::timeout(Duration::from_secs(5), async {
        while scope.seen.get() < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Existing files were not counted");

    let result = dispatcher.dispatch(&base, "/img/3.jpg", &download).await;
    assert!(matches!(result, Err(GrabError::Bailout { count: 3 })));

    drop(dispatcher);
    drop(ctx);
    let stats = pool.finish().await;

    assert!(stats.is_empty());
    assert!(!dir.path().join("3.jpg").exists());
}

#[tokio::test]
async fn test_failing_target_does_not_stop_the_next() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/links",
        r#"<html><body><a href="/x">x</a><a href="y">y</a></body></html>"#.to_string(),
    )
    .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let sink = Arc::new(MemorySink::new());

    let targets = vec![
        create_target(
            "broken",
            format!("{}/does-not-exist", mock_server.uri()),
            dir.path(),
            0,
            Action::new("//a/@href", Mode::Every, ActionKind::Print),
        ),
        create_target(
            "links",
            format!("{}/links", mock_server.uri()),
            dir.path(),
            0,
            Action::new("//a/@href", Mode::Every, ActionKind::Print),
        ),
    ];

    let report = run_targets(targets, &GrabberConfig::default(), sink.clone())
        .await
        .expect("Run failed");

    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(
        sink.lines(),
        vec![
            format!("{}/x", mock_server.uri()),
            format!("{}/linksy", mock_server.uri()),
        ]
    );
}

#[tokio::test]
async fn test_rules_file_end_to_end() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/docs/",
        concat!(
            r#"<html><body><a class="pdf" href="guide.pdf">Guide</a>"#,
            r#"<a href="about">About</a></body></html>"#
        )
        .to_string(),
    )
    .await;
    mount_file(&mock_server, "/docs/guide.pdf", 64).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let rules = format!(
        r#"[
            {{
                "Name": "docs",
                "URL": "{}/docs/",
                "Path": "{}",
                "Do": {{
                    "XPath": "//a[@class='pdf']/@href",
                    "Mode": "every",
                    "Action": "download"
                }}
            }}
        ]"#,
        mock_server.uri(),
        dir.path().display()
    );

    let mut rules_file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create rules file");
    rules_file
        .write_all(rules.as_bytes())
        .expect("Failed to write rules");
    rules_file.flush().expect("Failed to flush rules");

    let targets = load_rules(rules_file.path()).expect("Failed to load rules");
    let report = run_targets(targets, &GrabberConfig::default(), Arc::new(MemorySink::new()))
        .await
        .expect("Run failed");

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.stats.count, 1);
    assert!(dir.path().join("guide.pdf").exists());
}
