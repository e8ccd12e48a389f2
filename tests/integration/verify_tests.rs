//! Integration tests for the verifier
//!
//! These tests use wiremock to create mock HTTP servers and tempfile for
//! local pages, and run complete verifications end-to-end.

use std::time::Duration;
use sumi_check::checker::verify_with_sink;
use sumi_check::config::Config;
use sumi_check::{MemorySink, VerifyReport};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an HTML page linking to each of `links`
fn html_page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!("<a href=\"{}\">link</a>\n", link))
        .collect();
    format!(
        "<html><head><title>Test</title></head><body>\n{}</body></html>",
        anchors
    )
}

/// Config with link checking on for the given pages
fn link_config(pages: Vec<String>) -> Config {
    let mut config = Config::with_pages(pages);
    config.checks.links = true;
    config
}

async fn run(config: Config) -> (VerifyReport, MemorySink) {
    let sink = MemorySink::new();
    let report = verify_with_sink(config, &sink)
        .await
        .expect("Verification failed to start");
    (report, sink)
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_ok(server: &MockServer, route: &str) {
    Mock::given(path(route))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

fn messages(report: &VerifyReport) -> Vec<String> {
    report.issues.iter().map(|i| i.message.clone()).collect()
}

#[tokio::test]
async fn test_empty_page_list() {
    let (report, sink) = run(link_config(Vec::new())).await;

    assert!(report.is_success());
    assert_eq!(report.issue_count(), 0);
    assert!(sink.lines().is_empty());
}

#[tokio::test]
async fn test_page_with_good_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page(&["/a", "b"])).await;
    mount_ok(&server, "/a").await;
    mount_ok(&server, "/b").await;

    let (report, sink) = run(link_config(vec![format!("{}/", base)])).await;

    assert!(report.is_success(), "unexpected issues: {:?}", report.issues);
    let info = sink.info_lines();
    assert_eq!(info.len(), 3);
    assert!(info[0].starts_with(&format!("Page: {}/ (", base)));
    assert!(info[1].starts_with(&format!("Link: {}/a (", base)));
    assert!(info[2].starts_with(&format!("Link: {}/b (", base)));
    assert!(sink.error_lines().is_empty());
}

#[tokio::test]
async fn test_links_finish_before_next_page() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/one", html_page(&["/a", "/b"])).await;
    mount_page(&server, "/two", html_page(&["/c"])).await;
    mount_ok(&server, "/a").await;
    mount_ok(&server, "/b").await;
    mount_ok(&server, "/c").await;

    let pages = vec![format!("{}/one", base), format!("{}/two", base)];
    let (report, sink) = run(link_config(pages)).await;

    assert!(report.is_success());
    let order: Vec<String> = sink
        .info_lines()
        .into_iter()
        .map(|line| line.split(" (").next().unwrap().to_string())
        .collect();
    assert_eq!(
        order,
        vec![
            format!("Page: {}/one", base),
            format!("Link: {}/a", base),
            format!("Link: {}/b", base),
            format!("Page: {}/two", base),
            format!("Link: {}/c", base),
        ]
    );
}

#[tokio::test]
async fn test_duplicate_link_tested_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/one", html_page(&["/shared", "/shared#section"])).await;
    mount_page(&server, "/two", html_page(&["/shared"])).await;
    Mock::given(path("/shared"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let pages = vec![format!("{}/one", base), format!("{}/two", base)];
    let (report, sink) = run(link_config(pages)).await;

    assert!(report.is_success());
    let visited: Vec<String> = sink
        .info_lines()
        .into_iter()
        .filter(|line| line.starts_with("Visited link: "))
        .collect();
    assert_eq!(
        visited,
        vec![
            format!("Visited link: {}/shared#section", base),
            format!("Visited link: {}/shared", base),
        ]
    );
}

#[tokio::test]
async fn test_rejected_probe_retried_with_full_request() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page(&["/no-head"])).await;
    Mock::given(method("HEAD"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(200).set_body_string("exists"))
        .expect(1)
        .mount(&server)
        .await;

    let (report, sink) = run(link_config(vec![format!("{}/", base)])).await;

    assert!(report.is_success(), "unexpected issues: {:?}", report.issues);
    assert!(sink
        .info_lines()
        .iter()
        .any(|line| line.starts_with(&format!("Link: {}/no-head (", base))));
}

#[tokio::test]
async fn test_bad_link() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page(&["/missing"])).await;

    let (report, sink) = run(link_config(vec![format!("{}/", base)])).await;

    assert_eq!(report.issue_count(), 1);
    let issue = &report.issues[0];
    assert_eq!(issue.page, format!("{}/", base));
    assert!(issue
        .message
        .starts_with(&format!("Bad link (404): {}/missing (", base)));
    assert_eq!(sink.error_lines().last().unwrap(), "1 issue found");
}

#[tokio::test]
async fn test_link_transport_error() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Nothing listens on port 1
    mount_page(&server, "/", html_page(&["http://127.0.0.1:1/down"])).await;

    let (report, _) = run(link_config(vec![format!("{}/", base)])).await;

    assert_eq!(report.issue_count(), 1);
    assert!(report.issues[0].message.starts_with("Link error ("));
    assert!(report.issues[0]
        .message
        .contains("): http://127.0.0.1:1/down ("));
}

#[tokio::test]
async fn test_query_hash_verification() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html_page(&[
            "/archive.zip?sha1=88b99d3ee9aa6d57d5126cec991e9776a0f94fb1",
            "/archive.zip?sha1=88B99D3EE9AA6D57D5126CEC991E9776A0F94FB1",
            "/archive.zip?md5=00000000000000000000000000000000",
            "/archive.zip?crc32=b68fd21f",
        ]),
    )
    .await;
    Mock::given(method("HEAD"))
        .and(path("/archive.zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/archive.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_string("archive contents"))
        .expect(4)
        .mount(&server)
        .await;

    let mut config = link_config(vec![format!("{}/", base)]);
    config.links.query_hashes = true;
    let (report, sink) = run(config).await;

    assert_eq!(
        messages(&report),
        vec![format!(
            "Hash error (077e2543f3e4f5bfcf40e0303ef40381): {}/archive.zip?md5=00000000000000000000000000000000",
            base
        )]
    );
    let confirmed = sink
        .info_lines()
        .iter()
        .filter(|line| line.starts_with("Hash: "))
        .count();
    assert_eq!(confirmed, 3);
}

#[tokio::test]
async fn test_query_hashes_ignored_when_disabled() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page(&["/file.bin?sha1=deadbeef"])).await;
    mount_ok(&server, "/file.bin").await;

    let (report, sink) = run(link_config(vec![format!("{}/", base)])).await;

    assert!(report.is_success());
    assert!(!sink.info_lines().iter().any(|l| l.starts_with("Hash: ")));
}

#[tokio::test]
async fn test_disallowed_redirects() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page(&["/moved", "/moved-bare"])).await;
    Mock::given(path("/moved"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/x"))
        .mount(&server)
        .await;
    Mock::given(path("/moved-bare"))
        .respond_with(ResponseTemplate::new(301))
        .mount(&server)
        .await;
    Mock::given(path("/x"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = link_config(vec![format!("{}/", base)]);
    config.links.no_redirects = true;
    let (report, _) = run(config).await;

    let found = messages(&report);
    assert_eq!(found.len(), 2);
    assert!(found[0].starts_with(&format!("Redirected link (301: /x): {}/moved (", base)));
    assert!(found[1].starts_with(&format!(
        "Redirected link (301: [Missing Location header]): {}/moved-bare (",
        base
    )));
}

#[tokio::test]
async fn test_redirects_followed_by_default() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page(&["/moved"])).await;
    Mock::given(path("/moved"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/target", base)),
        )
        .mount(&server)
        .await;
    mount_ok(&server, "/target").await;

    let (report, _) = run(link_config(vec![format!("{}/", base)])).await;

    assert!(report.is_success(), "unexpected issues: {:?}", report.issues);
}

#[tokio::test]
async fn test_local_links() {
    let server = MockServer::start().await;
    let base = server.uri();
    let port = url::Url::parse(&base).unwrap().port().unwrap();

    let local_links = [
        format!("http://127.0.0.1:{}/ok", port),
        format!("http://localhost:{}/ok-name", port),
        format!("http://[::1]:{}/ok-v6", port),
    ];
    let refs: Vec<&str> = local_links.iter().map(String::as_str).collect();
    mount_page(&server, "/", html_page(&refs)).await;
    mount_ok(&server, "/ok").await;
    mount_ok(&server, "/ok-name").await;
    mount_ok(&server, "/ok-v6").await;

    let mut config = link_config(vec![format!("{}/", base)]);
    config.links.no_local_links = true;
    let (report, _) = run(config).await;

    let local: Vec<String> = messages(&report)
        .into_iter()
        .filter(|m| m.starts_with("Local link: "))
        .collect();
    assert_eq!(
        local,
        vec![
            format!("Local link: http://127.0.0.1:{}/ok", port),
            format!("Local link: http://localhost:{}/ok-name", port),
            format!("Local link: http://[::1]:{}/ok-v6", port),
        ]
    );
}

#[tokio::test]
async fn test_empty_fragment() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page(&["#", "#top"])).await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut config = link_config(vec![format!("{}/", base)]);
    config.links.no_empty_fragments = true;
    let (report, sink) = run(config).await;

    assert_eq!(messages(&report), vec![format!("Empty fragment: {}/#", base)]);
    assert!(sink
        .info_lines()
        .contains(&format!("Visited link: {}/#top", base)));
}

#[tokio::test]
async fn test_prefer_secure() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page(&["/plain"])).await;
    mount_ok(&server, "/plain").await;

    let mut config = link_config(vec![format!("{}/", base)]);
    config.links.prefer_secure = true;
    let (report, _) = run(config).await;

    assert_eq!(messages(&report), vec![format!("Insecure link: {}/plain", base)]);
}

#[tokio::test]
async fn test_only_same_domain() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page(&["/own", "http://127.0.0.2:1/elsewhere"])).await;
    mount_ok(&server, "/own").await;

    let mut config = link_config(vec![format!("{}/", base)]);
    config.links.only_same_domain = true;
    let (report, _) = run(config.clone()).await;
    assert!(report.is_success(), "unexpected issues: {:?}", report.issues);

    config.links.only_same_domain = false;
    let (report, _) = run(config).await;
    assert_eq!(report.issue_count(), 1);
    assert!(report.issues[0].message.starts_with("Link error ("));
}

#[tokio::test]
async fn test_links_to_ignore() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page(&["/skip-raw", "/skip-resolved", "/kept"])).await;
    mount_ok(&server, "/kept").await;

    let mut config = link_config(vec![format!("{}/", base)]);
    config.links.ignore = vec!["/skip-raw".to_string(), format!("{}/skip-resolved", base)];
    let (report, sink) = run(config).await;

    assert!(report.is_success(), "unexpected issues: {:?}", report.issues);
    let links = sink
        .info_lines()
        .iter()
        .filter(|l| l.starts_with("Link: "))
        .count();
    assert_eq!(links, 1);
}

#[tokio::test]
async fn test_bad_page_skips_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string(html_page(&["/a"])))
        .mount(&server)
        .await;
    Mock::given(path("/a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (report, _) = run(link_config(vec![format!("{}/broken", base)])).await;

    assert_eq!(report.issue_count(), 1);
    assert!(report.issues[0]
        .message
        .starts_with(&format!("Bad page (500): {}/broken (", base)));
}

#[tokio::test]
async fn test_page_redirect_updates_attribution() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    mount_page(&server, "/new", html_page(&["gone"])).await;

    let (report, sink) = run(link_config(vec![format!("{}/old", base)])).await;

    assert!(sink
        .info_lines()
        .contains(&format!("Redirected page: {}/old -> {}/new", base, base)));
    assert_eq!(report.issue_count(), 1);
    assert_eq!(report.issues[0].page, format!("{}/new", base));
    assert!(report.issues[0]
        .message
        .starts_with(&format!("Bad link (404): {}/gone (", base)));
}

#[tokio::test]
async fn test_slow_page_flagged_but_checked() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page(&["/a"]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    Mock::given(path("/a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = link_config(vec![format!("{}/slow", base)]);
    config.checks.max_response_time = Some(50);
    let (report, _) = run(config).await;

    assert_eq!(
        messages(&report),
        vec!["Page response took more than 50ms to complete"]
    );
}

#[tokio::test]
async fn test_xhtml_violations() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        "<html>\n<body>\n<p>one</div>\n<p>two</span>\n</body>\n</html>".to_string(),
    )
    .await;

    let mut config = Config::with_pages(vec![format!("{}/", base)]);
    config.checks.xhtml = true;
    let (report, _) = run(config).await;

    assert_eq!(report.issue_count(), 2);
    for issue in &report.issues {
        assert_eq!(issue.page, format!("{}/", base));
        assert!(issue.message.starts_with("XHTML parse error ("));
        assert!(!issue.message.contains('\n'));
    }
    assert!(report.issues[0].message.contains("Line: 3"));
    assert!(report.issues[1].message.contains("Line: 4"));
}

#[tokio::test]
async fn test_caching_headers() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/no-cache"))
        .respond_with(ResponseTemplate::new(200).insert_header("cache-control", "no-cache"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bare"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut config = Config::with_pages(vec![format!("{}/no-cache", base)]);
    config.checks.caching = true;
    let (report, _) = run(config.clone()).await;
    assert!(report.is_success(), "unexpected issues: {:?}", report.issues);

    config.pages = vec![format!("{}/bare", base)];
    let (report, _) = run(config).await;
    let missing = messages(&report)
        .into_iter()
        .filter(|m| m == "Missing Cache-Control header in response")
        .count();
    assert_eq!(missing, 1);
}

#[tokio::test]
async fn test_compression_headers() {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let server = MockServer::start().await;
    let base = server.uri();

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(html_page(&["/inside"]).as_bytes())
        .unwrap();
    let gzipped = encoder.finish().unwrap();

    Mock::given(method("GET"))
        .and(path("/gzip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(gzipped)
                .insert_header("content-encoding", "gzip"),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/plain", html_page(&[])).await;
    Mock::given(path("/inside"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = link_config(vec![format!("{}/gzip", base), format!("{}/plain", base)]);
    config.checks.compression = true;
    let (report, _) = run(config).await;

    assert_eq!(report.issue_count(), 1);
    assert_eq!(report.issues[0].page, format!("{}/plain", base));
    assert_eq!(
        report.issues[0].message,
        "Missing Content-Encoding header in response"
    );
}

#[tokio::test]
async fn test_request_headers() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestAgent/1.0"))
        .and(header("cache-control", "no-cache"))
        .and(header("pragma", "no-cache"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::with_pages(vec![format!("{}/", base)]);
    config.http.user_agent = "TestAgent/1.0".to_string();
    let (report, _) = run(config).await;

    assert!(report.is_success(), "unexpected issues: {:?}", report.issues);
}

#[tokio::test]
async fn test_local_file_pages() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("index.html"),
        html_page(&["img.png", "missing.png", "index.html#top"]),
    )
    .unwrap();
    std::fs::write(dir.path().join("img.png"), b"png").unwrap();

    let page = dir.path().join("index.html").display().to_string();
    let (report, sink) = run(link_config(vec![page])).await;

    assert_eq!(report.issue_count(), 1);
    assert!(report.issues[0].page.starts_with("file://"));
    assert!(report.issues[0].message.starts_with("Link error ("));
    assert!(report.issues[0].message.contains("missing.png"));
    assert!(sink.info_lines()[0].starts_with("Page: file://"));
}

#[tokio::test]
async fn test_summary_groups_issues_by_page() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/one", html_page(&["/x1", "/x2"])).await;
    mount_page(&server, "/two", html_page(&["/x3"])).await;

    let mut config = link_config(vec![format!("{}/one", base), format!("{}/two", base)]);
    config.report.summary = true;
    let (report, sink) = run(config).await;

    assert_eq!(report.issue_count(), 3);
    let errors = sink.error_lines();
    assert_eq!(errors.len(), 2);
    let summary: Vec<&str> = errors[0].lines().collect();
    assert_eq!(summary.len(), 6);
    assert_eq!(summary[0], "Summary of issues:");
    assert_eq!(summary[1], format!(" {}/one", base));
    assert!(summary[2].starts_with("  * Bad link (404): "));
    assert!(summary[3].starts_with("  * Bad link (404): "));
    assert_eq!(summary[4], format!(" {}/two", base));
    assert_eq!(errors[1], "3 issues found");
}

#[tokio::test]
async fn test_invalid_config_is_fatal() {
    let mut config = Config::with_pages(vec!["https://example.com/".to_string()]);
    config.checks.max_response_time = Some(0);

    let sink = MemorySink::new();
    let result = verify_with_sink(config, &sink).await;

    assert!(matches!(result, Err(sumi_check::CheckError::Config(_))));
    assert!(sink.lines().is_empty());
}
