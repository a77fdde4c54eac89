//! Short-link redirects.

use axum::http::StatusCode;
use integration_tests::setup::TestContext;

#[tokio::test]
async fn test_known_code_redirects_and_counts() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/q/spa").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header("location"),
        "https://harborview.example.com/spa"
    );
    assert_eq!(ctx.state.shortlinks.get("spa").unwrap().clicks(), 1);

    ctx.server.get("/q/spa").await;
    assert_eq!(ctx.state.shortlinks.get("spa").unwrap().clicks(), 2);
}

#[tokio::test]
async fn test_unknown_code_serves_bounce_page() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/q/gone404").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let page = response.text();
    assert!(page.contains("http-equiv=\"refresh\""));
    assert!(page.contains("content=\"3;url=/not-found\""));
}

#[tokio::test]
async fn test_malformed_code_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/q/a!").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(ctx.state.shortlinks.get("spa").unwrap().clicks(), 0);
}
