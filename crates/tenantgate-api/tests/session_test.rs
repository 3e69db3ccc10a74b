//! Session binding and partition lockouts through the router.

mod helpers;

use http::StatusCode;

use helpers::{StaticIdentity, TestApp};

const PATH: &str = "/api/offices/42/loans";
const BROWSER: &str = "Mozilla/5.0 (X11; Linux x86_64)";

fn session_headers<'a>(session_id: &'a str, fingerprint: &'a str) -> [(&'a str, &'a str); 3] {
    [
        ("X-Session-Id", session_id),
        ("X-FingerPrint", fingerprint),
        ("User-Agent", BROWSER),
    ]
}

#[tokio::test]
async fn test_session_bound_to_fingerprint() {
    let app = TestApp::new(true, StaticIdentity::default());
    let session = app.create_session("device-1").await;

    let response = app.get(PATH, &session_headers(&session, "device-1")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "SessionUser");

    let response = app.get(PATH, &session_headers(&session, "device-2")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_session_is_rejected() {
    let app = TestApp::new(true, StaticIdentity::default());

    let response = app
        .get(PATH, &session_headers("no-such-session", "device-1"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_repeated_failures_lock_the_fingerprint() {
    let app = TestApp::new(true, StaticIdentity::default());
    let victim = app.create_session("victim-device").await;
    let own = app.create_session("attacker-device").await;

    let response = app.get(PATH, &session_headers(&own, "attacker-device")).await;
    assert_eq!(response.status, StatusCode::OK);

    let mut rejected = None;
    for _ in 0..5 {
        let response = app
            .get(PATH, &session_headers(&victim, "attacker-device"))
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        rejected = Some(response.body);
    }

    // The attacker's own, otherwise valid session is now refused too.
    let locked = app.get(PATH, &session_headers(&own, "attacker-device")).await;
    assert_eq!(locked.status, StatusCode::UNAUTHORIZED);
    assert_eq!(Some(locked.body), rejected);

    // Other devices are unaffected.
    let response = app.get(PATH, &session_headers(&victim, "victim-device")).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_success_resets_failure_count() {
    let app = TestApp::new(true, StaticIdentity::default());
    let session = app.create_session("device-1").await;
    let other = app.create_session("device-9").await;

    for _ in 0..4 {
        let response = app.get(PATH, &session_headers(&other, "device-1")).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
    let response = app.get(PATH, &session_headers(&session, "device-1")).await;
    assert_eq!(response.status, StatusCode::OK);

    for _ in 0..4 {
        let response = app.get(PATH, &session_headers(&other, "device-1")).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
    let response = app.get(PATH, &session_headers(&session, "device-1")).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_guessed_session_ids_lock_the_fingerprint() {
    let app = TestApp::new(true, StaticIdentity::default());
    let own = app.create_session("guessing-device").await;

    for i in 0..5 {
        let guess = format!("guess-{i}");
        let response = app
            .get(PATH, &session_headers(&guess, "guessing-device"))
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let locked = app
        .get(PATH, &session_headers(&own, "guessing-device"))
        .await;
    assert_eq!(locked.status, StatusCode::UNAUTHORIZED);

    let bystander = app.create_session("other-device").await;
    let response = app.get(PATH, &session_headers(&bystander, "other-device")).await;
    assert_eq!(response.status, StatusCode::OK);
}
