//! End-to-end tests: register endpoints over HTTP, then call them.

use reqwest::StatusCode;
use sdk_rust::{ClientError, MetaEndpoints};

use dynroute::config::ServiceConfig;

mod common;

fn rejected(result: Result<String, ClientError>) -> (StatusCode, String) {
    match result {
        Err(ClientError::Status { status, message }) => (status, message),
        other => panic!("expected a rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_register_and_call_echo() {
    let server = common::start_server().await;
    let client = server.client();
    let echo = server.echo_manifest();

    assert_eq!(client.test().await.unwrap(), "ok");
    assert_eq!(
        client.add_service("/echo", &echo).await.unwrap(),
        "__ADDED_ENDPOINT__"
    );
    assert_eq!(client.get_service("/echo", &[("echo", "hi")]).await.unwrap(), "hi");

    let (status, message) = rejected(client.add_service("/echo", &echo).await);
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(message.contains("already been registered"), "{}", message);

    // The original binding survives the rejected duplicate.
    assert_eq!(client.get_service("/echo", &[("echo", "again")]).await.unwrap(), "again");
}

#[tokio::test]
async fn test_rejected_registrations_leave_registry_unchanged() {
    let server = common::start_server().await;
    let client = server.client();
    let echo = server.echo_manifest();
    let broken = server.manifest("broken.toml", "kind = \"no_such_kind\"\n");

    let cases = [
        ("/", echo.as_str(), StatusCode::FORBIDDEN),
        ("/__test__", echo.as_str(), StatusCode::FORBIDDEN),
        ("/__register__", echo.as_str(), StatusCode::FORBIDDEN),
        ("/__get_endpoints__", echo.as_str(), StatusCode::FORBIDDEN),
        ("", echo.as_str(), StatusCode::BAD_REQUEST),
        ("no-slash", echo.as_str(), StatusCode::BAD_REQUEST),
        ("/with space", echo.as_str(), StatusCode::BAD_REQUEST),
        ("/h\u{e9}llo", echo.as_str(), StatusCode::BAD_REQUEST),
        ("/a|b", echo.as_str(), StatusCode::BAD_REQUEST),
        ("/new", "/nonexistent/file", StatusCode::UNPROCESSABLE_ENTITY),
        ("/new", broken.as_str(), StatusCode::UNPROCESSABLE_ENTITY),
    ];

    for (endpoint, source, expected) in cases {
        let (status, _) = rejected(client.add_service(endpoint, source).await);
        assert_eq!(status, expected, "endpoint {:?}", endpoint);
    }

    assert!(client.get_endpoints().await.unwrap().is_empty());
    assert!(server.registry.is_empty());
}

#[tokio::test]
async fn test_missing_handler_message_names_the_file() {
    let server = common::start_server().await;
    let (_, message) = rejected(server.client().add_service("/new", "/nonexistent/file").await);
    assert!(message.contains("\"/nonexistent/file\""), "{}", message);
    assert!(message.contains("does not exist"), "{}", message);
}

#[tokio::test]
async fn test_handler_failure_is_isolated() {
    let server = common::start_server().await;
    let client = server.client();
    client.add_service("/echo", &server.echo_manifest()).await.unwrap();

    let (status, message) = rejected(client.get_service("/echo", &[]).await);
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(message, "Error at /echo: Missing `echo` param");

    assert_eq!(client.test().await.unwrap(), "ok");
    assert_eq!(client.get_service("/echo", &[("echo", "fine")]).await.unwrap(), "fine");
}

#[tokio::test]
async fn test_unregistered_path_is_not_found() {
    let server = common::start_server().await;
    let (status, _) = rejected(server.client().get_service("/nothing", &[]).await);
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_json_registration_body_and_post_dispatch() {
    let server = common::start_server().await;
    let http = reqwest::Client::new();

    let res = http
        .post(server.url("/__register__"))
        .json(&serde_json::json!({
            "endpoint": "/echo",
            "path_to_source": server.echo_manifest(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Any method reaches the handler; the form field stands in for the query.
    let res = http
        .post(server.url("/echo"))
        .form(&[("echo", "posted")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "posted");
}

#[tokio::test]
async fn test_listings_keep_registration_order() {
    let server = common::start_server().await;
    let client = server.client();
    let pong = server.manifest("pong.json", r#"{"kind":"static","body":"pong"}"#);

    for endpoint in ["/b", "/a", "/c"] {
        client.add_service(endpoint, &pong).await.unwrap();
    }

    assert_eq!(client.get_endpoints().await.unwrap(), vec!["/b", "/a", "/c"]);

    let root = reqwest::get(server.url("/")).await.unwrap();
    assert_eq!(root.status(), StatusCode::OK);
    let html = root.text().await.unwrap();
    assert!(html.contains("<ul><li>/b</li><li>/a</li><li>/c</li></ul>"), "{}", html);

    assert_eq!(client.get_service("/a", &[]).await.unwrap(), "pong");
}

#[tokio::test]
async fn test_registration_token() {
    let mut config = common::test_config();
    config.registration_token = Some("s3cret".into());
    let server = common::start_server_with(config, |_, _| {}).await;
    let echo = server.echo_manifest();

    let (status, _) = rejected(server.client().add_service("/echo", &echo).await);
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(server.registry.is_empty());

    let client = server.client().with_token("s3cret");
    client.add_service("/echo", &echo).await.unwrap();
    assert!(client.ensure_service("/echo", &echo).await.is_ok_and(|added| !added));
}

#[tokio::test]
async fn test_seeded_services_are_live_at_startup() {
    let server = common::start_server_with(common::test_config(), |config, dir| {
        let hello = common::write_manifest(
            dir,
            "hello.toml",
            "kind = \"template\"\ntemplate = \"hello {{ query.name }}\"\n",
        );
        config.services.push(ServiceConfig {
            path: "/hello".into(),
            handler_ref: hello.display().to_string(),
        });
    })
    .await;

    let client = server.client();
    assert_eq!(client.get_endpoints().await.unwrap(), vec!["/hello"]);
    assert_eq!(
        client.get_service("/hello", &[("name", "world")]).await.unwrap(),
        "hello world"
    );
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let server = common::start_server().await;
    let res = reqwest::get(server.url("/__test__")).await.unwrap();
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_non_json_listing_is_a_decode_error() {
    let server = common::start_server().await;
    // The test endpoint answers plain text, not a JSON array.
    let client = server.client().with_meta_endpoints(MetaEndpoints {
        endpoints: "/__test__".into(),
        ..MetaEndpoints::default()
    });

    let err = client.get_endpoints().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)), "{:?}", err);
    assert_eq!(err.status(), None);
}
