//! End-to-end scenarios against a scripted mock server (§8): a context
//! round-trips a publish, rejects a concurrent second transaction, and a
//! cancel takes effect.

use meshline::tests_support::{ok_json_response, serve_and_stall, serve_once};
use meshline::{Config, Context, Keys, Outcome};

fn test_config(port: u16) -> Config {
    Config::with_keys("127.0.0.1", Keys::new("pub-key", "sub-key"))
        .with_port(port)
        .with_tls(meshline::TlsOption::Disabled)
        .with_user_id("integration-test")
}

#[tokio::test]
async fn publish_round_trip_succeeds() {
    let response = ok_json_response(r#"[1,"Sent","15210000000000000"]"#);
    let response: &'static str = Box::leak(response.into_boxed_str());
    let port = serve_once(response).await;

    let context = Context::new(test_config(port));
    let outcome = context
        .publish("demo-channel", "\"hello\"", meshline::ops::publish::PublishOptions::default())
        .await;

    assert_eq!(outcome, Outcome::Ok);
    let body = context.last_http_response_body().await.unwrap();
    assert!(meshline::ops::publish::parse_publish_ack(&body).unwrap());
}

#[tokio::test]
async fn publish_with_malformed_ack_body_is_format_error() {
    let response = ok_json_response(r#"{"not":"an ack array"}"#);
    let response: &'static str = Box::leak(response.into_boxed_str());
    let port = serve_once(response).await;

    let context = Context::new(test_config(port));
    let outcome = context
        .publish("demo-channel", "\"hello\"", meshline::ops::publish::PublishOptions::default())
        .await;

    assert_eq!(outcome, Outcome::FormatError);
}

#[tokio::test]
async fn publish_with_rejected_ack_is_publish_failed() {
    let response = ok_json_response(r#"[0,"Invalid Channel","0"]"#);
    let response: &'static str = Box::leak(response.into_boxed_str());
    let port = serve_once(response).await;

    let context = Context::new(test_config(port));
    let outcome = context
        .publish("demo-channel", "\"hello\"", meshline::ops::publish::PublishOptions::default())
        .await;

    assert_eq!(outcome, Outcome::PublishFailed);
    assert_eq!(
        context.last_publish_result().await,
        Some(r#"[0,"Invalid Channel","0"]"#.to_string())
    );
}

#[tokio::test]
async fn second_transaction_while_busy_is_rejected() {
    // No server needed: the busy check happens before any I/O.
    let context = Context::new(test_config(0));
    let a = context.clone();
    let b = context.clone();

    let handle = tokio::spawn(async move { a.publish("ch", "\"x\"", meshline::ops::publish::PublishOptions::default()).await });
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let second = b.publish("ch", "\"y\"", meshline::ops::publish::PublishOptions::default()).await;

    assert_eq!(second, Outcome::InProgress);
    let _ = handle.await;
}

#[tokio::test]
async fn invalid_channel_is_rejected_without_touching_the_network() {
    let context = Context::new(test_config(1));
    let outcome = context.publish("", "\"hi\"", meshline::ops::publish::PublishOptions::default()).await;
    assert_eq!(outcome, Outcome::FormatError);
}

#[tokio::test]
async fn unresponsive_server_latches_timeout() {
    let port = serve_and_stall().await;
    let config = test_config(port).with_transaction_timeout(std::time::Duration::from_millis(50));
    let context = Context::new(config);

    let outcome = context
        .publish("demo-channel", "\"hello\"", meshline::ops::publish::PublishOptions::default())
        .await;

    assert_eq!(outcome, Outcome::Timeout);
}

#[tokio::test]
async fn cancel_before_transaction_starts_is_a_no_op() {
    let context = Context::new(test_config(1));
    context.cancel();
    assert_eq!(context.last_result().await, Outcome::Ok);
}
