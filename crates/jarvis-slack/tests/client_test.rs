use jarvis_pipeline::{
    DeliveryError, DeliveryOutcome, IdentityDirectory, RetryPolicy, RetryingNotifier, ThreadSource,
};
use jarvis_slack::SlackClient;
use jarvis_types::ThreadRef;
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn client(server: &mockito::Server) -> SlackClient {
    SlackClient::new("xoxb-test", Duration::from_secs(5))
        .unwrap()
        .with_api_base(server.url())
}

fn thread() -> ThreadRef {
    ThreadRef::new("C1", "100.1")
}

#[tokio::test]
async fn test_auth_test_returns_bot_user() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth.test")
        .match_header("authorization", "Bearer xoxb-test")
        .with_body(json!({"ok": true, "user_id": "UBOT"}).to_string())
        .create_async()
        .await;

    assert_eq!(client(&server).auth_test().await.unwrap(), "UBOT");
}

#[tokio::test]
async fn test_auth_test_error_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth.test")
        .with_body(json!({"ok": false, "error": "invalid_auth"}).to_string())
        .create_async()
        .await;

    let err = client(&server).auth_test().await.unwrap_err();
    assert!(err.to_string().contains("invalid_auth"));
}

#[tokio::test]
async fn test_replies_follow_cursor() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("GET", "/conversations.replies")
        .match_query(Matcher::Regex(r"^channel=C1&ts=100\.1&limit=200$".to_string()))
        .with_body(
            json!({
                "ok": true,
                "messages": [{"text": "root", "user": "U1", "ts": "100.1"}, {"user": "U2", "ts": "100.2"}],
                "has_more": true,
                "response_metadata": {"next_cursor": "page2"}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let second = server
        .mock("GET", "/conversations.replies")
        .match_query(Matcher::UrlEncoded("cursor".to_string(), "page2".to_string()))
        .with_body(
            json!({
                "ok": true,
                "messages": [{"text": "last", "ts": "100.3"}],
                "response_metadata": {"next_cursor": ""}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let messages = client(&server).fetch_thread(&thread()).await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].text.as_deref(), Some("root"));
    assert_eq!(messages[1].text, None);
    assert_eq!(messages[2].text.as_deref(), Some("last"));
}

#[tokio::test]
async fn test_replies_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/conversations.replies")
        .match_query(Matcher::Any)
        .with_body(json!({"ok": false, "error": "not_in_channel"}).to_string())
        .create_async()
        .await;

    let err = client(&server).fetch_thread(&thread()).await.unwrap_err();
    assert!(err.to_string().contains("not_in_channel"));
}

#[tokio::test]
async fn test_display_name_lookup() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/users.list")
        .match_query(Matcher::Any)
        .with_body(
            json!({
                "ok": true,
                "members": [
                    {"id": "U1", "real_name": "Ada Lovelace", "profile": {"display_name": "ada"}},
                    {"id": "U2", "profile": {"display_name": "bo"}},
                    {"id": "USLACKBOT", "real_name": "Slackbot"}
                ]
            })
            .to_string(),
        )
        .expect(3)
        .create_async()
        .await;

    let slack = client(&server);
    assert_eq!(slack.display_name("U1").await.unwrap().as_deref(), Some("Ada Lovelace"));
    assert_eq!(slack.display_name("U2").await.unwrap().as_deref(), Some("bo"));
    assert_eq!(slack.display_name("U9").await.unwrap(), None);
}

#[tokio::test]
async fn test_post_message_in_thread() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat.postMessage")
        .match_body(Matcher::Json(json!({
            "channel": "C1",
            "thread_ts": "100.1",
            "text": "hello"
        })))
        .with_body(json!({"ok": true, "ts": "100.9"}).to_string())
        .create_async()
        .await;

    client(&server).post_message(&thread(), "hello").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_message_http_429_is_rate_limit() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat.postMessage")
        .with_status(429)
        .with_header("retry-after", "3")
        .create_async()
        .await;

    let err = client(&server).post_message(&thread(), "x").await.unwrap_err();
    assert!(matches!(err, DeliveryError::RateLimited(ref msg) if msg.contains("3s")));
}

#[tokio::test]
async fn test_post_message_api_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat.postMessage")
        .match_body(Matcher::PartialJson(json!({"channel": "C1"})))
        .with_body(json!({"ok": false, "error": "ratelimited"}).to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/chat.postMessage")
        .match_body(Matcher::PartialJson(json!({"channel": "CGONE"})))
        .with_body(json!({"ok": false, "error": "channel_not_found"}).to_string())
        .create_async()
        .await;

    let slack = client(&server);
    let limited = slack.post_message(&thread(), "x").await.unwrap_err();
    assert!(limited.is_rate_limited());

    let gone = slack
        .post_message(&ThreadRef::new("CGONE", "1.0"), "x")
        .await
        .unwrap_err();
    assert!(!gone.is_rate_limited());
    assert!(gone.to_string().contains("channel_not_found"));
}

#[tokio::test]
async fn test_notifier_gives_up_on_persistent_rate_limit() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat.postMessage")
        .with_status(429)
        .expect(3)
        .create_async()
        .await;

    let notifier = RetryingNotifier::new(
        Arc::new(client(&server)),
        RetryPolicy::new(3, Duration::from_millis(1)),
    );
    let outcome = notifier.notify(&thread(), "ticket created").await;

    mock.assert_async().await;
    assert_eq!(outcome, DeliveryOutcome::RateLimited { attempts: 3 });
}
