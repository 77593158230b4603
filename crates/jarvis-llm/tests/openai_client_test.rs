use jarvis_llm::{ChatClient, ChatRequest, Message, OpenAIClient};
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_chat_returns_first_choice_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({"model": "gpt-4o-mini"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1,
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Title\nBody"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").unwrap().with_base_url(server.url());
    let request = ChatRequest::new(
        "gpt-4o-mini",
        vec![Message::system("sys"), Message::human("thread")],
    );
    let response = client.chat(request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.content.as_deref(), Some("Title\nBody"));
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 15);
}

#[tokio::test]
async fn test_chat_surfaces_api_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"bad key"}}"#)
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-bad").unwrap().with_base_url(server.url());
    let err = client
        .chat(ChatRequest::new("gpt-4o-mini", vec![Message::human("x")]))
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("401"), "unexpected error: {message}");
    assert!(message.contains("bad key"));
}
