use jarvis_notion::NotionClient;
use jarvis_pipeline::{NewTicket, TicketStore};
use mockito::Matcher;
use serde_json::json;

fn ticket() -> NewTicket {
    NewTicket {
        title: "Checkout button unresponsive".to_string(),
        body: "Steps in [recording](https://loom.com/abc)".to_string(),
        status_id: "not-started".to_string(),
        reporter: "Ada Lovelace".to_string(),
    }
}

#[tokio::test]
async fn test_create_ticket_returns_page_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/pages")
        .match_header("authorization", "Bearer secret_abc")
        .match_header("notion-version", "2022-06-28")
        .match_body(Matcher::PartialJson(json!({
            "parent": {"database_id": "db-42"},
            "properties": {"Status": {"status": {"id": "not-started"}}}
        })))
        .with_status(200)
        .with_body(json!({"object": "page", "id": "aaaa-bbbb-cccc"}).to_string())
        .create_async()
        .await;

    let client = NotionClient::new("secret_abc", "db-42")
        .unwrap()
        .with_api_base(server.url());
    let url = client.create_ticket(&ticket()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(url, "https://www.notion.so/aaaabbbbcccc");
}

#[tokio::test]
async fn test_missing_id_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/pages")
        .with_status(200)
        .with_body(json!({"object": "page"}).to_string())
        .create_async()
        .await;

    let client = NotionClient::new("t", "db").unwrap().with_api_base(server.url());
    let err = client.create_ticket(&ticket()).await.unwrap_err();
    assert!(err.to_string().contains("page id"));
}

#[tokio::test]
async fn test_api_error_surfaces_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/pages")
        .with_status(400)
        .with_body(json!({"object": "error", "code": "validation_error"}).to_string())
        .create_async()
        .await;

    let client = NotionClient::new("t", "db").unwrap().with_api_base(server.url());
    let err = client.create_ticket(&ticket()).await.unwrap_err().to_string();
    assert!(err.contains("400"));
    assert!(err.contains("validation_error"));
}
