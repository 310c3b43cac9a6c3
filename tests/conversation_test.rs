use chatpane::events::AppEvent;
use chatpane::llm::{ChatTransport, LlmClient, NO_REPLY_FALLBACK};
use chatpane::state::{APOLOGY_TEXT, FAILURE_TEXT};
use chatpane::ui::conversation::ConversationManager;
use chatpane::{ChatRequest, Config, Sender, UiConfig, ViewState};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(endpoint: String) -> LlmClient {
    let mut config = Config::default();
    config.endpoint = endpoint;
    LlmClient::new(&config).unwrap()
}

async fn mount_reply(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Run one exchange through the view transitions
async fn exchange(client: &LlmClient, text: &str) -> ViewState {
    let mut state = ViewState::new();
    state.set_input(text);
    let request = state.begin_submit().unwrap();
    let reply = client.send(&request).await;
    state.finish_submit(reply);
    state
}

#[tokio::test]
async fn posts_json_body_with_conversation_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({"message": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "hi"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(format!("{}/api/chat", server.uri()));
    let reply = client.send(&ChatRequest::new("hello")).await.unwrap();
    assert_eq!(reply, "hi");

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let conversation_id = body["conversation_id"].as_str().unwrap();
    assert!(conversation_id.starts_with("chat_"));
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn response_field_becomes_bot_message() {
    let server = MockServer::start().await;
    mount_reply(&server, ResponseTemplate::new(200).set_body_json(json!({"response": "hi"}))).await;

    let state = exchange(&client_for(format!("{}/api/chat", server.uri())), "hello").await;
    assert_eq!(state.messages().len(), 2);
    assert_eq!(state.messages()[1].sender(), Sender::Bot);
    assert_eq!(state.messages()[1].text(), "hi");
    assert_eq!(state.error(), None);
}

#[tokio::test]
async fn message_field_is_the_fallback_field() {
    let server = MockServer::start().await;
    mount_reply(&server, ResponseTemplate::new(200).set_body_json(json!({"message": "hi"}))).await;

    let state = exchange(&client_for(format!("{}/api/chat", server.uri())), "hello").await;
    assert_eq!(state.messages()[1].text(), "hi");
}

#[tokio::test]
async fn empty_object_yields_fixed_fallback() {
    let server = MockServer::start().await;
    mount_reply(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let state = exchange(&client_for(format!("{}/api/chat", server.uri())), "hello").await;
    assert_eq!(state.messages().len(), 2);
    assert_eq!(state.messages()[1].text(), NO_REPLY_FALLBACK);
    assert_eq!(state.error(), None);
}

fn assert_failed(state: &ViewState) {
    assert_eq!(state.messages().len(), 2);
    assert_eq!(state.messages()[1].sender(), Sender::Bot);
    assert_eq!(state.messages()[1].text(), APOLOGY_TEXT);
    assert_eq!(state.error(), Some(FAILURE_TEXT));
    assert!(!state.is_loading());
}

#[tokio::test]
async fn server_error_status_is_a_failure() {
    let server = MockServer::start().await;
    mount_reply(&server, ResponseTemplate::new(500).set_body_json(json!({"response": "ignored"}))).await;

    let state = exchange(&client_for(format!("{}/api/chat", server.uri())), "hello").await;
    assert_failed(&state);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_failure() {
    let server = MockServer::start().await;
    let endpoint = format!("{}/api/chat", server.uri());
    drop(server);

    let state = exchange(&client_for(endpoint), "hello").await;
    assert_failed(&state);
}

#[tokio::test]
async fn unparseable_body_is_a_failure() {
    let server = MockServer::start().await;
    mount_reply(&server, ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    let state = exchange(&client_for(format!("{}/api/chat", server.uri())), "hello").await;
    assert_failed(&state);
}

#[tokio::test]
async fn only_one_request_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "slow reply"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(format!("{}/api/chat", server.uri()));
    let mut manager = ConversationManager::new(Arc::new(client), UiConfig::default());
    let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);

    manager.handle_event(AppEvent::Paste("first".to_string()));
    manager.handle_key(enter);
    assert!(manager.state().is_loading());

    // Typing still works while loading, but sending does not.
    manager.handle_event(AppEvent::Paste("second".to_string()));
    manager.handle_key(enter);
    assert!(!manager.submit());
    assert_eq!(manager.state().input().content(), "second");
    assert_eq!(manager.state().messages().len(), 1);

    manager.wait_for_reply().await;
    assert!(!manager.state().is_loading());
    assert_eq!(manager.state().messages().len(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    // Once idle, the pending text can be sent.
    manager.handle_key(enter);
    manager.wait_for_reply().await;
    let texts: Vec<&str> = manager.state().messages().iter().map(|m| m.text()).collect();
    assert_eq!(texts, vec!["first", "slow reply", "second", "slow reply"]);
}
