//! End-to-end tests against a local Chat Completions stub.
//!
//! The stub is an axum app bound to an ephemeral port; it records every
//! request body and answers from a canned queue.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use persona_chat::tool::tool_fn;
use persona_chat::{
    ChatMessage, ChatParams, Chatbot, JsonSchema, LlmError, Provider, ToolDefinition, ToolRegistry,
};
use persona_chat_openai::{OpenAiConfig, OpenAiProvider};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Stub {
    replies: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl Stub {
    fn reply(&self, status: StatusCode, body: Value) -> &Self {
        self.replies.lock().unwrap().push_back((status, body));
        self
    }

    fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

async fn completions(State(stub): State<Stub>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    stub.requests.lock().unwrap().push(body);
    let (status, reply) = stub
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, json!({"error": {"message": "no reply queued"}})));
    (status, Json(reply))
}

async fn spawn_stub(stub: Stub) -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1")
}

fn provider(base_url: String) -> OpenAiProvider {
    OpenAiProvider::new(OpenAiConfig {
        api_key: "sk-test".into(),
        base_url,
        timeout: Some(Duration::from_secs(5)),
        ..Default::default()
    })
    .unwrap()
}

fn text_completion(text: &str) -> Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": text }, "finish_reason": "stop" }],
        "model": "gpt-4o-mini",
        "usage": { "prompt_tokens": 40, "completion_tokens": 8 }
    })
}

#[tokio::test]
async fn test_generate_against_stub() {
    let stub = Stub::default();
    stub.reply(StatusCode::OK, text_completion("Hello from the stub"));
    let provider = provider(spawn_stub(stub.clone()).await);

    let response = provider
        .generate(&ChatParams {
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(response.text(), Some("Hello from the stub"));
    assert_eq!(response.usage.input_tokens, 40);

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["model"], "gpt-4o-mini");
    assert_eq!(requests[0]["messages"][0]["role"], "system");
    assert!(requests[0].get("tools").is_none());
}

#[tokio::test]
async fn test_error_status_maps_to_llm_error() {
    let stub = Stub::default();
    stub.reply(
        StatusCode::UNAUTHORIZED,
        json!({"error": {"message": "Incorrect API key provided"}}),
    );
    let provider = provider(spawn_stub(stub).await);

    let err = provider
        .generate(&ChatParams {
            messages: vec![ChatMessage::user("hi")],
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Auth(m) if m == "Incorrect API key provided"));
}

#[tokio::test]
async fn test_rate_limit_is_retryable() {
    let stub = Stub::default();
    stub.reply(StatusCode::TOO_MANY_REQUESTS, json!({"error": {"message": "slow down"}}));
    let provider = provider(spawn_stub(stub).await);

    let err = provider
        .generate(&ChatParams {
            messages: vec![ChatMessage::user("hi")],
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_tool_turn_through_chatbot() {
    let stub = Stub::default();
    stub.reply(
        StatusCode::OK,
        json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_q1",
                        "type": "function",
                        "function": {
                            "name": "record_unknown_question",
                            "arguments": "{\"question\": \"What's your favourite colour?\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "model": "gpt-4o-mini"
        }),
    )
    .reply(StatusCode::OK, text_completion("I've noted that question."));
    let base_url = spawn_stub(stub.clone()).await;

    let mut registry = ToolRegistry::new();
    registry.register(tool_fn(
        ToolDefinition {
            name: "record_unknown_question".into(),
            description: "Record a question that couldn't be answered".into(),
            parameters: JsonSchema::new(json!({
                "type": "object",
                "properties": { "question": { "type": "string" } },
                "required": ["question"]
            })),
        },
        |_| async { Ok(json!({"recorded": true})) },
    ));
    let bot = Chatbot::new(
        Arc::new(provider(base_url)),
        Arc::new(registry),
        "You are acting as Rohit.",
    );

    let reply = bot
        .chat("What's your favourite colour?", &[])
        .await
        .unwrap();
    assert_eq!(reply, "I've noted that question.");

    let requests = stub.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0]["tools"][0]["function"]["name"],
        "record_unknown_question"
    );

    let second = requests[1]["messages"].as_array().unwrap();
    assert_eq!(second.len(), 4);
    assert_eq!(second[2]["role"], "assistant");
    assert_eq!(second[2]["tool_calls"][0]["id"], "call_q1");
    assert_eq!(second[3]["role"], "tool");
    assert_eq!(second[3]["tool_call_id"], "call_q1");
    assert_eq!(second[3]["content"], "{\"recorded\":true}");
}
