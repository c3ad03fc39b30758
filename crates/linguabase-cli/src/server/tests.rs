use super::*;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use linguabase_core::{ProxyConfig, ServiceEndpoint};
use linguabase_schemas::DocumentKind;
use reqwest::multipart;
use tempfile::TempDir;

struct TestServer {
    base: String,
    data: TempDir,
    client: reqwest::Client,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn write(&self, kind: DocumentKind, value: &Value) {
        let path = self.data.path().join(kind.default_file_name());
        std::fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        decode(response).await
    }

    async fn send_json(&self, method: reqwest::Method, path: &str, body: &Value) -> (StatusCode, Value) {
        let response = self
            .client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await
            .unwrap();
        decode(response).await
    }
}

async fn decode(response: reqwest::Response) -> (StatusCode, Value) {
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, format!("http://{addr}"))
}

/// Upstream stand-in for the speech and chat services
async fn spawn_upstream() -> String {
    async fn transcribe(mut form: Multipart) -> Json<Value> {
        let mut files = Vec::new();
        while let Ok(Some(field)) = form.next_field().await {
            files.push(json!({
                "name": field.name(),
                "file_name": field.file_name(),
            }));
        }
        Json(json!({"text": "Guten Morgen", "files": files}))
    }

    let app = Router::new()
        .route(
            "/api/generate-audio",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"audio": "UklGRg==", "echo": body}))
            }),
        )
        .route("/api/transcribe", post(transcribe))
        .route(
            "/api/chat",
            post(|Json(body): Json<Value>| async move {
                if body["model"] == "missing-model" {
                    return (StatusCode::NOT_FOUND, "model not found").into_response();
                }
                Json(json!({"message": {"role": "assistant", "content": "Hallo!"}, "echo": body}))
                    .into_response()
            }),
        );
    let (listener, base) = bind().await;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    base
}

async fn start(upstream: &str) -> TestServer {
    let data = TempDir::new().unwrap();
    let proxy = ServiceProxy::new(ProxyConfig {
        default_model: "gemma3:1b".to_string(),
        tts: ServiceEndpoint::new(upstream, 5),
        stt: ServiceEndpoint::new(upstream, 5),
        chat: ServiceEndpoint::new(upstream, 5),
    })
    .unwrap();
    let state = Arc::new(AppState::new(DocumentStore::open(data.path()), proxy));
    let router = build_router(state, &ServerConfig::default());

    let (listener, base) = bind().await;
    tokio::spawn(serve(listener, router, std::future::pending()));

    TestServer {
        base,
        data,
        client: reqwest::Client::new(),
    }
}

async fn start_offline() -> TestServer {
    // nothing listens on the upstream port
    let (listener, upstream) = bind().await;
    drop(listener);
    start(&upstream).await
}

fn knowledge_base() -> Value {
    json!([
        {
            "id": "6f1c2a4e-8f0e-4c55-9f7d-3b2f1a0c9e11",
            "timestamp": "2025-02-10T09:30:00",
            "language": "german",
            "kind": "phrase",
            "source_text": "Hallo",
            "translation": "Olá"
        },
        {
            "id": "a3d5e7f9-1b2c-4d3e-8f4a-5b6c7d8e9f00",
            "timestamp": "2025-02-10T09:31:00",
            "language": "german",
            "kind": "phrase",
            "source_text": "Guten Tag",
            "translation": "Bom dia"
        }
    ])
}

fn prompt_library() -> Value {
    json!({
        "description": "Prompts used by the practice screens",
        "last_updated": "2025-03-01T12:00:00",
        "parameter_delimiter": "$$",
        "prompts": [{
            "id": "small_talk",
            "description": "Keep a dialogue going",
            "template": "Reply briefly to: $$message$$",
            "parameters": ["message"],
            "structured_response": false,
            "last_edited": "2025-02-20T08:15:00"
        }]
    })
}

fn exercise() -> Value {
    json!({
        "timestamp": "2025-03-02T18:45:10",
        "exercise_id": uuid::Uuid::new_v4().to_string(),
        "knowledge_id": "6f1c2a4e-8f0e-4c55-9f7d-3b2f1a0c9e11",
        "language": "german",
        "practice_kind": "dialogue",
        "result": {"correct": "partial"}
    })
}

#[tokio::test]
async fn test_banner_and_health() {
    let server = start_offline().await;

    let (status, body) = server.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Linguabase API");
    assert!(body["endpoints"]
        .as_array()
        .unwrap()
        .contains(&json!("/api/knowledge_base")));

    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_knowledge_base_in_file_order() {
    let server = start_offline().await;
    server.write(DocumentKind::KnowledgeBase, &knowledge_base());

    let (status, body) = server.get("/api/knowledge_base").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["source_text"], "Hallo");
    assert_eq!(body[1]["translation"], "Bom dia");
}

#[tokio::test]
async fn test_error_statuses_and_bodies() {
    let server = start_offline().await;

    let (status, body) = server.get("/api/dialogue_phrases").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
    assert!(!body["detail"]
        .as_str()
        .unwrap()
        .contains(&server.data.path().display().to_string()));

    let mut base = knowledge_base();
    base[0]["language"] = json!("french");
    server.write(DocumentKind::KnowledgeBase, &base);
    let (status, body) = server.get("/api/knowledge_base").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "schema_violation");
    assert_eq!(body["violations"]["errors"][0]["path"], "$[0].language");

    std::fs::write(
        server.data.path().join(DocumentKind::PromptLibrary.default_file_name()),
        "{ broken",
    )
    .unwrap();
    let (status, body) = server.get("/api/prompts").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "malformed");
}

#[tokio::test]
async fn test_prompt_library_replace() {
    let server = start_offline().await;
    server.write(DocumentKind::PromptLibrary, &prompt_library());

    let mut edited = prompt_library();
    edited["prompts"][0]["template"] = json!("Answer politely: $$message$$");
    let (status, body) = server
        .send_json(reqwest::Method::PUT, "/api/prompts", &edited)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prompts"][0]["template"], "Answer politely: $$message$$");

    let (_, reloaded) = server.get("/api/prompts").await;
    assert_eq!(reloaded, body);

    let mut invalid = edited.clone();
    invalid["prompts"][0]["parameters"] = json!("message");
    let (status, body) = server
        .send_json(reqwest::Method::PUT, "/api/prompts", &invalid)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"]["errors"][0]["path"], "$.prompts[0].parameters");
    let (_, unchanged) = server.get("/api/prompts").await;
    assert_eq!(unchanged, reloaded);
}

#[tokio::test]
async fn test_practice_history_append() {
    let server = start_offline().await;

    let (status, body) = server.get("/api/practice_history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"exercises": []}));

    let (status, body) = server
        .send_json(reqwest::Method::POST, "/api/practice_history", &exercise())
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["exercises"].as_array().unwrap().len(), 1);

    let (status, body) = server
        .send_json(reqwest::Method::POST, "/api/practice_history", &exercise())
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["exercises"].as_array().unwrap().len(), 2);
    assert_eq!(body["exercises"][1]["result"], json!({"correct": "partial"}));
}

#[tokio::test]
async fn test_unparsable_body_is_rejected() {
    let server = start_offline().await;

    let response = server
        .client
        .post(server.url("/api/practice_history"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    let (status, body) = decode(response).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "schema_violation");
}

#[tokio::test]
async fn test_validation_report() {
    let server = start_offline().await;
    server.write(DocumentKind::KnowledgeBase, &knowledge_base());
    server.write(DocumentKind::PromptLibrary, &prompt_library());

    let (status, body) = server.get("/api/validation").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["knowledge_base"], json!({"status": "ok", "count": 2}));
    assert_eq!(body["prompts"], json!({"status": "ok", "count": 1}));
    assert_eq!(body["practice_history"]["status"], "missing_but_optional");
    assert_eq!(body["dialogue_phrases"]["kind"], "not_found");
}

#[tokio::test]
async fn test_proxy_pass_through() {
    let upstream = spawn_upstream().await;
    let server = start(&upstream).await;

    let (status, body) = server
        .send_json(
            reqwest::Method::POST,
            "/api/generate-audio",
            &json!({"text": "Guten Tag"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["audio"], "UklGRg==");
    assert_eq!(body["echo"]["speed"], 1.0);

    let (status, body) = server
        .send_json(
            reqwest::Method::POST,
            "/api/chat",
            &json!({"messages": [{"role": "user", "content": "Hallo"}]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["echo"]["model"], "gemma3:1b");
    assert_eq!(body["echo"]["stream"], false);

    let form = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(vec![1, 2, 3, 4])
            .file_name("take1.webm")
            .mime_str("audio/webm")
            .unwrap(),
    );
    let response = server
        .client
        .post(server.url("/api/transcribe-audio"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    let (status, body) = decode(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Guten Morgen");
    assert_eq!(body["files"], json!([{"name": "file", "file_name": "take1.webm"}]));
}

#[tokio::test]
async fn test_proxy_request_validation() {
    let server = start_offline().await;

    let (status, body) = server
        .send_json(
            reqwest::Method::POST,
            "/api/generate-audio",
            &json!({"text": "Hallo", "speed": 3.0}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "schema_violation");

    let (status, _) = server
        .send_json(reqwest::Method::POST, "/api/chat", &json!({"messages": []}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let form = multipart::Form::new().text("note", "no audio here");
    let response = server
        .client
        .post(server.url("/api/transcribe-audio"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    let (status, body) = decode(response).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"]["errors"][0]["violation"]["rule"], "required");
}

#[tokio::test]
async fn test_upstream_failures() {
    let server = start_offline().await;
    let (status, body) = server
        .send_json(
            reqwest::Method::POST,
            "/api/chat",
            &json!({"messages": [{"role": "user", "content": "Hallo"}]}),
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "service_unavailable");

    let upstream = spawn_upstream().await;
    let server = start(&upstream).await;
    let (status, body) = server
        .send_json(
            reqwest::Method::POST,
            "/api/chat",
            &json!({"model": "missing-model", "messages": [{"role": "user", "content": "Hallo"}]}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "upstream_error");
}

#[test]
fn test_cors_layer_accepts_configured_origins() {
    // invalid origins are skipped
    let _ = cors_layer(&["http://localhost:5173".to_string(), "\u{0}bad".to_string()]);
    let _ = cors_layer(&[]);
}
