//! Axum router configuration with middleware.
//!
//! Routes sit at the root (`/chats`, `/models`, `/health`) to match the
//! paths existing web clients call.
//! Middleware: body size limit, CORS, tracing.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    let body_limit = state.config.chat.max_upload_bytes;

    Router::new()
        .route("/chats/new", post(handlers::chat::create_chat))
        .route("/chats", get(handlers::chat::list_chats))
        .route(
            "/chats/{id}",
            get(handlers::chat::get_chat).delete(handlers::chat::delete_chat),
        )
        .route("/chats/{id}/message", post(handlers::chat::send_message))
        .route("/models", get(handlers::model::list_models))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin when none are configured, otherwise exactly the configured list.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(allowed))
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use parley_core::llm::box_provider::BoxLlmProvider;
    use parley_core::llm::provider::{Conversation, LlmProvider};
    use parley_types::config::ParleyConfig;
    use parley_types::llm::{LlmError, ModelInfo, OutgoingMessage, ProviderCapabilities};

    use super::*;

    const BOUNDARY: &str = "parley-test-boundary";

    /// Echoes messages; the text "fail" makes the call fail.
    struct EchoConversation;

    impl Conversation for EchoConversation {
        async fn send(&mut self, message: &OutgoingMessage) -> Result<String, LlmError> {
            if message.text == "fail" {
                return Err(LlmError::Provider {
                    message: "quota exhausted".to_string(),
                });
            }
            let suffix = match &message.image {
                Some(image) => format!(" [{}]", image.media_type),
                None => String::new(),
            };
            Ok(format!("echo: {}{suffix}", message.text))
        }

        fn release(&mut self) {}
    }

    struct EchoProvider {
        capabilities: ProviderCapabilities,
        models_fail: bool,
    }

    impl LlmProvider for EchoProvider {
        type Conversation = EchoConversation;

        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        fn start_conversation(&self) -> EchoConversation {
            EchoConversation
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
            if self.models_fail {
                return Err(LlmError::AuthenticationFailed);
            }
            Ok(vec![ModelInfo {
                name: "models/echo-1".to_string(),
                display_name: Some("Echo 1".to_string()),
                supports_chat: true,
            }])
        }
    }

    fn app_with(config: ParleyConfig, models_fail: bool) -> Router {
        let provider = BoxLlmProvider::new(EchoProvider {
            capabilities: ProviderCapabilities {
                vision: true,
                max_context_tokens: 1_000,
                max_output_tokens: 100,
            },
            models_fail,
        });
        build_router(AppState::new(provider, config))
    }

    fn app() -> Router {
        app_with(ParleyConfig::default(), false)
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(2, 2));
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, image::ImageFormat::Png).unwrap();
        cursor.into_inner()
    }

    fn multipart_body(message: Option<&str>, file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(text) = message {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"message\"\r\n\r\n{text}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn message_request(chat_id: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/chats/{chat_id}/message"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn with_method(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn create_chat(app: &Router) -> String {
        let (status, json) = send(app, with_method("POST", "/chats/new")).await;
        assert_eq!(status, StatusCode::OK);
        json["chat_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, json) = send(&app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_chat_shape() {
        let app = app();
        let (status, json) = send(&app, with_method("POST", "/chats/new")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["title"], "Nowy czat");
        assert_eq!(json["history"], serde_json::json!([]));
        assert!(json["chat_id"].is_string());

        let (_, listed) = send(&app, get("/chats")).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["id"], json["chat_id"]);
        assert_eq!(listed[0]["title"], "Nowy czat");
    }

    #[tokio::test]
    async fn test_full_scenario() {
        let app = app();
        let id = create_chat(&app).await;

        let (status, json) = send(
            &app,
            message_request(&id, multipart_body(Some("Hi there"), None)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], "echo: Hi there");
        assert_eq!(json["new_title"], "Hi there...");

        let (status, transcript) = send(&app, get(&format!("/chats/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            transcript,
            serde_json::json!([
                {"role": "user", "text": "Hi there"},
                {"role": "bot", "text": "echo: Hi there"}
            ])
        );

        let (status, json) = send(&app, with_method("DELETE", &format!("/chats/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({"status": "ok"}));

        let (status, json) = send(&app, get(&format!("/chats/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["detail"], "Czat nie znaleziony");
    }

    #[tokio::test]
    async fn test_provider_failure_is_reported_as_reply() {
        let app = app();
        let id = create_chat(&app).await;

        let (status, json) =
            send(&app, message_request(&id, multipart_body(Some("fail"), None))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], "Błąd: provider error: quota exhausted");
        assert_eq!(json["new_title"], "fail...");

        let (_, transcript) = send(&app, get(&format!("/chats/{id}"))).await;
        assert_eq!(transcript, serde_json::json!([{"role": "user", "text": "fail"}]));
    }

    #[tokio::test]
    async fn test_image_upload_is_stored_as_data_url() {
        let app = app();
        let id = create_chat(&app).await;
        let png = png_bytes();

        let (status, json) = send(
            &app,
            message_request(
                &id,
                multipart_body(Some("what is this"), Some(("pic.png", "image/png", png.as_slice()))),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], "echo: what is this [image/png]");

        let (_, transcript) = send(&app, get(&format!("/chats/{id}"))).await;
        let image = transcript[0]["image"].as_str().unwrap();
        assert!(image.starts_with("data:image/png;base64,"));
        assert!(transcript[1].get("image").is_none());
    }

    #[tokio::test]
    async fn test_non_image_upload_is_reported_without_recording() {
        let app = app();
        let id = create_chat(&app).await;

        let (status, json) = send(
            &app,
            message_request(
                &id,
                multipart_body(Some("read this"), Some(("notes.txt", "text/plain", &b"plain text"[..]))),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["response"].as_str().unwrap().starts_with("Błąd: "));
        assert_eq!(json["new_title"], "Nowy czat");

        let (_, transcript) = send(&app, get(&format!("/chats/{id}"))).await;
        assert_eq!(transcript, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_empty_file_part_counts_as_no_attachment() {
        let app = app();
        let id = create_chat(&app).await;

        let (status, json) = send(
            &app,
            message_request(
                &id,
                multipart_body(Some("hello"), Some(("", "application/octet-stream", &[][..]))),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], "echo: hello");
    }

    #[tokio::test]
    async fn test_message_to_unknown_chat_is_404() {
        let app = app();
        let unknown = "0191d7a4-0000-7000-8000-000000000000";
        let (status, json) =
            send(&app, message_request(unknown, multipart_body(Some("hi"), None))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "CHAT_NOT_FOUND");

        let (_, listed) = send(&app, get("/chats")).await;
        assert_eq!(listed, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_non_uuid_id_is_404() {
        let app = app();
        let (status, _) = send(&app, get("/chats/not-a-uuid")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, with_method("DELETE", "/chats/not-a-uuid")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_message_field_is_422() {
        let app = app();
        let id = create_chat(&app).await;
        let (status, json) = send(&app, message_request(&id, multipart_body(None, None))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_delete_twice_is_404() {
        let app = app();
        let id = create_chat(&app).await;
        let uri = format!("/chats/{id}");
        let (status, _) = send(&app, with_method("DELETE", &uri)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, with_method("DELETE", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_custom_error_prefix() {
        let mut config = ParleyConfig::default();
        config.chat.error_prefix = "Error: ".to_string();
        let app = app_with(config, false);
        let id = create_chat(&app).await;

        let (_, json) = send(&app, message_request(&id, multipart_body(Some("fail"), None))).await;
        assert_eq!(json["response"], "Error: provider error: quota exhausted");
    }

    #[tokio::test]
    async fn test_list_models() {
        let (status, json) = send(&app(), get("/models")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["name"], "models/echo-1");
        assert_eq!(json[0]["supports_chat"], true);
    }

    #[tokio::test]
    async fn test_list_models_failure_is_502() {
        let app = app_with(ParleyConfig::default(), true);
        let (status, json) = send(&app, get("/models")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["code"], "PROVIDER_ERROR");
    }
}
