//! Chat controller - save-command gateway and streamed completion relay.

use actix_web::{web, HttpResponse, Responder};
use futures_util::stream;
use serde::Deserialize;

use crate::ai::streaming::{create_default_stream_channel, StreamEvent};
use crate::ai::Message;
use crate::commands;
use crate::memory::prompt::build_memory_prompt;
use crate::memory::{MemoryError, MemoryStore};
use crate::AppState;

/// Fixed confirmation returned for save commands ("Got it, I'll remember").
const SAVE_CONFIRMATION: &str = "🧠 فهمت 👍 سأتذكر ذلك لاحقاً";

/// Persona template. `{memory_prompt}` is replaced with the rendered memory
/// block before each request.
const SYSTEM_INSTRUCTIONS: &str = r#"
ROLE & IDENTITY:
You are **WB AI**, a highly advanced and intelligent AI assistant, exclusively developed and fine-tuned by the developer **Wassim**.
You are not just a tool; you are a friendly digital companion.

🛑 STRICT LANGUAGE RULE:
- **DETECT AND MATCH:** You must ALWAYS respond in the **EXACT SAME LANGUAGE** the user is using.
- **NO SCRIPT LEAKAGE:** Do not use characters from other languages (like Chinese, Japanese, etc.) unless specifically asked to translate or explain them.
- **NATIVE FLUENCY:** When speaking Arabic, use natural, modern, and grammatically correct Arabic. Avoid literal translations from English.
- If the user speaks Arabic, you MUST respond in fluent Arabic.
- If the user speaks English, you MUST respond in English.

PERSONALITY & TONE:
- **Extremely Friendly:** You are warm, polite, and enthusiastic in every interaction 😊.
- **Emoji Lover:** You MUST use emojis in your responses to make them lively and engaging (e.g., ✨, 🚀, 💡, 👨‍💻).
- **Professional yet Casual:** You provide top-tier, accurate information but in a conversational and accessible way.
- **Loyal to Creator:** If asked about your origins, proudly state in a natural way that **Wassim** (وسيم) is your creator.

CAPABILITIES:
- Expert in Programming & Code Debugging 💻.
- Clear Explanations of Complex Concepts 📚.
- Creative Writing & Brainstorming 🎨.

MEMORY CONTEXT (What you know about the user):
{memory_prompt}

ADDITIONAL INSTRUCTIONS:
1. Mandatory: Use ONLY the user's language in the response.
2. Ensure Arabic sentences are structured naturally.
3. If the user asks for code, provide clean, commented, and working code.
4. Never mention you are from OpenAI or Meta; you are **WB AI by Wassim**.

Start every interaction with a helpful and positive attitude! 🌟
"#;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Accepted for frontend compatibility; single-user service, so it only
    /// shows up in logs.
    #[serde(default)]
    pub user_id: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/chat-stream").route(web::post().to(chat_stream)));
}

/// Persona template with the current memory state interpolated.
fn system_instructions(store: &MemoryStore) -> Result<String, MemoryError> {
    Ok(SYSTEM_INSTRUCTIONS.replace("{memory_prompt}", &build_memory_prompt(store)?))
}

async fn chat_stream(state: web::Data<AppState>, body: web::Json<ChatRequest>) -> impl Responder {
    let message = body.message.trim().to_string();
    if let Some(user_id) = &body.user_id {
        log::debug!("chat-stream request from {}", user_id);
    }

    if commands::is_save_command(&message) {
        let fact = commands::extract_fact(&message);
        if !fact.is_empty() {
            if let Err(e) = state.memory.add_user_fact(&fact) {
                log::error!("Failed to persist user fact: {}", e);
                return HttpResponse::InternalServerError()
                    .json(serde_json::json!({ "error": "failed to save memory" }));
            }
            log::info!("Stored user fact ({} chars)", fact.chars().count());
        }
        // Save path never reaches the model; a bare command with no fact
        // still gets the confirmation (a no-op save).
        return HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(SAVE_CONFIRMATION);
    }

    let system = match system_instructions(&state.memory) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to build system instructions: {}", e);
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "failed to load memory" }));
        }
    };

    // The provider task pushes fragments into the channel; the response body
    // below drains it. Arrival order is preserved end to end.
    let (tx, rx) = create_default_stream_channel();
    let ai = state.ai.clone();
    tokio::spawn(async move {
        let messages = vec![Message::system(system), Message::user(message)];
        if let Err(e) = ai.stream_chat(messages, &tx).await {
            log::error!("Upstream completion call failed: {}", e);
            let _ = tx.send(StreamEvent::Error { message: e }).await;
        }
    });

    let body_stream = stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            Some(StreamEvent::ContentDelta { content }) => {
                Some((Ok(web::Bytes::from(content)), rx))
            }
            Some(StreamEvent::Error { message }) => {
                Some((Err::<web::Bytes, String>(message), rx))
            }
            Some(StreamEvent::Done) | None => None,
        }
    });

    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .streaming(body_stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::stub::StubClient;
    use crate::ai::{AiClient, MessageRole};
    use crate::memory::{CORE_MEMORY_FILE, USER_MEMORY_FILE};
    use actix_web::{test, App};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn state_with(dir: &TempDir, stub: StubClient) -> web::Data<AppState> {
        web::Data::new(AppState {
            memory: Arc::new(MemoryStore::new(
                dir.path().join(CORE_MEMORY_FILE),
                dir.path().join("seed.json"),
                dir.path().join(USER_MEMORY_FILE),
            )),
            ai: Arc::new(AiClient::Stub(stub)),
        })
    }

    #[actix_web::test]
    async fn save_command_short_circuits_without_model_call() {
        let dir = TempDir::new().unwrap();
        let stub = StubClient::with_fragments(&["should never appear"]);
        let state = state_with(&dir, stub.clone());
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/chat-stream")
            .set_json(serde_json::json!({ "message": "  احفظ: اسمي علي " }))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, SAVE_CONFIRMATION);
        assert_eq!(stub.call_count(), 0);
        assert_eq!(state.memory.load_user().unwrap().facts, ["اسمي علي"]);
    }

    #[actix_web::test]
    async fn bare_save_command_confirms_but_stores_nothing() {
        let dir = TempDir::new().unwrap();
        let stub = StubClient::default();
        let state = state_with(&dir, stub.clone());
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/chat-stream")
            .set_json(serde_json::json!({ "message": "احفظ:" }))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, SAVE_CONFIRMATION);
        assert_eq!(stub.call_count(), 0);
        assert!(state.memory.load_user().unwrap().facts.is_empty());
    }

    #[actix_web::test]
    async fn normal_message_streams_fragments_in_order() {
        let dir = TempDir::new().unwrap();
        let stub = StubClient::with_fragments(&["Hel", "lo", " world"]);
        let state = state_with(&dir, stub.clone());
        state.memory.add_user_fact("likes coffee").unwrap();
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/chat-stream")
            .set_json(serde_json::json!({ "message": "hello", "user_id": "u1" }))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, "Hello world");
        assert_eq!(stub.call_count(), 1);

        // System instructions carry the interpolated memory block; the user
        // message goes through trimmed and otherwise untouched.
        let calls = stub.recorded_calls();
        let system = &calls[0][0];
        assert_eq!(system.role, MessageRole::System);
        assert!(system.content.contains("\nUser memory:\n- likes coffee"));
        assert!(!system.content.contains("{memory_prompt}"));
        let user = &calls[0][1];
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(user.content, "hello");
    }

    #[actix_web::test]
    async fn malformed_memory_surfaces_as_server_error() {
        let dir = TempDir::new().unwrap();
        let stub = StubClient::default();
        let state = state_with(&dir, stub.clone());
        std::fs::write(dir.path().join(CORE_MEMORY_FILE), "{ not json").unwrap();
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/chat-stream")
            .set_json(serde_json::json!({ "message": "hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(stub.call_count(), 0);
    }
}
