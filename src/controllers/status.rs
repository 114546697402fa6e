//! Status controller - liveness probe and the (stub) conversation reset.

use actix_web::{web, HttpResponse, Responder};

use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/status").route(web::get().to(status)))
        .service(web::resource("/reset").route(web::post().to(reset)));
}

async fn status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "mode": "API Mode",
        "model": state.ai.model()
    }))
}

/// Acknowledges a frontend conversation reset. Does NOT clear persisted
/// memory — the stored facts survive across conversations on purpose; the
/// frontend only clears its own message list.
async fn reset() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "reset": true }))
}
