use actix_web::{HttpResponse, Responder, post, web};
use log::{info, warn};

use super::models::AppState;

/// Terminate the operator session: stop accepting requests and let the
/// server drain gracefully.
#[post("/shutdown/")]
pub async fn shutdown(state: web::Data<AppState>) -> impl Responder {
    let handle = state.server.lock().expect("mutex poisoned").take();
    match handle {
        Some(handle) => {
            info!("shutdown requested, stopping server");
            actix_web::rt::spawn(async move { handle.stop(true).await });
            HttpResponse::Accepted().body("shutting down")
        }
        None => {
            warn!("shutdown requested but no server handle is registered");
            HttpResponse::Conflict().body("server handle not available")
        }
    }
}
