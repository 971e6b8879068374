use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, StatsResponse};

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    // Short, separate locks
    let height = {
        let bc = state.blockchain.lock().expect("mutex poisoned");
        bc.len()
    };
    let admissions = {
        let stats = state.stats.lock().expect("mutex poisoned");
        stats.clone()
    };

    HttpResponse::Ok().json(StatsResponse {
        height,
        policy: &state.policy,
        admissions,
    })
}
