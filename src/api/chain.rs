use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, info, warn};

use super::models::{
    AppState, ChainResponse, ErrorResponse, NewBlockRequest, NewBlockResponse, ValidateResponse,
};
use crate::blockchain::Transfer;
use crate::error::AdmissionError;

/// Get the full blockchain.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    let resp = ChainResponse {
        length: bc.len(),
        threshold: state.policy.threshold,
        chain: bc.list(),
    };
    HttpResponse::Ok().json(resp)
}

/// Tabular listing of the chain.
#[get("/chain/table/")]
pub async fn get_chain_table(state: web::Data<AppState>) -> impl Responder {
    let table = {
        let bc = state.blockchain.lock().expect("mutex poisoned");
        bc.render_table()
    };
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(table)
}

/// Validate the whole chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    let resp = ValidateResponse {
        valid: bc.is_valid_chain(),
        length: bc.len(),
    };
    HttpResponse::Ok().json(resp)
}

/// Submit a new block. Blocks until admission finishes; concurrent
/// submissions queue on the admission lock while reads stay available.
#[post("/blocks/")]
pub async fn submit_block(
    state: web::Data<AppState>,
    body: web::Json<NewBlockRequest>,
) -> impl Responder {
    let body = body.into_inner();
    for (field, value) in [
        ("sender", &body.sender),
        ("receiver", &body.receiver),
        ("amount", &body.amount),
    ] {
        if value.trim().is_empty() {
            warn!("POST /blocks/ - rejected: empty {field}");
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: format!("{field} must not be empty"),
            });
        }
    }

    let transfer = Transfer {
        sender: body.sender,
        receiver: body.receiver,
        amount: body.amount,
    };
    debug!(
        "POST /blocks/ - admitting {} -> {} ({})",
        transfer.sender, transfer.receiver, transfer.amount
    );

    let worker_state = state.clone();
    let outcome = web::block(move || worker_state.admit_block(transfer)).await;

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            warn!("POST /blocks/ - admission worker failed: {e}");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "admission worker failed".into(),
            });
        }
    };

    let mut stats = state.stats.lock().expect("mutex poisoned");
    match result {
        Ok((block, report)) => {
            stats.committed += 1;
            stats.total_iterations += report.iterations;
            stats.last_report = Some(report.clone());
            info!(
                "ACCEPTED block#{} hash={} accuracy={:.2}% iterations={} avg={:.2}%",
                block.block_number,
                block.block_hash,
                block.accuracy,
                report.iterations,
                report.average_accuracy
            );
            HttpResponse::Ok().json(NewBlockResponse { block, report })
        }
        Err(e) => {
            stats.failed += 1;
            stats.total_iterations += e.iterations();
            let body = ErrorResponse {
                error: e.to_string(),
            };
            match e {
                AdmissionError::OracleUnavailable { .. } => {
                    HttpResponse::ServiceUnavailable().json(body)
                }
                AdmissionError::Timeout { .. } => HttpResponse::GatewayTimeout().json(body),
                AdmissionError::InvalidPolicy(_) => HttpResponse::InternalServerError().json(body),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};
    use std::sync::Arc;

    use crate::api::{AppState, init_routes};
    use crate::blockchain::AdmissionPolicy;
    use crate::oracle::GroverSimulator;
    use crate::oracle::testing::{OfflineOracle, ScriptedOracle, SlowOracle};
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    fn policy(threshold: f64) -> AdmissionPolicy {
        AdmissionPolicy {
            threshold,
            shots: 1024,
            nonce_width: 8,
            max_iterations: Some(5),
            max_duration: None,
        }
    }

    fn simulated_state() -> web::Data<AppState> {
        web::Data::new(AppState::new(
            Arc::new(GroverSimulator::new(Some(11), 0.0)),
            policy(90.0),
        ))
    }

    #[actix_web::test]
    async fn submit_then_list_chain() {
        let state = simulated_state();
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/blocks/")
            .set_json(json!({"sender": "alice", "receiver": "bob", "amount": "10"}))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["block"]["block_number"], 2);
        assert!(resp["report"]["final_accuracy"].as_f64().unwrap() >= 90.0);

        let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
        let chain: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(chain["length"], 2);
        assert_eq!(
            chain["chain"][1]["previous_hash"],
            chain["chain"][0]["block_hash"]
        );

        let req = test::TestRequest::get().uri("/api/v1/validate/").to_request();
        let valid: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(valid["valid"], true);

        let req = test::TestRequest::get()
            .uri("/api/v1/chain/table/")
            .to_request();
        let table = test::call_and_read_body(&app, req).await;
        let table = String::from_utf8(table.to_vec()).unwrap();
        assert!(table.starts_with("Block Number"));
        assert!(table.contains("alice"));
    }

    #[actix_web::test]
    async fn blank_fields_are_rejected() {
        let state = simulated_state();
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/blocks/")
            .set_json(json!({"sender": "  ", "receiver": "bob", "amount": "10"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.blockchain.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn oracle_outage_maps_to_503() {
        let state = web::Data::new(AppState::new(Arc::new(OfflineOracle), policy(50.0)));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/blocks/")
            .set_json(json!({"sender": "a", "receiver": "b", "amount": "1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.blockchain.lock().unwrap().len(), 1);
        let stats = state.stats.lock().unwrap();
        assert_eq!(stats.failed, 1);
        // the single failed query still counts
        assert_eq!(stats.total_iterations, 1);
    }

    #[actix_web::test]
    async fn unreachable_threshold_maps_to_504() {
        let state = web::Data::new(AppState::new(
            Arc::new(GroverSimulator::new(Some(5), 0.0)),
            policy(100.01),
        ));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/blocks/")
            .set_json(json!({"sender": "a", "receiver": "b", "amount": "1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(state.stats.lock().unwrap().total_iterations, 5);
    }

    #[actix_web::test]
    async fn fields_are_stored_as_submitted() {
        let state = simulated_state();
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/blocks/")
            .set_json(json!({"sender": " alice ", "receiver": "bob\t", "amount": " 10"}))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["block"]["sender"], " alice ");
        assert_eq!(resp["block"]["receiver"], "bob\t");
        assert_eq!(resp["block"]["amount"], " 10");

        let bc = state.blockchain.lock().unwrap();
        assert_eq!(bc.last_block().sender, " alice ");
        assert!(bc.is_valid_chain());
    }

    #[actix_web::test]
    async fn chain_stays_readable_during_admission() {
        let oracle = SlowOracle {
            delay: Duration::from_millis(300),
            inner: ScriptedOracle::new(&[0, 1024]),
        };
        let state = web::Data::new(AppState::new(Arc::new(oracle), policy(90.0)));
        let app = Rc::new(
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await,
        );

        let post_app = Rc::clone(&app);
        let post = actix_web::rt::spawn(async move {
            let req = test::TestRequest::post()
                .uri("/api/v1/blocks/")
                .set_json(json!({"sender": "a", "receiver": "b", "amount": "1"}))
                .to_request();
            test::call_service(&*post_app, req).await.status()
        });
        actix_web::rt::time::sleep(Duration::from_millis(100)).await;

        let started = Instant::now();
        let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
        let chain: Value = test::call_and_read_body_json(&*app, req).await;
        assert!(started.elapsed() < Duration::from_millis(250));
        assert_eq!(chain["length"], 1);

        assert_eq!(post.await.unwrap(), StatusCode::OK);
        let bc = state.blockchain.lock().unwrap();
        assert_eq!(bc.len(), 2);
        assert!(bc.is_valid_chain());
    }
}
