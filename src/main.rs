mod api;
mod blockchain;
mod config;
mod error;
mod oracle;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;
use std::io;
use std::sync::Arc;

use api::AppState;
use config::Config;
use oracle::GroverSimulator;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let cfg = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    println!(
        "⛓️ Starting oracle-gated ledger at http://{}:{} ({:?} backend, threshold {}%)",
        cfg.host, cfg.port, cfg.backend, cfg.policy.threshold
    );

    let oracle = Arc::new(GroverSimulator::new(cfg.oracle_seed, cfg.oracle_noise));
    info!(
        "shots={} nonce_width={} max_iterations={:?} max_duration={:?} noise={}",
        cfg.policy.shots,
        cfg.policy.nonce_width,
        cfg.policy.max_iterations,
        cfg.policy.max_duration,
        oracle.noise()
    );
    let state = web::Data::new(AppState::new(oracle, cfg.policy.clone()));

    let app_state = state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(api::init_routes)
    })
    .bind((cfg.host.as_str(), cfg.port))?
    .run();

    *state.server.lock().expect("mutex poisoned") = Some(server.handle());
    server.await
}
