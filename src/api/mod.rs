mod chain;
mod health;
pub mod models;
mod shutdown;
mod stats;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::get_chain_table)
            .service(chain::validate_chain)
            .service(chain::submit_block)
            .service(stats::get_stats)
            .service(shutdown::shutdown),
    );
}
