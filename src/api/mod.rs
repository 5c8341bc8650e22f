//! txlens HTTP API Module
//! REST API that explains already-fetched Sui transactions

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use middleware::start_cleanup_task;
pub use routes::{create_router, create_router_with_limit};
pub use types::*;
