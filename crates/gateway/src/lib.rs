//! AutoGuard Gateway
//!
//! The HTTP surface: one catch-all visit route that resolves the offer,
//! obtains a cloak decision and dispatches the page internally, plus a
//! health endpoint and the admin hooks the dashboard calls into the core.
pub mod dto;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
