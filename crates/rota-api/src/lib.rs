//! JSON REST API for Rota.
//!
//! Exposes an axum [`Router`] backed by any [`rota_core::store::RotaStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rota_api::api_router(state))
//! ```

pub mod error;
pub mod ledger;
pub mod runs;

use std::sync::Arc;

use axum::{Router, routing::get};
use rota_core::{config::EngineConfig, store::RotaStore};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:     Arc<S>,
  pub engine:    Arc<EngineConfig>,
  /// Processing-unit name recorded on runs started through the API.
  pub workspace: Arc<str>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      engine:    Arc::clone(&self.engine),
      workspace: Arc::clone(&self.workspace),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: RotaStore + 'static,
{
  Router::new()
    // Runs
    .route("/runs", get(runs::list::<S>).post(runs::create::<S>))
    .route("/runs/{id}", get(runs::get_one::<S>))
    .route("/runs/{id}/audit", get(runs::audit::<S>))
    // Ledger
    .route("/ledger", get(ledger::list::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
