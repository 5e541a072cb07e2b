//! JSON HTTP API for the FIO person service.
//!
//! Exposes an axum [`Router`] over a [`PersonService`] backed by any
//! [`PersonStore`] and [`EnrichmentProvider`].

pub mod config;
pub mod error;
pub mod persons;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use fio_core::{enrich::EnrichmentProvider, service::PersonService, store::PersonStore};
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::ApiError;

/// Build the API router for `service`.
pub fn router<S, E>(service: PersonService<S, E>) -> Router
where
  S: PersonStore + 'static,
  E: EnrichmentProvider + 'static,
{
  Router::new()
    .route("/AddPerson", post(persons::add::<S, E>))
    .route("/DeletePerson/{id}", delete(persons::delete::<S, E>))
    .route("/EditPerson", put(persons::edit::<S, E>))
    .route("/GetPerson", get(persons::list::<S, E>))
    .layer(TraceLayer::new_for_http())
    .with_state(service)
}

// ─── Integration tests ────────────────────────────────────────────────────────
