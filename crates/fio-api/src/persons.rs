//! Handlers for the person endpoints.
//!
//! | Method   | Path                 | Notes |
//! |----------|----------------------|-------|
//! | `POST`   | `/AddPerson`         | Body: [`CreatePerson`]; returns 201 + enriched record |
//! | `DELETE` | `/DeletePerson/{id}` | Returns 202 + the deleted record |
//! | `PUT`    | `/EditPerson`        | Body: [`EditPerson`]; returns 200 + updated record |
//! | `GET`    | `/GetPerson`         | `?page&limit&name&surname&age&gender&ethnicity` |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use fio_core::{
  enrich::EnrichmentProvider,
  person::{CreatePerson, EditPerson, ListParams, PersonRecord},
  service::PersonService,
  store::PersonStore,
};
use tracing::info;

use crate::error::ApiError;

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /AddPerson` — body: `{"name": "...", "surname": "...", "patronymic": "..."}`
pub async fn add<S, E>(
  State(service): State<PersonService<S, E>>,
  body: Result<Json<CreatePerson>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore + 'static,
  E: EnrichmentProvider + 'static,
{
  info!("AddPerson");
  let Json(input) = body?;
  let person = service.create(input).await?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /DeletePerson/{id}`
pub async fn delete<S, E>(
  State(service): State<PersonService<S, E>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore + 'static,
  E: EnrichmentProvider + 'static,
{
  info!(id = %id, "DeletePerson");
  let person = service.delete(&id).await?;
  Ok((StatusCode::ACCEPTED, Json(person)))
}

// ─── Edit ─────────────────────────────────────────────────────────────────────

/// `PUT /EditPerson` — body: the full record, including `id`.
pub async fn edit<S, E>(
  State(service): State<PersonService<S, E>>,
  body: Result<Json<EditPerson>, JsonRejection>,
) -> Result<Json<PersonRecord>, ApiError>
where
  S: PersonStore + 'static,
  E: EnrichmentProvider + 'static,
{
  info!("EditPerson");
  let Json(input) = body?;
  Ok(Json(service.edit(input).await?))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /GetPerson[?page=..][&limit=..][&name=..][&surname=..][&age=..][&gender=..][&ethnicity=..]`
pub async fn list<S, E>(
  State(service): State<PersonService<S, E>>,
  pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<PersonRecord>>, ApiError>
where
  S: PersonStore + 'static,
  E: EnrichmentProvider + 'static,
{
  info!("GetPerson");
  let Query(pairs) = pairs?;
  Ok(Json(service.list(ListParams::from_pairs(pairs)).await?))
}
