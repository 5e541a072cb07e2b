//! The `PersonStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `fio-store-sqlite`).
//! The workflow service and the HTTP layer depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use crate::person::{NewPerson, PersonQuery, PersonRecord};

/// Abstraction over a table of person records.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new person. The store assigns `id`, `created_at` and
  /// `updated_at`.
  fn create(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<PersonRecord, Self::Error>> + Send + '_;

  /// Persist a fully-formed record, keeping its `id` and timestamps.
  ///
  /// Used for seed loading. Depending on the backend the id counter may lag
  /// behind the inserted id; call [`PersonStore::repair_sequence`] afterwards.
  fn insert_with_id(
    &self,
    record: PersonRecord,
  ) -> impl Future<Output = Result<PersonRecord, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<PersonRecord>, Self::Error>> + Send + '_;

  /// Overwrite every mutable column of an existing record, including
  /// `updated_at`, with the values in `record`. Returns `None` if no row with
  /// that id exists.
  fn update(
    &self,
    record: PersonRecord,
  ) -> impl Future<Output = Result<Option<PersonRecord>, Self::Error>> + Send + '_;

  /// Remove a person. Returns `false` if no row with that id existed.
  fn delete(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// List persons matching `query.filter`, ordered by id, skipping
  /// `query.offset` rows and returning at most `query.limit`.
  fn list<'a>(
    &'a self,
    query: &'a PersonQuery,
  ) -> impl Future<Output = Result<Vec<PersonRecord>, Self::Error>> + Send + 'a;

  /// Total number of stored persons.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Move the id generator past the current maximum id and return the next
  /// id it will hand out.
  fn repair_sequence(
    &self,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;
}
