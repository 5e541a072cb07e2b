//! [`PersonService`] — the create / edit / delete / list workflows.
//!
//! Each call is independent; the service holds no per-request state and
//! performs no locking of its own. Concurrent edits of the same record are
//! last-writer-wins at the store.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
  enrich::{EnrichError, Enrichment, EnrichmentProvider},
  error::Error,
  ethnicity,
  person::{
    CreatePerson, EditPerson, ListParams, NewPerson, PersonFilter, PersonQuery,
    PersonRecord,
  },
  store::PersonStore,
  Result,
};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

// ─── Service ─────────────────────────────────────────────────────────────────

/// Orchestrates enrichment and persistence of person records.
///
/// Cloning is cheap — both collaborators are reference-counted.
pub struct PersonService<S, E> {
  store:    Arc<S>,
  enricher: Arc<E>,
}

impl<S, E> Clone for PersonService<S, E> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), enricher: Arc::clone(&self.enricher) }
  }
}

impl<S, E> PersonService<S, E>
where
  S: PersonStore,
  E: EnrichmentProvider,
{
  pub fn new(store: Arc<S>, enricher: Arc<E>) -> Self {
    Self { store, enricher }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Create ────────────────────────────────────────────────────────────────

  /// Validate, enrich and persist a new person.
  ///
  /// Nothing is written unless all three lookups succeed.
  pub async fn create(&self, input: CreatePerson) -> Result<PersonRecord> {
    validate_names(&input.name, &input.surname)?;
    debug!(?input, "creating person");

    let enrichment = self.enrich(&input.name).await.inspect_err(|e| {
      warn!(dependency = %e.dependency(), error = %e, "enrichment failed");
    })?;

    let ethnicity = ethnicity::resolve(&enrichment.candidates).to_owned();
    debug!(
      age = enrichment.age,
      gender = %enrichment.gender,
      %ethnicity,
      "enrichment resolved"
    );

    let person = self
      .store
      .create(NewPerson {
        name: input.name,
        surname: input.surname,
        patronymic: input.patronymic,
        age: enrichment.age,
        gender: enrichment.gender,
        ethnicity,
      })
      .await
      .map_err(Error::store)?;

    info!(id = person.id, "created person");
    Ok(person)
  }

  /// Run the three lookups concurrently. The first failure wins; the other
  /// in-flight lookups are dropped and their results discarded.
  async fn enrich(&self, name: &str) -> Result<Enrichment, EnrichError> {
    let (age, gender, candidates) = tokio::try_join!(
      self.enricher.age(name),
      self.enricher.gender(name),
      self.enricher.ethnicity(name),
    )?;
    Ok(Enrichment { age, gender, candidates })
  }

  // ── Edit ──────────────────────────────────────────────────────────────────

  /// Replace the mutable fields of an existing person with caller-supplied
  /// values. Enrichment is not re-run.
  pub async fn edit(&self, input: EditPerson) -> Result<PersonRecord> {
    validate_names(&input.name, &input.surname)?;
    debug!(?input, "editing person");

    let mut person = self
      .store
      .get(input.id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(input.id))?;

    person.name = input.name;
    person.surname = input.surname;
    person.patronymic = input.patronymic;
    person.age = input.age;
    person.gender = input.gender;
    person.ethnicity = input.ethnicity;
    person.updated_at = Utc::now();

    let person = self
      .store
      .update(person)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(input.id))?;

    info!(id = person.id, "updated person");
    Ok(person)
  }

  // ── Delete ────────────────────────────────────────────────────────────────

  /// Delete the person identified by `raw_id` and return it as it was before
  /// deletion.
  pub async fn delete(&self, raw_id: &str) -> Result<PersonRecord> {
    let id = parse_id(raw_id)?;

    let person = self
      .store
      .get(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))?;
    debug!(?person, "found person to delete");

    if !self.store.delete(id).await.map_err(Error::store)? {
      return Err(Error::NotFound(id));
    }

    info!(id, "deleted person");
    Ok(person)
  }

  // ── List ──────────────────────────────────────────────────────────────────

  /// Return one page of persons matching the filters in `params`.
  pub async fn list(&self, params: ListParams) -> Result<Vec<PersonRecord>> {
    let query = build_query(params)?;
    debug!(?query, "listing persons");

    self.store.list(&query).await.map_err(Error::store)
  }
}

// ─── Parsing helpers ─────────────────────────────────────────────────────────

fn validate_names(name: &str, surname: &str) -> Result<()> {
  if name.is_empty() || surname.is_empty() {
    return Err(Error::Validation("name and surname are required".into()));
  }
  Ok(())
}

/// Parse a record id from a path segment. Ids are non-negative integers.
pub fn parse_id(raw: &str) -> Result<i64> {
  raw
    .parse::<u64>()
    .ok()
    .and_then(|id| i64::try_from(id).ok())
    .ok_or_else(|| Error::InvalidArgument(format!("invalid id: {raw:?}")))
}

/// Parse a positive paging parameter, falling back to `default` when absent.
fn parse_positive(name: &str, raw: Option<&str>, default: u64) -> Result<u64> {
  match raw {
    None => Ok(default),
    Some(s) => s
      .parse::<u64>()
      .ok()
      .filter(|&v| v >= 1)
      .ok_or_else(|| Error::InvalidArgument(format!("invalid '{name}' parameter"))),
  }
}

/// Empty query-string values count as absent.
fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.is_empty())
}

/// Turn raw query-string parameters into a store query.
pub fn build_query(params: ListParams) -> Result<PersonQuery> {
  let page = parse_positive("page", non_empty(params.page).as_deref(), DEFAULT_PAGE)?;
  let limit =
    parse_positive("limit", non_empty(params.limit).as_deref(), DEFAULT_LIMIT)?;

  let offset = (page - 1)
    .checked_mul(limit)
    .ok_or_else(|| Error::InvalidArgument("'page' and 'limit' overflow".into()))?;

  let filter = PersonFilter {
    name:      non_empty(params.name),
    surname:   non_empty(params.surname),
    // A non-numeric age is ignored rather than rejected.
    age:       non_empty(params.age).and_then(|a| a.parse().ok()),
    gender:    non_empty(params.gender),
    ethnicity: non_empty(params.ethnicity),
  };

  Ok(PersonQuery { filter, offset, limit })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{
    convert::Infallible,
    sync::{
      Mutex,
      atomic::{AtomicUsize, Ordering},
    },
  };

  use super::*;
  use crate::enrich::{Candidate, Dependency};

  // ── Fakes ─────────────────────────────────────────────────────────────────

  #[derive(Default)]
  struct MemoryStore {
    rows:    Mutex<Vec<PersonRecord>>,
    next_id: Mutex<i64>,
  }

  impl PersonStore for MemoryStore {
    type Error = Infallible;

    async fn create(&self, input: NewPerson) -> Result<PersonRecord, Infallible> {
      let mut next = self.next_id.lock().unwrap();
      *next += 1;
      let now = Utc::now();
      let record = PersonRecord {
        id:         *next,
        name:       input.name,
        surname:    input.surname,
        patronymic: input.patronymic,
        age:        input.age,
        gender:     input.gender,
        ethnicity:  input.ethnicity,
        created_at: now,
        updated_at: now,
      };
      self.rows.lock().unwrap().push(record.clone());
      Ok(record)
    }

    async fn insert_with_id(
      &self,
      record: PersonRecord,
    ) -> Result<PersonRecord, Infallible> {
      self.rows.lock().unwrap().push(record.clone());
      Ok(record)
    }

    async fn get(&self, id: i64) -> Result<Option<PersonRecord>, Infallible> {
      Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn update(
      &self,
      record: PersonRecord,
    ) -> Result<Option<PersonRecord>, Infallible> {
      let mut rows = self.rows.lock().unwrap();
      Ok(rows.iter_mut().find(|r| r.id == record.id).map(|r| {
        *r = record.clone();
        record
      }))
    }

    async fn delete(&self, id: i64) -> Result<bool, Infallible> {
      let mut rows = self.rows.lock().unwrap();
      let before = rows.len();
      rows.retain(|r| r.id != id);
      Ok(rows.len() != before)
    }

    async fn list(&self, query: &PersonQuery) -> Result<Vec<PersonRecord>, Infallible> {
      Ok(
        self
          .rows
          .lock()
          .unwrap()
          .iter()
          .filter(|r| query.filter.matches(r))
          .skip(query.offset as usize)
          .take(query.limit as usize)
          .cloned()
          .collect(),
      )
    }

    async fn count(&self) -> Result<u64, Infallible> {
      Ok(self.rows.lock().unwrap().len() as u64)
    }

    async fn repair_sequence(&self) -> Result<i64, Infallible> {
      Ok(*self.next_id.lock().unwrap() + 1)
    }
  }

  struct FakeEnricher {
    calls:    AtomicUsize,
    fail_age: bool,
  }

  impl FakeEnricher {
    fn ok() -> Self { Self { calls: AtomicUsize::new(0), fail_age: false } }

    fn failing_age() -> Self { Self { calls: AtomicUsize::new(0), fail_age: true } }
  }

  impl EnrichmentProvider for FakeEnricher {
    async fn age(&self, _name: &str) -> Result<i32, EnrichError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.fail_age {
        return Err(EnrichError::Unreachable(
          Dependency::Age,
          "connection refused".into(),
        ));
      }
      Ok(30)
    }

    async fn gender(&self, _name: &str) -> Result<String, EnrichError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok("male".into())
    }

    async fn ethnicity(&self, _name: &str) -> Result<Vec<Candidate>, EnrichError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(vec![Candidate::new("US", 0.7), Candidate::new("GB", 0.9)])
    }
  }

  fn service(enricher: FakeEnricher) -> PersonService<MemoryStore, FakeEnricher> {
    PersonService::new(Arc::new(MemoryStore::default()), Arc::new(enricher))
  }

  fn create_input(name: &str, surname: &str) -> CreatePerson {
    CreatePerson {
      name:       name.into(),
      surname:    surname.into(),
      patronymic: String::new(),
    }
  }

  fn list_params(page: Option<&str>, limit: Option<&str>) -> ListParams {
    ListParams {
      page: page.map(Into::into),
      limit: limit.map(Into::into),
      ..Default::default()
    }
  }

  // ── Create ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_persists_enriched_record() {
    let svc = service(FakeEnricher::ok());

    let person = svc.create(create_input("Dmitriy", "Ushakov")).await.unwrap();
    assert_eq!(person.age, 30);
    assert_eq!(person.gender, "male");
    assert_eq!(person.ethnicity, "GB");

    let stored = svc.store().get(person.id).await.unwrap().unwrap();
    assert_eq!(stored, person);
  }

  #[tokio::test]
  async fn create_rejects_empty_names_without_enriching() {
    let svc = service(FakeEnricher::ok());

    for (name, surname) in [("", "Ushakov"), ("Dmitriy", ""), ("", "")] {
      let err = svc.create(create_input(name, surname)).await.unwrap_err();
      assert!(matches!(err, Error::Validation(_)), "got {err:?}");
    }

    assert_eq!(svc.enricher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(svc.store().count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn create_with_failed_age_lookup_persists_nothing() {
    let svc = service(FakeEnricher::failing_age());

    let err = svc.create(create_input("Dmitriy", "Ushakov")).await.unwrap_err();
    assert!(matches!(
      err,
      Error::Dependency(EnrichError::Unreachable(Dependency::Age, _))
    ));
    assert_eq!(svc.store().count().await.unwrap(), 0);
  }

  // ── Edit ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn edit_overwrites_fields_without_enrichment() {
    let svc = service(FakeEnricher::ok());
    let created = svc.create(create_input("Dmitriy", "Ushakov")).await.unwrap();
    let calls_after_create = svc.enricher.calls.load(Ordering::SeqCst);

    let edited = svc
      .edit(EditPerson {
        id:         created.id,
        name:       "Ivan".into(),
        surname:    "Petrov".into(),
        patronymic: "Sergeevich".into(),
        age:        55,
        gender:     "female".into(),
        ethnicity:  "KZ".into(),
      })
      .await
      .unwrap();

    assert_eq!(edited.id, created.id);
    assert_eq!(edited.name, "Ivan");
    assert_eq!(edited.age, 55);
    assert_eq!(edited.ethnicity, "KZ");
    assert_eq!(edited.created_at, created.created_at);
    assert!(edited.updated_at >= created.updated_at);
    assert_eq!(svc.enricher.calls.load(Ordering::SeqCst), calls_after_create);
  }

  #[tokio::test]
  async fn edit_missing_person_is_not_found() {
    let svc = service(FakeEnricher::ok());
    let err = svc
      .edit(EditPerson {
        id:         42,
        name:       "Ivan".into(),
        surname:    "Petrov".into(),
        patronymic: String::new(),
        age:        1,
        gender:     "male".into(),
        ethnicity:  "RU".into(),
      })
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NotFound(42)));
  }

  // ── Delete ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_returns_record_and_removes_it_from_listing() {
    let svc = service(FakeEnricher::ok());
    let created = svc.create(create_input("Dmitriy", "Ushakov")).await.unwrap();

    let deleted = svc.delete(&created.id.to_string()).await.unwrap();
    assert_eq!(deleted, created);

    let listed = svc.list(ListParams::default()).await.unwrap();
    assert!(listed.iter().all(|p| p.id != created.id));
  }

  #[tokio::test]
  async fn delete_missing_person_is_not_found() {
    let svc = service(FakeEnricher::ok());
    assert!(matches!(svc.delete("7").await.unwrap_err(), Error::NotFound(7)));
  }

  #[tokio::test]
  async fn delete_non_numeric_id_is_invalid() {
    let svc = service(FakeEnricher::ok());
    for raw in ["abc", "-1", "1.5", ""] {
      let err = svc.delete(raw).await.unwrap_err();
      assert!(matches!(err, Error::InvalidArgument(_)), "{raw:?} gave {err:?}");
    }
  }

  // ── List ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_pages_through_filtered_results() {
    let svc = service(FakeEnricher::ok());
    for i in 0..12 {
      svc
        .create(create_input("Dmitriy", &format!("Surname{i}")))
        .await
        .unwrap();
    }

    let page = svc.list(list_params(Some("2"), Some("5"))).await.unwrap();
    let ids: Vec<i64> = page.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![6, 7, 8, 9, 10]);
  }

  #[tokio::test]
  async fn list_round_trips_a_created_record() {
    let svc = service(FakeEnricher::ok());
    svc.create(create_input("Ivan", "Petrov")).await.unwrap();
    let created = svc.create(create_input("Dmitriy", "Ushakov")).await.unwrap();

    let listed = svc
      .list(ListParams {
        name: Some("Dmitriy".into()),
        surname: Some("Ushakov".into()),
        ..Default::default()
      })
      .await
      .unwrap();
    assert_eq!(listed, vec![created]);
  }

  #[test]
  fn build_query_applies_defaults() {
    let q = build_query(ListParams::default()).unwrap();
    assert_eq!(q.offset, 0);
    assert_eq!(q.limit, DEFAULT_LIMIT);
    assert_eq!(q.filter, PersonFilter::default());
  }

  #[test]
  fn build_query_rejects_zero_or_garbage_paging() {
    for (page, limit) in [
      (Some("0"), None),
      (None, Some("0")),
      (Some("x"), None),
      (None, Some("-3")),
    ] {
      let err = build_query(list_params(page, limit)).unwrap_err();
      assert!(matches!(err, Error::InvalidArgument(_)));
    }
  }

  #[test]
  fn build_query_ignores_non_numeric_age() {
    let q = build_query(ListParams {
      age: Some("old".into()),
      gender: Some("male".into()),
      ..Default::default()
    })
    .unwrap();
    assert_eq!(q.filter.age, None);
    assert_eq!(q.filter.gender.as_deref(), Some("male"));
  }

  #[test]
  fn build_query_keeps_age_beyond_i32() {
    let q = build_query(ListParams {
      age: Some("99999999999".into()),
      ..Default::default()
    })
    .unwrap();
    assert_eq!(q.filter.age, Some(99_999_999_999));
  }

  #[test]
  fn build_query_computes_offset() {
    let q = build_query(list_params(Some("3"), Some("4"))).unwrap();
    assert_eq!(q.offset, 8);
    assert_eq!(q.limit, 4);
  }
}
