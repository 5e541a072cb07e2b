//! Person records and the request/query shapes that produce them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Record ──────────────────────────────────────────────────────────────────

/// A persisted person, enriched with inferred age, gender and ethnicity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
  /// Store-assigned; never changes after creation.
  pub id:         i64,
  pub name:       String,
  pub surname:    String,
  #[serde(default)]
  pub patronymic: String,
  pub age:        i32,
  pub gender:     String,
  /// A country code from the ethnicity lookup, or `"unknown"`.
  pub ethnicity:  String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::PersonStore::create`].
/// `id`, `created_at` and `updated_at` are always assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
  pub name:       String,
  pub surname:    String,
  pub patronymic: String,
  pub age:        i32,
  pub gender:     String,
  pub ethnicity:  String,
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// Body of a create request. Everything else is derived by enrichment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePerson {
  #[serde(default)]
  pub name:       String,
  #[serde(default)]
  pub surname:    String,
  #[serde(default)]
  pub patronymic: String,
}

/// Body of an edit request: a full replacement of the mutable fields.
///
/// Timestamps sent by the caller are ignored; `updated_at` is set by the
/// service and `created_at` never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditPerson {
  pub id:         i64,
  pub name:       String,
  pub surname:    String,
  #[serde(default)]
  pub patronymic: String,
  pub age:        i32,
  pub gender:     String,
  pub ethnicity:  String,
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Optional predicates for listing persons. All set fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFilter {
  /// Case-insensitive substring match.
  pub name:      Option<String>,
  /// Case-insensitive substring match.
  pub surname:   Option<String>,
  /// Wider than a stored age so an out-of-range value matches nothing.
  pub age:       Option<i64>,
  pub gender:    Option<String>,
  pub ethnicity: Option<String>,
}

impl PersonFilter {
  /// Whether `record` satisfies every set predicate.
  ///
  /// Backends that cannot push the filter down to the database use this
  /// directly; the SQLite backend mirrors it in SQL.
  pub fn matches(&self, record: &PersonRecord) -> bool {
    fn contains_ci(haystack: &str, needle: &str) -> bool {
      haystack.to_lowercase().contains(&needle.to_lowercase())
    }

    self.name.as_deref().is_none_or(|n| contains_ci(&record.name, n))
      && self
        .surname
        .as_deref()
        .is_none_or(|s| contains_ci(&record.surname, s))
      && self.age.is_none_or(|a| i64::from(record.age) == a)
      && self.gender.as_deref().is_none_or(|g| record.gender == g)
      && self
        .ethnicity
        .as_deref()
        .is_none_or(|e| record.ethnicity == e)
  }
}

/// Parameters for [`crate::store::PersonStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonQuery {
  pub filter: PersonFilter,
  pub offset: u64,
  pub limit:  u64,
}

/// Raw listing parameters as they arrive on the query string.
///
/// Kept as strings so the service can decide which malformed values are
/// errors (`page`, `limit`) and which are silently ignored (`age`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
  pub page:      Option<String>,
  pub limit:     Option<String>,
  pub name:      Option<String>,
  pub surname:   Option<String>,
  pub age:       Option<String>,
  pub gender:    Option<String>,
  pub ethnicity: Option<String>,
}

impl ListParams {
  /// Collect decoded query-string pairs. The first value of a repeated key
  /// wins; unknown keys are ignored.
  pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
    let mut params = Self::default();
    for (key, value) in pairs {
      let slot = match key.as_str() {
        "page" => &mut params.page,
        "limit" => &mut params.limit,
        "name" => &mut params.name,
        "surname" => &mut params.surname,
        "age" => &mut params.age,
        "gender" => &mut params.gender,
        "ethnicity" => &mut params.ethnicity,
        _ => continue,
      };
      if slot.is_none() {
        *slot = Some(value);
      }
    }
    params
  }
}
