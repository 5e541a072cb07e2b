//! [`SqliteStore`] — the SQLite implementation of [`PersonStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{
  OptionalExtension as _,
  functions::FunctionFlags,
  types::Value,
};
use tracing::{info, warn};

use fio_core::{
  person::{NewPerson, PersonFilter, PersonQuery, PersonRecord},
  store::PersonStore,
};

use crate::{
  Result,
  encode::{PERSON_COLUMNS, RawPerson, encode_dt},
  schema::{CASEFOLD_FN, PRAGMAS, SCHEMA, TABLE},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A person store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  async fn init(&self) -> Result<()> {
    let existed = self
      .conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        conn.create_scalar_function(
          CASEFOLD_FN,
          1,
          FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
          |ctx| Ok(ctx.get::<String>(0)?.to_lowercase()),
        )?;

        let existed: bool = conn
          .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            rusqlite::params![TABLE],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !existed {
          conn.execute_batch(SCHEMA)?;
        }
        Ok(existed)
      })
      .await?;

    if existed {
      info!(table = TABLE, "table already exists, skipping migration");
    } else {
      info!(table = TABLE, "database migrated");
    }
    Ok(())
  }

  /// Run [`PersonStore::repair_sequence`], downgrading failure to a warning.
  ///
  /// Startup should not abort because the counter could not be adjusted.
  pub async fn repair_sequence_or_warn(&self) {
    match self.repair_sequence().await {
      Ok(next) => info!(next_id = next, "id sequence repaired"),
      Err(e) => warn!(error = %e, "failed to repair id sequence"),
    }
  }
}

// ─── Filter → SQL ────────────────────────────────────────────────────────────

/// Translate a filter into a `WHERE` clause and its positional parameters.
///
/// Mirrors [`PersonFilter::matches`]: substring filters compare casefolded
/// values with `instr`, so `%` and `_` in user input have no special meaning.
fn where_clause(filter: &PersonFilter) -> (String, Vec<Value>) {
  let mut conds:  Vec<String> = Vec::new();
  let mut params: Vec<Value>  = Vec::new();

  let mut push = |cond: &str, value: Value| {
    params.push(value);
    conds.push(cond.replace('?', &format!("?{}", params.len())));
  };

  if let Some(name) = &filter.name {
    push(
      &format!("instr({CASEFOLD_FN}(name), ?) > 0"),
      Value::Text(name.to_lowercase()),
    );
  }
  if let Some(surname) = &filter.surname {
    push(
      &format!("instr({CASEFOLD_FN}(surname), ?) > 0"),
      Value::Text(surname.to_lowercase()),
    );
  }
  if let Some(age) = filter.age {
    push("age = ?", Value::Integer(age));
  }
  if let Some(gender) = &filter.gender {
    push("gender = ?", Value::Text(gender.clone()));
  }
  if let Some(ethnicity) = &filter.ethnicity {
    push("ethnicity = ?", Value::Text(ethnicity.clone()));
  }

  let clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  (clause, params)
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = crate::Error;

  async fn create(&self, input: NewPerson) -> Result<PersonRecord> {
    let now     = Utc::now();
    let now_str = encode_dt(now);

    let NewPerson { name, surname, patronymic, age, gender, ethnicity } = input;
    let (n, s, p, g, e) = (
      name.clone(),
      surname.clone(),
      patronymic.clone(),
      gender.clone(),
      ethnicity.clone(),
    );

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (
             name, surname, patronymic, age, gender, ethnicity,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![n, s, p, age, g, e, now_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(PersonRecord {
      id,
      name,
      surname,
      patronymic,
      age,
      gender,
      ethnicity,
      created_at: now,
      updated_at: now,
    })
  }

  async fn insert_with_id(&self, record: PersonRecord) -> Result<PersonRecord> {
    let row = record.clone();
    let created_str = encode_dt(row.created_at);
    let updated_str = encode_dt(row.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (
             id, name, surname, patronymic, age, gender, ethnicity,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            row.id,
            row.name,
            row.surname,
            row.patronymic,
            row.age,
            row.gender,
            row.ethnicity,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn get(&self, id: i64) -> Result<Option<PersonRecord>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
              rusqlite::params![id],
              RawPerson::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn update(&self, record: PersonRecord) -> Result<Option<PersonRecord>> {
    let row = record.clone();
    let updated_str = encode_dt(row.updated_at);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE persons
           SET name = ?2, surname = ?3, patronymic = ?4, age = ?5,
               gender = ?6, ethnicity = ?7, updated_at = ?8
           WHERE id = ?1",
          rusqlite::params![
            row.id,
            row.name,
            row.surname,
            row.patronymic,
            row.age,
            row.gender,
            row.ethnicity,
            updated_str,
          ],
        )?)
      })
      .await?;

    Ok((changed > 0).then_some(record))
  }

  async fn delete(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM persons WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn list(&self, query: &PersonQuery) -> Result<Vec<PersonRecord>> {
    let (clause, mut params) = where_clause(&query.filter);
    let limit_idx  = params.len() + 1;
    let offset_idx = params.len() + 2;
    params.push(Value::Integer(i64::try_from(query.limit).unwrap_or(i64::MAX)));
    params.push(Value::Integer(i64::try_from(query.offset).unwrap_or(i64::MAX)));

    let sql = format!(
      "SELECT {PERSON_COLUMNS}
       FROM persons
       {clause}
       ORDER BY id
       LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
    );

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM persons", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count.max(0) as u64)
  }

  async fn repair_sequence(&self) -> Result<i64> {
    let next = self
      .conn
      .call(|conn| {
        let max_id: i64 = conn.query_row(
          "SELECT COALESCE(MAX(id), 0) FROM persons",
          [],
          |r| r.get(0),
        )?;

        let updated = conn.execute(
          "UPDATE sqlite_sequence SET seq = MAX(seq, ?2) WHERE name = ?1",
          rusqlite::params![TABLE, max_id],
        )?;
        if updated == 0 {
          conn.execute(
            "INSERT INTO sqlite_sequence (name, seq) VALUES (?1, ?2)",
            rusqlite::params![TABLE, max_id],
          )?;
        }

        let seq: i64 = conn.query_row(
          "SELECT seq FROM sqlite_sequence WHERE name = ?1",
          rusqlite::params![TABLE],
          |r| r.get(0),
        )?;
        Ok(seq + 1)
      })
      .await?;
    Ok(next)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_filter_has_no_where_clause() {
    let (clause, params) = where_clause(&PersonFilter::default());
    assert!(clause.is_empty());
    assert!(params.is_empty());
  }

  #[test]
  fn placeholders_are_numbered_in_order() {
    let (clause, params) = where_clause(&PersonFilter {
      name: Some("Dmi".into()),
      age: Some(40),
      ethnicity: Some("RU".into()),
      ..Default::default()
    });
    assert_eq!(
      clause,
      "WHERE instr(casefold(name), ?1) > 0 AND age = ?2 AND ethnicity = ?3"
    );
    assert_eq!(params.len(), 3);
  }
}
