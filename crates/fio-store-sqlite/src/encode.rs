//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings.

use chrono::{DateTime, Utc};
use fio_core::person::PersonRecord;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawPerson::from_row`].
pub const PERSON_COLUMNS: &str =
  "id, name, surname, patronymic, age, gender, ethnicity, created_at, updated_at";

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub id:         i64,
  pub name:       String,
  pub surname:    String,
  pub patronymic: String,
  pub age:        i32,
  pub gender:     String,
  pub ethnicity:  String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawPerson {
  /// Read a row selected with [`PERSON_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      surname:    row.get(2)?,
      patronymic: row.get(3)?,
      age:        row.get(4)?,
      gender:     row.get(5)?,
      ethnicity:  row.get(6)?,
      created_at: row.get(7)?,
      updated_at: row.get(8)?,
    })
  }

  pub fn into_person(self) -> Result<PersonRecord> {
    Ok(PersonRecord {
      id:         self.id,
      name:       self.name,
      surname:    self.surname,
      patronymic: self.patronymic,
      age:        self.age,
      gender:     self.gender,
      ethnicity:  self.ethnicity,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_survive_encoding() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }

  #[test]
  fn garbage_timestamp_is_a_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
