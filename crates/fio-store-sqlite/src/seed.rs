//! Loading of initial person records with explicit ids.

use std::path::Path;

use chrono::Utc;
use fio_core::{person::PersonRecord, store::PersonStore};
use serde::Deserialize;
use tracing::info;

use crate::{Result, SqliteStore};

/// One entry of a seed file. Timestamps are assigned at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedPerson {
  pub id:         i64,
  pub name:       String,
  pub surname:    String,
  #[serde(default)]
  pub patronymic: String,
  pub age:        i32,
  pub gender:     String,
  pub ethnicity:  String,
}

impl SqliteStore {
  /// Insert `seed` if the table is empty.
  ///
  /// Callers should run [`PersonStore::repair_sequence`] afterwards.
  ///
  /// Returns the number of inserted rows; `0` when data already existed.
  pub async fn seed(&self, seed: Vec<SeedPerson>) -> Result<usize> {
    if self.count().await? > 0 {
      info!("seed data already present, skipping");
      return Ok(0);
    }

    let now = Utc::now();
    let inserted = seed.len();
    for p in seed {
      self
        .insert_with_id(PersonRecord {
          id:         p.id,
          name:       p.name,
          surname:    p.surname,
          patronymic: p.patronymic,
          age:        p.age,
          gender:     p.gender,
          ethnicity:  p.ethnicity,
          created_at: now,
          updated_at: now,
        })
        .await?;
    }
    info!(count = inserted, "seed data inserted");
    Ok(inserted)
  }

  /// Read a JSON array of [`SeedPerson`] from `path` and pass it to
  /// [`SqliteStore::seed`].
  pub async fn seed_from_file(&self, path: impl AsRef<Path>) -> Result<usize> {
    let text = tokio::fs::read_to_string(path).await?;
    let seed: Vec<SeedPerson> = serde_json::from_str(&text)?;
    self.seed(seed).await
  }
}
