//! The `EnrichmentProvider` trait and the values it produces.
//!
//! Enrichment derives age, gender and ethnicity candidates from a first name.
//! Implemented by `fio-enrich` over HTTP; tests substitute in-memory fakes.

use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Values ──────────────────────────────────────────────────────────────────

/// One `(country, probability)` pair from the ethnicity lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
  pub country_id:  String,
  pub probability: f64,
}

impl Candidate {
  pub fn new(country_id: impl Into<String>, probability: f64) -> Self {
    Self { country_id: country_id.into(), probability }
  }
}

/// The combined answer of all three lookups for one name. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
  pub age:        i32,
  pub gender:     String,
  /// In the order the ethnicity service returned them.
  pub candidates: Vec<Candidate>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Which external lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
  Age,
  Gender,
  Ethnicity,
}

impl fmt::Display for Dependency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Age => "age",
      Self::Gender => "gender",
      Self::Ethnicity => "ethnicity",
    })
  }
}

/// A failed lookup, tagged with the dependency that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichError {
  /// The service could not be reached or answered with a non-success status.
  #[error("{0} service unavailable: {1}")]
  Unreachable(Dependency, String),

  /// The service answered, but the body was not the expected JSON shape.
  #[error("invalid {0} data: {1}")]
  Malformed(Dependency, String),
}

impl EnrichError {
  pub fn dependency(&self) -> Dependency {
    match self {
      Self::Unreachable(d, _) | Self::Malformed(d, _) => *d,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Source of name-based predictions.
///
/// The three lookups are independent reads; callers may issue them in any
/// order or concurrently.
pub trait EnrichmentProvider: Send + Sync {
  /// Predicted age for `name`.
  fn age<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<i32, EnrichError>> + Send + 'a;

  /// Predicted gender for `name`.
  fn gender<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<String, EnrichError>> + Send + 'a;

  /// Candidate countries of origin for `name`, as ordered by the service.
  fn ethnicity<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Vec<Candidate>, EnrichError>> + Send + 'a;
}
