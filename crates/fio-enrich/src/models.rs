//! Response bodies of the prediction services.
//!
//! Only the fields the service consumes are modelled; everything else in the
//! payload is ignored.

use fio_core::enrich::Candidate;
use serde::Deserialize;

/// `{"count": 123, "name": "dmitriy", "age": 42}`
#[derive(Debug, Deserialize)]
pub struct AgeResponse {
  /// `null` for names the service has never seen.
  #[serde(default)]
  pub age: Option<i32>,
}

/// `{"count": 123, "name": "dmitriy", "gender": "male", "probability": 1.0}`
#[derive(Debug, Deserialize)]
pub struct GenderResponse {
  #[serde(default)]
  pub gender: Option<String>,
}

/// `{"count": 123, "name": "dmitriy", "country": [{"country_id": "UA", "probability": 0.4}]}`
#[derive(Debug, Deserialize)]
pub struct EthnicityResponse {
  #[serde(default)]
  pub country: Vec<Candidate>,
}
