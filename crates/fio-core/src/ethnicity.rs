//! Picks a single ethnicity out of the lookup's candidate list.

use crate::enrich::Candidate;

/// Value used when the lookup returned no candidates.
pub const UNKNOWN: &str = "unknown";

/// Return the `country_id` with the strictly greatest probability.
///
/// Ties keep the earlier candidate. Probabilities are taken as given; no range
/// check is applied.
pub fn resolve(candidates: &[Candidate]) -> &str {
  let mut best: Option<&Candidate> = None;
  for c in candidates {
    if best.is_none_or(|b| c.probability > b.probability) {
      best = Some(c);
    }
  }
  best.map_or(UNKNOWN, |c| c.country_id.as_str())
}
