//! HTTP enrichment client.
//!
//! Implements [`fio_core::enrich::EnrichmentProvider`] against three external
//! prediction services (agify/genderize/nationalize-style APIs), each queried
//! with `GET <base>?name=<name>`.

mod client;
mod models;

pub use client::{EnrichConfig, HttpEnricher};
