//! Core types and trait definitions for the FIO person service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend (`fio-store-sqlite`) and the enrichment transport
//! (`fio-enrich`) plug in through the traits defined here.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod enrich;
pub mod error;
pub mod ethnicity;
pub mod person;
pub mod service;
pub mod store;

pub use error::{Error, Result};
