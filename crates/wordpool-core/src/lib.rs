//! Core types and trait definitions for the wordpool service.
//!
//! This crate is free of HTTP and database dependencies. The store and the
//! HTTP layers depend on it; it depends on nothing but serialisation,
//! time and hashing crates.

// Native `async fn` in traits; the `Send` bounds are spelled out in `store`.
#![allow(async_fn_in_trait)]

pub mod admission;
pub mod error;
pub mod hash;
pub mod pool;
pub mod store;
pub mod visitor;

pub use error::{Error, Result};
