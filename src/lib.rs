// src/lib.rs

//! Stella Sora News Cache Library
//!
//! Keeps per-region, per-category snapshots of the upstream news feed with
//! hero thumbnails resolved from article bodies, and answers paged queries
//! from those snapshots.

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod testing;

pub use app::NewsApp;
