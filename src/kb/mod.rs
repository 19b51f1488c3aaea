//! Knowledge-base search engine.
//!
//! An in-memory, concurrent, character-n-gram inverted index with
//! TF·IDF-weighted scoring and a substring fallback:
//!
//! - **Dual index**: separate postings tables for titles and bodies, with a
//!   per-document gram cache enabling O(G) update and delete
//! - **Scoring**: smoothed IDF over the query's unique grams, occurrence
//!   counts as term frequency, title hits weighted double
//! - **Fallback**: full-store substring scan when the query is shorter than
//!   the n-gram size after normalisation
//! - **Concurrency**: one readers-writer lock over the whole index; any
//!   number of concurrent searches, one mutator at a time
//!
//! # Example
//!
//! ```no_run
//! use assist_fusion_kb::kb::{Doc, KbRepository, MemoryRepo};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = MemoryRepo::new();
//!     repo.add(Doc::new("1", "客服入门", "什么是客服，如何开始")).await?;
//!
//!     let (items, total) = repo.search("客服", 10).await?;
//!     println!("{} hits ({} returned)", total, items.len());
//!
//!     Ok(())
//! }
//! ```

mod config;
mod document;
mod error;
mod index;
mod ngram;
mod repo;
mod score;

pub use config::{KbBackend, KbConfig, KbConfigBuilder};
pub use document::{snippet, Doc, SearchItem};
pub use error::{KbError, KbResult};
pub use repo::{create_repository, KbInfo, KbRepository, MemoryRepo};
