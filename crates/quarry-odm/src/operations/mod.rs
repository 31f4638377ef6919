//! Persistence operations: one-shot values built around a single document.

mod insert;

pub use insert::{Insert, InsertOptions};
