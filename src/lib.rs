//! Clue Engine: procedural hint generation for long-running search games.
//!
//! Composes authored templates with categorical traits derived from a
//! mission's hidden location and prize, under a day-driven clarity
//! schedule, reproducible decoy injection, per-player anti-repetition and a
//! leak-risk filter that swaps risky output for a neutral fallback.

pub mod core;
pub mod schema;
