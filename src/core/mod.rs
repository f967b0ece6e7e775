//! Clue generation stages, in pipeline order.

pub mod config;
pub mod decoy;
pub mod features;
pub mod history;
pub mod leak;
pub mod phrases;
pub mod pipeline;
pub mod recorder;
pub mod render;
pub mod schedule;
pub mod selector;
pub mod store;
pub mod template;
