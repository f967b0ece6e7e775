//! Data types shared by the engine and its collaborators.

pub mod clue;
pub mod features;
pub mod mission;
pub mod record;
