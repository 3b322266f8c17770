//! Process mining math utilities.

pub mod math;

pub use math::stable::*;
pub use math::summary::{Summary, SENTINEL};
