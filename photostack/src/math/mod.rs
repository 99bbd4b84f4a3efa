//! Math utilities shared by the stacking engine.

pub mod statistics;

pub use statistics::{mean, median, median_mut, standard_deviation};
