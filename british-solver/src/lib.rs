//! British Square solver: memoized search, checkpoints, the analysis table
//! and interactive play.

pub mod checkpoint;
pub mod play;
pub mod render;
pub mod solver;
pub mod stats;
