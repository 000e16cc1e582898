//! Path-exhaustive role-safety verification for EDAM models.
//!
//! Enumerates every simple path from the initial state and checks each
//! transition's role preconditions and updates along it. Exponential in
//! branching factor: a correctness tool for small-to-moderate models,
//! bounded by a configurable explored-path ceiling.

pub mod paths;
pub mod report;
pub mod role_safety;

pub use paths::{enumerate_paths, PathSet, VerifyOptions, MAX_PATHS};
pub use report::{Issue, VerifyReport};
pub use role_safety::check;
