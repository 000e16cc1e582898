//! edam-model: EDAM access-control model types.
//!
//! An EDAM is a declarative finite-state model whose transitions are
//! gated by guards, role constraints, and the expected outcomes of
//! external contract calls. This crate owns the immutable model types
//! consumed by the compiler (edam-codegen) and the role-safety
//! verifier (edam-verify), plus the JSON deserialization of models
//! supplied by an upstream builder.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`Edam`] -- the model: states, transitions, roles, participants
//! - [`Transition`] -- one guarded state-to-state step
//! - [`Exp`] -- the expression AST used in guards, assignments, and
//!   external-call lists
//! - [`RoleMode`] -- Granted / Revoked / Unconstrained
//! - [`ModelError`] -- model-level validation and input errors

pub mod edam;
pub mod error;
pub mod exp;
pub mod transition;

pub use edam::{Adjacency, Edam};
pub use error::ModelError;
pub use exp::{Exp, Literal};
pub use transition::{Assignment, Param, RoleMap, RoleMode, Transition};
