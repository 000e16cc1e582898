//! EDAM-to-Solidity contract generation.
//!
//! The pipeline lowers a model's expressions and role constraints
//! (analysis), synthesizes the constructor and per-operation function
//! bodies (call-tree merge with a per-transition try/catch fallback),
//! and assembles the final contract source. All accumulated state for
//! one run lives in a [`GenContext`]; a context is never shared across
//! compilations.

pub mod assemble;
pub mod body;
pub mod call_tree;
pub mod constructor;
pub mod context;
pub mod dedup;
pub mod error;
pub mod expr;
pub mod grouping;
pub mod process;
pub mod roles;
pub mod snippets;
pub mod try_catch;
pub mod types;

pub use context::{Builtin, GenContext};
pub use error::CodegenError;
pub use expr::{lower, Lowered};
pub use grouping::{can_group, GroupKey};
pub use process::OperationCode;
pub use types::{map_type, ExternalType};

use edam_model::Edam;

/// Compile one model to complete Solidity contract source.
///
/// Builds the constructor from the deploy transitions, the functions
/// from the grouped regular transitions, and assembles the contract
/// with exactly the helper snippets the lowered code uses. Errors
/// carry the offending model's name.
pub fn generate_contract(edam: &Edam) -> Result<String, CodegenError> {
    let mut ctx = GenContext::new();

    let constructor = constructor::build(edam, &mut ctx).map_err(|e| e.in_model(&edam.name))?;
    let (operation_map, has_external_calls) =
        process::process_regular_transitions(edam, &mut ctx)
            .map_err(|e| e.in_model(&edam.name))?;

    // Declared once, after every transition has been processed.
    ctx.ensure_permissions_field();

    Ok(assemble::assemble_contract(
        edam,
        &constructor,
        &operation_map,
        has_external_calls,
        &ctx,
    ))
}
