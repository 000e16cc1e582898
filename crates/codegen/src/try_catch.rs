//! Per-transition try/catch fallback.
//!
//! Used when a group's external calls cannot be merged into one tree:
//! each transition gets its own independent nested block, wrapped from
//! the last call to the first. A failure-expecting call carries the
//! continuation in its catch arm.

use crate::body::transition_body;
use crate::context::GenContext;
use crate::error::CodegenError;
use crate::expr::lower;
use edam_model::Transition;

/// Build the nested try/catch source for one transition. Without
/// external calls this is just the transition body.
pub fn build(
    transition: &Transition,
    contract: &str,
    indent_level: usize,
    ctx: &mut GenContext,
) -> Result<String, CodegenError> {
    let depth = transition.external_calls.len();
    if depth == 0 {
        return transition_body(transition, contract, indent_level, ctx);
    }

    let mut current = transition_body(transition, contract, indent_level + depth, ctx)?;

    for (position, call) in transition.external_calls.iter().enumerate().rev() {
        let (inner, expected) = call.as_external_call().ok_or_else(|| {
            CodegenError::unsupported(&format!(
                "external call in transition '{}' is not an equality against a boolean literal",
                transition.operation
            ))
        })?;
        let lowered = lower(inner, &transition.initiator, contract, ctx)?;
        let call_text = lowered
            .calls
            .first()
            .ok_or_else(|| CodegenError::unsupported("external call lowered to no call text"))?
            .clone();

        let indent = "\t".repeat(indent_level + position);
        let inner_indent = "\t".repeat(indent_level + position + 1);
        current = if expected {
            format!(
                "{call}{{\n{ii}{body}\n{i}}} catch {{\n{ii}revert(\"Expected external call to succeed\");\n{i}}}",
                call = call_text,
                body = current,
                i = indent,
                ii = inner_indent,
            )
        } else {
            format!(
                "{call}{{\n{ii}revert(\"Expected external call to fail\");\n{i}}} catch {{\n{ii}{body}\n{i}}}",
                call = call_text,
                body = current,
                i = indent,
                ii = inner_indent,
            )
        };
    }
    Ok(current)
}
