//! Transition grouping: which transitions may share one emitted
//! conditional branch.
//!
//! Two transitions can share a branch iff they have the same source
//! state, the same operation, guards that serialize to identical text,
//! structurally equivalent role maps (participant names ignored), and
//! compatible external calls: either neither has any, or at least one
//! call on each side shares a (contract, operation) signature.

use crate::context::GenContext;
use crate::error::CodegenError;
use crate::expr::lower;
use edam_model::{RoleMode, Transition};

/// Serialize a guard to comparison text, ignoring external-call side
/// effects.
pub fn serialize_guard(
    transition: &Transition,
    contract: &str,
    ctx: &mut GenContext,
) -> Result<String, CodegenError> {
    Ok(lower(&transition.guard, &transition.initiator, contract, ctx)?.code)
}

fn mode_tag(mode: RoleMode) -> &'static str {
    match mode {
        RoleMode::Granted => "Granted",
        RoleMode::Revoked => "Revoked",
        RoleMode::Unconstrained => "Unconstrained",
    }
}

/// Serialize a transition's role structure without participant names:
/// the initiator's role-mode set, then each declared participant's
/// role-mode set position-by-position.
pub fn role_shape(transition: &Transition) -> String {
    let serialize_one = |participant: &str| -> String {
        transition
            .roles
            .get(participant)
            .map(|modes| {
                modes
                    .iter()
                    .map(|(role, mode)| format!("{}:{}", role, mode_tag(*mode)))
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .unwrap_or_default()
    };

    let initiator = serialize_one(&transition.initiator);
    let participants = transition
        .participants
        .iter()
        .map(|p| serialize_one(p))
        .collect::<Vec<_>>()
        .join(";");

    format!("initiator:{};participants:{}", initiator, participants)
}

/// Grouping key: transitions sharing a key are merged into one
/// conditional branch and processed together.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupKey {
    pub source_state: String,
    pub guard: String,
    pub roles: String,
}

impl GroupKey {
    pub fn for_transition(
        transition: &Transition,
        contract: &str,
        ctx: &mut GenContext,
    ) -> Result<GroupKey, CodegenError> {
        Ok(GroupKey {
            source_state: transition.source_state.clone(),
            guard: serialize_guard(transition, contract, ctx)?,
            roles: role_shape(transition),
        })
    }
}

/// Whether two calls share a (contract, operation) signature.
fn calls_match(a: &edam_model::Exp, b: &edam_model::Exp) -> bool {
    match (a.call_signature(), b.call_signature()) {
        (Some(sa), Some(sb)) => sa == sb,
        _ => false,
    }
}

/// Decide whether two transitions may share one emitted branch.
pub fn can_group(
    t1: &Transition,
    t2: &Transition,
    contract: &str,
    ctx: &mut GenContext,
) -> Result<bool, CodegenError> {
    if t1.source_state != t2.source_state || t1.operation != t2.operation {
        return Ok(false);
    }

    if serialize_guard(t1, contract, ctx)? != serialize_guard(t2, contract, ctx)? {
        return Ok(false);
    }

    if role_shape(t1) != role_shape(t2) {
        return Ok(false);
    }

    // Calls: both empty, or at least one signature shared.
    if t1.external_calls.is_empty() && t2.external_calls.is_empty() {
        return Ok(true);
    }
    for c1 in &t1.external_calls {
        for c2 in &t2.external_calls {
            if calls_match(c1, c2) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
