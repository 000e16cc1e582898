//! Role-based access-control code synthesis.
//!
//! Preconditions lower to one `roleSatisf(...)` call per constrained
//! participant, conjoined with `&&`. Postconditions lower to one
//! `_permissions[...] = true|false` statement per (participant, role,
//! mode) triple. The arities of the `_roles(...)` array constructors
//! actually used are tracked in the [`GenContext`] so the assembler
//! emits exactly the needed overloads.

use crate::context::GenContext;
use edam_model::{RoleMap, RoleMode};

/// Lower a participant identifier for role checks: the initiator
/// becomes the caller sentinel, the contract becomes its own address.
pub fn participant_ident(participant: &str, caller: &str, contract: &str) -> String {
    if participant == "user" || participant == caller {
        "msg.sender".to_string()
    } else if participant == contract {
        "address(this)".to_string()
    } else {
        participant.to_string()
    }
}

/// Lower role preconditions to a guard condition string.
///
/// A participant with no constrained roles contributes nothing; an
/// unconstrained map lowers to the empty string.
pub fn role_guard(roles: &RoleMap, caller: &str, contract: &str, ctx: &mut GenContext) -> String {
    let mut conditions = Vec::new();

    for (participant, modes) in roles {
        let mut granted = Vec::new();
        let mut revoked = Vec::new();
        for (role, mode) in modes {
            match mode {
                RoleMode::Granted => granted.push(format!("Roles.{}", role)),
                RoleMode::Revoked => revoked.push(format!("Roles.{}", role)),
                RoleMode::Unconstrained => {}
            }
        }

        if !granted.is_empty() {
            ctx.role_array_arities.insert(granted.len());
        }
        if !revoked.is_empty() {
            ctx.role_array_arities.insert(revoked.len());
        }

        let granted_array = if granted.is_empty() {
            "new Roles [] (0)".to_string()
        } else {
            format!("_roles({})", granted.join(", "))
        };
        let revoked_array = if revoked.is_empty() {
            "new Roles [] (0)".to_string()
        } else {
            format!("_roles({})", revoked.join(", "))
        };

        if !granted.is_empty() || !revoked.is_empty() {
            conditions.push(format!(
                "roleSatisf({}, {}, {})",
                participant_ident(participant, caller, contract),
                granted_array,
                revoked_array
            ));
        }
    }

    conditions.join(" && ")
}

/// Lower role postconditions to permission-mutation statements.
pub fn role_updates(updates: &RoleMap, caller: &str, contract: &str) -> Vec<String> {
    let mut statements = Vec::new();
    for (participant, modes) in updates {
        for (role, mode) in modes {
            let value = match mode {
                RoleMode::Granted => "true",
                RoleMode::Revoked => "false",
                RoleMode::Unconstrained => continue,
            };
            statements.push(format!(
                "_permissions[{}][Roles.{}] = {}",
                participant_ident(participant, caller, contract),
                role,
                value
            ));
        }
    }
    statements
}

/// Post-update assertion checking the updated roles actually hold.
/// Empty when the transition performs no role updates.
pub fn role_assertion(updates: &RoleMap, caller: &str, contract: &str, ctx: &mut GenContext) -> String {
    let checks = role_guard(updates, caller, contract, ctx);
    if checks.is_empty() {
        String::new()
    } else {
        format!("assert({});", checks)
    }
}
