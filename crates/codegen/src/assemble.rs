//! Final contract assembly.
//!
//! Combines enum declarations, fields, the constructor, the generated
//! functions, and the conditionally included helper snippets into one
//! Solidity source file with a fixed structural template.

use crate::constructor::ConstructorCode;
use crate::context::GenContext;
use crate::process::OperationCode;
use crate::snippets;
use edam_model::{Edam, RoleMode};

pub const STATE_DECLARATION: &str = "State public _state;";
pub const PERMISSIONS_DECLARATION: &str =
    "mapping(address => mapping(Roles => bool)) public _permissions";

const DEFAULT_STATE: &str = "q0";
const DEFAULT_ROLE: &str = "_______R00_______";

/// `enum State { ... }`, with a placeholder member when the model
/// declares no states.
pub fn state_enum(states: &[String]) -> String {
    if states.is_empty() {
        return format!("enum State {{{}}}", DEFAULT_STATE);
    }
    let mut sorted: Vec<&str> = states.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    format!("enum State {{ {} }}", sorted.join(", "))
}

/// `enum Roles { ... }`, with a placeholder member when the model
/// declares no roles.
pub fn role_enum(roles: &[String]) -> String {
    let mut sorted: Vec<&str> = roles
        .iter()
        .map(String::as_str)
        .filter(|r| !r.is_empty())
        .collect();
    if sorted.is_empty() {
        return format!("enum Roles {{{}}}", DEFAULT_ROLE);
    }
    sorted.sort_unstable();
    sorted.dedup();
    format!("enum Roles {{ {} }}", sorted.join(", "))
}

/// Whether any transition performs a role update. Controls inclusion
/// of the role-satisfaction helper and its array overloads.
pub fn has_role_updates(edam: &Edam) -> bool {
    edam.transitions.iter().any(|t| {
        t.role_updates
            .values()
            .flat_map(|modes| modes.values())
            .any(|mode| *mode != RoleMode::Unconstrained)
    })
}

/// One `function` block per operation, branches joined with `else` and
/// terminated by the fallthrough revert.
pub fn functions_code(
    operation_map: &[(String, OperationCode)],
    has_external_calls: bool,
) -> String {
    let reentrancy = if has_external_calls {
        "nonReentrant "
    } else {
        ""
    };

    let mut functions = Vec::new();
    for (operation, code) in operation_map {
        functions.push(format!(
            "\tfunction {operation} ({params}) public {reentrancy}{{\n\t\t{bodies} else {{\n\t\t\trevert(\"Condition not met\");\n\t\t}}\n\t}}",
            operation = operation,
            params = code.params,
            reentrancy = reentrancy,
            bodies = code.bodies.join(" else "),
        ));
    }
    functions.join("\n\n")
}

fn reentrancy_fields() -> String {
    [
        "\tbool private _entered;",
        "\tmodifier nonReentrant() {",
        "\t\trequire(!_entered, \"Reentrant call\");",
        "\t\t_entered = true;",
        "\t\t_;",
        "\t\t_entered = false;",
        "\t}",
    ]
    .join("\n")
}

/// Assemble the complete contract source.
pub fn assemble_contract(
    edam: &Edam,
    constructor: &ConstructorCode,
    operation_map: &[(String, OperationCode)],
    has_external_calls: bool,
    ctx: &GenContext,
) -> String {
    let mut sections = Vec::new();

    sections.push("// SPDX-License-Identifier: UNLICENSED".to_string());
    sections.push("pragma solidity ^0.8.0;".to_string());
    if !constructor.imports.is_empty() {
        sections.push(String::new());
        sections.push(constructor.imports.clone());
    }
    sections.push(String::new());
    sections.push(format!("contract {} {{", edam.name));
    sections.push(format!("\t{}", state_enum(&edam.states)));
    sections.push(format!("\t{}", role_enum(&edam.roles)));
    sections.push(format!("\t{}", STATE_DECLARATION));

    if !ctx.contract_fields.is_empty() {
        sections.push(format!("\t{};", ctx.contract_fields.join(";\n\t")));
    }
    // The modifier must exist if either the constructor or any
    // function carries it.
    if has_external_calls || constructor.has_external_calls {
        sections.push(reentrancy_fields());
    }

    if !constructor.code.is_empty() {
        sections.push(String::new());
        sections.push(format!("\t{}", constructor.code));
    }

    let functions = functions_code(operation_map, has_external_calls);
    if !functions.is_empty() {
        sections.push(String::new());
        sections.push(functions);
    }

    for builtin in &ctx.used_builtins {
        sections.push(snippets::builtin_snippet(*builtin).to_string());
    }

    if has_role_updates(edam) {
        sections.push(snippets::ROLE_SATISF.to_string());
        let overloads = snippets::roles_overloads(&ctx.role_array_arities);
        if !overloads.is_empty() {
            sections.push(overloads);
        }
    }

    sections.push("}".to_string());
    let mut source = sections.join("\n");
    source.push('\n');
    source
}
