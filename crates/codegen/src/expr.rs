//! Expression lowering: EDAM expression trees to Solidity source text.
//!
//! `lower()` is a pure function of the tree and the caller/contract
//! context, except that it records used builtin helpers in the
//! [`GenContext`] so the assembler can include exactly the snippets
//! the contract needs.
//!
//! External calls do not lower to inline text. A `ContractWrite`
//! contributes a `try _c.op(...)` string to the call list; the
//! enclosing equality against a boolean literal turns that into the
//! bare `try { require(x); } catch { require(!x); }` form used when no
//! richer call-tree optimization applies.

use crate::context::{Builtin, GenContext};
use crate::error::CodegenError;
use edam_model::{Exp, Literal};

/// Result of lowering one expression: inline source text plus the
/// external-call strings extracted along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    pub code: String,
    pub calls: Vec<String>,
}

impl Lowered {
    fn pure(code: impl Into<String>) -> Lowered {
        Lowered {
            code: code.into(),
            calls: Vec::new(),
        }
    }
}

/// Merge two call lists, order-preserving, first occurrence wins.
fn merge_calls(left: Vec<String>, right: Vec<String>) -> Vec<String> {
    let mut merged = left;
    for call in right {
        if !merged.contains(&call) {
            merged.push(call);
        }
    }
    merged
}

fn is_bool_literal(code: &str) -> bool {
    code == "true" || code == "false"
}

/// Lower a binary operand pair.
fn lower_pair(
    left: &Exp,
    right: &Exp,
    caller: &str,
    contract: &str,
    ctx: &mut GenContext,
) -> Result<(Lowered, Lowered), CodegenError> {
    Ok((
        lower(left, caller, contract, ctx)?,
        lower(right, caller, contract, ctx)?,
    ))
}

/// Lower an expression to Solidity text and extracted external calls.
pub fn lower(
    exp: &Exp,
    caller: &str,
    contract: &str,
    ctx: &mut GenContext,
) -> Result<Lowered, CodegenError> {
    match exp {
        Exp::Add { left, right } => {
            let (l, r) = lower_pair(left, right, caller, contract, ctx)?;
            Ok(Lowered::pure(format!("({} + {})", l.code, r.code)))
        }
        Exp::Sub { left, right } => {
            let (l, r) = lower_pair(left, right, caller, contract, ctx)?;
            Ok(Lowered::pure(format!("({} - {})", l.code, r.code)))
        }
        Exp::Mul { left, right } => {
            let (l, r) = lower_pair(left, right, caller, contract, ctx)?;
            Ok(Lowered::pure(format!("({} * {})", l.code, r.code)))
        }
        Exp::Div { left, right } => {
            let (l, r) = lower_pair(left, right, caller, contract, ctx)?;
            Ok(Lowered::pure(format!("({} / {})", l.code, r.code)))
        }

        Exp::Eq { left, right } => {
            let (l, r) = lower_pair(left, right, caller, contract, ctx)?;
            let code = if !l.code.is_empty() && !r.code.is_empty() {
                format!("{} == {}", l.code, r.code)
            } else {
                String::new()
            };
            // Equality of a write call against a boolean literal is
            // the bare external-call form: one string with a positive
            // and a negated require arm.
            let calls = if !l.calls.is_empty() && r.calls.is_empty() && is_bool_literal(&r.code) {
                vec![format!(
                    "{}{{ require({}); }} catch {{ require(!{}); }}",
                    l.calls[0], r.code, r.code
                )]
            } else {
                Vec::new()
            };
            Ok(Lowered { code, calls })
        }
        Exp::Ne { left, right } => {
            let (l, r) = lower_pair(left, right, caller, contract, ctx)?;
            Ok(Lowered::pure(format!("{} != {}", l.code, r.code)))
        }
        Exp::Lt { left, right } => {
            let (l, r) = lower_pair(left, right, caller, contract, ctx)?;
            Ok(Lowered::pure(format!("{} < {}", l.code, r.code)))
        }
        Exp::Le { left, right } => {
            let (l, r) = lower_pair(left, right, caller, contract, ctx)?;
            Ok(Lowered::pure(format!("{} <= {}", l.code, r.code)))
        }
        Exp::Gt { left, right } => {
            let (l, r) = lower_pair(left, right, caller, contract, ctx)?;
            Ok(Lowered::pure(format!("{} > {}", l.code, r.code)))
        }
        Exp::Ge { left, right } => {
            let (l, r) = lower_pair(left, right, caller, contract, ctx)?;
            Ok(Lowered::pure(format!("{} >= {}", l.code, r.code)))
        }

        Exp::And { left, right } => {
            let (l, r) = lower_pair(left, right, caller, contract, ctx)?;
            let calls = merge_calls(l.calls, r.calls);
            // A side consumed as an external call lowers to empty; the
            // other side's text stands alone.
            let code = if !l.code.is_empty() && !r.code.is_empty() {
                format!("({} && {})", l.code, r.code)
            } else if !l.code.is_empty() {
                l.code
            } else {
                r.code
            };
            Ok(Lowered { code, calls })
        }
        Exp::Or { left, right } => {
            let (l, r) = lower_pair(left, right, caller, contract, ctx)?;
            let calls = merge_calls(l.calls, r.calls);
            let code = if !l.code.is_empty() && !r.code.is_empty() {
                format!("({} || {})", l.code, r.code)
            } else if !l.code.is_empty() {
                l.code
            } else {
                r.code
            };
            Ok(Lowered { code, calls })
        }
        Exp::Not { operand } => {
            let inner = lower(operand, caller, contract, ctx)?;
            Ok(Lowered {
                code: format!("!({})", inner.code),
                calls: inner.calls,
            })
        }

        Exp::Val(Literal::Bool(b)) => Ok(Lowered::pure(if *b { "true" } else { "false" })),
        Exp::Val(Literal::Int(i)) => Ok(Lowered::pure(i.to_string())),
        Exp::Val(Literal::Str(s)) => Ok(Lowered::pure(s.clone())),

        Exp::SelfRef => Ok(Lowered::pure("address(this)")),

        Exp::Var(name) => {
            let needs_cast = ctx
                .field_types
                .get(name)
                .map(|ty| ty == "address" || ty.ends_with("Contract"))
                .unwrap_or(false);
            if needs_cast {
                Ok(Lowered::pure(format!("address({})", name)))
            } else {
                Ok(Lowered::pure(name.clone()))
            }
        }

        Exp::Participant(p) => {
            if p == caller {
                Ok(Lowered::pure("msg.sender"))
            } else if p == contract {
                Ok(Lowered::pure("address(this)"))
            } else {
                Ok(Lowered::pure(p.clone()))
            }
        }

        Exp::MapIndex { map, key } => {
            let (m, k) = lower_pair(map, key, caller, contract, ctx)?;
            Ok(Lowered::pure(format!("{}[{}]", m.code, k.code)))
        }
        Exp::ListIndex { list, index } => {
            let (l, i) = lower_pair(list, index, caller, contract, ctx)?;
            Ok(Lowered::pure(format!("{}[{}]", l.code, i.code)))
        }

        Exp::Call {
            operation,
            arguments,
        } => lower_call(operation, arguments, caller, contract, ctx),

        Exp::ContractRead {
            contract: target,
            expression,
        } => {
            let inner = lower(expression, caller, contract, ctx)?;
            Ok(Lowered::pure(format!("_{}.{}", target, inner.code)))
        }

        Exp::ContractWrite {
            contract: target,
            operation,
            participant_args,
            data_args,
        } => {
            let mut args = Vec::new();
            for arg in participant_args.iter().chain(data_args) {
                args.push(lower(arg, caller, contract, ctx)?.code);
            }
            Ok(Lowered {
                code: String::new(),
                calls: vec![format!("try _{}.{}({}) ", target, operation, args.join(", "))],
            })
        }
    }
}

/// Argument-count check for builtin mutation operations.
fn expect_args(operation: &str, args: &[String], expected: usize) -> Result<(), CodegenError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CodegenError::InvalidBuiltin {
            operation: operation.to_string(),
            expected,
            found: args.len(),
        })
    }
}

fn lower_call(
    operation: &str,
    arguments: &[Exp],
    caller: &str,
    contract: &str,
    ctx: &mut GenContext,
) -> Result<Lowered, CodegenError> {
    let mut args = Vec::with_capacity(arguments.len());
    for arg in arguments {
        args.push(lower(arg, caller, contract, ctx)?.code);
    }

    // Builtin mutation operations lower to statements, not expressions.
    match operation {
        "update_map" | "update_list" => {
            expect_args(operation, &args, 3)?;
            Ok(Lowered::pure(format!("{}[{}] = {}", args[0], args[1], args[2])))
        }
        "update_nested_map" => {
            expect_args(operation, &args, 4)?;
            Ok(Lowered::pure(format!(
                "{}[{}][{}] = {}",
                args[0], args[1], args[2], args[3]
            )))
        }
        "append" | "append_list" => {
            expect_args(operation, &args, 2)?;
            Ok(Lowered::pure(format!("{}.push({})", args[0], args[1])))
        }
        "append_lists" => {
            expect_args(operation, &args, 2)?;
            Ok(Lowered::pure(format!(
                "for(uint _i = 0; _i < {src}.length; _i+=1)\n\t\t\t{dst}.push({src}[_i])",
                dst = args[0],
                src = args[1]
            )))
        }
        _ => {
            if let Some(builtin) = Builtin::from_operation(operation) {
                ctx.used_builtins.insert(builtin);
            }
            Ok(Lowered::pure(format!("{}({})", operation, args.join(", "))))
        }
    }
}

/// Whether this operation is a builtin mutation statement rather than
/// a value-producing call.
pub fn is_update_operation(operation: &str) -> bool {
    matches!(
        operation,
        "update_map" | "update_list" | "append" | "append_list" | "append_lists" | "update_nested_map"
    )
}
