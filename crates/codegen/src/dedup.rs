//! Deduplication of nested `update_map` calls.
//!
//! A top-level `update_map` call may contain nested `update_map` calls
//! in its arguments. When the same nested call (same operation,
//! structurally identical arguments) occurs more than once, it must be
//! emitted exactly once: every occurrence in the parent is replaced by
//! the nested call's first argument (the container being mutated), and
//! the nested call itself becomes a separate top-level statement.
//! Extracted statements execute first, in discovery order, then the
//! rewritten parent.

use crate::error::CodegenError;
use edam_model::Exp;

/// Rewrite a top-level `update_map` call, extracting nested
/// `update_map` calls.
///
/// Returns the rewritten parent call plus the extracted calls in
/// discovery order.
pub fn dedup_update_map(call: &Exp) -> Result<(Exp, Vec<Exp>), CodegenError> {
    let (operation, arguments) = match call {
        Exp::Call {
            operation,
            arguments,
        } if operation == "update_map" => (operation, arguments),
        other => return Err(CodegenError::NotAnUpdateMap(format!("{:?}", other))),
    };

    let mut extracted: Vec<Exp> = Vec::new();
    let new_args: Vec<Exp> = arguments
        .iter()
        .map(|arg| rewrite(arg, &mut extracted))
        .collect();

    Ok((
        Exp::Call {
            operation: operation.clone(),
            arguments: new_args,
        },
        extracted,
    ))
}

/// Replace nested `update_map` calls by their first argument,
/// recording each distinct call once.
fn rewrite(exp: &Exp, extracted: &mut Vec<Exp>) -> Exp {
    match exp {
        Exp::Call {
            operation,
            arguments,
        } if operation == "update_map" => {
            if !extracted.iter().any(|seen| seen == exp) {
                extracted.push(exp.clone());
            }
            // The first argument is the container being mutated; the
            // parent keeps referring to it after extraction.
            arguments
                .first()
                .map(|a| rewrite(a, extracted))
                .unwrap_or_else(|| exp.clone())
        }

        Exp::Add { left, right } => binary(exp, left, right, extracted),
        Exp::Sub { left, right } => binary(exp, left, right, extracted),
        Exp::Mul { left, right } => binary(exp, left, right, extracted),
        Exp::Div { left, right } => binary(exp, left, right, extracted),
        Exp::Eq { left, right } => binary(exp, left, right, extracted),
        Exp::Ne { left, right } => binary(exp, left, right, extracted),
        Exp::Lt { left, right } => binary(exp, left, right, extracted),
        Exp::Le { left, right } => binary(exp, left, right, extracted),
        Exp::Gt { left, right } => binary(exp, left, right, extracted),
        Exp::Ge { left, right } => binary(exp, left, right, extracted),
        Exp::And { left, right } => binary(exp, left, right, extracted),
        Exp::Or { left, right } => binary(exp, left, right, extracted),

        Exp::Not { operand } => Exp::Not {
            operand: Box::new(rewrite(operand, extracted)),
        },

        Exp::MapIndex { map, key } => Exp::MapIndex {
            map: Box::new(rewrite(map, extracted)),
            key: Box::new(rewrite(key, extracted)),
        },
        Exp::ListIndex { list, index } => Exp::ListIndex {
            list: Box::new(rewrite(list, extracted)),
            index: Box::new(rewrite(index, extracted)),
        },

        Exp::Call {
            operation,
            arguments,
        } => Exp::Call {
            operation: operation.clone(),
            arguments: arguments.iter().map(|a| rewrite(a, extracted)).collect(),
        },

        Exp::ContractRead {
            contract,
            expression,
        } => Exp::ContractRead {
            contract: contract.clone(),
            expression: Box::new(rewrite(expression, extracted)),
        },
        Exp::ContractWrite {
            contract,
            operation,
            participant_args,
            data_args,
        } => Exp::ContractWrite {
            contract: contract.clone(),
            operation: operation.clone(),
            participant_args: participant_args
                .iter()
                .map(|a| rewrite(a, extracted))
                .collect(),
            data_args: data_args.iter().map(|a| rewrite(a, extracted)).collect(),
        },

        // Leaves
        Exp::Val(_) | Exp::SelfRef | Exp::Var(_) | Exp::Participant(_) => exp.clone(),
    }
}

fn binary(template: &Exp, left: &Exp, right: &Exp, extracted: &mut Vec<Exp>) -> Exp {
    let l = Box::new(rewrite(left, extracted));
    let r = Box::new(rewrite(right, extracted));
    match template {
        Exp::Add { .. } => Exp::Add { left: l, right: r },
        Exp::Sub { .. } => Exp::Sub { left: l, right: r },
        Exp::Mul { .. } => Exp::Mul { left: l, right: r },
        Exp::Div { .. } => Exp::Div { left: l, right: r },
        Exp::Eq { .. } => Exp::Eq { left: l, right: r },
        Exp::Ne { .. } => Exp::Ne { left: l, right: r },
        Exp::Lt { .. } => Exp::Lt { left: l, right: r },
        Exp::Le { .. } => Exp::Le { left: l, right: r },
        Exp::Gt { .. } => Exp::Gt { left: l, right: r },
        Exp::Ge { .. } => Exp::Ge { left: l, right: r },
        Exp::And { .. } => Exp::And { left: l, right: r },
        Exp::Or { .. } => Exp::Or { left: l, right: r },
        _ => unreachable!("binary() called with non-binary template"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_map(args: Vec<Exp>) -> Exp {
        Exp::Call {
            operation: "update_map".to_string(),
            arguments: args,
        }
    }

    #[test]
    fn test_identical_nested_calls_extracted_once() {
        let nested = update_map(vec![Exp::var("bids"), Exp::var("who"), Exp::int(5)]);
        let parent = update_map(vec![
            Exp::var("totals"),
            Exp::MapIndex {
                map: Box::new(nested.clone()),
                key: Box::new(Exp::var("who")),
            },
            Exp::Add {
                left: Box::new(nested.clone()),
                right: Box::new(Exp::int(1)),
            },
        ]);

        let (rewritten, extracted) = dedup_update_map(&parent).unwrap();
        assert_eq!(extracted, vec![nested]);

        // Both occurrences replaced by the nested call's container.
        let expected = update_map(vec![
            Exp::var("totals"),
            Exp::MapIndex {
                map: Box::new(Exp::var("bids")),
                key: Box::new(Exp::var("who")),
            },
            Exp::Add {
                left: Box::new(Exp::var("bids")),
                right: Box::new(Exp::int(1)),
            },
        ]);
        assert_eq!(rewritten, expected);
    }

    #[test]
    fn test_distinct_nested_calls_each_extracted() {
        let nested_a = update_map(vec![Exp::var("bids"), Exp::var("a"), Exp::int(1)]);
        let nested_b = update_map(vec![Exp::var("bids"), Exp::var("b"), Exp::int(2)]);
        let parent = update_map(vec![
            Exp::var("totals"),
            nested_a.clone(),
            nested_b.clone(),
        ]);

        let (_, extracted) = dedup_update_map(&parent).unwrap();
        assert_eq!(extracted, vec![nested_a, nested_b]);
    }

    #[test]
    fn test_no_nested_calls_is_identity() {
        let parent = update_map(vec![Exp::var("bids"), Exp::var("who"), Exp::int(5)]);
        let (rewritten, extracted) = dedup_update_map(&parent).unwrap();
        assert_eq!(rewritten, parent);
        assert!(extracted.is_empty());
    }

    #[test]
    fn test_non_update_map_rejected() {
        let e = Exp::Call {
            operation: "append".to_string(),
            arguments: vec![Exp::var("items"), Exp::int(1)],
        };
        assert!(matches!(
            dedup_update_map(&e),
            Err(CodegenError::NotAnUpdateMap(_))
        ));
    }
}
