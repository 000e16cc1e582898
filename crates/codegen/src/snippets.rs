//! Solidity helper snippets included on demand.
//!
//! Math helpers are emitted only when an expression used them; the
//! role-satisfaction helper and its `_roles` array constructors are
//! emitted only when the contract performs role updates, with exactly
//! the arities the role handler observed.

use crate::context::Builtin;
use std::collections::BTreeSet;

pub const SUM: &str = r#"
    // Sum of the integers in an array
    function sum(uint[] memory numbers) internal pure returns (uint) {
        uint _total = 0;
        for (uint i = 0; i < numbers.length; i++) {
            _total += numbers[i];
        }
        return _total;
    }
"#;

pub const MIN: &str = r#"
    // Minimum value in an array
    function min(uint[] memory numbers) internal pure returns (uint) {
        require(numbers.length > 0, "Array cannot be empty");
        uint minimum = numbers[0];
        for (uint i = 1; i < numbers.length; i++) {
            if (numbers[i] < minimum) {
                minimum = numbers[i];
            }
        }
        return minimum;
    }

    // Minimum of two numbers
    function min(uint a, uint b) internal pure returns (uint) {
        if (a < b)
            return a;
        return b;
    }
"#;

pub const MAX: &str = r#"
    // Maximum value in an array
    function max(uint[] memory numbers) internal pure returns (uint) {
        require(numbers.length > 0, "Array cannot be empty");
        uint maximum = numbers[0];
        for (uint i = 1; i < numbers.length; i++) {
            if (numbers[i] > maximum) {
                maximum = numbers[i];
            }
        }
        return maximum;
    }

    // Maximum of two numbers
    function max(uint a, uint b) internal pure returns (uint) {
        if (a > b)
            return a;
        return b;
    }
"#;

pub const GET_AMOUNT_OUT: &str = r#"
    // Output amount for Uniswap-style reserves and an input amount
    function get_amount_out(
        uint amountIn,
        uint reserveIn,
        uint reserveOut,
        uint feePercent
    ) internal pure returns (uint) {
        require(reserveIn > 0 && reserveOut > 0, "Invalid reserves");
        require(feePercent <= 1000, "Fee percent too high");

        uint multiplier = 1000;
        uint amountInWithFee = amountIn * (multiplier - feePercent);
        uint numerator = amountInWithFee * reserveOut;
        uint denominator = (reserveIn * multiplier) + amountInWithFee;

        require(denominator > 0, "Denominator must be greater than zero");
        return numerator / denominator;
    }
"#;

pub const ROLE_SATISF: &str = r#"
    // Checks whether a participant's granted roles satisfy the
    // constraints: hasrole_roles must all be granted, notrole_roles
    // must all be absent.
    function roleSatisf(
        address participant,
        Roles[] memory hasrole_roles,
        Roles[] memory notrole_roles
    ) internal view returns (bool) {
        for (uint i = 0; i < notrole_roles.length; i++) {
            if (_permissions[participant][notrole_roles[i]]) {
                return false;
            }
        }

        for (uint i = 0; i < hasrole_roles.length; i++) {
            if (!_permissions[participant][hasrole_roles[i]]) {
                return false;
            }
        }

        return true;
    }
"#;

/// Snippet text for a used builtin.
pub fn builtin_snippet(builtin: Builtin) -> &'static str {
    match builtin {
        Builtin::Sum => SUM,
        Builtin::Min => MIN,
        Builtin::Max => MAX,
        Builtin::GetAmountOut => GET_AMOUNT_OUT,
    }
}

/// Generate `_roles` array-constructor overloads for the observed
/// arities — no more, no fewer.
pub fn roles_overloads(arities: &BTreeSet<usize>) -> String {
    let mut functions = Vec::new();
    for &count in arities {
        if count == 0 {
            continue;
        }
        let params: Vec<String> = (1..=count).map(|i| format!("Roles r{}", i)).collect();
        let assignments: Vec<String> = (0..count).map(|i| format!("arr[{}] = r{};", i, i + 1)).collect();
        functions.push(format!(
            "    function _roles({}) internal pure returns (Roles[] memory arr) {{\n        arr = new Roles[]({});\n        {}\n    }}",
            params.join(", "),
            count,
            assignments.join("\n        ")
        ));
    }

    if functions.is_empty() {
        String::new()
    } else {
        format!("    // ----- Array Constructors -----\n{}", functions.join("\n"))
    }
}
