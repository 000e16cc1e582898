//! EDAM type -> Solidity type mapping.
//!
//! Known scalar, list, and map types map directly. An unrecognized
//! type is treated as an external-contract reference needing an import
//! and a constructor parameter; that is a heuristic default, never a
//! failure.

/// An external contract type discovered during mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalType {
    pub ty: String,
    pub name: String,
}

/// Map an EDAM variable type to a Solidity declaration.
///
/// `is_param` controls `memory` vs `public` modifiers: reference-typed
/// function parameters need `memory`, contract fields get `public`.
/// Returns the declaration and, for unknown types, the external-type
/// record used for imports and constructor parameters.
pub fn map_type(ty: &str, name: &str, is_param: bool) -> (String, Option<ExternalType>) {
    let memory = if is_param { " memory" } else { "" };
    let public = if is_param { "" } else { " public" };

    let declaration = match ty {
        "int" | "uint" => format!("uint{} {}", public, name),
        "bool" => format!("bool{} {}", public, name),
        "address" | "user" | "contract" => format!("address{} {}", public, name),
        "string" => format!("string{}{} {}", memory, public, name),
        "list_int" => format!("uint[]{}{} {}", memory, public, name),
        "list_bool" => format!("bool[]{}{} {}", memory, public, name),
        "list_string" => format!("string[]{}{} {}", memory, public, name),
        "map_address_bool" => format!("mapping(address => bool){} {}", public, name),
        "map_address_int" => format!("mapping(address => uint){} {}", public, name),
        "map_string_int" => format!("mapping(string => uint){} {}", public, name),
        "map_string_string" => format!("mapping(string => string){} {}", public, name),
        "map_address_string" => format!("mapping(address => string){} {}", public, name),
        "map_map_address_string_bool" => {
            format!("mapping(address => mapping(string => bool)){} {}", public, name)
        }
        "map_map_address_string_int" => {
            format!("mapping(address => mapping(string => uint)){} {}", public, name)
        }
        "map_map_address_address_int" => {
            format!("mapping(address => mapping(address => uint)){} {}", public, name)
        }
        other => {
            // Unknown type: external contract reference, field named
            // with a leading underscore.
            return (
                format!("{}{} _{}", other, public, name),
                Some(ExternalType {
                    ty: other.to_string(),
                    name: name.to_string(),
                }),
            );
        }
    };

    (declaration, None)
}
