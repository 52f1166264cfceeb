//! Fix hints attached to checker error codes.

/// Returns the `help:` text for a checker error code, if one is registered.
pub fn hint_for_code(code: &str) -> Option<&'static str> {
    let hint = match code {
        "E_BIN_ADD_MISMATCH" => "both operands of '+' must have the same type",
        "E_TERNARY_TEST_NOT_BOOL" => "the condition of a ternary must be a boolean",
        "E_OBJECT_FIELD_MISSING" => "add the missing field to the object literal",
        "E_UNION_NO_MATCH" => "the value must match one of the union members",
        "E_BIN_MUL_OPERAND" => "'*' only accepts numbers",
        "E_ARRAY_ELEMENT_MISMATCH" => "all elements of an array literal must share one type",
        _ => return None,
    };
    Some(hint)
}
