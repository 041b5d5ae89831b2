// ABOUTME: truthiness and positional-argument conversion helpers used across builtins.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::TgtlError;
use crate::value::{BlockNode, Value};

/// The truthiness a bare command condition (`if`, `while`) tests for: an
/// `Error` is always false, `Int` is false only for zero, `Bool` passes
/// through, `List`/`Map`/`Block` test structural emptiness, and everything
/// else is true unless its display form is empty.
pub fn to_bool(val: &Value) -> bool {
    match val {
        Value::Error(_) => false,
        Value::Int(n) => *n != 0,
        Value::Bool(b) => *b,
        Value::List(items) => !items.borrow().is_empty(),
        Value::Map(m) => !m.borrow().is_empty(),
        Value::Block(node) => !node.statements.is_empty(),
        other => !other.to_string().is_empty(),
    }
}

/// Converts a value to an integer. Only `Int` and `Bool` convert implicitly
/// (matching the reference `Convert` table) - parsing a `String`/`Word` into
/// an integer is the job of the dedicated `int` builtin, not this helper.
pub fn to_int(val: &Value) -> Result<i64, TgtlError> {
    match val {
        Value::Int(n) => Ok(*n),
        Value::Bool(b) => Ok(if *b { -1 } else { 0 }),
        other => Err(TgtlError::from_string(format!(
            "Cannot convert {} value",
            other.type_name()
        ))),
    }
}

/// Any value converts to a raw string via its own `Display` form.
pub fn expect_string(val: &Value) -> String {
    val.to_string()
}

/// Only `Word` and `Type` convert to a bare name (matching `Word`/`Type`'s
/// own `Convert` methods - an `Int` or `String` does not implicitly decay
/// into a word).
pub fn expect_word(val: &Value) -> Result<String, TgtlError> {
    match val {
        Value::Word(w) => Ok(w.to_string()),
        Value::Type(t) => Ok(t.to_string()),
        other => Err(TgtlError::from_string(format!(
            "Cannot convert {} value",
            other.type_name()
        ))),
    }
}

/// Only `Word` and `Type` convert to a type name.
pub fn expect_type_name(val: &Value) -> Result<String, TgtlError> {
    expect_word(val)
}

pub fn expect_block(val: &Value) -> Result<Rc<BlockNode>, TgtlError> {
    match val {
        Value::Block(b) => Ok(b.clone()),
        other => Err(TgtlError::from_string(format!(
            "Cannot convert {} value",
            other.type_name()
        ))),
    }
}

pub fn expect_list(val: &Value) -> Result<Rc<RefCell<Vec<Value>>>, TgtlError> {
    match val {
        Value::List(l) => Ok(l.clone()),
        other => Err(TgtlError::from_string(format!(
            "Cannot convert {} value",
            other.type_name()
        ))),
    }
}

pub fn expect_map(val: &Value) -> Result<Rc<RefCell<HashMap<String, Value>>>, TgtlError> {
    match val {
        Value::Map(m) => Ok(m.clone()),
        other => Err(TgtlError::from_string(format!(
            "Cannot convert {} value",
            other.type_name()
        ))),
    }
}

/// Every value converts to itself when no narrower type is requested.
pub fn expect_value(val: &Value) -> Value {
    val.clone()
}

/// Decodes `froms[i]` into the i-th requested type for each closure in
/// `decoders`, short-circuiting with "Too few arguments" if `froms` is
/// shorter than `decoders`.
pub fn args(froms: &[Value], arity: usize) -> Result<(), TgtlError> {
    if froms.len() < arity {
        return Err(TgtlError::from_string(format!(
            "Too few arguments: {} in stead of {}",
            froms.len(),
            arity
        )));
    }
    Ok(())
}
