// ABOUTME: introspection commands - help, explain, overload, expand, val.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::convert::{args, expect_string, expect_value, expect_word};
use crate::env::Environment;
use crate::value::Value;

fn help_map(env: &Environment) -> Option<Rc<RefCell<HashMap<String, Value>>>> {
    match env.lookup("HELP") {
        Some(Value::Map(m)) => Some(m),
        _ => None,
    }
}

/// `help name` - with `name == "all"`, lists every entry of the `HELP` map
/// bound at the outermost scope; otherwise looks up and prints the single
/// named entry. Mirrors the reference's `help`, including its exact
/// interpolation message formats.
fn help(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    let name = expect_string(&call_args[0]);
    let map = match help_map(env) {
        Some(m) => m,
        None => {
            let _ = env.printi("help: ${1}:No help available 1.\n", &[Value::string(name)]);
            return Value::nil();
        }
    };
    if name == "all" {
        let entries = map.borrow();
        let mut keys: Vec<&String> = entries.keys().collect();
        keys.sort();
        for k in keys {
            let v = entries.get(k).cloned().unwrap_or_else(Value::nil);
            let _ = env.printi("${1}:\t${2}\n", &[Value::string(k.clone()), v]);
        }
        return Value::nil();
    }
    let found = map.borrow().get(&name).cloned();
    match found {
        Some(msg) => {
            let _ = env.printi("help:\t${1}:\n${2}\n", &[Value::string(name), msg.clone()]);
            msg
        }
        None => {
            let _ = env.printi("help:\t${1}:No help available 2.\n", &[Value::string(name)]);
            Value::nil()
        }
    }
}

/// `explain name help` - registers `help` as the explanation for `name` in
/// the `HELP` map bound at the outermost scope, creating the map if it
/// doesn't exist yet. Callable from TGTL scripts, so a user-defined `to`
/// procedure can document itself exactly like a builtin.
pub(crate) fn explain(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 2) {
        return Value::from_error(e);
    }
    let name = expect_string(&call_args[0]);
    let text = call_args[1].clone();
    let map = help_map(env).unwrap_or_else(|| Rc::new(RefCell::new(HashMap::new())));
    map.borrow_mut().insert(name, text.clone());
    env.define("HELP", Value::Map(map), -1);
    text
}

/// `overload name target type...` adds a dispatch entry for `target`,
/// selected when a call's argument types match `type...` in order.
fn overload(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 2) {
        return Value::from_error(e);
    }
    let name = match expect_word(&call_args[0]) {
        Ok(w) => w,
        Err(e) => return Value::from_error(e),
    };
    let target = call_args[1].clone();
    let types = &call_args[2..];
    env.overload(&name, target, types)
}

/// Flattens $1 into its constituent List elements, or a one-element list
/// when $1 is not itself a List.
fn expand(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    Value::list(call_args[0].list_items())
}

/// Returns $1 exactly as given, with no further evaluation or conversion -
/// useful for passing a literal Block/List through a command boundary.
fn val(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    expect_value(&call_args[0])
}

pub fn register(env: &mut Environment) {
    super::register(env, "help", help, "lists or shows the explanation registered for command $1, or all of them when $1 is \"all\"");
    super::register(env, "explain", explain, "registers $2 as the explanation for command $1");
    super::register(env, "overload", overload, "adds a type-dispatched overload for $1");
    super::register(env, "expand", expand, "flattens $1 into its List elements");
    super::register(env, "val", val, "returns $1 unchanged, with no further evaluation");
}
