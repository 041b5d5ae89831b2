// ABOUTME: variable binding, lookup and in-place integer update commands.

use crate::convert::{args, expect_string, to_int};
use crate::env::Environment;
use crate::value::Value;

/// Binds `args[1]` to the name `args[0]` one frame below the command's own
/// (level 1, the caller's frame) - not level 0, which would vanish the
/// moment this command's own call frame pops.
fn let_cmd(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 2) {
        return Value::from_error(e);
    }
    let name = expect_string(&call_args[0]);
    env.define(&name, call_args[1].clone(), 1)
}

/// Rebinds an already-bound name in whichever frame currently holds it.
fn set_cmd(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 2) {
        return Value::from_error(e);
    }
    let name = expect_string(&call_args[0]);
    env.set(&name, call_args[1].clone())
}

fn get_cmd(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    let name = expect_string(&call_args[0]);
    match env.lookup(&name) {
        Some(v) => v,
        None => Value::error(format!("undefined variable: {name}"), -1),
    }
}

/// Looks up `args[0]` as a variable name, converts its current value to an
/// Int, adds `delta`, and stores the result back under the same name. Unlike
/// the reference implementation, an arity or conversion failure is returned
/// as a genuine fail-flow error rather than silently swallowed into `Int(0)`.
fn update_int_by_name(env: &mut Environment, call_args: &[Value], delta: i64) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    let name = expect_string(&call_args[0]);
    let current = match env.lookup(&name) {
        Some(v) => v,
        None => return Value::error(format!("undefined variable: {name}"), -1),
    };
    let n = match to_int(&current) {
        Ok(n) => n,
        Err(e) => return Value::from_error(e),
    };
    env.set(&name, Value::Int(n + delta))
}

fn inc(env: &mut Environment, call_args: &[Value]) -> Value {
    update_int_by_name(env, call_args, 1)
}

fn dec(env: &mut Environment, call_args: &[Value]) -> Value {
    update_int_by_name(env, call_args, -1)
}

pub fn register(env: &mut Environment) {
    super::register(env, "let", let_cmd, "binds $2 to the name $1 in the calling frame");
    super::register(env, "set", set_cmd, "rebinds the existing variable named $1 to $2");
    super::register(env, "get", get_cmd, "gets the value bound to the name $1");
    super::register(env, "inc", inc, "increments the Int variable named $1 by one");
    super::register(env, "dec", dec, "decrements the Int variable named $1 by one");
}
