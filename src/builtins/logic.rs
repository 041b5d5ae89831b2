// ABOUTME: boolean binary operator commands.

use crate::convert::{args, to_bool};
use crate::env::Environment;
use crate::value::Value;

fn two_bools(_env: &mut Environment, call_args: &[Value]) -> Result<(bool, bool), Value> {
    if let Err(e) = args(call_args, 2) {
        return Err(Value::from_error(e));
    }
    Ok((to_bool(&call_args[0]), to_bool(&call_args[1])))
}

fn band(env: &mut Environment, call_args: &[Value]) -> Value {
    match two_bools(env, call_args) {
        Ok((a, b)) => Value::Bool(a && b),
        Err(e) => e,
    }
}

fn bor(env: &mut Environment, call_args: &[Value]) -> Value {
    match two_bools(env, call_args) {
        Ok((a, b)) => Value::Bool(a || b),
        Err(e) => e,
    }
}

fn bxor(env: &mut Environment, call_args: &[Value]) -> Value {
    match two_bools(env, call_args) {
        Ok((a, b)) => Value::Bool(a != b),
        Err(e) => e,
    }
}

fn bnot(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    Value::Bool(!to_bool(&call_args[0]))
}

pub fn register(env: &mut Environment) {
    super::register(env, "band", band, "returns true if $1 and $2 arguments are true");
    super::register(env, "bor", bor, "returns true if $1 or $2 arguments are true");
    super::register(env, "bxor", bxor, "returns true if $1 and $2 are different booleans");
    super::register(env, "bnot", bnot, "returns true if $1 is false and false otherwise");
}
