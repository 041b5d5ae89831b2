// ABOUTME: type introspection and narrow conversion commands - type, typeof, teq, str, int.

use crate::convert::{args, expect_string, expect_type_name};
use crate::env::Environment;
use crate::parser::parse_integer_literal;
use crate::value::Value;

/// Constructs a `Type` value from a bare name, e.g. `type Int`.
fn type_cmd(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    match expect_type_name(&call_args[0]) {
        Ok(name) => Value::type_value(name),
        Err(e) => Value::from_error(e),
    }
}

fn typeof_cmd(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    call_args[0].type_of()
}

/// Checks whether $1's runtime type equals the Type named $2.
fn teq(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 2) {
        return Value::from_error(e);
    }
    let want = match expect_type_name(&call_args[1]) {
        Ok(name) => name,
        Err(e) => return Value::from_error(e),
    };
    Value::Bool(call_args[0].type_name() == want)
}

fn str_cmd(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    Value::string(expect_string(&call_args[0]))
}

/// Converts $1 to an Int by re-parsing its string form through the same
/// numeric grammar the parser uses for integer literals.
fn int_cmd(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    if let Value::Int(n) = &call_args[0] {
        return Value::Int(*n);
    }
    let s = expect_string(&call_args[0]);
    match parse_integer_literal(&s) {
        Ok(n) => Value::Int(n),
        Err(e) => Value::from_error(e),
    }
}

pub fn register(env: &mut Environment) {
    super::register(env, "type", type_cmd, "constructs a Type value from a bare name");
    super::register(env, "typeof", typeof_cmd, "returns the runtime Type of $1");
    super::register(env, "teq", teq, "checks if the Type of $1 is $2");
    super::register(env, "str", str_cmd, "converts $1 to its String form");
    super::register(env, "int", int_cmd, "converts $1 to an Int");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Flow;

    fn env() -> Environment {
        let mut env = Environment::new();
        env.push().unwrap();
        env
    }

    #[test]
    fn typeof_reports_the_runtime_type_name() {
        let mut env = env();
        match typeof_cmd(&mut env, &[Value::Int(1)]) {
            Value::Type(t) => assert_eq!(&*t, "Int"),
            other => panic!("expected Type, got {other:?}"),
        }
    }

    #[test]
    fn teq_compares_against_a_named_type() {
        let mut env = env();
        match teq(&mut env, &[Value::Int(1), Value::word("Int")]) {
            Value::Bool(b) => assert!(b),
            other => panic!("expected Bool(true), got {other:?}"),
        }
    }

    #[test]
    fn int_reparses_a_numeric_string() {
        let mut env = env();
        match int_cmd(&mut env, &[Value::string("42")]) {
            Value::Int(n) => assert_eq!(n, 42),
            other => panic!("expected Int(42), got {other:?}"),
        }
    }

    #[test]
    fn int_on_non_numeric_string_fails() {
        let mut env = env();
        let result = int_cmd(&mut env, &[Value::string("abc")]);
        assert_eq!(result.flow(), Flow::Fail);
    }
}
