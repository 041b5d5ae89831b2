// ABOUTME: integer arithmetic and comparison commands.

use crate::convert::{args, to_int};
use crate::env::Environment;
use crate::value::Value;

fn two_ints(env: &mut Environment, call_args: &[Value]) -> Result<(i64, i64), Value> {
    if let Err(e) = args(call_args, 2) {
        return Err(env.fail_string("${1}", &[Value::from_error(e)]));
    }
    let a = match to_int(&call_args[0]) {
        Ok(n) => n,
        Err(e) => return Err(Value::from_error(e)),
    };
    let b = match to_int(&call_args[1]) {
        Ok(n) => n,
        Err(e) => return Err(Value::from_error(e)),
    };
    Ok((a, b))
}

fn iadd(env: &mut Environment, call_args: &[Value]) -> Value {
    match two_ints(env, call_args) {
        Ok((a, b)) => Value::Int(a + b),
        Err(e) => e,
    }
}

fn isub(env: &mut Environment, call_args: &[Value]) -> Value {
    match two_ints(env, call_args) {
        Ok((a, b)) => Value::Int(a - b),
        Err(e) => e,
    }
}

fn imul(env: &mut Environment, call_args: &[Value]) -> Value {
    match two_ints(env, call_args) {
        Ok((a, b)) => Value::Int(a * b),
        Err(e) => e,
    }
}

fn idiv(env: &mut Environment, call_args: &[Value]) -> Value {
    match two_ints(env, call_args) {
        Ok((_, 0)) => Value::error("division by 0", -1),
        Ok((a, b)) => Value::Int(a / b),
        Err(e) => e,
    }
}

fn igt(env: &mut Environment, call_args: &[Value]) -> Value {
    match two_ints(env, call_args) {
        Ok((a, b)) => Value::Bool(a > b),
        Err(e) => e,
    }
}

fn ilt(env: &mut Environment, call_args: &[Value]) -> Value {
    match two_ints(env, call_args) {
        Ok((a, b)) => Value::Bool(a < b),
        Err(e) => e,
    }
}

fn ige(env: &mut Environment, call_args: &[Value]) -> Value {
    match two_ints(env, call_args) {
        Ok((a, b)) => Value::Bool(a >= b),
        Err(e) => e,
    }
}

fn ile(env: &mut Environment, call_args: &[Value]) -> Value {
    match two_ints(env, call_args) {
        Ok((a, b)) => Value::Bool(a <= b),
        Err(e) => e,
    }
}

fn ieq(env: &mut Environment, call_args: &[Value]) -> Value {
    match two_ints(env, call_args) {
        Ok((a, b)) => Value::Bool(a == b),
        Err(e) => e,
    }
}

pub fn register(env: &mut Environment) {
    super::register(env, "iadd", iadd, "adds two Ints together");
    super::register(env, "isub", isub, "subtracts an Int from an Int");
    super::register(env, "imul", imul, "multiplies an Int by an Int");
    super::register(env, "idiv", idiv, "divides an Int by an Int");
    super::register(env, "ilt", ilt, "checks if $1 < $2, where $1 and $2 must be Int");
    super::register(env, "ile", ile, "checks if $1 <= $2, where $1 and $2 must be Int");
    super::register(env, "igt", igt, "checks if $1 > $2, where $1 and $2 must be Int");
    super::register(env, "ige", ige, "checks if $1 >= $2, where $1 and $2 must be Int");
    super::register(env, "ieq", ieq, "checks if $1 == $2, where $1 and $2 must be Int");
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
    fn iadd_sums_two_ints() {
        let mut env = env();
        match iadd(&mut env, &[Value::Int(2), Value::Int(3)]) {
            Value::Int(n) => assert_eq!(n, 5),
            other => panic!("expected Int(5), got {other:?}"),
        }
    }

    #[test]
    fn idiv_by_zero_fails_with_division_by_0() {
        let mut env = env();
        let result = idiv(&mut env, &[Value::Int(4), Value::Int(0)]);
        assert_eq!(result.flow(), Flow::Fail);
        match result {
            Value::Error(e) => assert_eq!(e.message, "division by 0"),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn idiv_truncates_toward_zero() {
        let mut env = env();
        match idiv(&mut env, &[Value::Int(-7), Value::Int(2)]) {
            Value::Int(n) => assert_eq!(n, -3),
            other => panic!("expected Int(-3), got {other:?}"),
        }
    }

    #[test]
    fn ilt_compares_integers() {
        let mut env = env();
        match ilt(&mut env, &[Value::Int(1), Value::Int(2)]) {
            Value::Bool(b) => assert!(b),
            other => panic!("expected Bool(true), got {other:?}"),
        }
    }
}
