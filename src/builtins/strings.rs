// ABOUTME: string and rune/codepoint commands.

use crate::convert::{args, expect_string, to_int};
use crate::env::Environment;
use crate::value::Value;

fn sadd(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 2) {
        return Value::from_error(e);
    }
    let base = expect_string(&call_args[0]);
    let suffix = expect_string(&call_args[1]);
    Value::string(format!("{base}{suffix}"))
}

fn sget(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 2) {
        return Value::from_error(e);
    }
    let s = expect_string(&call_args[0]);
    let index = match to_int(&call_args[1]) {
        Ok(n) => n,
        Err(e) => return Value::from_error(e),
    };
    let runes: Vec<char> = s.chars().collect();
    if index < 0 || index as usize >= runes.len() {
        return Value::error("index out of range", -1);
    }
    Value::Int(runes[index as usize] as i64)
}

fn slen(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    let s = expect_string(&call_args[0]);
    Value::Int(s.chars().count() as i64)
}

fn runes(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    let s = expect_string(&call_args[0]);
    Value::list(s.chars().map(|c| Value::Int(c as i64)).collect())
}

fn wire(_env: &mut Environment, call_args: &[Value]) -> Value {
    let mut out = String::new();
    for arg in call_args {
        let code = match to_int(arg) {
            Ok(n) => n,
            Err(e) => return Value::from_error(e),
        };
        match u32::try_from(code).ok().and_then(char::from_u32) {
            Some(c) => out.push(c),
            None => return Value::error(format!("invalid code point: {code}"), -1),
        }
    }
    Value::string(out)
}

fn seq(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 2) {
        return Value::from_error(e);
    }
    Value::Bool(expect_string(&call_args[0]) == expect_string(&call_args[1]))
}

pub fn register(env: &mut Environment) {
    super::register(env, "sadd", sadd, "returns a string with $2 appended to string $1");
    super::register(env, "sget", sget, "gets a rune from a string by index");
    super::register(env, "slen", slen, "returns the length of a string");
    super::register(env, "runes", runes, "converts String to a list of character code points");
    super::register(env, "wire", wire, "converts character code points to String");
    super::register(env, "seq", seq, "checks if [str $1] == [str $2]");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        let mut env = Environment::new();
        env.push().unwrap();
        env
    }

    #[test]
    fn sadd_concatenates() {
        let mut env = env();
        match sadd(&mut env, &[Value::string("foo"), Value::string("bar")]) {
            Value::String(s) => assert_eq!(&*s, "foobar"),
            other => panic!("expected String, got {other:?}"),
        }
    }

    #[test]
    fn sget_and_slen_count_runes_not_bytes() {
        let mut env = env();
        match slen(&mut env, &[Value::string("héllo")]) {
            Value::Int(n) => assert_eq!(n, 5),
            other => panic!("expected Int(5), got {other:?}"),
        }
        match sget(&mut env, &[Value::string("héllo"), Value::Int(1)]) {
            Value::Int(n) => assert_eq!(n, 'é' as i64),
            other => panic!("expected Int, got {other:?}"),
        }
    }

    #[test]
    fn runes_and_wire_round_trip() {
        let mut env = env();
        let runes_list = runes(&mut env, &[Value::string("ab")]);
        let items = runes_list.list_items();
        match wire(&mut env, &items) {
            Value::String(s) => assert_eq!(&*s, "ab"),
            other => panic!("expected String, got {other:?}"),
        }
    }
}
