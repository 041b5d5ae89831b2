// ABOUTME: hash map construction, access, and iteration commands.

use crate::convert::{args, expect_block, expect_map, expect_string, expect_value, expect_word};
use crate::effect::Flow;
use crate::env::Environment;
use crate::value::Value;
use std::collections::HashMap;

fn map_cmd(_env: &mut Environment, call_args: &[Value]) -> Value {
    let mut entries = HashMap::new();
    let mut i = 1;
    while i < call_args.len() {
        let key = expect_string(&call_args[i - 1]);
        entries.insert(key, call_args[i].clone());
        i += 2;
    }
    Value::map(entries)
}

fn mget(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 2) {
        return Value::from_error(e);
    }
    let map = match expect_map(&call_args[0]) {
        Ok(m) => m,
        Err(e) => return Value::from_error(e),
    };
    let key = expect_string(&call_args[1]);
    match map.borrow().get(&key) {
        Some(v) => v.clone(),
        None => Value::nil(),
    }
}

fn mset(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 3) {
        return Value::from_error(e);
    }
    let map = match expect_map(&call_args[0]) {
        Ok(m) => m,
        Err(e) => return Value::from_error(e),
    };
    let key = expect_string(&call_args[1]);
    let value = expect_value(&call_args[2]);
    map.borrow_mut().insert(key.clone(), value);
    map.borrow().get(&key).cloned().unwrap_or_else(Value::nil)
}

fn mkeys(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    let map = match expect_map(&call_args[0]) {
        Ok(m) => m,
        Err(e) => return Value::from_error(e),
    };
    Value::list(map.borrow().keys().map(|k| Value::string(k.clone())).collect())
}

fn meach(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 4) {
        return Value::from_error(e);
    }
    let map = match expect_map(&call_args[0]) {
        Ok(m) => m,
        Err(e) => return Value::from_error(e),
    };
    let key = match expect_word(&call_args[1]) {
        Ok(w) => w,
        Err(e) => return Value::from_error(e),
    };
    let name = match expect_word(&call_args[2]) {
        Ok(w) => w,
        Err(e) => return Value::from_error(e),
    };
    let block = match expect_block(&call_args[3]) {
        Ok(b) => b,
        Err(e) => return Value::from_error(e),
    };
    let entries: Vec<(String, Value)> = map
        .borrow()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    for (k, v) in entries {
        env.define(&key, Value::string(k), 0);
        env.define(&name, v, 0);
        let result = crate::value::eval_block(&block, env, call_args);
        if result.flow() > Flow::Normal {
            return result;
        }
    }
    call_args[0].clone()
}

pub fn register(env: &mut Environment) {
    super::register(env, "map", map_cmd, "creates a new map from alternating key/value arguments");
    super::register(env, "mget", mget, "gets a value from a map by key");
    super::register(env, "mset", mset, "sets a value in a map by key and value");
    super::register(env, "mkeys", mkeys, "returns all keys of a map as an unsorted list");
    super::register(env, "meach", meach, "calls block $4 for each entry in the map");
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
    fn map_cmd_builds_from_alternating_pairs() {
        let mut env = env();
        let m = map_cmd(&mut env, &[Value::string("a"), Value::Int(1), Value::string("b"), Value::Int(2)]);
        match m {
            Value::Map(m) => assert_eq!(m.borrow().len(), 2),
            other => panic!("expected Map, got {other:?}"),
        }
    }

    #[test]
    fn mset_mutates_through_every_alias() {
        let mut env = env();
        let original = map_cmd(&mut env, &[]);
        let alias = original.clone();
        mset(&mut env, &[original, Value::string("k"), Value::Int(7)]);
        match mget(&mut env, &[alias, Value::string("k")]) {
            Value::Int(n) => assert_eq!(n, 7),
            other => panic!("expected Int(7), got {other:?}"),
        }
    }

    #[test]
    fn mget_missing_key_returns_nil() {
        let mut env = env();
        let m = map_cmd(&mut env, &[]);
        assert!(mget(&mut env, &[m, Value::string("absent")]).is_nil());
    }
}
