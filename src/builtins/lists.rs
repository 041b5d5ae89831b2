// ABOUTME: list construction, indexing, iteration and slicing commands.

use crate::convert::{args, expect_block, expect_list, expect_value, expect_word, to_int};
use crate::effect::Flow;
use crate::env::Environment;
use crate::support;
use crate::value::Value;

fn list_cmd(_env: &mut Environment, call_args: &[Value]) -> Value {
    Value::list(call_args.to_vec())
}

fn ladd(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 2) {
        return Value::from_error(e);
    }
    let list = match expect_list(&call_args[0]) {
        Ok(l) => l,
        Err(e) => return Value::from_error(e),
    };
    let mut items = list.borrow().clone();
    items.push(expect_value(&call_args[1]));
    Value::list(items)
}

fn lget(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 2) {
        return Value::from_error(e);
    }
    let list = match expect_list(&call_args[0]) {
        Ok(l) => l,
        Err(e) => return Value::from_error(e),
    };
    let index = match to_int(&call_args[1]) {
        Ok(n) => n,
        Err(e) => return Value::from_error(e),
    };
    let items = list.borrow();
    if index < 0 || index as usize >= items.len() {
        return Value::error("index out of range", -1);
    }
    items[index as usize].clone()
}

fn lset(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 3) {
        return Value::from_error(e);
    }
    let list = match expect_list(&call_args[0]) {
        Ok(l) => l,
        Err(e) => return Value::from_error(e),
    };
    let index = match to_int(&call_args[1]) {
        Ok(n) => n,
        Err(e) => return Value::from_error(e),
    };
    let mut items = list.borrow_mut();
    if index < 0 || index as usize >= items.len() {
        return Value::error("index out of range", -1);
    }
    items[index as usize] = expect_value(&call_args[2]);
    items[index as usize].clone()
}

fn llen(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    let list = match expect_list(&call_args[0]) {
        Ok(l) => l,
        Err(e) => return Value::from_error(e),
    };
    Value::Int(list.borrow().len() as i64)
}

fn lsort(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    let list = match expect_list(&call_args[0]) {
        Ok(l) => l,
        Err(e) => return Value::from_error(e),
    };
    let sorted = support::sort_strings(&list.borrow());
    Value::list(sorted)
}

fn leach(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 4) {
        return Value::from_error(e);
    }
    let list = match expect_list(&call_args[0]) {
        Ok(l) => l,
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
    let items = list.borrow().clone();
    for (i, v) in items.into_iter().enumerate() {
        env.define(&key, Value::Int(i as i64), 0);
        env.define(&name, v, 0);
        let result = crate::value::eval_block(&block, env, call_args);
        if result.flow() > Flow::Normal {
            return result;
        }
    }
    call_args[0].clone()
}

/// Slices `list` from `from` to `to`, `to` exclusive - matching the
/// reference's `list[from:to]`. Negative bounds wrap from the end of the
/// list independently for both `from` and `to` - a deliberate fix of the
/// reference implementation, which only ever re-derives `from` on the `to <
/// 0` branch.
fn lslice(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 3) {
        return Value::from_error(e);
    }
    let list = match expect_list(&call_args[0]) {
        Ok(l) => l,
        Err(e) => return Value::from_error(e),
    };
    let mut from = match to_int(&call_args[1]) {
        Ok(n) => n,
        Err(e) => return Value::from_error(e),
    };
    let mut to = match to_int(&call_args[2]) {
        Ok(n) => n,
        Err(e) => return Value::from_error(e),
    };
    let items = list.borrow();
    let length = items.len() as i64;
    if length == 0 {
        return Value::list(Vec::new());
    }
    if from < 0 {
        from += length;
    }
    if to < 0 {
        to += length;
    }
    if from >= length {
        from = length - 1;
    }
    if to >= length {
        to = length - 1;
    }
    if from > to {
        std::mem::swap(&mut from, &mut to);
    }
    if from < 0 {
        from = 0;
    }
    if to < 0 {
        to = 0;
    }
    Value::list(items[from as usize..to as usize].to_vec())
}

pub fn register(env: &mut Environment) {
    super::register(env, "list", list_cmd, "creates a new list");
    super::register(env, "ladd", ladd, "returns a list with $2 appended to list $1");
    super::register(env, "lget", lget, "gets a value from a list by index");
    super::register(env, "lset", lset, "sets a value in a list by index and value");
    super::register(env, "llen", llen, "returns the length of a list");
    super::register(env, "lsort", lsort, "returns list $1 sorted by string value");
    super::register(env, "leach", leach, "calls block $4 for each entry in the list");
    super::register(env, "lslice", lslice, "slices the list $1 from $2 to $3");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::BlockNode;
    use std::rc::Rc;

    fn env() -> Environment {
        let mut env = Environment::new();
        env.push().unwrap();
        env
    }

    #[test]
    fn ladd_returns_a_new_list_with_the_value_appended() {
        let mut env = env();
        let list = Value::list(vec![Value::Int(1)]);
        match ladd(&mut env, &[list, Value::Int(2)]) {
            Value::List(items) => assert_eq!(items.borrow().len(), 2),
            other => panic!("expected List, got {other:?}"),
        }
    }

    #[test]
    fn lget_out_of_range_fails() {
        let mut env = env();
        let list = Value::list(vec![Value::Int(1)]);
        let result = lget(&mut env, &[list, Value::Int(5)]);
        assert_eq!(result.flow(), Flow::Fail);
    }

    #[test]
    fn lslice_wraps_negative_bounds_independently() {
        let mut env = env();
        let list = Value::list(vec![
            Value::Int(0),
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
            Value::Int(4),
        ]);
        // from=-3 -> index 2, to=-1 -> index 4 (exclusive), i.e. [2, 3].
        // A buggy `to < 0` branch that re-derives `from` instead of `to`
        // would instead clobber `from` to 6 and panic/misbehave.
        match lslice(&mut env, &[list, Value::Int(-3), Value::Int(-1)]) {
            Value::List(items) => {
                let nums: Vec<i64> = items
                    .borrow()
                    .iter()
                    .map(|v| match v {
                        Value::Int(n) => *n,
                        _ => unreachable!(),
                    })
                    .collect();
                assert_eq!(nums, vec![2, 3]);
            }
            other => panic!("expected List, got {other:?}"),
        }
    }

    #[test]
    fn lslice_end_bound_is_exclusive() {
        let mut env = env();
        let list = Value::list(vec![
            Value::Int(0),
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
            Value::Int(4),
        ]);
        match lslice(&mut env, &[list, Value::Int(1), Value::Int(3)]) {
            Value::List(items) => {
                let nums: Vec<i64> = items
                    .borrow()
                    .iter()
                    .map(|v| match v {
                        Value::Int(n) => *n,
                        _ => unreachable!(),
                    })
                    .collect();
                assert_eq!(nums, vec![1, 2]);
            }
            other => panic!("expected List, got {other:?}"),
        }
    }

    #[test]
    fn leach_binds_index_and_value_per_iteration() {
        let mut env = env();
        let list = Value::list(vec![Value::Int(10), Value::Int(20)]);
        let block = Value::Block(Rc::new(BlockNode {
            statements: vec![Value::Getter(Box::new(Value::word("v")))],
        }));
        let result = leach(&mut env, &[list, Value::word("i"), Value::word("v"), block]);
        assert!(matches!(result, Value::List(_)));
        match env.lookup("v") {
            Some(Value::Int(n)) => assert_eq!(n, 20),
            other => panic!("expected last-bound v to be Int(20), got {other:?}"),
        }
    }
}
