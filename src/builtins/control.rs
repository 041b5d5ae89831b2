// ABOUTME: control-flow commands - if, switch, while, to, do, ret/return, break, fail, rescue, nop, isnil.

use std::rc::Rc;

use crate::convert::{args, expect_block, expect_list, expect_word, to_bool};
use crate::effect::Flow;
use crate::env::Environment;
use crate::value::{eval_block, DefinedNode, Value};

/// `if cond thenBlock` or `if cond thenBlock else elseBlock`. The `else`
/// keyword may be skipped: a bare third Block argument is also accepted as
/// the else branch, matching the looser arity the reference grammar allows.
fn if_(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 2) {
        return Value::from_error(e);
    }
    let else_index = if call_args.len() >= 4 {
        match expect_word(&call_args[2]) {
            Ok(w) if w == "else" => Some(3),
            _ => None,
        }
    } else if call_args.len() == 3 {
        Some(2)
    } else {
        None
    };

    if to_bool(&call_args[0]) {
        match expect_block(&call_args[1]) {
            Ok(b) => eval_block(&b, env, call_args),
            Err(e) => Value::from_error(e),
        }
    } else if let Some(idx) = else_index {
        match expect_block(&call_args[idx]) {
            Ok(b) => eval_block(&b, env, call_args),
            Err(e) => Value::from_error(e),
        }
    } else {
        Value::nil()
    }
}

/// `switch target case1 block1 case2 block2 ... "default" blockD`. A case
/// label named `default` is matched by ordinary string equality against
/// `target`, exactly like any other case - it is not a catch-all.
fn switch_(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    let target = call_args[0].to_string();
    let mut i = 1;
    while i + 1 < call_args.len() {
        if call_args[i].to_string() == target {
            return match expect_block(&call_args[i + 1]) {
                Ok(b) => eval_block(&b, env, call_args),
                Err(e) => Value::from_error(e),
            };
        }
        i += 2;
    }
    Value::nil()
}

/// `while condBlock bodyBlock`. Requires exactly 2 Block arguments - the
/// arity message says "2 arguments", not the reference implementation's
/// "3", which never matched the check it actually performs.
pub fn while_(env: &mut Environment, call_args: &[Value]) -> Value {
    if call_args.len() != 2 {
        return env.fail_string("while needs exactly 2 arguments", &[]);
    }
    let cond_block = match expect_block(&call_args[0]) {
        Ok(b) => b,
        Err(e) => return Value::from_error(e),
    };
    let body_block = match expect_block(&call_args[1]) {
        Ok(b) => b,
        Err(e) => return Value::from_error(e),
    };
    loop {
        let cond_result = eval_block(&cond_block, env, call_args);
        if cond_result.flow() > Flow::Normal {
            return cond_result;
        }
        if !to_bool(&cond_result) {
            return Value::nil();
        }
        let body_result = eval_block(&body_block, env, call_args);
        match body_result.flow() {
            Flow::Break => return body_result.unwrap_effect(),
            Flow::Return | Flow::Fail => return body_result,
            Flow::Normal => {}
        }
    }
}

/// `to name (param...) block` defines a procedure and binds it one frame
/// below this command's own (level 1, the caller's frame) - see
/// `builtins::variables::let_cmd` for the same binding-level rule.
fn to(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 3) {
        return Value::from_error(e);
    }
    let name = call_args[0].to_string();
    let param_list = match expect_list(&call_args[1]) {
        Ok(l) => l,
        Err(e) => return Value::from_error(e),
    };
    let mut params = Vec::with_capacity(param_list.borrow().len());
    for p in param_list.borrow().iter() {
        match expect_word(p) {
            Ok(w) => params.push(w),
            Err(e) => return Value::from_error(e),
        }
    }
    let block = match expect_block(&call_args[2]) {
        Ok(b) => b,
        Err(e) => return Value::from_error(e),
    };
    let defined = Value::Defined(Rc::new(DefinedNode {
        name: name.clone(),
        params,
        block,
    }));
    env.define(&name, defined, 1)
}

/// Runs a Block immediately in the current frame, with no parameter binding
/// beyond what `eval_block` itself always does.
fn do_(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    match expect_block(&call_args[0]) {
        Ok(b) => eval_block(&b, env, call_args),
        Err(e) => Value::from_error(e),
    }
}

fn ret(_env: &mut Environment, call_args: &[Value]) -> Value {
    let v = call_args.first().cloned().unwrap_or_else(Value::nil);
    Value::Return(Box::new(v))
}

fn break_cmd(_env: &mut Environment, call_args: &[Value]) -> Value {
    let v = call_args.first().cloned().unwrap_or_else(Value::nil);
    Value::Break(Box::new(v))
}

/// `fail msg arg...` interpolates `arg...` into `msg` and raises it as a
/// fail-flow `Error`.
fn fail_cmd(env: &mut Environment, call_args: &[Value]) -> Value {
    if call_args.is_empty() {
        return env.fail_string("fail", &[]);
    }
    let msg = call_args[0].to_string();
    let extra = call_args[1..].to_vec();
    env.fail_string(&msg, &extra)
}

/// `rescue block` installs `block` as the handler for any fail-flow error
/// raised within the calling frame.
fn rescue_cmd(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    match expect_block(&call_args[0]) {
        Ok(b) => env.prevent(b),
        Err(e) => Value::from_error(e),
    }
}

fn nop(_env: &mut Environment, _call_args: &[Value]) -> Value {
    Value::nil()
}

fn isnil(_env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return Value::from_error(e);
    }
    Value::Bool(call_args[0].is_nil())
}

pub fn register(env: &mut Environment) {
    super::register(env, "if", if_, "evaluates $2 when $1 is true, otherwise the else branch if any");
    super::register(env, "switch", switch_, "evaluates the block whose case label equals $1");
    super::register(env, "to", to, "defines a procedure named $1 with parameters $2 and body $3");
    super::register(env, "do", do_, "immediately evaluates the block $1 in the current frame");
    super::register(env, "ret", ret, "ends the enclosing call, yielding $1 as its result");
    super::register(env, "return", ret, "alias for ret");
    super::register(env, "break", break_cmd, "ends the enclosing loop, yielding $1 as its result");
    super::register(env, "fail", fail_cmd, "raises $1 (interpolated against the rest of the arguments) as an error");
    super::register(env, "rescue", rescue_cmd, "installs $1 as the error handler for the calling frame");
    super::register(env, "nop", nop, "does nothing");
    super::register(env, "isnil", isnil, "checks if $1 is the nil word");
}
