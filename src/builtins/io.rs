// ABOUTME: console output commands - p, print, write.

use crate::convert::{args, expect_string};
use crate::env::Environment;
use crate::value::Value;

/// Debug-prints every argument space-separated, followed by a newline.
fn p(env: &mut Environment, call_args: &[Value]) -> Value {
    let mut out = String::new();
    for arg in call_args {
        out.push_str(&arg.to_string());
        out.push(' ');
    }
    out.push('\n');
    let _ = env.write(&out);
    Value::nil()
}

/// Interpolates `$1`… references in `args[0]` against `args[1..]` and
/// writes the result to the current frame's writer.
fn print_cmd(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return env.fail_string("printf: ${1}", &[Value::from_error(e)]);
    }
    let msg = expect_string(&call_args[0]);
    let extra = call_args[1..].to_vec();
    match env.printi(&msg, &extra) {
        Ok(n) => Value::Int(n as i64),
        Err(e) => Value::from_error(e),
    }
}

/// Writes `args[0]`'s string form verbatim, with no interpolation.
fn write_cmd(env: &mut Environment, call_args: &[Value]) -> Value {
    if let Err(e) = args(call_args, 1) {
        return env.fail_string("write: ${1}", &[Value::from_error(e)]);
    }
    let msg = expect_string(&call_args[0]);
    match env.write(&msg) {
        Ok(n) => Value::Int(n as i64),
        Err(e) => Value::from_error(e),
    }
}

pub fn register(env: &mut Environment) {
    super::register(env, "p", p, "print debug output");
    super::register(
        env,
        "print",
        print_cmd,
        "print to the environment's current writer with interpolation",
    );
    super::register(env, "write", write_cmd, "write to the environment's current writer");
}
