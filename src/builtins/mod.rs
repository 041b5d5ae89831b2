//! # Built-in Commands Module
//!
//! Core builtins for the interpreter, organized into categories matching the
//! reference implementation's grouping.
//!
//! - **[io]**: `p`, `print`, `write` - console output
//! - **[arithmetic]**: `iadd`, `isub`, `imul`, `idiv`, `ilt`, `ile`, `igt`, `ige`, `ieq`
//! - **[logic]**: `band`, `bor`, `bxor`, `bnot`
//! - **[strings]**: `sadd`, `sget`, `slen`, `runes`, `wire`, `seq`
//! - **[lists]**: `list`, `ladd`, `lget`, `lset`, `llen`, `lsort`, `leach`, `lslice`
//! - **[maps]**: `map`, `mget`, `mset`, `mkeys`, `meach`
//! - **[variables]**: `let`, `set`, `get`, `inc`, `dec`
//! - **[types]**: `type`, `typeof`, `teq`, `str`, `int`
//! - **[control]**: `if`, `switch`, `to`, `do`, `ret`, `return`, `break`, `fail`,
//!   `rescue`, `nop`, `isnil`, and (registered separately) `while`
//! - **[reflection]**: `help`, `explain`, `overload`, `expand`, `val`
//!
//! Each category exposes a `register(env)` function that binds its commands
//! and records their one-line explanations in the `HELP` map.

use crate::env::Environment;
use crate::value::{ProcFn, Value};

pub mod arithmetic;
pub mod control;
pub mod io;
pub mod lists;
pub mod logic;
pub mod maps;
pub mod reflection;
pub mod strings;
pub mod types;
pub mod variables;

/// Binds `f` at the outermost scope under `name` and records `help` as its
/// one-line explanation by calling the `explain` builtin directly, exactly
/// as the reference implementation's `Register` does.
pub fn register(env: &mut Environment, name: &str, f: ProcFn, help: &str) {
    env.define(name, Value::Proc(f), -1);
    reflection::explain(env, &[Value::string(name), Value::string(help)]);
}

/// Registers every builtin safe to expose regardless of whether the host
/// wants a Turing-complete language (everything except `while`).
pub fn register_builtins(env: &mut Environment) {
    env.define("true", Value::Bool(true), -1);
    env.define("false", Value::Bool(false), -1);

    io::register(env);
    arithmetic::register(env);
    logic::register(env);
    strings::register(env);
    lists::register(env);
    maps::register(env);
    variables::register(env);
    types::register(env);
    control::register(env);
    reflection::register(env);
}

/// Registers the commands that make the language Turing-complete
/// (unbounded iteration). Not to be used where that is undesirable.
pub fn register_turing_complete_builtins(env: &mut Environment) {
    register(env, "while", control::while_, "executes $2 while $1 returns true");
}
