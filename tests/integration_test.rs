// ABOUTME: end-to-end scenarios - parse a script, evaluate it, assert on writer output.

use std::cell::RefCell;
use std::rc::Rc;

use tgtl::env::Environment;
use tgtl::value::Value;
use tgtl::{builtins, parser};

fn fresh_env() -> (Environment, Rc<RefCell<Vec<u8>>>) {
    let buf = Rc::new(RefCell::new(Vec::new()));
    let mut env = Environment::with_writer(buf.clone());
    env.push().expect("fresh environment always has room for its first frame");
    builtins::register_builtins(&mut env);
    builtins::register_turing_complete_builtins(&mut env);
    (env, buf)
}

fn run(env: &mut Environment, src: &str) -> Value {
    let parsed = parser::parse_script(src).expect("script should parse");
    parsed.eval(env, &[])
}

fn written(buf: &Rc<RefCell<Vec<u8>>>) -> String {
    String::from_utf8(buf.borrow().clone()).unwrap()
}

#[test]
fn scenario_print_writes_its_argument() {
    let (mut env, buf) = fresh_env();
    run(&mut env, r#"print "Hello world!""#);
    assert_eq!(written(&buf), "Hello world!");
}

#[test]
fn scenario_defined_procedure_calls_builtin_arithmetic() {
    let (mut env, buf) = fresh_env();
    run(&mut env, "to add a b { ret [iadd $a $b] } ; print [add 3 4]");
    assert_eq!(written(&buf), "7");
}

#[test]
fn scenario_while_loop_counts_up() {
    let (mut env, buf) = fresh_env();
    run(
        &mut env,
        "let x 0 ; while {ilt [get x] 5} {set x [iadd [get x] 1]} ; print [get x]",
    );
    assert_eq!(written(&buf), "5");
}

#[test]
fn scenario_rescue_catches_a_fail_and_skips_the_rest() {
    let (mut env, buf) = fresh_env();
    let result = run(&mut env, r#"rescue {ret "caught"} ; fail "boom" ; print "unreached""#);
    match result.unwrap_effect() {
        Value::String(s) => assert_eq!(&*s, "caught"),
        other => panic!("expected String(\"caught\"), got {other:?}"),
    }
    assert_eq!(written(&buf), "");
}

#[test]
fn scenario_overload_dispatches_by_argument_types() {
    let (mut env, buf) = fresh_env();
    run(&mut env, "overload add iadd Int Int ; print [add 2 3]");
    assert_eq!(written(&buf), "5");

    let failure = run(&mut env, r#"add "a" "b""#);
    match failure {
        Value::Error(e) => assert_eq!(e.message, "No overload defined for signature: _String_String"),
        other => panic!("expected Error, got {other:?}"),
    }
}

#[test]
fn scenario_map_literal_and_mget_round_trip() {
    let (mut env, buf) = fresh_env();
    run(&mut env, r#"let m [map k "v"] ; print [mget $m "k"]"#);
    assert_eq!(written(&buf), "v");
}

#[test]
fn break_inside_while_yields_its_payload_as_the_loop_result() {
    let (mut env, _buf) = fresh_env();
    let result = run(
        &mut env,
        r#"let x 0 ; while {true} { set x [iadd [get x] 1] ; if [ieq $x 3] { break "stopped" } }"#,
    );
    match result {
        Value::String(s) => assert_eq!(&*s, "stopped"),
        other => panic!("expected String(\"stopped\"), got {other:?}"),
    }
}

#[test]
fn multiple_statements_separated_by_semicolons_run_in_order() {
    let (mut env, buf) = fresh_env();
    run(&mut env, r#"print "a" ; print "b" ; print "c""#);
    assert_eq!(written(&buf), "abc");
}

#[test]
fn division_by_zero_fails_with_the_documented_message() {
    let (mut env, _buf) = fresh_env();
    // Trailing newline: a bare integer literal running to true EOF with no
    // terminator is itself a parse error.
    let result = run(&mut env, "idiv 4 0\n");
    match result {
        Value::Error(e) => assert_eq!(e.message, "division by 0"),
        other => panic!("expected Error, got {other:?}"),
    }
}

#[test]
fn recursive_procedure_computes_factorial() {
    let (mut env, buf) = fresh_env();
    run(
        &mut env,
        "to fact n { if [ieq $n 0] { ret 1 } { ret [imul $n [fact [isub $n 1]]] } } ; print [fact 5]",
    );
    assert_eq!(written(&buf), "120");
}
