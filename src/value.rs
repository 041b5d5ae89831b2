// ABOUTME: the Value enum - TGTL's single sum type, doubling as AST node and runtime value.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::effect::Flow;
use crate::env::Environment;
use crate::error::TgtlError;

pub type ProcFn = fn(&mut Environment, &[Value]) -> Value;

/// `order p1 p2 ...` - one statement.
#[derive(Debug)]
pub struct CommandNode {
    pub order: Value,
    pub parameters: Vec<Value>,
}

/// `{ s1 ; s2 ; ... }` - a lazily-passed sequence of statements.
#[derive(Debug)]
pub struct BlockNode {
    pub statements: Vec<Value>,
}

/// A user-defined procedure built by the `to` command.
#[derive(Debug)]
pub struct DefinedNode {
    pub name: String,
    pub params: Vec<String>,
    pub block: Rc<BlockNode>,
}

/// A host-side polymorphic object with dynamic method dispatch.
#[derive(Debug)]
pub struct WrapperNode {
    pub kind: String,
    pub handle: Value,
    pub methods: RefCell<HashMap<String, Value>>,
}

/// A `Wrapper` plus its own fields and embedded values.
#[derive(Debug)]
pub struct ObjectNode {
    pub wrapper: WrapperNode,
    pub fields: RefCell<HashMap<String, Value>>,
    pub embedded: RefCell<HashMap<String, Value>>,
}

/// The unified value/AST type. `List` and `Map` are shared by reference
/// (`Rc<RefCell<..>>`) so that `lset`/`mset`/`ladd` mutations are observable
/// through every alias, per the language's "no defensive copying" rule.
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    String(Rc<str>),
    Word(Rc<str>),
    Type(Rc<str>),
    Comment(Rc<str>),
    Error(Rc<TgtlError>),
    List(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<HashMap<String, Value>>>),
    Getter(Box<Value>),
    Command(Rc<CommandNode>),
    Evaluation(Rc<CommandNode>),
    Block(Rc<BlockNode>),
    Defined(Rc<DefinedNode>),
    Proc(ProcFn),
    Wrapper(Rc<WrapperNode>),
    Object(Rc<ObjectNode>),
    Overload(Rc<RefCell<HashMap<String, Value>>>),
    Return(Box<Value>),
    Break(Box<Value>),
    Rescue(Rc<BlockNode>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Rc::from(s.into()))
    }

    pub fn word(s: impl Into<String>) -> Value {
        Value::Word(Rc::from(s.into()))
    }

    pub fn type_value(s: impl Into<String>) -> Value {
        Value::Type(Rc::from(s.into()))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn map(entries: HashMap<String, Value>) -> Value {
        Value::Map(Rc::new(RefCell::new(entries)))
    }

    /// There is no dedicated "nil" variant in the data model (see SPEC_FULL.md
    /// §3); the absent/"no value" case is represented by the word `nil`,
    /// matching the language's own `!nil` vocabulary for a missing value.
    pub fn nil() -> Value {
        Value::word("nil")
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Word(w) if &**w == "nil")
    }

    pub fn error(message: impl Into<String>, index: i64) -> Value {
        Value::Error(Rc::new(TgtlError::at(message, index)))
    }

    pub fn from_error(err: TgtlError) -> Value {
        Value::Error(Rc::new(err))
    }

    pub fn bool_value(b: bool) -> Value {
        Value::Bool(b)
    }

    /// Only `Block` is lazy: it is passed through unevaluated when collected
    /// into a list instead of being evaluated eagerly.
    pub fn is_lazy(&self) -> bool {
        matches!(self, Value::Block(_))
    }

    pub fn flow(&self) -> Flow {
        match self {
            Value::Error(_) => Flow::Fail,
            Value::Break(_) => Flow::Break,
            Value::Return(_) => Flow::Return,
            _ => Flow::Normal,
        }
    }

    /// Unwraps the payload an effect is carrying. Non-effect values unwrap
    /// to a clone of themselves; `Error` unwraps to itself (the error value
    /// *is* its own payload).
    pub fn unwrap_effect(&self) -> Value {
        match self {
            Value::Break(v) | Value::Return(v) => (**v).clone(),
            _ => self.clone(),
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Int(_) => "Int".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::String(_) => "String".to_string(),
            Value::Word(_) => "Word".to_string(),
            Value::Type(_) => "Type".to_string(),
            Value::Comment(_) => "Comment".to_string(),
            Value::Error(_) => "Error".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Map(_) => "Map".to_string(),
            Value::Getter(_) => "Getter".to_string(),
            Value::Command(_) => "Command".to_string(),
            Value::Evaluation(_) => "Evaluation".to_string(),
            Value::Block(_) => "Block".to_string(),
            Value::Defined(_) => "Defined".to_string(),
            Value::Proc(_) => "Proc".to_string(),
            Value::Wrapper(w) => w.kind.clone(),
            Value::Object(o) => o.wrapper.kind.clone(),
            Value::Overload(_) => "Overload".to_string(),
            Value::Return(_) => "Return".to_string(),
            Value::Break(_) => "Break".to_string(),
            Value::Rescue(_) => "Rescue".to_string(),
        }
    }

    pub fn type_of(&self) -> Value {
        Value::type_value(self.type_name())
    }

    /// Evaluates this value, carrying `args` through to positions that
    /// require them (see SPEC_FULL.md §4.3 for the per-variant rules).
    pub fn eval(&self, env: &mut Environment, args: &[Value]) -> Value {
        match self {
            Value::Int(_)
            | Value::Bool(_)
            | Value::String(_)
            | Value::Word(_)
            | Value::Type(_)
            | Value::Error(_)
            | Value::Map(_) => self.clone(),
            Value::Comment(_) => Value::nil(),
            Value::List(items) => eval_value_list(&items.borrow(), env, args),
            Value::Getter(key) => eval_getter(key, env),
            Value::Command(node) => eval_command(node, env, args),
            Value::Evaluation(node) => eval_evaluation(node, env, args),
            Value::Block(node) => eval_block(node, env, args),
            Value::Defined(node) => eval_defined(node, env, args),
            Value::Proc(f) => f(env, args),
            Value::Wrapper(node) => eval_wrapper(node, env, args),
            Value::Object(node) => eval_object(node, env, args),
            Value::Overload(table) => eval_overload(table, env, args),
            // Break/Return embed their inner value in the reference
            // implementation, which promotes the inner value's Eval method;
            // mirror that by delegating straight through.
            Value::Break(inner) => inner.eval(env, args),
            Value::Return(inner) => inner.eval(env, args),
            Value::Rescue(block) => eval_rescue(block, env, args),
        }
    }

    pub fn as_name(&self) -> String {
        self.to_string()
    }

    pub fn list_items(&self) -> Vec<Value> {
        match self {
            Value::List(items) => items.borrow().clone(),
            other => vec![other.clone()],
        }
    }
}

fn eval_value_list(items: &[Value], env: &mut Environment, args: &[Value]) -> Value {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if item.is_lazy() {
            out.push(item.clone());
            continue;
        }
        let evaluated = item.eval(env, args);
        if evaluated.flow() > Flow::Normal {
            return evaluated;
        }
        out.push(evaluated);
    }
    Value::list(out)
}

fn eval_getter(key: &Value, env: &mut Environment) -> Value {
    let key_val = key.eval(env, &[]);
    if key_val.flow() > Flow::Normal {
        return key_val;
    }
    let name = key_val.as_name();
    match env.lookup(&name) {
        Some(v) => v,
        None => Value::error(format!("undefined variable: {name}"), -1),
    }
}

fn eval_command(node: &CommandNode, env: &mut Environment, args: &[Value]) -> Value {
    let order_val = node.order.eval(env, &[]);
    if order_val.flow() > Flow::Normal {
        return order_val;
    }
    let name = order_val.as_name();
    let callee = match env.lookup(&name) {
        Some(v) => v,
        None => return Value::error(format!("Cannot evaluate nil order: {name}"), -1),
    };
    match env.push() {
        Err(e) => env.rescue(Value::from_error(e)),
        Ok(()) => {
            let eargs = eval_value_list(&node.parameters, env, args);
            let result = if eargs.flow() > Flow::Normal {
                eargs
            } else {
                callee.eval(env, &eargs.list_items())
            };
            env.pop();
            result
        }
    }
}

fn eval_evaluation(node: &CommandNode, env: &mut Environment, args: &[Value]) -> Value {
    match env.push() {
        Err(e) => Value::from_error(e),
        Ok(()) => {
            let result = eval_command(node, env, args);
            env.pop();
            result
        }
    }
}

pub fn eval_block(node: &BlockNode, env: &mut Environment, args: &[Value]) -> Value {
    for (i, a) in args.iter().enumerate() {
        env.define(&(i + 1).to_string(), a.clone(), 0);
    }
    env.define("argc", Value::Int(args.len() as i64), 0);
    env.define("argv", Value::list(args.to_vec()), 0);

    let mut result = Value::nil();
    for statement in &node.statements {
        result = statement.eval(env, args);
        match result.flow() {
            Flow::Normal => {
                env.define("RESULT", result.clone(), 0);
            }
            Flow::Break => return result.unwrap_effect(),
            Flow::Fail => return env.rescue(result),
            Flow::Return => return result,
        }
    }
    result
}

/// Executes a user-defined procedure: pushes a frame, binds each parameter
/// positionally plus `"0"` to the procedure's own name, evaluates the body,
/// and unwraps a `Return` flow (a `return` statement ends the call, not the
/// caller).
fn eval_defined(node: &Rc<DefinedNode>, env: &mut Environment, args: &[Value]) -> Value {
    match env.push() {
        Err(e) => env.rescue(Value::from_error(e)),
        Ok(()) => {
            if args.len() < node.params.len() {
                let result = env.fail_string("Not enough arguments", args);
                env.pop();
                return env.rescue(result);
            }
            for (p, a) in node.params.iter().zip(args.iter()) {
                env.define(p, a.clone(), 0);
            }
            env.define("0", Value::string(node.name.clone()), 0);
            let result = eval_block(&node.block, env, args);
            env.pop();
            match result.flow() {
                Flow::Return => result.unwrap_effect(),
                _ => result,
            }
        }
    }
}

fn eval_wrapper(node: &Rc<WrapperNode>, env: &mut Environment, args: &[Value]) -> Value {
    dispatch_method(&node.methods, Value::Wrapper(node.clone()), args, env)
}

fn eval_object(node: &Rc<ObjectNode>, env: &mut Environment, args: &[Value]) -> Value {
    dispatch_method(&node.wrapper.methods, Value::Object(node.clone()), args, env)
}

fn dispatch_method(
    methods: &RefCell<HashMap<String, Value>>,
    receiver: Value,
    args: &[Value],
    env: &mut Environment,
) -> Value {
    let name = match args.first() {
        Some(Value::Word(w)) => w.to_string(),
        _ => return Value::error("method name must be a Word", -1),
    };
    let method = match methods.borrow().get(&name) {
        Some(m) => m.clone(),
        None => return Value::error(format!("No such method {name}"), -1),
    };
    let mut call_args = args.to_vec();
    call_args[0] = receiver;
    method.eval(env, &call_args)
}

fn eval_overload(
    table: &Rc<RefCell<HashMap<String, Value>>>,
    env: &mut Environment,
    args: &[Value],
) -> Value {
    let signature = signature_of(args);
    let target = table.borrow().get(&signature).cloned();
    match target {
        Some(t) => t.eval(env, args),
        None => Value::error(format!("No overload defined for signature: {signature}"), -1),
    }
}

pub fn signature_of(args: &[Value]) -> String {
    let mut sig = String::new();
    for arg in args {
        sig.push('_');
        sig.push_str(arg.type_name());
    }
    sig
}

fn eval_rescue(block: &Rc<BlockNode>, env: &mut Environment, args: &[Value]) -> Value {
    // Depth protection is deliberately ignored here so a rescuer can always
    // run, even when the failure that triggered it was itself a stack
    // overflow.
    env.push_force();
    env.set_rescuing(true);
    let _ = env.printi("Rescuing.\n", &[]);
    let result = eval_block(block, env, args);
    env.pop();
    env.set_rescuing(false);
    result
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::String(s) => write!(f, "{s}"),
            Value::Word(w) => write!(f, "{w}"),
            Value::Type(t) => write!(f, "{t}"),
            Value::Comment(c) => write!(f, "{c}"),
            Value::Error(e) => write!(f, "{}", e.message),
            Value::List(items) => display_list(f, &items.borrow()),
            Value::Map(map) => display_map(f, &map.borrow()),
            Value::Getter(key) => write!(f, "{key}"),
            Value::Command(node) | Value::Evaluation(node) => {
                write!(f, "{}", node.order)?;
                write!(f, " ")?;
                display_list(f, &node.parameters)
            }
            Value::Block(node) => {
                write!(f, "{{")?;
                display_list(f, &node.statements)?;
                write!(f, "}}")
            }
            Value::Defined(node) => {
                write!(f, "to {} (", node.name)?;
                let params: Vec<Value> = node.params.iter().map(|p| Value::word(p.clone())).collect();
                display_list(f, &params)?;
                write!(f, ") ")?;
                write!(f, "{{")?;
                display_list(f, &node.block.statements)?;
                write!(f, "}}")
            }
            Value::Proc(_) => write!(f, "proc"),
            Value::Wrapper(node) => {
                write!(f, "[interface {} ", node.kind)?;
                display_method_map(f, &node.methods.borrow())?;
                write!(f, "]")
            }
            Value::Object(node) => {
                write!(f, "[struct {} ", node.wrapper.kind)?;
                display_method_map(f, &node.wrapper.methods.borrow())?;
                write!(f, " ")?;
                display_method_map(f, &node.fields.borrow())?;
                write!(f, " ")?;
                display_method_map(f, &node.embedded.borrow())?;
                write!(f, "]")
            }
            Value::Overload(table) => display_map(f, &table.borrow()),
            Value::Return(inner) | Value::Break(inner) => write!(f, "{inner}"),
            Value::Rescue(block) => {
                write!(f, "{{")?;
                display_list(f, &block.statements)?;
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

fn display_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    write!(f, "[list")?;
    for item in items {
        write!(f, " {item}")?;
    }
    write!(f, "]")
}

fn display_map(f: &mut fmt::Formatter<'_>, map: &HashMap<String, Value>) -> fmt::Result {
    write!(f, "[map")?;
    for (k, v) in map {
        write!(f, " {k} {v}")?;
    }
    write!(f, "]")
}

fn display_method_map(f: &mut fmt::Formatter<'_>, map: &HashMap<String, Value>) -> fmt::Result {
    display_map(f, map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;

    #[test]
    fn int_and_bool_display() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }

    #[test]
    fn string_and_word_display_bare() {
        assert_eq!(Value::string("hello").to_string(), "hello");
        assert_eq!(Value::word("add").to_string(), "add");
    }

    #[test]
    fn list_display_uses_list_command_form() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(list.to_string(), "[list 1 2]");
    }

    #[test]
    fn self_evaluating_values_eval_to_themselves() {
        let mut env = Environment::new();
        match Value::Int(7).eval(&mut env, &[]) {
            Value::Int(n) => assert_eq!(n, 7),
            other => panic!("expected Int, got {other:?}"),
        }
    }

    #[test]
    fn comment_evaluates_to_nil() {
        let mut env = Environment::new();
        let result = Value::Comment(Rc::from("# hi")).eval(&mut env, &[]);
        assert!(result.is_nil());
    }

    #[test]
    fn list_eval_expands_elements_but_passes_blocks_through() {
        let mut env = Environment::new();
        env.push().unwrap();
        env.define("x", Value::Int(5), 0);
        let getter = Value::Getter(Box::new(Value::word("x")));
        let block = Value::Block(Rc::new(BlockNode { statements: vec![] }));
        let list = Value::list(vec![getter, block]);
        match list.eval(&mut env, &[]) {
            Value::List(items) => {
                let items = items.borrow();
                match &items[0] {
                    Value::Int(n) => assert_eq!(*n, 5),
                    other => panic!("expected Int, got {other:?}"),
                }
                assert!(matches!(items[1], Value::Block(_)));
            }
            other => panic!("expected List, got {other:?}"),
        }
    }

    #[test]
    fn getter_on_missing_name_is_a_fail_flow_error() {
        let mut env = Environment::new();
        let getter = Value::Getter(Box::new(Value::word("nope")));
        let result = getter.eval(&mut env, &[]);
        assert_eq!(result.flow(), Flow::Fail);
    }

    #[test]
    fn overload_dispatch_builds_underscore_joined_signature() {
        let args = vec![Value::string("a"), Value::string("b")];
        assert_eq!(signature_of(&args), "_String_String");
    }

    #[test]
    fn defined_eval_binds_params_and_runs_body() {
        let mut env = Environment::new();
        env.push().unwrap();
        let block = Rc::new(BlockNode {
            statements: vec![Value::Getter(Box::new(Value::word("x")))],
        });
        let proc = Value::Defined(Rc::new(DefinedNode {
            name: "identity".to_string(),
            params: vec!["x".to_string()],
            block,
        }));
        match proc.eval(&mut env, &[Value::Int(99)]) {
            Value::Int(n) => assert_eq!(n, 99),
            other => panic!("expected Int(99), got {other:?}"),
        }
    }

    #[test]
    fn defined_eval_fails_with_too_few_arguments() {
        let mut env = Environment::new();
        env.push().unwrap();
        let block = Rc::new(BlockNode { statements: vec![] });
        let proc = Value::Defined(Rc::new(DefinedNode {
            name: "needs_one".to_string(),
            params: vec!["x".to_string()],
            block,
        }));
        let result = proc.eval(&mut env, &[]);
        assert_eq!(result.flow(), Flow::Fail);
    }

    #[test]
    fn defined_eval_unwraps_a_return_statement() {
        let mut env = Environment::new();
        env.push().unwrap();
        let block = Rc::new(BlockNode {
            statements: vec![Value::Return(Box::new(Value::Int(5)))],
        });
        let proc = Value::Defined(Rc::new(DefinedNode {
            name: "five".to_string(),
            params: vec![],
            block,
        }));
        match proc.eval(&mut env, &[]) {
            Value::Int(n) => assert_eq!(n, 5),
            other => panic!("expected Int(5), got {other:?}"),
        }
    }

    #[test]
    fn return_and_break_unwrap_their_payload() {
        let inner = Value::Int(9);
        let ret = Value::Return(Box::new(inner.clone()));
        let brk = Value::Break(Box::new(inner));
        match ret.unwrap_effect() {
            Value::Int(n) => assert_eq!(n, 9),
            other => panic!("expected Int, got {other:?}"),
        }
        match brk.unwrap_effect() {
            Value::Int(n) => assert_eq!(n, 9),
            other => panic!("expected Int, got {other:?}"),
        }
    }
}
