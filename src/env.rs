// ABOUTME: the frame-stack Environment - scope lookup/definition, interpolation, rescue.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use crate::config::FRAMES_MAX;
use crate::effect::Flow;
use crate::error::TgtlError;
use crate::parser::{is_letter, is_number};
use crate::value::Value;

pub type SharedWriter = Rc<RefCell<dyn Write>>;

struct Frame {
    variables: HashMap<String, Value>,
    writer: Option<SharedWriter>,
    rescuer: Option<Value>,
}

impl Frame {
    fn new(writer: Option<SharedWriter>) -> Self {
        Frame {
            variables: HashMap::new(),
            writer,
            rescuer: None,
        }
    }
}

/// A stack of scopes. The topmost frame is always the currently executing
/// call's locals; frame level `0` addresses it, `-1` addresses the
/// outermost (global) frame, and positive `k` walks `k` frames down from
/// the top. See SPEC_FULL.md §9 "Frame(level) addressing" for why this
/// departs from the reference implementation's literal (and
/// self-contradictory) level arithmetic.
pub struct Environment {
    frames: Vec<Frame>,
    writer: SharedWriter,
    rescuing: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::with_writer(Rc::new(RefCell::new(io::stdout())))
    }

    pub fn with_writer(writer: SharedWriter) -> Self {
        Environment {
            frames: Vec::new(),
            writer,
            rescuing: false,
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_rescuing(&self) -> bool {
        self.rescuing
    }

    pub fn set_rescuing(&mut self, value: bool) {
        self.rescuing = value;
    }

    /// Pushes a new frame. Refuses to grow the stack (returning an error
    /// instead) once depth would meet or exceed `FRAMES_MAX`, unless a
    /// rescue is in progress - see SPEC_FULL.md §9 "stack-depth refusal".
    pub fn push(&mut self) -> Result<(), TgtlError> {
        if self.frames.len() + 1 >= FRAMES_MAX && !self.rescuing {
            return Err(TgtlError::from_string(
                "PROGRAM HAS DISAPPEARED INTO THE BLACK LAGOON - too much recursion or function calls",
            ));
        }
        self.push_force();
        Ok(())
    }

    /// Pushes unconditionally, bypassing the depth limit. Used only by the
    /// `rescue` command's own frame, so a rescuer can always run.
    pub fn push_force(&mut self) {
        let writer = self.writer.clone();
        self.frames.push(Frame::new(Some(writer)));
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    fn frame_index(&self, level: i64) -> Option<usize> {
        let len = self.frames.len();
        if len == 0 {
            return None;
        }
        if level == 0 {
            return Some(len - 1);
        }
        if level < 0 {
            return Some(0);
        }
        let idx = len as i64 - 1 - level;
        if idx < 0 {
            None
        } else {
            Some(idx as usize)
        }
    }

    fn lookup_frame(&self, name: &str) -> Option<(Value, usize)> {
        for i in (0..self.frames.len()).rev() {
            if let Some(v) = self.frames[i].variables.get(name) {
                return Some((v.clone(), i));
            }
        }
        None
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.lookup_frame(name).map(|(v, _)| v)
    }

    pub fn define(&mut self, name: &str, value: Value, level: i64) -> Value {
        match self.frame_index(level) {
            Some(idx) => {
                self.frames[idx].variables.insert(name.to_string(), value.clone());
                value
            }
            None => Value::error("no such frame available.", -1),
        }
    }

    pub fn set(&mut self, name: &str, value: Value) -> Value {
        match self.lookup_frame(name) {
            Some((_, idx)) => {
                self.frames[idx].variables.insert(name.to_string(), value.clone());
                value
            }
            None => Value::error("no such variable", -1),
        }
    }

    pub fn rescuer(&self) -> Option<Value> {
        self.frames.last().and_then(|f| f.rescuer.clone())
    }

    /// Installs `block` as the rescuer of the caller's frame (level 1).
    pub fn prevent(&mut self, block: Rc<crate::value::BlockNode>) -> Value {
        let idx = match self.frame_index(1) {
            Some(idx) => idx,
            None => return Value::error("Could not set rescuer", -1),
        };
        let old = self.frames[idx]
            .rescuer
            .clone()
            .unwrap_or_else(Value::nil);
        self.frames[idx].rescuer = Some(Value::Rescue(block));
        old
    }

    /// The handler dispatcher: routes a fail-flow result through the
    /// installed rescuer, if any, converting a successful rescue into a
    /// `Return` so it cannot re-trigger a nested rescue loop.
    pub fn rescue(&mut self, result: Value) -> Value {
        if result.flow() < Flow::Fail {
            return result;
        }
        let rescuer = match self.rescuer() {
            Some(r) => r,
            None => return result,
        };
        let unwrapped = result.unwrap_effect();
        let rescued = rescuer.eval(self, &[unwrapped, result]);
        if rescued.flow() == Flow::Normal {
            Value::Return(Box::new(rescued))
        } else {
            Value::Return(Box::new(rescued.unwrap_effect()))
        }
    }

    /// Writes `msg` verbatim, returning the number of bytes written.
    pub fn write(&mut self, msg: &str) -> Result<usize, TgtlError> {
        let writer = self
            .frames
            .last()
            .and_then(|f| f.writer.clone())
            .unwrap_or_else(|| self.writer.clone());
        writer
            .borrow_mut()
            .write_all(msg.as_bytes())
            .map_err(|e| TgtlError::from_string(format!("no writer set in environment: {e}")))?;
        Ok(msg.len())
    }

    /// Interpolates `msg` against `args` and writes the result, returning the
    /// number of bytes written.
    pub fn printi(&mut self, msg: &str, args: &[Value]) -> Result<usize, TgtlError> {
        let interpolated = self.interpolate(msg, args);
        self.write(&interpolated)
    }

    pub fn error_from_string(&mut self, msg: &str, args: &[Value]) -> TgtlError {
        TgtlError::from_string(self.interpolate(msg, args))
    }

    pub fn fail_string(&mut self, msg: &str, args: &[Value]) -> Value {
        Value::from_error(self.error_from_string(msg, args))
    }

    /// Substitutes `$name`, `${name}`, and `$$` references in `s`. Missing
    /// names are rendered as the literal four characters `!nil`.
    pub fn interpolate(&mut self, s: &str, args: &[Value]) -> String {
        for (i, a) in args.iter().enumerate() {
            self.define(&(i + 1).to_string(), a.clone(), 0);
        }
        let chars: Vec<char> = s.chars().collect();
        let mut res = String::new();
        let mut name = String::new();
        let mut in_name: i32 = 0;

        fn apply(env: &mut Environment, res: &mut String, name: &mut String) {
            match env.lookup(name) {
                Some(v) => res.push_str(&v.to_string()),
                None => res.push_str("!nil"),
            }
            name.clear();
        }

        for &r in &chars {
            match r {
                '$' => {
                    if in_name == 0 {
                        in_name = 1;
                    } else if in_name == 1 {
                        if name.is_empty() {
                            res.push('$');
                            in_name = 0;
                        } else {
                            apply(self, &mut res, &mut name);
                            in_name = 0;
                        }
                    }
                }
                '{' => {
                    if in_name > 0 {
                        in_name += 1;
                    } else {
                        res.push('{');
                    }
                }
                '}' => {
                    if in_name > 0 {
                        in_name -= 1;
                        if in_name == 1 {
                            apply(self, &mut res, &mut name);
                            in_name = 0;
                        }
                    } else {
                        res.push('}');
                    }
                }
                other => {
                    if in_name > 0 {
                        if is_number(other) || is_letter(other) {
                            name.push(other);
                        } else {
                            apply(self, &mut res, &mut name);
                            in_name = 0;
                            res.push(other);
                        }
                    } else {
                        res.push(other);
                    }
                }
            }
        }
        if !name.is_empty() {
            apply(self, &mut res, &mut name);
        }
        res
    }

    /// Tab-completion support for a host REPL: returns every bound name
    /// across all frames that starts with `prefix`, sorted, or `prefix`
    /// itself if nothing matches.
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let mut res: Vec<String> = Vec::new();
        for frame in &self.frames {
            for name in frame.variables.keys() {
                if name.starts_with(prefix) {
                    res.push(name.clone());
                }
            }
        }
        if res.is_empty() {
            res.push(prefix.to_string());
        }
        res.sort();
        res
    }

    /// Builds or augments an `Overload` table bound at the outermost scope.
    pub fn overload(&mut self, name: &str, target: Value, types: &[Value]) -> Value {
        let table = match self.lookup(name) {
            Some(Value::Overload(t)) => t,
            Some(_) => return Value::error(format!("Not a overload: {name}"), -1),
            None => Rc::new(RefCell::new(HashMap::new())),
        };
        let mut signature = String::new();
        for t in types {
            signature.push('_');
            signature.push_str(&t.to_string());
        }
        let resolved = match &target {
            Value::String(_) | Value::Word(_) => {
                self.lookup(&target.as_name()).unwrap_or_else(|| target.clone())
            }
            _ => target.clone(),
        };
        table.borrow_mut().insert(signature, resolved);
        self.define(name, Value::Overload(table.clone()), -1);
        Value::Overload(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::BlockNode;

    #[test]
    fn define_and_lookup_within_topmost_frame() {
        let mut env = Environment::new();
        env.push().unwrap();
        env.define("x", Value::Int(42), 0);
        match env.lookup("x") {
            Some(Value::Int(n)) => assert_eq!(n, 42),
            other => panic!("expected Int(42), got {other:?}"),
        }
    }

    #[test]
    fn lookup_walks_frames_top_to_bottom() {
        let mut env = Environment::new();
        env.push().unwrap();
        env.define("x", Value::Int(1), -1);
        env.push().unwrap();
        env.define("y", Value::Int(2), 0);
        assert!(env.lookup("x").is_some());
        assert!(env.lookup("y").is_some());
        env.pop();
        assert!(env.lookup("y").is_none());
        assert!(env.lookup("x").is_some());
    }

    #[test]
    fn define_at_level_zero_targets_innermost_frame_not_outermost() {
        let mut env = Environment::new();
        env.push().unwrap();
        env.push().unwrap();
        env.define("x", Value::Int(1), 0);
        env.pop();
        // x was bound in the inner (now-popped) frame, not the outer one.
        assert!(env.lookup("x").is_none());
    }

    #[test]
    fn set_rebinds_in_the_frame_that_holds_the_name() {
        let mut env = Environment::new();
        env.push().unwrap();
        env.define("x", Value::Int(1), -1);
        env.push().unwrap();
        env.set("x", Value::Int(2));
        env.pop();
        match env.lookup("x") {
            Some(Value::Int(n)) => assert_eq!(n, 2),
            other => panic!("expected Int(2), got {other:?}"),
        }
    }

    #[test]
    fn set_on_unbound_name_fails() {
        let mut env = Environment::new();
        env.push().unwrap();
        let result = env.set("never_defined", Value::Int(1));
        assert_eq!(result.flow(), Flow::Fail);
    }

    #[test]
    fn push_refuses_growth_past_frames_max_outside_rescue() {
        let mut env = Environment::new();
        for _ in 0..(FRAMES_MAX - 1) {
            env.push().unwrap();
        }
        let depth_before = env.depth();
        assert!(env.push().is_err());
        assert_eq!(env.depth(), depth_before);
    }

    #[test]
    fn push_succeeds_past_the_limit_while_rescuing() {
        let mut env = Environment::new();
        for _ in 0..(FRAMES_MAX - 1) {
            env.push().unwrap();
        }
        env.set_rescuing(true);
        assert!(env.push().is_ok());
    }

    #[test]
    fn interpolate_double_dollar_is_literal_dollar() {
        let mut env = Environment::new();
        env.push().unwrap();
        assert_eq!(env.interpolate("$$", &[]), "$");
    }

    #[test]
    fn interpolate_missing_name_is_bang_nil() {
        let mut env = Environment::new();
        env.push().unwrap();
        assert_eq!(env.interpolate("$missing", &[]), "!nil");
    }

    #[test]
    fn interpolate_braced_name() {
        let mut env = Environment::new();
        env.push().unwrap();
        env.define("name", Value::string("world"), 0);
        assert_eq!(env.interpolate("hello ${name}!", &[]), "hello world!");
    }

    #[test]
    fn interpolate_binds_positional_args() {
        let mut env = Environment::new();
        env.push().unwrap();
        assert_eq!(
            env.interpolate("sum is $1", &[Value::Int(7)]),
            "sum is 7"
        );
    }

    #[test]
    fn rescue_with_no_rescuer_propagates_unchanged() {
        let mut env = Environment::new();
        env.push().unwrap();
        let err = Value::error("boom", -1);
        let result = env.rescue(err);
        assert_eq!(result.flow(), Flow::Fail);
    }

    #[test]
    fn rescue_runs_handler_and_yields_a_return_effect() {
        let mut env = Environment::new();
        env.push().unwrap();
        let rescuer_block = Rc::new(BlockNode {
            statements: vec![Value::string("caught")],
        });
        env.prevent(rescuer_block);
        let err = Value::error("boom", -1);
        let rescued = env.rescue(err);
        assert_eq!(rescued.flow(), Flow::Return);
        match rescued.unwrap_effect() {
            Value::String(s) => assert_eq!(&*s, "caught"),
            other => panic!("expected String(\"caught\"), got {other:?}"),
        }
    }

    #[test]
    fn complete_returns_sorted_prefix_matches() {
        let mut env = Environment::new();
        env.push().unwrap();
        env.define("alpha", Value::Int(1), 0);
        env.define("alabaster", Value::Int(2), 0);
        env.define("beta", Value::Int(3), 0);
        assert_eq!(env.complete("al"), vec!["alabaster".to_string(), "alpha".to_string()]);
    }
}
