// ABOUTME: CLI entry point - REPL with history/completion, or batch script execution.

mod builtins;
mod config;
mod convert;
mod effect;
mod env;
mod error;
mod parser;
mod repl_helper;
mod support;
mod value;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};

use env::Environment;
use repl_helper::TgtlHelper;
use value::Value;

#[derive(Parser, Debug)]
#[command(name = "tgtl")]
#[command(version = config::VERSION)]
#[command(about = "A small command-oriented scripting language")]
struct CliArgs {
    /// Script files to execute. With none given, starts an interactive REPL.
    #[arg(value_name = "FILE")]
    scripts: Vec<PathBuf>,
}

fn main() {
    let args = CliArgs::parse();

    let env = Rc::new(RefCell::new(Environment::new()));
    env.borrow_mut().push().expect("fresh environment always has room for its first frame");
    builtins::register_builtins(&mut env.borrow_mut());
    builtins::register_turing_complete_builtins(&mut env.borrow_mut());

    if !args.scripts.is_empty() {
        let mut had_error = false;
        for path in &args.scripts {
            if let Err(message) = run_file(&env, path) {
                eprintln!("error in {}: {message}", path.display());
                had_error = true;
            }
        }
        if had_error {
            std::process::exit(1);
        }
        return;
    }

    run_repl(&env);
}

/// Parses and evaluates one script file as a single top-level Block,
/// carrying the process's argv through as the block's arguments - matching
/// the reference runner's "whole file is one statement list" model.
fn run_file(env: &Rc<RefCell<Environment>>, path: &PathBuf) -> Result<(), String> {
    let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let parsed = parser::parse_script(&contents).map_err(|e| e.to_string())?;
    let argv: Vec<Value> = std::env::args().map(Value::string).collect();
    let result = parsed.eval(&mut env.borrow_mut(), &argv);
    if let Value::Error(e) = result {
        return Err(e.message.clone());
    }
    Ok(())
}

fn history_path() -> PathBuf {
    match dirs_home() {
        Some(home) => home.join(config::HISTORY_FILE_NAME),
        None => PathBuf::from(config::HISTORY_FILE_NAME),
    }
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

fn run_repl(env: &Rc<RefCell<Environment>>) {
    let rl_config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<TgtlHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(rl_config).expect("failed to initialize REPL editor");
    rl.set_helper(Some(TgtlHelper::new(env.clone())));

    let history_file = history_path();
    let _ = rl.load_history(&history_file);

    println!("{}", config::WELCOME_MESSAGE);
    println!("{}", config::WELCOME_SUBTITLE);

    let mut buf = String::new();
    loop {
        let prompt = if buf.is_empty() { "tgtl> " } else { "...> " };
        match rl.readline(prompt) {
            Ok(line) => {
                if let Some(rest) = line.strip_prefix('\\') {
                    buf.push('\n');
                    buf.push_str(rest);
                    continue;
                }
                if !buf.is_empty() {
                    buf.push('\n');
                    buf.push_str(&line);
                } else {
                    buf = line;
                    buf.push('\n');
                }
                let input = std::mem::take(&mut buf);
                if input.trim() == "quit" || input.trim() == "exit" {
                    break;
                }
                if input.trim().is_empty() {
                    continue;
                }
                run_line(env, &input);
            }
            Err(ReadlineError::Interrupted) => {
                buf.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error reading line: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(&history_file);
}

fn run_line(env: &Rc<RefCell<Environment>>, input: &str) {
    let parsed = match parser::parse_script(input) {
        Ok(v) => v,
        Err(e) => {
            let _ = env.borrow_mut().printi("Parse error: ${1}\n", &[Value::string(e.message)]);
            return;
        }
    };
    let result = parsed.eval(&mut env.borrow_mut(), &[]);
    let mut env = env.borrow_mut();
    match result {
        Value::Error(e) => {
            let _ = env.printi("Error ${1}: \n", &[Value::string(e.message.clone())]);
        }
        other => {
            let _ = env.printi(">>${1}\n", &[other]);
        }
    }
}
