#![allow(clippy::needless_return)]

//! Rocks is a dynamically typed, lexically scoped, object-based scripting
//! language with first-class functions, evaluated by a tree-walk interpreter
//! with a hand-written recursive descent parser. It is a hobby project
//! inspired by [Crafting Interpreters](https://craftinginterpreters.com/)
//! and is not intended for production use.
//!
//! ## Pipeline
//! Source text moves through four stages before it has any effect:
//!
//! 1. [`scanner`] turns characters into a flat list of [`token::Token`]s.
//! 2. [`parser`] turns tokens into a tree of [`expr::Expr`]/[`stmt::Stmt`]
//!    nodes via recursive descent, recovering from errors by synchronizing
//!    at the next statement boundary.
//! 3. [`resolver`] walks the tree once to compute, for every variable
//!    reference, how many enclosing scopes away its binding lives. This
//!    lookup distance is recorded in a side table rather than the tree
//!    itself.
//! 4. [`interpreter`] walks the tree again, this time evaluating it,
//!    consulting the resolver's side table to jump straight to the right
//!    [`environment::Environment`] instead of re-searching the scope chain.
//!
//! A variable declaration looks like `let a = 1;` rather than `var a = 1;`,
//! and printing is an ordinary call to a native function, `print(a)`, not a
//! dedicated statement form. Classes (`class Point { ... }`) do not support
//! inheritance; a method prefixed with `static` is attached directly to the
//! class rather than to instances.
//!
//! Errors are reported through [`error::Error::throw`] as soon as they are
//! found. Scan and parse errors set a "had error" flag and do not stop the
//! scanner/parser from looking for more of the same kind; runtime errors set
//! a separate flag and abort the statement in progress.

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

const HISTORY_FILE: &str = ".rocks_history";

/// Drives the pipeline over one or more source units, keeping a single
/// [`Interpreter`] alive across calls so that globals and REPL-declared
/// bindings persist between lines.
#[allow(non_camel_case_types)]
pub struct rocks {
    interpreter: Interpreter,
}

impl rocks {
    pub fn new() -> Self {
        rocks { interpreter: Interpreter::new() }
    }

    /// Builds a driver whose `print` output is captured into `output` instead
    /// of going to standard output. Intended for tests.
    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        rocks { interpreter: Interpreter::with_output(output) }
    }

    /// Reads `path`, runs it, and exits the process according to the
    /// outcome: 65 on a compile-time (scan/parse/resolve) error, 70 on a
    /// runtime error, 66 if the file cannot be read, 0 otherwise.
    pub fn run_file(&mut self, path: &str) {
        let contents = fs::read_to_string(path).unwrap_or_else(|io_error| {
            eprintln!("Could not read file '{path}': {io_error}");
            std::process::exit(66);
        });

        let start = Instant::now();
        self.run(&contents);

        if error::did_runtime_error() {
            std::process::exit(70);
        }
        if error::did_error() {
            std::process::exit(65);
        }

        println!("Finished in {}ms", start.elapsed().as_millis());
    }

    /// Reads lines from standard input until EOF, running each one as its
    /// own source unit. A line missing a trailing `;` or `}` gets one
    /// appended, so `1 + 1` works without the user typing the semicolon.
    pub fn run_prompt(&mut self) {
        let mut editor = DefaultEditor::new().expect("line editor to initialize");
        let history_path = history_path();

        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        loop {
            match editor.readline("> ") {
                Ok(mut line) => {
                    let _ = editor.add_history_entry(line.as_str());

                    let trimmed = line.trim_end();
                    if !trimmed.ends_with(';') && !trimmed.ends_with('}') {
                        line.push(';');
                    }

                    self.run(&line);
                    error::reset_error();
                },
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Readline error: {err}");
                    break;
                },
            }
        }

        if let Some(path) = &history_path {
            let _ = editor.save_history(path);
        }
    }

    /// Scans, parses, resolves, and interprets one source string, stopping
    /// early (without interpreting) if an earlier stage reported an error.
    pub fn run(&mut self, source: &str) {
        let tokens = Scanner::new(source).scan_tokens();

        if error::did_error() {
            return;
        }

        let statements = Parser::new(tokens).parse();

        if error::did_error() {
            return;
        }

        Resolver::new(&mut self.interpreter).resolve(&statements);

        if error::did_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}

impl Default for rocks {
    fn default() -> Self {
        Self::new()
    }
}

fn history_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(HISTORY_FILE))
}
