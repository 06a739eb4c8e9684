use std::fmt::Debug;
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::interpreter::{ControlFlow, Interpreter};
use crate::literal::Literal;
use crate::object::{Callable, Value};
use crate::stmt::{FunctionData, Stmt};
use crate::token::Token;

/// A user-defined function or method, closing over the environment it was
/// declared in. Methods are turned into a fresh `Function` with a narrower
/// closure every time they are bound to an instance (see [`Function::bind`]).
#[derive(Clone)]
pub struct Function {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
    pub is_static: bool,
}

impl Function {
    pub fn new(declaration: &FunctionData, closure: Rc<RefCell<Environment>>) -> Self {
        Function {
            name: declaration.name.clone(),
            params: declaration.params.clone(),
            body: Rc::new(declaration.body.clone()),
            closure,
            is_initializer: declaration.name.lexeme == "init",
            is_static: declaration.is_static,
        }
    }

    /// Returns a copy of this function whose closure is a new scope, nested
    /// inside the original one, with `this` bound to `instance`.
    pub fn bind(&self, instance: Value) -> Function {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));
        environment.define("this", instance);

        Function {
            name: self.name.clone(),
            params: self.params.clone(),
            body: Rc::clone(&self.body),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
            is_static: self.is_static,
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && Rc::ptr_eq(&self.body, &other.body)
            && Rc::ptr_eq(&self.closure, &other.closure)
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));

        for (param, arg) in self.params.iter().zip(arguments) {
            environment.define(&param.lexeme, arg);
        }

        let control = interpreter.execute_block(&self.body, Rc::new(RefCell::new(environment)));

        if self.is_initializer {
            return self.closure.borrow().get(&Token::from("this"));
        }

        match control {
            ControlFlow::Return(value) => Ok(value),
            _ => Ok(Value::from(Literal::Nil)),
        }
    }

    fn arity(&self) -> usize {
        self.params.len()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<function {}>", self.name.lexeme)
    }
}

impl Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<function {}>", self.name.lexeme)
    }
}

/// A function implemented in Rust and installed directly into the global
/// environment, rather than declared with `fun`.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: Token,
    pub arity: usize,
    pub function: fn(&mut Interpreter, Vec<Value>) -> Result<Value, RuntimeError>,
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl NativeFunction {
    pub fn get_globals() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: Token::from("clock"),
                arity: 0,
                function: |_, _| {
                    let now = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap()
                        .as_millis();
                    Ok(Value::from(now as f64))
                },
            },
            NativeFunction {
                name: Token::from("print"),
                arity: 1,
                function: |interpreter, mut arguments| {
                    let value = arguments.remove(0);
                    interpreter.print_line(&value.to_string());
                    Ok(Value::from(Literal::Nil))
                },
            },
            NativeFunction {
                name: Token::from("readLine"),
                arity: 0,
                function: |_, _| {
                    let mut input = String::new();
                    let bytes = std::io::stdin().read_line(&mut input).unwrap_or(0);
                    if bytes == 0 {
                        return Ok(Value::from(Literal::Nil));
                    }
                    if input.ends_with('\n') {
                        input.pop();
                        if input.ends_with('\r') {
                            input.pop();
                        }
                    }
                    Ok(Value::from(input))
                },
            },
        ]
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && std::ptr::eq(self.function as *const (), other.function as *const ())
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native function {}>", self.name.lexeme)
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native function {}>", self.name.lexeme)
    }
}
