use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::function::Function;
use crate::interpreter::Interpreter;
use crate::object::{Callable, Value};
use crate::token::Token;

/// A class declaration's runtime representation: a name, its instance
/// methods, and its static members (static methods, bound once at class
/// execution time, surfaced through ordinary field access). There is no
/// superclass; every class stands on its own.
#[derive(Clone)]
pub struct Class {
    pub name: String,
    pub methods: HashMap<String, Function>,
    pub statics: HashMap<String, Value>,
}

impl Class {
    pub fn new(name: String, methods: HashMap<String, Function>, statics: HashMap<String, Value>) -> Self {
        Class { name, methods, statics }
    }

    pub fn get_method(&self, name: &str) -> Option<Function> {
        self.methods.get(name).cloned()
    }

    pub fn get_static(&self, name: &str) -> Option<Value> {
        self.statics.get(name).cloned()
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

impl Callable for Class {
    fn arity(&self) -> usize {
        match self.get_method("init") {
            Some(initializer) => initializer.arity(),
            None => 0,
        }
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        let class = Rc::new(RefCell::new(self.clone()));
        let instance = Rc::new(RefCell::new(Instance::from(&class)));

        if let Some(initializer) = self.get_method("init") {
            let bound = initializer.bind(Value::Instance(Rc::clone(&instance)));
            bound.call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

/// A runtime object created by calling a class. Field lookups check the
/// instance's own fields first, then fall back to the class's methods.
#[derive(Clone)]
pub struct Instance {
    pub class: Rc<RefCell<Class>>,
    pub fields: HashMap<String, Value>,
}

impl Instance {
    pub fn get(&self, name: &Token, instance: &Value) -> Result<Value, RuntimeError> {
        if let Some(field) = self.fields.get(&name.lexeme) {
            Ok(field.clone())
        } else if let Some(method) = self.class.borrow().get_method(&name.lexeme) {
            Ok(Value::from(method.bind(instance.clone())))
        } else {
            Err(RuntimeError {
                token: name.clone(),
                message: format!("Undefined property '{}'", name.lexeme),
            })
        }
    }

    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl From<&Rc<RefCell<Class>>> for Instance {
    fn from(value: &Rc<RefCell<Class>>) -> Self {
        Instance { class: Rc::clone(value), fields: HashMap::new() }
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<instance {}>", self.class.borrow().name)
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<instance {}>", self.class.borrow().name)
    }
}
