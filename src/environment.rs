use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Value;
use crate::token::Token;
use crate::error::RuntimeError;

/// A chained name-to-value mapping realizing one lexical scope. Environments
/// are reference-counted because a closure's captured environment must
/// outlive the call frame that created it, and multiple closures may share
/// the same enclosing environment.
#[derive(Debug, Clone)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    pub variables: HashMap<String, Value>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment {
            enclosing,
            variables: HashMap::new(),
        }
    }

    /// Always writes to this environment's map; shadowing an outer binding of
    /// the same name is legal here (the resolver rejects only same-scope
    /// redeclaration).
    pub fn define(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    /// Walks `enclosing` exactly `distance` times from this environment.
    fn ancestor(&self, distance: usize) -> Rc<RefCell<Environment>> {
        let parent = self.enclosing.clone()
            .unwrap_or_else(|| panic!("enclosing environment to exist at depth {}", 1));
        let mut environment = Rc::clone(&parent);

        for i in 1..distance {
            let parent = environment.borrow().enclosing.clone()
                .unwrap_or_else(|| panic!("enclosing environment to exist at depth {}", i));
            environment = Rc::clone(&parent);
        }

        environment
    }

    /// Overwrites an existing binding, local or inherited; never creates a new one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.variables.contains_key(&name.lexeme) {
            self.variables.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &mut self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'", name.lexeme),
        })
    }

    /// Resolver-guaranteed assignment at a known lexical distance; no fallback needed.
    pub fn assign_at(&mut self, distance: usize, name: &Token, value: Value) {
        if distance > 0 {
            self.ancestor(distance).borrow_mut().variables.insert(name.lexeme.clone(), value);
        } else {
            self.variables.insert(name.lexeme.clone(), value);
        }
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(variable) = self.variables.get(&name.lexeme) {
            return Ok(variable.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'", name.lexeme)
        })
    }

    /// Resolver-guaranteed lookup at a known lexical distance; no fallback needed.
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Value, RuntimeError> {
        if distance > 0 {
            match self.ancestor(distance).borrow().variables.get(&name.lexeme) {
                Some(variable) => Ok(variable.clone()),
                None => Err(RuntimeError {
                    token: name.clone(),
                    message: format!("Undefined variable '{}'", name.lexeme),
                }),
            }
        } else {
            match self.variables.get(&name.lexeme) {
                Some(variable) => Ok(variable.clone()),
                None => Err(RuntimeError {
                    token: name.clone(),
                    message: format!("Undefined variable '{}'", name.lexeme),
                }),
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::{Type, Location};

    fn token(name: &str) -> Token {
        Token::new(Type::Identifier, name.to_string(), None, Location::new(0, 0))
    }

    #[test]
    fn get_delegates_to_enclosing() {
        let mut globals = Environment::new(None);
        globals.define("x", Value::from(1.0));
        let globals = Rc::new(RefCell::new(globals));

        let local = Environment::new(Some(Rc::clone(&globals)));
        assert_eq!(local.get(&token("x")).unwrap(), Value::from(1.0));
    }

    #[test]
    fn assign_never_creates_a_binding() {
        let mut env = Environment::new(None);
        assert!(env.assign(&token("missing"), Value::from(1.0)).is_err());
    }

    #[test]
    fn assign_overwrites_the_existing_scope() {
        let globals = Rc::new(RefCell::new(Environment::new(None)));
        globals.borrow_mut().define("x", Value::from(1.0));

        let mut local = Environment::new(Some(Rc::clone(&globals)));
        local.assign(&token("x"), Value::from(2.0)).unwrap();

        assert_eq!(globals.borrow().get(&token("x")).unwrap(), Value::from(2.0));
        assert!(local.variables.is_empty());
    }
}
