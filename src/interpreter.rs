use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use crate::class::Class;
use crate::environment::Environment;
use crate::error::{self, Error, RuntimeError};
use crate::expr::{Expr, ExprVisitor};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Value};
use crate::stmt::{Stmt, StmtVisitor};
use crate::token::{Token, Type};

pub type EvalResult = Result<Value, RuntimeError>;

/// Non-local exit a statement produced. Runtime errors are not carried here;
/// they are thrown (printed, flagged) where they occur and unwind to the
/// nearest enclosing block/loop as a plain `Normal`, same as the teacher's
/// flag-checked `print` statement did for expression errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

/// Walks the annotated AST, evaluating expressions against the current
/// environment and executing statements for effect.
pub struct Interpreter {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<Token, usize>,
    output: Rc<RefCell<dyn Write>>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(io::stdout())))
    }

    /// Builds an interpreter that writes `print` output to `output` instead
    /// of standard out, so tests can capture it without touching a process stream.
    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::get_globals() {
            globals.borrow_mut().define(&native.name.lexeme.clone(), Value::from(native));
        }

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.execute(statement);

            if error::did_runtime_error() {
                return;
            }
        }
    }

    /// Records the lexical distance the resolver computed for a
    /// variable/assignment/`this` reference, keyed by the reference's own
    /// token (its source position stands in for AST-node identity).
    pub fn resolve(&mut self, name: &Token, depth: usize) {
        self.locals.insert(name.clone(), depth);
    }

    pub fn print_line(&mut self, text: &str) {
        let _ = writeln!(self.output.borrow_mut(), "{text}");
    }

    fn execute(&mut self, stmt: &Stmt) -> ControlFlow {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        expr.accept(self)
    }

    /// Evaluates `expr`, throwing and reporting `None` on error instead of
    /// propagating a `Result` through the statement visitors.
    fn eval_or_throw(&mut self, expr: &Expr) -> Option<Value> {
        match self.evaluate(expr) {
            Ok(value) => Some(value),
            Err(error) => {
                error.throw();
                None
            }
        }
    }

    /// Executes `statements` in a child scope of `environment`, restoring
    /// the previous environment on every exit path, including non-local ones.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> ControlFlow {
        let previous = Rc::clone(&self.environment);
        self.environment = environment;

        let mut result = ControlFlow::Normal;
        for statement in statements {
            result = self.execute(statement);

            if error::did_runtime_error() || result != ControlFlow::Normal {
                break;
            }
        }

        self.environment = previous;
        result
    }

    fn look_up_variable(&self, name: &Token) -> EvalResult {
        match self.locals.get(name) {
            Some(distance) => self.environment.borrow().get_at(*distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn call_value(&mut self, callee: Value, paren: &Token, arguments: Vec<Value>) -> EvalResult {
        let arity = match &callee {
            Value::Function(function) => function.arity(),
            Value::NativeFunction(function) => function.arity(),
            Value::Class(class) => class.borrow().arity(),
            _ => {
                return Err(RuntimeError {
                    token: paren.clone(),
                    message: "Can only call functions and classes".to_string(),
                });
            }
        };

        if arguments.len() != arity {
            return Err(RuntimeError {
                token: paren.clone(),
                message: format!("Expected {arity} arguments but got {}", arguments.len()),
            });
        }

        match callee {
            Value::Function(function) => function.call(self, arguments),
            Value::NativeFunction(function) => function.call(self, arguments),
            Value::Class(class) => {
                let bound = Rc::clone(&class);
                bound.borrow().call(self, arguments)
            },
            _ => unreachable!("non-callable values are rejected above"),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn operands_must_be_numbers(operator: &Token) -> RuntimeError {
    RuntimeError {
        token: operator.clone(),
        message: "Operands must be numbers".to_string(),
    }
}

impl ExprVisitor<EvalResult> for Interpreter {
    fn visit_literal_expr(&mut self, literal: &Literal) -> EvalResult {
        Ok(Value::from(literal.clone()))
    }

    fn visit_unary_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Unary(unary) = expr else { unreachable!() };
        let right = self.evaluate(&unary.expr)?;

        match unary.operator.r#type {
            Type::Minus => match right {
                Value::Literal(Literal::Number(n)) => Ok(Value::from(-n)),
                _ => Err(operands_must_be_numbers(&unary.operator)),
            },
            Type::Bang => Ok(Value::from(!right.is_truthy())),
            _ => unreachable!(),
        }
    }

    /// Evaluates left-before-right, matching lexical reading order (the
    /// lineage's right-before-left evaluation was a documented bug, not a
    /// feature to preserve).
    fn visit_binary_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Binary(binary) = expr else { unreachable!() };

        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;

        let numbers = |l: &Value, r: &Value| match (l, r) {
            (Value::Literal(Literal::Number(l)), Value::Literal(Literal::Number(r))) => Some((*l, *r)),
            _ => None,
        };

        match binary.operator.r#type {
            Type::Minus => numbers(&left, &right)
                .map(|(l, r)| Value::from(l - r))
                .ok_or_else(|| operands_must_be_numbers(&binary.operator)),
            Type::Slash => numbers(&left, &right)
                .map(|(l, r)| Value::from(l / r))
                .ok_or_else(|| operands_must_be_numbers(&binary.operator)),
            Type::Star => numbers(&left, &right)
                .map(|(l, r)| Value::from(l * r))
                .ok_or_else(|| operands_must_be_numbers(&binary.operator)),
            Type::Greater => numbers(&left, &right)
                .map(|(l, r)| Value::from(l > r))
                .ok_or_else(|| operands_must_be_numbers(&binary.operator)),
            Type::GreaterEqual => numbers(&left, &right)
                .map(|(l, r)| Value::from(l >= r))
                .ok_or_else(|| operands_must_be_numbers(&binary.operator)),
            Type::Less => numbers(&left, &right)
                .map(|(l, r)| Value::from(l < r))
                .ok_or_else(|| operands_must_be_numbers(&binary.operator)),
            Type::LessEqual => numbers(&left, &right)
                .map(|(l, r)| Value::from(l <= r))
                .ok_or_else(|| operands_must_be_numbers(&binary.operator)),
            Type::EqualEqual => Ok(Value::from(left == right)),
            Type::BangEqual => Ok(Value::from(left != right)),
            Type::Plus => match (&left, &right) {
                (Value::Literal(Literal::Number(l)), Value::Literal(Literal::Number(r))) => Ok(Value::from(l + r)),
                (Value::Literal(Literal::String(_)), _) | (_, Value::Literal(Literal::String(_))) => {
                    Ok(Value::from(format!("{left}{right}")))
                },
                _ => Err(RuntimeError {
                    token: binary.operator.clone(),
                    message: "Operands must be two numbers or two strings".to_string(),
                }),
            },
            _ => unreachable!(),
        }
    }

    fn visit_logical_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Logical(logical) = expr else { unreachable!() };

        let left = self.evaluate(&logical.left)?;

        match logical.operator.r#type {
            Type::Or if left.is_truthy() => Ok(left),
            Type::Or => self.evaluate(&logical.right),
            Type::And if !left.is_truthy() => Ok(left),
            Type::And => self.evaluate(&logical.right),
            _ => unreachable!(),
        }
    }

    fn visit_grouping_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Grouping(grouping) = expr else { unreachable!() };
        self.evaluate(&grouping.expr)
    }

    fn visit_variable_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Variable(variable) = expr else { unreachable!() };
        self.look_up_variable(&variable.name)
    }

    fn visit_assign_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Assign(assign) = expr else { unreachable!() };

        let value = self.evaluate(&assign.value)?;

        match self.locals.get(&assign.name) {
            Some(distance) => self.environment.borrow_mut().assign_at(*distance, &assign.name, value.clone()),
            None => self.globals.borrow_mut().assign(&assign.name, value.clone())?,
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Call(call) = expr else { unreachable!() };

        let callee = self.evaluate(&call.callee)?;

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        self.call_value(callee, &call.paren, arguments)
    }

    fn visit_get_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Get(get) = expr else { unreachable!() };

        let object = self.evaluate(&get.object)?;

        match object {
            Value::Instance(instance) => instance.borrow().get(&get.name, &Value::Instance(Rc::clone(&instance))),
            Value::Class(class) => class.borrow().get_static(&get.name.lexeme).ok_or_else(|| RuntimeError {
                token: get.name.clone(),
                message: format!("Undefined property '{}'", get.name.lexeme),
            }),
            _ => Err(RuntimeError {
                token: get.name.clone(),
                message: "Only instances and classes have properties".to_string(),
            }),
        }
    }

    fn visit_set_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Set(set) = expr else { unreachable!() };

        let object = self.evaluate(&set.object)?;

        let Value::Instance(instance) = object else {
            return Err(RuntimeError {
                token: set.name.clone(),
                message: "Only instances have fields".to_string(),
            });
        };

        let value = self.evaluate(&set.value)?;
        instance.borrow_mut().set(&set.name, value.clone());
        Ok(value)
    }

    fn visit_this_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::This(this) = expr else { unreachable!() };
        self.look_up_variable(&this.keyword)
    }
}

impl StmtVisitor<ControlFlow> for Interpreter {
    fn visit_expression_stmt(&mut self, stmt: &Stmt) -> ControlFlow {
        let Stmt::Expression(data) = stmt else { unreachable!() };
        self.eval_or_throw(&data.expr);
        ControlFlow::Normal
    }

    fn visit_let_stmt(&mut self, stmt: &Stmt) -> ControlFlow {
        let Stmt::Let(data) = stmt else { unreachable!() };

        let value = match &data.initializer {
            Some(initializer) => match self.eval_or_throw(initializer) {
                Some(value) => value,
                None => return ControlFlow::Normal,
            },
            None => Value::from(Literal::Nil),
        };

        self.environment.borrow_mut().define(&data.name.lexeme, value);
        ControlFlow::Normal
    }

    fn visit_block_stmt(&mut self, stmt: &Stmt) -> ControlFlow {
        let Stmt::Block(data) = stmt else { unreachable!() };

        let scope = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
        self.execute_block(&data.statements, scope)
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) -> ControlFlow {
        let Stmt::If(data) = stmt else { unreachable!() };

        let condition = match self.eval_or_throw(&data.condition) {
            Some(value) => value,
            None => return ControlFlow::Normal,
        };

        if condition.is_truthy() {
            self.execute(&data.then_branch)
        } else if let Some(else_branch) = &data.else_branch {
            self.execute(else_branch)
        } else {
            ControlFlow::Normal
        }
    }

    /// Consumes `Break`/`Continue` here, at the loop boundary, rather than at
    /// nested blocks or `if` statements.
    fn visit_while_stmt(&mut self, stmt: &Stmt) -> ControlFlow {
        let Stmt::While(data) = stmt else { unreachable!() };

        loop {
            let condition = match self.eval_or_throw(&data.condition) {
                Some(value) => value,
                None => return ControlFlow::Normal,
            };

            if !condition.is_truthy() {
                return ControlFlow::Normal;
            }

            match self.execute(&data.body) {
                ControlFlow::Normal | ControlFlow::Continue => {
                    if error::did_runtime_error() {
                        return ControlFlow::Normal;
                    }
                    if let Some(increment) = &data.increment {
                        if self.eval_or_throw(increment).is_none() {
                            return ControlFlow::Normal;
                        }
                    }
                },
                ControlFlow::Break => return ControlFlow::Normal,
                ControlFlow::Return(value) => return ControlFlow::Return(value),
            }
        }
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) -> ControlFlow {
        let Stmt::Function(data) = stmt else { unreachable!() };

        let function = Function::new(data, Rc::clone(&self.environment));
        self.environment.borrow_mut().define(&data.name.lexeme, Value::from(function));
        ControlFlow::Normal
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) -> ControlFlow {
        let Stmt::Class(data) = stmt else { unreachable!() };

        self.environment.borrow_mut().define(&data.name.lexeme, Value::from(Literal::Nil));

        let mut methods = HashMap::new();
        let mut statics = HashMap::new();

        for method in &data.methods {
            let Stmt::Function(declaration) = method else { unreachable!() };
            let function = Function::new(declaration, Rc::clone(&self.environment));

            if declaration.is_static {
                statics.insert(declaration.name.lexeme.clone(), Value::from(function));
            } else {
                methods.insert(declaration.name.lexeme.clone(), function);
            }
        }

        let class = Class::new(data.name.lexeme.clone(), methods, statics);
        let assigned = self.environment.borrow_mut().assign(&data.name, Value::from(Rc::new(RefCell::new(class))));

        if let Err(error) = assigned {
            error.throw();
        }

        ControlFlow::Normal
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) -> ControlFlow {
        let Stmt::Return(data) = stmt else { unreachable!() };

        let value = match &data.value {
            Some(expr) => match self.eval_or_throw(expr) {
                Some(value) => value,
                None => return ControlFlow::Normal,
            },
            None => Value::from(Literal::Nil),
        };

        ControlFlow::Return(value)
    }

    fn visit_break_stmt(&mut self, _stmt: &Stmt) -> ControlFlow {
        ControlFlow::Break
    }

    fn visit_continue_stmt(&mut self, _stmt: &Stmt) -> ControlFlow {
        ControlFlow::Continue
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    fn run(source: &str) -> String {
        let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
        let output: Rc<RefCell<dyn Write>> = buffer.clone();
        let mut interpreter = Interpreter::with_output(output);

        let tokens = Scanner::new(source).scan_tokens();
        let statements = Parser::new(tokens).parse();
        Resolver::new(&mut interpreter).resolve(&statements);
        interpreter.interpret(&statements);

        String::from_utf8(buffer.borrow().clone()).unwrap()
    }

    #[test]
    fn prints_arithmetic_without_trailing_zero() {
        assert_eq!(run("print(1 + 2);"), "3\n");
        assert_eq!(run("print(1.5 + 1.5);"), "3\n");
        assert_eq!(run("print(1 / 2);"), "0.5\n");
    }

    #[test]
    fn string_concatenation_via_plus() {
        assert_eq!(run(r#"print("a" + "b");"#), "ab\n");
        assert_eq!(run(r#"print("x" + 1);"#), "x1\n");
    }

    #[test]
    fn closures_capture_by_reference() {
        let source = r#"
            fun make() {
                let x = 0;
                fun inc() { x = x + 1; return x; }
                return inc;
            }
            let f = make();
            print(f());
            print(f());
            print(f());
        "#;
        assert_eq!(run(source), "1\n2\n3\n");
    }

    #[test]
    fn for_desugaring_with_break_and_continue() {
        let source = r#"
            for (let i = 0; i < 5; i = i + 1) {
                if (i == 2) continue;
                if (i == 4) break;
                print(i);
            }
        "#;
        assert_eq!(run(source), "0\n1\n3\n");
    }

    #[test]
    fn classes_and_this() {
        let source = r#"
            class Counter {
                init(start) { this.n = start; }
                bump() { this.n = this.n + 1; return this.n; }
            }
            let c = Counter(10);
            print(c.bump());
            print(c.bump());
        "#;
        assert_eq!(run(source), "11\n12\n");
    }

    #[test]
    fn static_methods_on_classes() {
        let source = r#"
            class M { static id(x) { return x; } }
            print(M.id(42));
        "#;
        assert_eq!(run(source), "42\n");
    }

    #[test]
    fn equality_never_errors_across_types() {
        assert_eq!(run("print(1 == \"1\");"), "false\n");
        assert_eq!(run("print(nil == false);"), "false\n");
    }
}
