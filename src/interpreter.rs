use std::io::Write;
use std::mem;

use tracing::{debug, trace};

use crate::annotated_ast::{AnnotatedExpression, AnnotatedProgram, AnnotatedStatement, ExprId};
use crate::ast::{BinaryOperator, LogicalOperator, UnaryOperator};
use crate::common::error::{convert_error, ErrorInfo, LoxResult};
use crate::common::utils::{rcrc, RcRc};
use crate::interpreter::environment::Environment;
use crate::interpreter::lox_value::LoxValue;
use crate::interpreter::lox_value::LoxValue::{Bool, Nil, Number};
use crate::interpreter::result::{InterpretResult, InterpreterError};
use crate::resolve::Locals;

pub mod environment;
pub mod lox_value;
pub mod result;

/// Tree-walking evaluator. Output of `print` goes to `W`, so a session can be pointed at stdout
/// or captured in memory.
pub struct Interpreter<W: Write> {
    globals: RcRc<Environment>,
    // Swapped for a child frame for the duration of each block.
    environment: RcRc<Environment>,
    locals: Locals,
    writer: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(writer: W) -> Self {
        let globals = rcrc(Environment::new());
        Interpreter { environment: globals.clone(), globals, locals: Locals::new(), writer }
    }

    /// Registers resolved distances. Node ids are never reused, so tables from earlier runs stay
    /// valid.
    pub fn add_locals(&mut self, locals: Locals) {
        self.locals.extend(locals);
    }

    pub fn writer(&self) -> &W { &self.writer }

    pub fn into_writer(self) -> W { self.writer }

    /// Runs the statements in order, stopping at the first runtime error. Bindings made before
    /// the error remain visible to later calls.
    pub fn interpret(&mut self, program: &AnnotatedProgram) -> LoxResult<()> {
        debug!(statements = program.statements.len(), "interpreting program");
        convert_error(self.interpret_go(program))
    }

    fn interpret_go(&mut self, program: &AnnotatedProgram) -> InterpretResult<()> {
        for statement in &program.statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, statement: &AnnotatedStatement) -> InterpretResult<()> {
        match statement {
            AnnotatedStatement::Variable(name, e, _) => {
                let value = match e {
                    Some(e) => self.evaluate(e)?,
                    None => Nil,
                };
                self.environment.borrow_mut().define(name.as_str(), value);
                Ok(())
            }
            AnnotatedStatement::Block(ss, i) => {
                let frame = Environment::new_enclosed(self.environment.clone());
                self.execute_block(ss, frame, i)
            }
            AnnotatedStatement::IfElse { cond, if_stmt, else_stmt, .. } => {
                if self.evaluate(cond)?.truthiness() {
                    self.execute(if_stmt)
                } else {
                    match else_stmt {
                        Some(e) => self.execute(e),
                        None => Ok(()),
                    }
                }
            }
            AnnotatedStatement::Expression(e) => self.evaluate(e).map(|_| ()),
            AnnotatedStatement::Print(e, i) => {
                let value = self.evaluate(e)?;
                writeln!(self.writer, "{}", value.stringify())
                    .map_err(|_| InterpreterError::Output(*i))
            }
        }
    }

    fn execute_block(
        &mut self,
        statements: &[AnnotatedStatement],
        frame: Environment,
        i: &ErrorInfo,
    ) -> InterpretResult<()> {
        trace!(line = i.line, "entering block");
        let previous = mem::replace(&mut self.environment, rcrc(frame));
        let result = statements.iter().try_for_each(|s| self.execute(s));
        self.environment = previous;
        trace!(line = i.line, ok = result.is_ok(), "exited block");
        result
    }

    fn evaluate(&mut self, expression: &AnnotatedExpression) -> InterpretResult<LoxValue> {
        match expression {
            AnnotatedExpression::Literal(atom, _) => Ok(atom.into()),
            AnnotatedExpression::Grouping(e, _) => self.evaluate(e),
            AnnotatedExpression::Variable(name, id, i) => self.look_up_variable(name, id, i),
            AnnotatedExpression::Assign(name, id, e, i) => {
                let value = self.evaluate(e)?;
                match self.locals.get(id) {
                    Some(distance) =>
                        Environment::assign_at(&self.environment, *distance, name, value.clone(), *i)?,
                    None => self.globals.borrow_mut().assign(name, value.clone(), *i)?,
                }
                Ok(value)
            }
            AnnotatedExpression::Unary(op, e, i) => {
                let value = self.evaluate(e)?;
                match op {
                    UnaryOperator::Minus => match value {
                        Number(n) => Ok(Number(-n)),
                        _ => Err(InterpreterError::type_error("Operand must be a number.", *i)),
                    },
                    UnaryOperator::Bang => Ok(Bool(!value.truthiness())),
                }
            }
            AnnotatedExpression::Logical(op, e1, e2, _) => {
                let left = self.evaluate(e1)?;
                let short_circuits = match op {
                    LogicalOperator::Or => left.truthiness(),
                    LogicalOperator::And => !left.truthiness(),
                };
                if short_circuits { Ok(left) } else { self.evaluate(e2) }
            }
            AnnotatedExpression::Binary(op, e1, e2, i) => {
                let left = self.evaluate(e1)?;
                let right = self.evaluate(e2)?;
                binary(op, left, right, i)
            }
            AnnotatedExpression::Call(callee, args, i) => {
                self.evaluate(callee)?;
                for arg in args {
                    self.evaluate(arg)?;
                }
                Err(InterpreterError::NotCallable(*i))
            }
        }
    }

    fn look_up_variable(&self, name: &str, id: &ExprId, i: &ErrorInfo) -> InterpretResult<LoxValue> {
        match self.locals.get(id) {
            Some(distance) => Environment::get_at(&self.environment, *distance, name, *i),
            None => self.globals.borrow().get(name, *i),
        }
    }
}

fn binary(
    op: &BinaryOperator, left: LoxValue, right: LoxValue, i: &ErrorInfo,
) -> InterpretResult<LoxValue> {
    match op {
        BinaryOperator::EqualEqual => Ok(Bool(left.equal_equal(&right))),
        BinaryOperator::BangEqual => Ok(Bool(!left.equal_equal(&right))),
        BinaryOperator::Plus => match (left, right) {
            (Number(n1), Number(n2)) => Ok(Number(n1 + n2)),
            (LoxValue::String(s1), LoxValue::String(s2)) => Ok(LoxValue::String(s1 + &s2)),
            _ => Err(InterpreterError::type_error(
                "Operands must be two numbers or two strings.", *i)),
        },
        BinaryOperator::Minus => numbers(left, right, i).map(|(n1, n2)| Number(n1 - n2)),
        BinaryOperator::Mult => numbers(left, right, i).map(|(n1, n2)| Number(n1 * n2)),
        BinaryOperator::Div => numbers(left, right, i).map(|(n1, n2)| Number(n1 / n2)),
        BinaryOperator::Greater => numbers(left, right, i).map(|(n1, n2)| Bool(n1 > n2)),
        BinaryOperator::GreaterEqual => numbers(left, right, i).map(|(n1, n2)| Bool(n1 >= n2)),
        BinaryOperator::Less => numbers(left, right, i).map(|(n1, n2)| Bool(n1 < n2)),
        BinaryOperator::LessEqual => numbers(left, right, i).map(|(n1, n2)| Bool(n1 <= n2)),
    }
}

fn numbers(left: LoxValue, right: LoxValue, i: &ErrorInfo) -> InterpretResult<(f64, f64)> {
    match (left, right) {
        (Number(n1), Number(n2)) => Ok((n1, n2)),
        _ => Err(InterpreterError::type_error("Operands must be numbers.", *i)),
    }
}
