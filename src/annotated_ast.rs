use std::sync::atomic::{AtomicUsize, Ordering};

use crate::ast::{Atom, BinaryOperator, Expression, LogicalOperator, Program, Statement, UnaryOperator};
use crate::common::error::ErrorInfo;

/// Identity of a variable read or assignment node. Unique for the lifetime of the process, so
/// distance tables from successive parses (e.g. REPL lines) can be merged.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct ExprId(usize);

impl ExprId {
    pub fn fresh() -> Self {
        static NEXT_ID: AtomicUsize = AtomicUsize::new(0);
        ExprId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct AnnotatedProgram {
    pub statements: Vec<AnnotatedStatement>,
}

impl From<&AnnotatedProgram> for Program {
    fn from(ae: &AnnotatedProgram) -> Self {
        Program { statements: ae.statements.iter().map(|e| e.into()).collect() }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum AnnotatedStatement {
    Block(Vec<AnnotatedStatement>, ErrorInfo),
    IfElse {
        cond: AnnotatedExpression,
        if_stmt: Box<AnnotatedStatement>,
        else_stmt: Option<Box<AnnotatedStatement>>,
        error_info: ErrorInfo,
    },
    Variable(String, Option<AnnotatedExpression>, ErrorInfo),
    Expression(AnnotatedExpression),
    Print(AnnotatedExpression, ErrorInfo),
}

impl From<&AnnotatedStatement> for Statement {
    fn from(ae: &AnnotatedStatement) -> Self {
        match ae {
            AnnotatedStatement::Block(ss, _) =>
                Statement::Block(ss.iter().map(|e| e.into()).collect()),
            AnnotatedStatement::IfElse { cond, if_stmt, else_stmt, .. } => Statement::IfElse {
                cond: cond.into(),
                if_stmt: Box::new(if_stmt.as_ref().into()),
                else_stmt: else_stmt.as_ref().map(|e| Box::new(e.as_ref().into())),
            },
            AnnotatedStatement::Variable(n, e, _) =>
                Statement::Variable(n.clone(), e.as_ref().map(|e| e.into())),
            AnnotatedStatement::Expression(e) => Statement::Expression(e.into()),
            AnnotatedStatement::Print(p, _) => Statement::Print(p.into()),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum AnnotatedExpression {
    Literal(Atom, ErrorInfo),
    Grouping(Box<AnnotatedExpression>, ErrorInfo),
    Unary(UnaryOperator, Box<AnnotatedExpression>, ErrorInfo),
    Binary(BinaryOperator, Box<AnnotatedExpression>, Box<AnnotatedExpression>, ErrorInfo),
    Logical(LogicalOperator, Box<AnnotatedExpression>, Box<AnnotatedExpression>, ErrorInfo),
    Variable(String, ExprId, ErrorInfo),
    Assign(String, ExprId, Box<AnnotatedExpression>, ErrorInfo),
    // The error info points at the closing parenthesis.
    Call(Box<AnnotatedExpression>, Vec<AnnotatedExpression>, ErrorInfo),
}

impl From<&AnnotatedExpression> for Expression {
    fn from(ae: &AnnotatedExpression) -> Self {
        match ae {
            AnnotatedExpression::Literal(atom, _) => Expression::Literal(atom.to_owned()),
            AnnotatedExpression::Grouping(e, _) =>
                Expression::Grouping(Box::new(e.as_ref().into())),
            AnnotatedExpression::Unary(op, e, _) =>
                Expression::Unary(*op, Box::new(e.as_ref().into())),
            AnnotatedExpression::Binary(op, e1, e2, _) =>
                Expression::Binary(
                    *op,
                    Box::new(e1.as_ref().into()),
                    Box::new(e2.as_ref().into()),
                ),
            AnnotatedExpression::Logical(op, e1, e2, _) =>
                Expression::Logical(
                    *op,
                    Box::new(e1.as_ref().into()),
                    Box::new(e2.as_ref().into()),
                ),
            AnnotatedExpression::Variable(name, ..) => Expression::Variable(name.to_owned()),
            AnnotatedExpression::Assign(name, _, e, _) =>
                Expression::Assign(name.to_owned(), Box::new(e.as_ref().into())),
            AnnotatedExpression::Call(callee, args, _) =>
                Expression::Call(
                    Box::new(callee.as_ref().into()),
                    args.iter().map(|a| a.into()).collect(),
                ),
        }
    }
}
