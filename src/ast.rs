use std::fmt;
use std::fmt::{Display, Formatter};

/// Identity-free program shape. Parsed programs are projected into it for structural comparison
/// and printing; see [`crate::annotated_ast`] for the executable tree.
#[derive(Debug, PartialEq, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self { Program { statements } }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Block(Vec<Statement>),
    IfElse { cond: Expression, if_stmt: Box<Statement>, else_stmt: Option<Box<Statement>> },
    Variable(String, Option<Expression>),
    Expression(Expression),
    Print(Expression),
}

impl Statement {
    pub fn variable<S: Into<String>>(str: S, expr: Expression) -> Self {
        Statement::Variable(str.into(), Some(expr))
    }
    pub fn declaration<S: Into<String>>(str: S) -> Self {
        Statement::Variable(str.into(), None)
    }
    pub fn if_else(cond: Expression, if_stmt: Statement, else_stmt: Option<Statement>) -> Self {
        Statement::IfElse { cond, if_stmt: Box::new(if_stmt), else_stmt: else_stmt.map(Box::new) }
    }
}

/// Number of enclosing-environment hops between the frame a name is used in and the frame
/// holding its binding.
pub type ScopeJumps = usize;

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Literal(Atom),
    Grouping(Box<Expression>),
    Unary(UnaryOperator, Box<Expression>),
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
    Logical(LogicalOperator, Box<Expression>, Box<Expression>),
    Variable(String),
    Assign(String, Box<Expression>),
    Call(Box<Expression>, Vec<Expression>),
}

impl Expression {
    pub fn pretty_print(&self) -> String {
        fn aux(e: &Expression, depth: usize) -> String {
            let indent = |s: &str| -> String {
                format!("{}{}", "\t".repeat(depth), s)
            };
            match e {
                Expression::Literal(atom) => indent(&atom.to_source()),
                Expression::Variable(name) => indent(name),
                Expression::Grouping(e) => indent(&format!("(\n{})", aux(e, depth + 1))),
                Expression::Assign(name, e) =>
                    indent(&format!("{} := (\n{})", name, aux(e, depth + 1))),
                Expression::Unary(op, e) =>
                    indent(&format!("{}(\n{})", op.symbol(), aux(e, depth + 1))),
                Expression::Binary(op, e1, e2) =>
                    indent(&format!("{}(\n{},\n{})", op.symbol(), aux(e1, depth + 1), aux(e2, depth + 1))),
                Expression::Logical(op, e1, e2) =>
                    indent(&format!("{}(\n{},\n{})", op.symbol(), aux(e1, depth + 1), aux(e2, depth + 1))),
                Expression::Call(callee, args) =>
                    indent(&format!(
                        "call(\n{}{})",
                        aux(callee, depth + 1),
                        args.iter().map(|arg| format!(",\n{}", aux(arg, depth + 1))).collect::<String>(),
                    )),
            }
        }
        aux(self, 0)
    }

    /// Source text which parses back into this exact shape. Parentheses only appear where the
    /// tree has an explicit [`Expression::Grouping`].
    pub fn to_source(&self) -> String {
        match self {
            Expression::Literal(atom) => atom.to_source(),
            Expression::Variable(name) => name.to_owned(),
            Expression::Grouping(e) => format!("({})", e.to_source()),
            Expression::Assign(name, e) => format!("{} = {}", name, e.to_source()),
            Expression::Unary(op, e) => format!("{}{}", op.symbol(), e.to_source()),
            Expression::Binary(op, e1, e2) =>
                format!("{} {} {}", e1.to_source(), op.symbol(), e2.to_source()),
            Expression::Logical(op, e1, e2) =>
                format!("{} {} {}", e1.to_source(), op.symbol(), e2.to_source()),
            Expression::Call(callee, args) => format!(
                "{}({})",
                callee.to_source(),
                args.iter().map(|a| a.to_source()).collect::<Vec<_>>().join(", "),
            ),
        }
    }

    pub fn number(n: f64) -> Self { Expression::Literal(Atom::Number(n)) }
    pub fn string<S: Into<String>>(str: S) -> Self { Expression::Literal(Atom::string(str)) }
    pub fn variable<S: Into<String>>(str: S) -> Self { Expression::Variable(str.into()) }
    pub fn assign<S: Into<String>>(str: S, value: Expression) -> Self {
        Expression::Assign(str.into(), Box::new(value))
    }
    pub fn grouping(expr: Expression) -> Self { Expression::Grouping(Box::new(expr)) }
    pub fn unary(op: UnaryOperator, expr: Expression) -> Self { Expression::Unary(op, Box::new(expr)) }
    pub fn binary(op: BinaryOperator, e1: Expression, e2: Expression) -> Self {
        Expression::Binary(op, Box::new(e1), Box::new(e2))
    }
    pub fn logical(op: LogicalOperator, e1: Expression, e2: Expression) -> Self {
        Expression::Logical(op, Box::new(e1), Box::new(e2))
    }
}

/// Fully parenthesised prefix form, e.g. `(- (- 1 2) 3)`.
impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(atom) => write!(f, "{}", atom.to_source()),
            Expression::Variable(name) => write!(f, "{}", name),
            Expression::Grouping(e) => write!(f, "(group {})", e),
            Expression::Assign(name, e) => write!(f, "(= {} {})", name, e),
            Expression::Unary(op, e) => write!(f, "({} {})", op.symbol(), e),
            Expression::Binary(op, e1, e2) => write!(f, "({} {} {})", op.symbol(), e1, e2),
            Expression::Logical(op, e1, e2) => write!(f, "({} {} {})", op.symbol(), e1, e2),
            Expression::Call(callee, args) => {
                write!(f, "(call {}", callee)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Atom {
    Number(f64),
    String(String),
    True,
    False,
    Nil,
}

impl Atom {
    pub fn string<S: Into<String>>(str: S) -> Self { Atom::String(str.into()) }

    pub fn to_source(&self) -> String {
        match self {
            Atom::Number(n) => n.to_string(),
            Atom::String(s) => format!("\"{}\"", s),
            Atom::True => "true".to_owned(),
            Atom::False => "false".to_owned(),
            Atom::Nil => "nil".to_owned(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub enum UnaryOperator {
    Minus,
    Bang,
}

impl UnaryOperator {
    pub fn symbol(&self) -> &str {
        match self {
            UnaryOperator::Minus => "-",
            UnaryOperator::Bang => "!",
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub enum BinaryOperator {
    Minus,
    Plus,
    Div,
    Mult,

    BangEqual,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &str {
        match self {
            BinaryOperator::Minus => "-",
            BinaryOperator::Plus => "+",
            BinaryOperator::Div => "/",
            BinaryOperator::Mult => "*",
            BinaryOperator::BangEqual => "!=",
            BinaryOperator::EqualEqual => "==",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
        }
    }
}

/// Short-circuiting operators; kept apart from [`BinaryOperator`] since the right operand is
/// evaluated conditionally.
#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn symbol(&self) -> &str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }
}
