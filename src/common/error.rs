use std::fmt::Debug;

use nonempty::NonEmpty;

use crate::common::lexer::{Token, TokenType};

pub trait LoxError: Debug {
    fn get_info(&self) -> ErrorInfo;
    fn get_message(&self) -> String;
    fn get_kind(&self) -> ErrorKind;
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ErrorInfo {
    pub line: usize,
}

/// The stage that produced an error. Drivers use it to pick an exit code.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Resolution,
    Runtime,
}

pub type LoxResult<A> = Result<A, NonEmpty<Box<dyn LoxError>>>;

pub fn convert_errors<A, E: LoxError + 'static>(result: Result<A, NonEmpty<E>>) -> LoxResult<A> {
    result.map_err(|e| e.map::<Box<dyn LoxError>, _>(|a| Box::new(a)))
}

pub fn convert_error<A, E: LoxError + 'static>(result: Result<A, E>) -> LoxResult<A> {
    convert_errors(result.map_err(NonEmpty::new))
}

/// Formats a single error the way the drivers print it.
pub fn report(error: &dyn LoxError) -> String {
    format!("[line {}] Error: {}", error.get_info().line, error.get_message())
}

/// Runtime errors dominate: if any error in the list is a runtime error, the whole batch is one.
pub fn worst_kind(errors: &NonEmpty<Box<dyn LoxError>>) -> ErrorKind {
    if errors.iter().any(|e| e.get_kind() == ErrorKind::Runtime) {
        ErrorKind::Runtime
    } else {
        errors.first().get_kind()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ParserError {
    pub message: String,
    pub token: Token,
}

impl ParserError {
    pub fn new<S: Into<String>>(message: S, token: Token) -> Self {
        ParserError { message: message.into(), token }
    }
}

impl LoxError for ParserError {
    fn get_info(&self) -> ErrorInfo {
        ErrorInfo { line: self.token.line }
    }

    fn get_message(&self) -> String {
        match self.token.get_type() {
            TokenType::Eof => format!("at end: {}", self.message),
            _ => format!("at '{}': {}", self.token.lexeme, self.message),
        }
    }

    fn get_kind(&self) -> ErrorKind { ErrorKind::Syntax }
}
