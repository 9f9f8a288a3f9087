use crate::common::error::{ErrorInfo, ErrorKind, LoxError};
use crate::interpreter::result::InterpreterError::{NotCallable, Output, TypeError, UndefinedVariable};

#[derive(Debug, Clone, PartialEq)]
pub enum InterpreterError {
    UndefinedVariable(String, ErrorInfo),
    TypeError(String, ErrorInfo),
    NotCallable(ErrorInfo),
    Output(ErrorInfo),
}

impl InterpreterError {
    pub fn type_error<S: Into<String>>(message: S, error_info: ErrorInfo) -> Self {
        TypeError(message.into(), error_info)
    }
}

impl LoxError for InterpreterError {
    fn get_info(&self) -> ErrorInfo {
        match self {
            UndefinedVariable(_, i) => *i,
            TypeError(_, i) => *i,
            NotCallable(i) => *i,
            Output(i) => *i,
        }
    }

    fn get_message(&self) -> String {
        match self {
            UndefinedVariable(name, _) => format!("Undefined variable '{}'.", name),
            TypeError(m, _) => m.to_owned(),
            NotCallable(_) => "Can only call functions and classes.".to_owned(),
            Output(_) => "Could not write output.".to_owned(),
        }
    }

    fn get_kind(&self) -> ErrorKind { ErrorKind::Runtime }
}

pub type InterpretResult<A> = Result<A, InterpreterError>;
