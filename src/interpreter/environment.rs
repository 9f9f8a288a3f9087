use std::collections::HashMap;

use crate::ast::ScopeJumps;
use crate::common::error::ErrorInfo;
use crate::common::utils::RcRc;
use crate::interpreter::lox_value::LoxValue;
use crate::interpreter::result::{InterpretResult, InterpreterError};

/// A single frame of bindings. Frames are shared, since a frame may outlive the block that
/// created it.
#[derive(Debug, Default)]
pub struct Environment {
    enclosing: Option<RcRc<Environment>>,
    values: HashMap<String, LoxValue>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn new_enclosed(enclosing: RcRc<Environment>) -> Self {
        Environment { enclosing: Some(enclosing), values: HashMap::new() }
    }

    /// Binds in this frame only, overwriting any previous binding of the same name.
    pub fn define<S: Into<String>>(&mut self, name: S, value: LoxValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str, error_info: ErrorInfo) -> InterpretResult<LoxValue> {
        if let Some(value) = self.values.get(name) {
            return Ok(value.clone());
        }
        match &self.enclosing {
            Some(enclosing) => enclosing.borrow().get(name, error_info),
            None => Err(undefined(name, error_info)),
        }
    }

    /// Mutates the nearest existing binding; never creates one.
    pub fn assign(&mut self, name: &str, value: LoxValue, error_info: ErrorInfo) -> InterpretResult<()> {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            return Ok(());
        }
        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value, error_info),
            None => Err(undefined(name, error_info)),
        }
    }

    /// The frame exactly `distance` enclosing links away, if the chain is that long.
    pub fn ancestor(env: &RcRc<Environment>, distance: ScopeJumps) -> Option<RcRc<Environment>> {
        let mut frame = env.clone();
        for _ in 0..distance {
            let next = frame.borrow().enclosing.clone()?;
            frame = next;
        }
        Some(frame)
    }

    pub fn get_at(
        env: &RcRc<Environment>,
        distance: ScopeJumps,
        name: &str,
        error_info: ErrorInfo,
    ) -> InterpretResult<LoxValue> {
        let frame = Environment::ancestor(env, distance).ok_or_else(|| undefined(name, error_info))?;
        let value = frame.borrow().values.get(name).cloned();
        value.ok_or_else(|| undefined(name, error_info))
    }

    pub fn assign_at(
        env: &RcRc<Environment>,
        distance: ScopeJumps,
        name: &str,
        value: LoxValue,
        error_info: ErrorInfo,
    ) -> InterpretResult<()> {
        let frame = Environment::ancestor(env, distance).ok_or_else(|| undefined(name, error_info))?;
        let mut frame = frame.borrow_mut();
        match frame.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name, error_info)),
        }
    }
}

fn undefined(name: &str, error_info: ErrorInfo) -> InterpreterError {
    InterpreterError::UndefinedVariable(name.to_owned(), error_info)
}
