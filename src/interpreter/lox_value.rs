use std::fmt::{Display, Formatter};

use crate::ast::Atom;
use crate::interpreter::lox_value::LoxValue::{Bool, Nil, Number};

#[derive(Debug, Clone, PartialEq)]
pub enum LoxValue {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,
}

impl LoxValue {
    /// Integral numbers print without a trailing `.0`.
    pub fn stringify(&self) -> String {
        match self {
            Number(n) => {
                let text = format!("{:?}", n);
                match text.strip_suffix(".0") {
                    Some(integral) => integral.to_owned(),
                    None => text,
                }
            }
            LoxValue::String(s) => s.to_owned(),
            Bool(b) => b.to_string(),
            Nil => "nil".to_owned(),
        }
    }

    /// Only `nil` and `false` are falsy.
    pub fn truthiness(&self) -> bool {
        match self {
            Bool(b) => *b,
            Nil => false,
            _ => true,
        }
    }

    // Numbers compare as IEEE doubles, so NaN is unequal to itself.
    pub fn equal_equal(&self, other: &LoxValue) -> bool {
        match (self, other) {
            (Number(n1), Number(n2)) => n1 == n2,
            (LoxValue::String(s1), LoxValue::String(s2)) => s1 == s2,
            (Bool(b1), Bool(b2)) => b1 == b2,
            (Nil, Nil) => true,
            _ => false,
        }
    }
}

impl Display for LoxValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.stringify())
    }
}

impl From<&Atom> for LoxValue {
    fn from(atom: &Atom) -> Self {
        match atom {
            Atom::Number(n) => Number(*n),
            Atom::String(s) => LoxValue::String(s.to_owned()),
            Atom::True => Bool(true),
            Atom::False => Bool(false),
            Atom::Nil => Nil,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_drop_the_fraction() {
        assert_eq!(Number(3.0).stringify(), "3");
        assert_eq!(Number(-0.0).stringify(), "-0");
        assert_eq!(Number(2.5).stringify(), "2.5");
        assert_eq!(Number(0.1 + 0.2).stringify(), "0.30000000000000004");
    }

    #[test]
    fn non_numbers_use_their_natural_text() {
        assert_eq!(Nil.stringify(), "nil");
        assert_eq!(Bool(false).to_string(), "false");
        assert_eq!(LoxValue::String("a b".into()).stringify(), "a b");
    }

    #[test]
    fn zero_and_empty_string_are_truthy() {
        assert!(Number(0.0).truthiness());
        assert!(LoxValue::String(String::new()).truthiness());
        assert!(!Nil.truthiness());
        assert!(!Bool(false).truthiness());
    }

    #[test]
    fn equality_never_coerces() {
        assert!(Nil.equal_equal(&Nil));
        assert!(!Nil.equal_equal(&Bool(false)));
        assert!(!Number(1.0).equal_equal(&LoxValue::String("1".into())));
        assert!(!Number(f64::NAN).equal_equal(&Number(f64::NAN)));
        assert!(LoxValue::String("a".into()).equal_equal(&LoxValue::String("a".into())));
    }
}
