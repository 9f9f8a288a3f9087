use std::fmt::Debug;

use nonempty::NonEmpty;

use crate::annotated_ast::AnnotatedProgram;
use crate::common::lexer::{Token, tokenize};
use crate::parser::parse;
use crate::resolve::{Locals, resolve};

pub fn unsafe_tokenize(program: Vec<&str>) -> Vec<Token> {
    tokenize(program.join("\n").as_ref()).expect("Failed to tokenize")
}

pub fn unsafe_parse(program: Vec<&str>) -> AnnotatedProgram {
    parse(&unsafe_tokenize(program)).expect("Failed to parse")
}

pub fn unsafe_resolve(program: Vec<&str>) -> (AnnotatedProgram, Locals) {
    let ast = unsafe_parse(program);
    let locals = resolve(&ast).expect("Failed to resolve");
    (ast, locals)
}

pub trait SliceExt<A> {
    fn unwrap_single(&self) -> &A;
}

impl<A: Debug> SliceExt<A> for [A] {
    fn unwrap_single(&self) -> &A {
        assert_eq!(self.len(), 1, "Expected slice with single element, got {:?}", self);
        &self[0]
    }
}

impl<A: Debug> SliceExt<A> for NonEmpty<A> {
    fn unwrap_single(&self) -> &A {
        assert!(self.tail().is_empty(), "Expected NonEmpty with single element, got {:?}", self);
        self.first()
    }
}

pub fn eq_vec_msg<A>(left: Vec<A>, right: Vec<A>) -> Option<String> where A: PartialEq + Debug {
    if left == right {
        return None;
    }
    let split = |v: &Vec<A>| -> String {
        v.iter().map(|a| format!("{:?}", a)).collect::<Vec<_>>().join("\n")
    };
    let left_split = split(&left);
    let right_split = split(&right);
    if left.len() != right.len() {
        return Some(format!(
            "different lengths...\nleft vector:\n{}\nright vector:\n{}\n",
            left_split,
            right_split,
        ));
    }

    let mut result = format!(
        "different values...\nleft vector:\n{}\nright vector:\n{}\n",
        left_split,
        right_split,
    );
    for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
        if l != r {
            result.push_str(format!("At index '{}',\nleft : {:?}\nright: {:?}\n", i, l, r).as_ref())
        }
    }
    Some(result)
}

#[macro_export] macro_rules! assert_eq_vec {
    ($expected: expr, $actual: expr $(,)?) => {{
        if let Some(s) = $crate::common::tests::eq_vec_msg($expected, $actual) {
            panic!("{}", s);
        }
    }}
}
