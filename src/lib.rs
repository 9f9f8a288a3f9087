pub mod annotated_ast;
pub mod ast;
pub mod common;
pub mod config;
pub mod interpreter;
pub mod parser;
pub mod prompt;
pub mod resolve;
pub mod runfile;
