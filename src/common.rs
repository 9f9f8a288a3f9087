pub mod error;
pub mod lexer;
pub mod utils;
#[cfg(test)]
pub mod tests;
