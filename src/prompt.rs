use std::io;
use std::io::{BufRead, Write};

use tracing::debug;

use crate::common::error::{report, LoxResult};
use crate::common::lexer::tokenize;
use crate::interpreter::Interpreter;
use crate::parser::parse;
use crate::resolve::resolve;

/// Interactive session. Every line runs against the same interpreter, so globals survive between
/// lines. Errors are reported and the session goes on; end of input ends it.
pub fn run_prompt() -> io::Result<()> {
    let stdin = io::stdin();
    let mut interpreter = Interpreter::new(io::stdout());
    let mut line_read = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        line_read.clear();
        if stdin.lock().read_line(&mut line_read)? == 0 {
            debug!("end of input");
            println!();
            return Ok(());
        }
        if let Err(errors) = run(&line_read, &mut interpreter) {
            for e in errors {
                eprintln!("{}", report(e.as_ref()));
            }
        }
    }
}

/// The whole pipeline for one chunk of source. Nothing is executed unless every static stage
/// succeeded.
pub fn run<W: Write>(source: &str, interpreter: &mut Interpreter<W>) -> LoxResult<()> {
    let tokens = tokenize(source)?;
    let program = parse(&tokens)?;
    let locals = resolve(&program)?;
    interpreter.add_locals(locals);
    interpreter.interpret(&program)
}
