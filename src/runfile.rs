use std::fmt::{Display, Formatter};
use std::fs::read_to_string;
use std::io;
use std::path::{Path, PathBuf};

use nonempty::NonEmpty;
use tracing::debug;

use crate::common::error::{report, worst_kind, ErrorKind, LoxError};
use crate::config::{EX_DATAERR, EX_IOERR, EX_SOFTWARE};
use crate::interpreter::Interpreter;
use crate::prompt::run;

#[derive(Debug)]
pub enum RunFileError {
    Io(PathBuf, io::Error),
    Lox(NonEmpty<Box<dyn LoxError>>),
}

impl RunFileError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunFileError::Io(..) => EX_IOERR,
            RunFileError::Lox(errors) => match worst_kind(errors) {
                ErrorKind::Runtime => EX_SOFTWARE,
                _ => EX_DATAERR,
            },
        }
    }
}

impl Display for RunFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RunFileError::Io(path, e) => write!(f, "Cannot open file {}: {}", path.display(), e),
            RunFileError::Lox(errors) => {
                let reports: Vec<String> = errors.iter().map(|e| report(e.as_ref())).collect();
                write!(f, "{}", reports.join("\n"))
            }
        }
    }
}

pub fn run_file(path: &Path) -> Result<(), RunFileError> {
    let source = read_to_string(path).map_err(|e| RunFileError::Io(path.to_owned(), e))?;
    debug!(path = %path.display(), bytes = source.len(), "running file");
    let mut interpreter = Interpreter::new(io::stdout());
    run(&source, &mut interpreter).map_err(RunFileError::Lox)
}
