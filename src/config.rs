use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Once;

// Exit codes, as in sysexits.h.
pub const EX_USAGE: i32 = 64;
pub const EX_DATAERR: i32 = 65;
pub const EX_SOFTWARE: i32 = 70;
pub const EX_IOERR: i32 = 74;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Mode {
    Prompt,
    File(PathBuf),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Config {
    pub mode: Mode,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UsageError;

impl Display for UsageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Usage: treelox [script]")
    }
}

impl Config {
    /// `args` is the full argument list, program name included.
    pub fn from_args<I: IntoIterator<Item=String>>(args: I) -> Result<Config, UsageError> {
        let args: Vec<String> = args.into_iter().skip(1).collect();
        match args.as_slice() {
            [] => Ok(Config { mode: Mode::Prompt }),
            [script] => Ok(Config { mode: Mode::File(PathBuf::from(script)) }),
            _ => Err(UsageError),
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber filtered by `RUST_LOG`, e.g. `RUST_LOG=treelox=trace`. Does
/// nothing when the variable is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_starts_a_prompt() {
        assert_eq!(Config::from_args(args(&["treelox"])), Ok(Config { mode: Mode::Prompt }));
        assert_eq!(Config::from_args(Vec::new()), Ok(Config { mode: Mode::Prompt }));
    }

    #[test]
    fn single_argument_is_a_script() {
        assert_eq!(
            Config::from_args(args(&["treelox", "script.lox"])),
            Ok(Config { mode: Mode::File(PathBuf::from("script.lox")) }),
        );
    }

    #[test]
    fn extra_arguments_are_a_usage_error() {
        let error = Config::from_args(args(&["treelox", "a.lox", "b.lox"])).unwrap_err();
        assert_eq!(error.to_string(), "Usage: treelox [script]");
    }

    #[test]
    fn tracing_can_be_initialised_twice() {
        init_tracing();
        init_tracing();
    }
}
