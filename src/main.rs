use std::env;
use std::process;

use treelox::config::{init_tracing, Config, Mode, EX_IOERR, EX_USAGE};
use treelox::prompt::run_prompt;
use treelox::runfile::run_file;

fn main() {
    init_tracing();
    let config = match Config::from_args(env::args()) {
        Ok(config) => config,
        Err(usage) => {
            eprintln!("{}", usage);
            process::exit(EX_USAGE);
        }
    };
    match config.mode {
        Mode::Prompt => {
            if let Err(e) = run_prompt() {
                eprintln!("{}", e);
                process::exit(EX_IOERR);
            }
        }
        Mode::File(path) => {
            if let Err(e) = run_file(&path) {
                eprintln!("{}", e);
                process::exit(e.exit_code());
            }
        }
    }
}
