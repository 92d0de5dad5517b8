use std::process;

use clap::Parser;

use edlint::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();

    match cli::run(cli) {
        Ok(code) => process::exit(code),
        // Piping into head closes stdout early; that is a clean exit
        Err(err) if err.is_broken_pipe() => process::exit(0),
        Err(err) => {
            eprintln!("ERROR: {err}");
            process::exit(1);
        }
    }
}
