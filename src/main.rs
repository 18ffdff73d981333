// src/main.rs

use clap::Parser;

use lqles::{run, LaplaceError, RunConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = RunConfig::parse();

    if let Err(e) = run(&config) {
        eprintln!("Error: {e}");
        let code = match e {
            LaplaceError::MissingInput(_) => 3,
            _ => 1,
        };
        std::process::exit(code);
    }
}
