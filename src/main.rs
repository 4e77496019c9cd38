// Thin binary wrapper; every command lives in the library's `cli` module.
use clap::Parser;
use newsgroup_classify::cli::{execute_command, ClassifyArgs};
use newsgroup_classify::logging;
use std::process;

fn main() {
    let args = ClassifyArgs::parse();
    logging::init(args.log_level);

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
