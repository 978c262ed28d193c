//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = roadnet_cli::run() {
        eprintln!("roadnet: {err}");
        std::process::exit(1);
    }
}
