//! Kodegen Bundler Setup - macOS setup assembler for Java applications.
//!
//! This binary assembles .app bundles and service preference panes from a
//! declarative setup file, with proper error handling and exit codes.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match kodegen_bundler_setup::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
