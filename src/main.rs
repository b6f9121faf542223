//! compat-build - secondary-architecture build pass.
//!
//! This binary resolves which extra architecture variants a build needs and
//! drives the toolchain to produce them.

use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match compat_build::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(output) = e.toolchain_output() {
                eprintln!("Output:\n\t| {}", output.join("\n\t| "));
            }
            1
        }
    };

    process::exit(exit_code);
}
