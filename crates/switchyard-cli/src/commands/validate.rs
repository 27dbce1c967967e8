//! Validate a routing configuration.

use clap::Args;
use switchyard_config::ValidationError;

use super::common::load_config;

/// Validate a routing configuration file.
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the routing configuration (TOML)
    pub config: std::path::PathBuf,
}

/// Run the validate command.
pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;

    match config.validate() {
        Ok(()) => {
            println!(
                "{}: valid ({} connections, {} midpoints)",
                config.name,
                config.len(),
                config.midpoints.len()
            );
            Ok(())
        }
        Err(err) => {
            let errors = match err {
                ValidationError::Multiple(errors) => errors,
                single => vec![single],
            };
            println!("{}: {} problem(s)", config.name, errors.len());
            for error in &errors {
                println!("  - {error}");
            }
            anyhow::bail!("'{}' is not a valid routing configuration", args.config.display())
        }
    }
}
