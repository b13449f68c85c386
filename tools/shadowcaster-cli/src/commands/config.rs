//! Print the effective configuration.

use shadowcaster_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("# {}", config_file_path().display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
