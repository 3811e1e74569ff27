use std::path::Path;

use anyhow::Result;
use bridgelift_core::{Config, RunLock};
use owo_colors::OwoColorize;

pub fn run(config_path: &Path, config: &Config) -> Result<()> {
    let data_path = config.data_path();

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Data:    {}", data_path.display());
    println!("  Lock:    {}", RunLock::path_for(&data_path).display());
    println!();
    println!("{}", "Effective config".bold());
    for line in config.to_toml()?.lines() {
        println!("  {line}");
    }

    Ok(())
}
