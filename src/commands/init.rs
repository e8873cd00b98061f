use anyhow::Result;
use hindex::config::Config;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let config_path = path.join("config.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    std::fs::create_dir_all(path)?;
    let config = Config::default();
    std::fs::write(&config_path, toml::to_string_pretty(&config)?)?;

    println!("Wrote default configuration to {}", config_path.display());
    Ok(())
}
