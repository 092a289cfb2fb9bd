use uuid::Uuid;

use crate::app::config_path;
use crate::cli::Cli;
use crate::config::{default_data_path, AppConfig};

pub fn handle_init(cli: &Cli, user: Option<&str>) -> anyhow::Result<()> {
    let config_path = config_path(cli);
    if config_path.exists() {
        anyhow::bail!("Config already exists at {}", config_path.display());
    }

    let data_path = match &cli.data {
        Some(path) => std::path::PathBuf::from(path),
        None => default_data_path(),
    };
    let user_id = match user {
        Some(id) => id.to_string(),
        None => Uuid::new_v4().to_string(),
    };

    let config = AppConfig::new(&data_path, user_id.clone());
    config.save(&config_path)?;

    if !cli.quiet {
        println!("Initialized config at {}", config_path.display());
        println!("Data file: {}", data_path.display());
        println!("Identity: {}", user_id);
    }
    Ok(())
}
