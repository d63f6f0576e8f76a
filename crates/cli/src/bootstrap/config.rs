use autoguard_domain::{CliOverrides, Config};

/// Load and validate configuration. Logging is not yet initialized when
/// this runs, so the summary line is emitted by the caller afterwards.
pub fn load_config(config_path: Option<&str>, cli_overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}
