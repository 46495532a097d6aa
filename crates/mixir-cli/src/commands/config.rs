//! Configuration commands.

use serde_json::json;

use super::Context;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Prints the effective configuration. Secret references are shown as
/// written, not resolved.
pub fn dump(ctx: &Context) -> CliResult<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&ctx.config)?);
        return Ok(());
    }
    let toml_str = toml::to_string_pretty(&ctx.config)
        .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;
    println!("# config.toml ({})", CliConfig::default_path().display());
    println!("{toml_str}");
    Ok(())
}

pub fn validate(ctx: &Context) -> CliResult<()> {
    ctx.config.validate()?;
    ctx.done("Configuration is valid.")
}

pub fn path(ctx: &Context) -> CliResult<()> {
    let config = CliConfig::default_path();
    let user = ctx.session.user_path();
    ctx.emit(
        &json!({ "config": config, "user": user }),
        |_| {
            println!("config: {}", config.display());
            println!("user:   {}", user.display());
        },
    )
}
