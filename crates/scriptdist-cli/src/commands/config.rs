//! `scriptdist config`: inspect the effective configuration.

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::{AppConfig, PROJECT_CONFIG_FILE},
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(
    cmd: ConfigCommands,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(config, &key)?;
            output.json(&value)?;
            output.print(&render_value(&value))?;
        }

        ConfigCommands::List => {
            output.json(config)?;
            output.header("Current Configuration:")?;
            let serialised = toml::to_string_pretty(config).map_err(|e| CliError::ConfigError {
                message: format!("Failed to serialise config: {e}"),
                source: Some(Box::new(e)),
            })?;
            output.print(&serialised)?;
        }

        ConfigCommands::Path => match AppConfig::locate(global.config.as_ref(), &global.project_dir) {
            Some(path) => output.print(&path.display().to_string())?,
            None => output.info(&format!(
                "No configuration file; defaults apply (create {} with `scriptdist init`)",
                global.project_dir.join(PROJECT_CONFIG_FILE).display()
            ))?,
        },
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<serde_json::Value> {
    config.get(key).ok_or_else(|| CliError::ConfigError {
        message: format!("Unknown config key: '{key}'"),
        source: None,
    })
}

/// Strings unquoted, everything else as JSON.
fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_known_key() {
        let cfg = AppConfig::default();
        let value = get_config_value(&cfg, "github.repo").unwrap();
        assert_eq!(render_value(&value), "gradle-enterprise-build-validation-scripts");
    }

    #[test]
    fn get_unknown_key_is_error() {
        let cfg = AppConfig::default();
        assert!(matches!(
            get_config_value(&cfg, "does.not.exist"),
            Err(CliError::ConfigError { .. })
        ));
    }

    #[test]
    fn non_strings_render_as_json() {
        let cfg = AppConfig::default();
        assert_eq!(
            render_value(&get_config_value(&cfg, "git.push_tags").unwrap()),
            "true"
        );
        assert_eq!(
            render_value(&get_config_value(&cfg, "github.timeout_secs").unwrap()),
            "60"
        );
    }
}
