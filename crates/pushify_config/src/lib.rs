use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

pub mod models;
pub use models::*;

/// Loads the application configuration.
///
/// Sources are layered in order: `config/default.*`, `config/{RUN_ENV}.*`
/// (RUN_ENV defaults to `debug`), then environment variables prefixed with
/// `PUSHIFY` using `__` as the section separator, e.g.
/// `PUSHIFY__SERVER__PORT=8086`. Finally, `secret_from_env` markers in the
/// parsed config are replaced from plain environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "PUSHIFY".to_string());

    let manifest_dir =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string()));
    let workspace_root = manifest_dir
        .ancestors()
        .nth(2) // go from crates/pushify_config to workspace root
        .unwrap_or(&manifest_dir)
        .to_path_buf();

    let default_path = workspace_root.join("config/default");
    let env_path = workspace_root.join(format!("config/{}", run_env));

    debug!("config: workspace_root: {}", workspace_root.display());
    debug!("config: default_path: {}", default_path.display());
    debug!("config: env_path: {}", env_path.display());

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Recursively replaces all "secret_from_env" string values with environment
/// variable values. The variable name is the config path joined with `_` and
/// uppercased, e.g. `gateway.api_key` reads `GATEWAY_API_KEY`.
fn inject_env_secrets(value: &mut Value) {
    fn walk(path: Vec<String>, obj: &mut Value) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    walk(new_path, v);
                }
            }
            Value::String(s) if s == "secret_from_env" => {
                let env_key = path.join("_").to_uppercase();
                if let Ok(env_val) = std::env::var(&env_key) {
                    *obj = Value::String(env_val);
                } else {
                    warn!("env var {} not found for secret_from_env", env_key);
                }
            }
            _ => {}
        }
    }

    walk(vec![], value);
}

/// Applies environment overrides based on "secret_from_env" markers in the
/// serialized config.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("config not serializable: {err}")))?;
    inject_env_secrets(&mut json);
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("env override produced invalid config: {err}")))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// Loading happens at most once per process, guarded by a `OnceCell`. The file
/// defaults to `.env` and can be overridden via the `DOTENV_OVERRIDE` variable
/// or a leading `.env*` command line argument.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = std::env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let raw = r#"{"server": {"host": "127.0.0.1", "port": 8086}}"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.server.port, 8086);
        assert!(config.database.is_none());
        assert!(config.gateway.is_none());
    }

    #[test]
    fn gateway_section_parses_optional_ids() {
        let raw = r#"{
            "server": {"host": "0.0.0.0", "port": 8080},
            "gateway": {"base_url": "https://push.example.com", "api_key": "k"}
        }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        let gateway = config.gateway.unwrap();
        assert_eq!(gateway.base_url, "https://push.example.com");
        assert!(gateway.platform_application_id.is_none());
        assert!(gateway.broadcast_topic_id.is_none());
    }

    #[test]
    fn secret_marker_is_replaced_from_env() {
        std::env::set_var("TESTGATEWAY_API_KEY", "from-env");
        let mut value = serde_json::json!({
            "testgateway": {"api_key": "secret_from_env", "base_url": "https://x"}
        });
        inject_env_secrets(&mut value);
        assert_eq!(value["testgateway"]["api_key"], "from-env");
        assert_eq!(value["testgateway"]["base_url"], "https://x");
        std::env::remove_var("TESTGATEWAY_API_KEY");
    }

    #[test]
    fn missing_env_leaves_marker_untouched() {
        let mut value = serde_json::json!({
            "testgw_absent": {"api_key": "secret_from_env"}
        });
        inject_env_secrets(&mut value);
        assert_eq!(value["testgw_absent"]["api_key"], "secret_from_env");
    }
}
