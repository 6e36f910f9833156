use std::env;

use crate::errors::GatewayError;

/// Variable naming the settings module the inner application loads.
pub const SETTINGS_MODULE_VAR: &str = "APP_SETTINGS_MODULE";
pub const DEFAULT_SETTINGS_MODULE: &str = "app.settings";
pub const DEFAULT_HOST: &str = "localhost";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    pub settings_module_var: String,
    pub settings_module: String,
    /// Whether 500 responses carry the error message and trace.
    /// Meant for development; turn off where internals must not leak.
    pub expose_errors: bool,
    /// Server name used when a request carries no Host header.
    pub default_host: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            settings_module_var: SETTINGS_MODULE_VAR.to_string(),
            settings_module: DEFAULT_SETTINGS_MODULE.to_string(),
            expose_errors: true,
            default_host: DEFAULT_HOST.to_string(),
        }
    }
}

impl AdapterConfig {
    /// Reads overrides from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] when a variable holds an unusable value.
    pub fn from_env() -> Result<Self, GatewayError> {
        let defaults = Self::default();
        Ok(Self {
            expose_errors: match env::var("GATEWAY_EXPOSE_ERRORS") {
                Ok(raw) => parse_flag(&raw).ok_or_else(|| {
                    GatewayError::Config(format!("GATEWAY_EXPOSE_ERRORS: invalid value {raw:?}"))
                })?,
                Err(_) => defaults.expose_errors,
            },
            default_host: env::var("GATEWAY_DEFAULT_HOST")
                .ok()
                .filter(|h| !h.is_empty())
                .unwrap_or(defaults.default_host),
            ..defaults
        })
    }

    /// Sets the settings-module variable unless something already set it.
    /// Returns the value in effect afterwards.
    pub fn ensure_settings_module(&self) -> String {
        ensure_env_default(&self.settings_module_var, &self.settings_module)
    }
}

/// Sets `key` to `default` only if it is currently unset, and returns the
/// value the process ends up with.
pub fn ensure_env_default(key: &str, default: &str) -> String {
    if let Ok(existing) = env::var(key) {
        return existing;
    }
    // SAFETY: assumes no other thread reads the environment through libc
    // while the application is bootstrapping.
    unsafe { env::set_var(key, default) };
    default.to_string()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn parses_common_flag_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
