//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ScrubberConfig;
use crate::config::secret_string;
use crate::domain::errors::ScrubberError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ScrubberConfig
/// 4. Applies environment variable overrides (SCRUBBER_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns [`ScrubberError::Configuration`] if:
/// - File cannot be read
/// - A referenced environment variable is not set
/// - TOML parsing fails
/// - An override cannot be parsed
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use scrubber::config::loader::load_config;
///
/// let config = load_config("scrubber.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ScrubberConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ScrubberError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ScrubberError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: ScrubberConfig = toml::from_str(&contents)
        .map_err(|e| ScrubberError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ScrubberError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is valid")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ScrubberError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ScrubberError::Configuration(format!("Invalid value for {name}: {value}")))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Applies environment variable overrides using SCRUBBER_* prefix
///
/// Environment variables follow the pattern: SCRUBBER_<SECTION>_<KEY>,
/// for example SCRUBBER_ENGINE_HASH_SALT or SCRUBBER_DEFAULTS_ENABLED_RULES.
/// Lists are comma separated.
fn apply_env_overrides(config: &mut ScrubberConfig) -> Result<()> {
    const LOG_LEVEL: &str = "SCRUBBER_APPLICATION_LOG_LEVEL";
    const HASH_SALT: &str = "SCRUBBER_ENGINE_HASH_SALT";
    const MAX_MATCHES: &str = "SCRUBBER_ENGINE_MAX_MATCHES_PER_RULE";
    const DISABLED_RULES: &str = "SCRUBBER_ENGINE_DISABLED_RULES";
    const ENABLE_PSEUDONYMS: &str = "SCRUBBER_DEFAULTS_ENABLE_PSEUDONYMS";
    const PRESERVE_STRUCTURE: &str = "SCRUBBER_DEFAULTS_PRESERVE_STRUCTURE";
    const MAX_PROCESSING_TIME: &str = "SCRUBBER_DEFAULTS_MAX_PROCESSING_TIME_MS";
    const ENABLED_RULES: &str = "SCRUBBER_DEFAULTS_ENABLED_RULES";
    const AUDIT_ENABLED: &str = "SCRUBBER_AUDIT_ENABLED";
    const AUDIT_LOG_PATH: &str = "SCRUBBER_AUDIT_LOG_PATH";
    const AUDIT_JSON: &str = "SCRUBBER_AUDIT_JSON_FORMAT";
    const LOCAL_ENABLED: &str = "SCRUBBER_LOGGING_LOCAL_ENABLED";
    const LOCAL_PATH: &str = "SCRUBBER_LOGGING_LOCAL_PATH";
    const LOCAL_ROTATION: &str = "SCRUBBER_LOGGING_LOCAL_ROTATION";

    // Application overrides
    if let Ok(val) = std::env::var(LOG_LEVEL) {
        config.application.log_level = val;
    }

    // Engine overrides
    if let Ok(val) = std::env::var(HASH_SALT) {
        config.engine.hash_salt = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var(MAX_MATCHES) {
        config.engine.max_matches_per_rule = parse_env(MAX_MATCHES, &val)?;
    }
    if let Ok(val) = std::env::var(DISABLED_RULES) {
        config.engine.disabled_rules = split_list(&val);
    }

    // Default call options
    if let Ok(val) = std::env::var(ENABLE_PSEUDONYMS) {
        config.defaults.enable_pseudonyms = parse_env(ENABLE_PSEUDONYMS, &val)?;
    }
    if let Ok(val) = std::env::var(PRESERVE_STRUCTURE) {
        config.defaults.preserve_structure = parse_env(PRESERVE_STRUCTURE, &val)?;
    }
    if let Ok(val) = std::env::var(MAX_PROCESSING_TIME) {
        config.defaults.max_processing_time_ms = parse_env(MAX_PROCESSING_TIME, &val)?;
    }
    if let Ok(val) = std::env::var(ENABLED_RULES) {
        config.defaults.enabled_rules = Some(split_list(&val).into_iter().collect());
    }

    // Audit overrides
    if let Ok(val) = std::env::var(AUDIT_ENABLED) {
        config.audit.enabled = parse_env(AUDIT_ENABLED, &val)?;
    }
    if let Ok(val) = std::env::var(AUDIT_LOG_PATH) {
        config.audit.log_path = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var(AUDIT_JSON) {
        config.audit.json_format = parse_env(AUDIT_JSON, &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var(LOCAL_ENABLED) {
        config.logging.local_enabled = parse_env(LOCAL_ENABLED, &val)?;
    }
    if let Ok(val) = std::env::var(LOCAL_PATH) {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var(LOCAL_ROTATION) {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("SCRUBBER_LOADER_TEST_VAR", "test_value");
        let input = "hash_salt = \"${SCRUBBER_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "hash_salt = \"test_value\"\n");
        std::env::remove_var("SCRUBBER_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("SCRUBBER_LOADER_MISSING_VAR");
        let input = "hash_salt = \"${SCRUBBER_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("SCRUBBER_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# hash_salt = \"${SCRUBBER_LOADER_COMMENTED}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" email, ipv4 ,,"), vec!["email", "ipv4"]);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-scrubber.toml");
        assert!(matches!(result, Err(ScrubberError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let temp_file = write_config(
            r#"
[application]
log_level = "debug"

[engine]
hash_salt = "unit-test-salt"
disabled_rules = ["filepath"]

[[engine.custom_rules]]
id = "vmid"
category = "system"
priority = 65
pattern = "vm-[0-9]{3,}"
strategy = "hash"

[defaults]
preserve_structure = false
"#,
        );

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.engine.custom_rules.len(), 1);
        assert!(!config.defaults.preserve_structure);
        assert!(config.engine.hash_salt.is_some());
    }

    #[test]
    fn test_load_config_invalid_strategy() {
        let temp_file = write_config(
            r#"
[[engine.custom_rules]]
id = "bad"
category = "system"
pattern = "x"
strategy = "shred"
"#,
        );
        assert!(load_config(temp_file.path()).is_err());
    }
}
