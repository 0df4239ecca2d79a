use nutrisnap_core::gateway::DEFAULT_MODEL;
use nutrisnap_core::{Locale, DEFAULT_CALORIE_TARGET};
use serde::{Deserialize, Serialize, Serializer};
use std::path::PathBuf;
use std::str::FromStr;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the entry history and preferences
    pub data_dir: ConfigValue<PathBuf>,
    /// Gemini API key
    #[serde(serialize_with = "serialize_masked")]
    pub api_key: ConfigValue<Option<String>>,
    /// Gemini model name
    pub model: ConfigValue<String>,
    /// Language for weekday labels
    pub locale: ConfigValue<Locale>,
    /// Calories that count as a full day in the calendar
    pub daily_calorie_target: ConfigValue<u32>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    api_key: Option<String>,
    model: Option<String>,
    locale: Option<String>,
    daily_calorie_target: Option<u32>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut api_key = ConfigValue::new(None, ConfigSource::Default);
        let mut model = ConfigValue::new(DEFAULT_MODEL.to_string(), ConfigSource::Default);
        let mut locale = ConfigValue::new(Locale::default(), ConfigSource::Default);
        let mut daily_calorie_target =
            ConfigValue::new(DEFAULT_CALORIE_TARGET, ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(key) = file_config.api_key {
                api_key = ConfigValue::new(Some(key), ConfigSource::File);
            }
            if let Some(name) = file_config.model {
                model = ConfigValue::new(name, ConfigSource::File);
            }
            if let Some(raw) = file_config.locale {
                let parsed = Locale::from_str(&raw)
                    .map_err(|e| ConfigError::InvalidValue("locale".to_string(), e))?;
                locale = ConfigValue::new(parsed, ConfigSource::File);
            }
            if let Some(target) = file_config.daily_calorie_target {
                daily_calorie_target = ConfigValue::new(target, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(dir) = std::env::var("NUTRISNAP_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(key) =
            std::env::var("NUTRISNAP_API_KEY").or_else(|_| std::env::var("GEMINI_API_KEY"))
        {
            api_key = ConfigValue::new(Some(key), ConfigSource::Environment);
        }
        if let Ok(name) = std::env::var("NUTRISNAP_MODEL") {
            model = ConfigValue::new(name, ConfigSource::Environment);
        }
        if let Ok(raw) = std::env::var("NUTRISNAP_LOCALE") {
            let parsed = Locale::from_str(&raw)
                .map_err(|e| ConfigError::InvalidValue("NUTRISNAP_LOCALE".to_string(), e))?;
            locale = ConfigValue::new(parsed, ConfigSource::Environment);
        }
        if let Ok(raw) = std::env::var("NUTRISNAP_CALORIE_TARGET") {
            let parsed = raw.trim().parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("NUTRISNAP_CALORIE_TARGET".to_string(), e.to_string())
            })?;
            daily_calorie_target = ConfigValue::new(parsed, ConfigSource::Environment);
        }

        Ok(Self {
            data_dir,
            api_key,
            model,
            locale,
            daily_calorie_target,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/nutrisnap/
    /// - macOS: ~/Library/Application Support/nutrisnap/
    /// - Windows: %APPDATA%/nutrisnap/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nutrisnap")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/nutrisnap/
    /// - macOS: ~/Library/Application Support/nutrisnap/
    /// - Windows: %APPDATA%/nutrisnap/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nutrisnap")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

/// Key shown as "…" plus its last four characters.
pub fn mask_key(key: &Option<String>) -> String {
    match key.as_deref().map(str::trim) {
        None | Some("") => "(not set)".to_string(),
        Some(k) => {
            let chars: Vec<char> = k.chars().collect();
            let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
            format!("…{}", tail)
        }
    }
}

fn serialize_masked<S: Serializer>(
    key: &ConfigValue<Option<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    ConfigValue::new(mask_key(&key.value), key.source.clone()).serialize(serializer)
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(key, e) => {
                write!(f, "Invalid value for '{}': {}", key, e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.data_dir.value.ends_with("nutrisnap"));
        assert_eq!(config.model.value, DEFAULT_MODEL);
        assert_eq!(config.model.source, ConfigSource::Default);
        assert_eq!(config.locale.value, Locale::PtBr);
        assert_eq!(config.daily_calorie_target.value, 2500);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/data").unwrap();
        writeln!(file, "api_key: secret-1234").unwrap();
        writeln!(file, "model: gemini-test").unwrap();
        writeln!(file, "locale: en-US").unwrap();
        writeln!(file, "daily_calorie_target: 2000").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/custom/data"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(config.model.value, "gemini-test");
        assert_eq!(config.locale.value, Locale::EnUs);
        assert_eq!(config.daily_calorie_target.value, 2000);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: data").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("data"));
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "model: fromfile").unwrap();

        std::env::set_var("NUTRISNAP_MODEL", "fromenv");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.model.value, "fromenv");
        assert_eq!(config.model.source, ConfigSource::Environment);

        std::env::remove_var("NUTRISNAP_MODEL");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_invalid_locale_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "locale: klingon").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Invalid value for 'locale'"));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(&None), "(not set)");
        assert_eq!(mask_key(&Some("  ".to_string())), "(not set)");
        assert_eq!(mask_key(&Some("abcdef123456".to_string())), "…3456");
    }

    #[test]
    fn test_json_never_contains_raw_key() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "api_key: super-secret-key-9876").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("super-secret"));
    }
}
