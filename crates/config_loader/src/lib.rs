//! # Config Loader
//!
//! Loads the Safe Route alert configuration: the alert policy, the store
//! backend and the seeded contact directory.
//!
//! A config file has three sections:
//!
//! ```toml
//! [alert]
//! radius_km = 5.0          # proximity radius, inclusive
//!
//! [store]
//! kind = "file"            # "memory" | "file"
//! path = "alerts.json"
//!
//! [[users]]
//! id = 1
//! username = "nadia"
//! lat = 23.8103            # lat/lon are optional; users without them
//! lon = 90.4125            # can raise alerts but never receive them
//! contacts = [2, 3]        # directed edges, one hop
//! ```
//!
//! Parsing is followed by a semantic pass that rejects dangling or
//! self-referencing contacts, duplicate ids, out-of-range coordinates and a
//! file store without a path.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("safe-route.toml")).unwrap();
//! println!("Alert radius: {} km", config.alert.radius_km);
//! ```

mod parser;
mod validator;

pub use contracts::SafeRouteConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Loader for `SafeRouteConfig`
///
/// Every load path validates, so a returned config always seeds a
/// directory the dispatcher can build.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load an alert config from `path`, format chosen by extension (.toml / .json)
    ///
    /// # Errors
    /// `ContractError::Io` when the file cannot be read, `ConfigParse` for an
    /// unknown extension or malformed document, `ConfigValidation` when the
    /// users or policy are inconsistent.
    pub fn load_from_path(path: &Path) -> Result<SafeRouteConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<SafeRouteConfig, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Re-validate a config after command-line overrides or location edits
    pub fn validate(config: &SafeRouteConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    /// Serialize back to TOML, e.g. after `locate` moved a user
    pub fn to_toml(config: &SafeRouteConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize SafeRouteConfig to JSON string
    pub fn to_json(config: &SafeRouteConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<SafeRouteConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
[alert]
radius_km = 5.0

[store]
kind = "memory"

[[users]]
id = 1
username = "nadia"
lat = 23.8103
lon = 90.4125
contacts = [2]

[[users]]
id = 2
username = "arif"
lat = 23.8110
lon = 90.4130
contacts = [1]
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.alert.radius_km, 5.0);
        assert_eq!(config.users.len(), 2);
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.users.len(), config2.users.len());
        assert_eq!(config.users[0].username, config2.users[0].username);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.users[1].contacts, config2.users[1].contacts);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Duplicate user id should fail validation
        let content = r#"
[[users]]
id = 1
username = "nadia"

[[users]]
id = 1
username = "arif"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let dir = std::env::temp_dir().join(format!("safe-route-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, MINIMAL_TOML).unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(config.users.len(), 2);

        let bad = dir.join("config.yaml");
        std::fs::write(&bad, "users: []").unwrap();
        let err = ConfigLoader::load_from_path(&bad).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
