use crate::error::{PantryError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_DATA_DIR: &str = "data";

/// Which backend holds the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Documents and photos in a local directory.
    #[default]
    Local,
    /// A Firebase project (Firestore + Storage).
    Firebase,
}

impl std::str::FromStr for BackendKind {
    type Err = PantryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local" => Ok(BackendKind::Local),
            "firebase" => Ok(BackendKind::Firebase),
            other => Err(PantryError::Config(format!(
                "unknown backend '{}' (expected 'local' or 'firebase')",
                other
            ))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Firebase => write!(f, "firebase"),
        }
    }
}

/// Connection identifiers for one Firebase project, as they appear in the
/// web console's `firebaseConfig` snippet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: String,
    #[serde(default)]
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    #[serde(default)]
    pub messaging_sender_id: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
}

/// Keys accepted by `FirebaseConfig::set`, in console order.
pub const FIREBASE_KEYS: &[&str] = &[
    "apiKey",
    "authDomain",
    "projectId",
    "storageBucket",
    "messagingSenderId",
    "appId",
    "measurementId",
];

impl FirebaseConfig {
    /// The fields needed to address documents and objects must be present.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("apiKey", &self.api_key),
            ("projectId", &self.project_id),
            ("storageBucket", &self.storage_bucket),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(PantryError::Config(format!("firebase.{} is not set", key)));
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "apiKey" => Some(self.api_key.clone()),
            "authDomain" => Some(self.auth_domain.clone()),
            "projectId" => Some(self.project_id.clone()),
            "storageBucket" => Some(self.storage_bucket.clone()),
            "messagingSenderId" => Some(self.messaging_sender_id.clone()),
            "appId" => Some(self.app_id.clone()),
            "measurementId" => Some(self.measurement_id.clone().unwrap_or_default()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "apiKey" => self.api_key = value,
            "authDomain" => self.auth_domain = value,
            "projectId" => self.project_id = value,
            "storageBucket" => self.storage_bucket = value,
            "messagingSenderId" => self.messaging_sender_id = value,
            "appId" => self.app_id = value,
            "measurementId" => {
                self.measurement_id = if value.is_empty() { None } else { Some(value) }
            }
            other => {
                return Err(PantryError::Config(format!(
                    "unknown firebase key '{}'",
                    other
                )))
            }
        }
        Ok(())
    }
}

/// Configuration for pantry, stored in `<home>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PantryConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Directory for the local backend, relative to the pantry home unless
    /// absolute.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase: Option<FirebaseConfig>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

impl Default for PantryConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_dir: default_data_dir(),
            firebase: None,
        }
    }
}

impl PantryConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: PantryConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn data_dir(&self, home: &Path) -> PathBuf {
        if self.data_dir.is_absolute() {
            self.data_dir.clone()
        } else {
            home.join(&self.data_dir)
        }
    }

    /// Look up a dotted key: `backend`, `data-dir`, or `firebase.<key>`.
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "backend" => Ok(self.backend.to_string()),
            "data-dir" => Ok(self.data_dir.display().to_string()),
            _ => {
                let field = key.strip_prefix("firebase.").ok_or_else(|| unknown_key(key))?;
                let firebase = self.firebase.clone().unwrap_or_default();
                firebase.get(field).ok_or_else(|| unknown_key(key))
            }
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "backend" => self.backend = value.parse()?,
            "data-dir" => self.data_dir = PathBuf::from(value),
            _ => {
                let field = key.strip_prefix("firebase.").ok_or_else(|| unknown_key(key))?;
                self.firebase
                    .get_or_insert_with(FirebaseConfig::default)
                    .set(field, value)?;
            }
        }
        Ok(())
    }

    /// Every settable key, with the api key masked.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries = vec![
            ("backend".to_string(), self.backend.to_string()),
            ("data-dir".to_string(), self.data_dir.display().to_string()),
        ];
        if let Some(fb) = &self.firebase {
            for key in FIREBASE_KEYS {
                let value = fb.get(key).unwrap_or_default();
                let value = if *key == "apiKey" { mask(&value) } else { value };
                entries.push((format!("firebase.{}", key), value));
            }
        }
        entries
    }
}

fn unknown_key(key: &str) -> PantryError {
    PantryError::Config(format!("unknown config key '{}'", key))
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "*".repeat(secret.chars().count())
    } else {
        format!("{}…", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_firebase() -> FirebaseConfig {
        FirebaseConfig {
            api_key: "AIzaExample".into(),
            auth_domain: "pantry-demo.firebaseapp.com".into(),
            project_id: "pantry-demo".into(),
            storage_bucket: "pantry-demo.appspot.com".into(),
            messaging_sender_id: "1234".into(),
            app_id: "1:1234:web:abcd".into(),
            measurement_id: Some("G-TEST".into()),
        }
    }

    #[test]
    fn test_default_config() {
        let config = PantryConfig::default();
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.firebase.is_none());
    }

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        let config = PantryConfig::load(temp.path()).unwrap();
        assert_eq!(config, PantryConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let config = PantryConfig {
            backend: BackendKind::Firebase,
            firebase: Some(sample_firebase()),
            ..PantryConfig::default()
        };
        config.save(temp.path()).unwrap();

        let loaded = PantryConfig::load(temp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_reads_console_snippet_field_names() {
        let json = r#"{
            "backend": "firebase",
            "firebase": {
                "apiKey": "k",
                "authDomain": "d",
                "projectId": "p",
                "storageBucket": "b",
                "messagingSenderId": "m",
                "appId": "a",
                "measurementId": "G-1"
            }
        }"#;
        let config: PantryConfig = serde_json::from_str(json).unwrap();
        let fb = config.firebase.unwrap();
        assert_eq!(fb.project_id, "p");
        assert_eq!(fb.measurement_id.as_deref(), Some("G-1"));
    }

    #[test]
    fn test_validate_requires_addressing_fields() {
        let mut fb = sample_firebase();
        assert!(fb.validate().is_ok());
        fb.storage_bucket.clear();
        assert!(fb.validate().is_err());
    }

    #[test]
    fn test_set_and_get_dotted_keys() {
        let mut config = PantryConfig::default();
        config.set("backend", "firebase".into()).unwrap();
        config.set("firebase.projectId", "demo".into()).unwrap();

        assert_eq!(config.get("backend").unwrap(), "firebase");
        assert_eq!(config.get("firebase.projectId").unwrap(), "demo");
        assert!(config.set("firebase.nope", "x".into()).is_err());
        assert!(config.set("backend", "s3".into()).is_err());
        assert!(config.get("colour").is_err());
    }

    #[test]
    fn test_entries_mask_api_key() {
        let config = PantryConfig {
            firebase: Some(sample_firebase()),
            ..PantryConfig::default()
        };
        let entries = config.entries();
        let api_key = entries
            .iter()
            .find(|(k, _)| k == "firebase.apiKey")
            .map(|(_, v)| v.clone())
            .unwrap();
        assert_eq!(api_key, "AIza…");
    }

    #[test]
    fn test_relative_data_dir_resolves_under_home() {
        let config = PantryConfig::default();
        let home = Path::new("/tmp/pantry-home");
        assert_eq!(config.data_dir(home), home.join("data"));
    }
}
