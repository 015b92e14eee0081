//! Runtime configuration and the password store.
//!
//! Settings come from the environment (a `.env` file is loaded by the CLI).
//! The password digest lives in a small JSON file; when the file is missing
//! or unreadable the built-in fallback digest applies.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AuthResult;

/// Digest used when no store file exists or it cannot be parsed.
pub const FALLBACK_PASSWORD_HASH: &str =
    "c8a6ed3ac08087cc037c2fc7846a7f95976b8f5bfbaf2d9540cf89b74452b034";

/// Key of the digest inside the store file.
pub const PASSWORD_HASH_KEY: &str = "password_hash";

const DEFAULT_UPLOAD_DIR: &str = "static/uploads";
const DEFAULT_CONFIG_FILE: &str = "config.json";
const DEFAULT_MAX_UPLOAD: usize = 16 * 1024 * 1024;
const DEFAULT_PORT: u16 = 5000;

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory for uploaded and generated workbooks
    pub upload_dir: PathBuf,
    /// Password store file
    pub config_file: PathBuf,
    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,
    /// HTTP port
    pub port: u16,
}

impl AppConfig {
    /// Build the configuration from `PLANILLAS_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            upload_dir: env_or("PLANILLAS_UPLOAD_DIR", DEFAULT_UPLOAD_DIR).into(),
            config_file: env_or("PLANILLAS_CONFIG", DEFAULT_CONFIG_FILE).into(),
            max_upload_bytes: env_parse("PLANILLAS_MAX_UPLOAD", DEFAULT_MAX_UPLOAD),
            port: env_parse("PLANILLAS_PORT", DEFAULT_PORT),
        }
    }

    /// Password store backed by the configured file.
    pub fn password_store(&self) -> PasswordStore {
        PasswordStore::new(&self.config_file)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: DEFAULT_UPLOAD_DIR.into(),
            config_file: DEFAULT_CONFIG_FILE.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD,
            port: DEFAULT_PORT,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, "ignoring unparseable setting");
            default
        }),
        Err(_) => default,
    }
}

/// Flat JSON file holding the SHA-256 digest of the operator password.
#[derive(Debug, Clone)]
pub struct PasswordStore {
    path: PathBuf,
}

impl PasswordStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored digest, or the fallback when the file is absent, unparseable or
    /// lacks the key.
    pub fn load_hash(&self) -> String {
        self.load_map()
            .and_then(|map| {
                map.get(PASSWORD_HASH_KEY)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| FALLBACK_PASSWORD_HASH.to_string())
    }

    /// Rewrite the store with a new digest, keeping any other keys.
    pub fn save_hash(&self, digest: &str) -> AuthResult<()> {
        let mut map = self.load_map().unwrap_or_default();
        map.insert(PASSWORD_HASH_KEY.to_string(), Value::String(digest.to_string()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(&Value::Object(map))?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn load_map(&self) -> Option<Map<String, Value>> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Some(map),
            _ => {
                tracing::warn!(
                    path = %self.path.display(),
                    "password store unreadable, using fallback"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_fallback() {
        let dir = tempdir().unwrap();
        let store = PasswordStore::new(dir.path().join("config.json"));
        assert_eq!(store.load_hash(), FALLBACK_PASSWORD_HASH);
    }

    #[test]
    fn test_garbage_file_uses_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json {").unwrap();
        assert_eq!(PasswordStore::new(&path).load_hash(), FALLBACK_PASSWORD_HASH);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = PasswordStore::new(&path);
        store.save_hash("abc123").unwrap();
        assert_eq!(store.load_hash(), "abc123");
    }

    #[test]
    fn test_save_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"password_hash":"old","theme":"dark"}"#).unwrap();

        PasswordStore::new(&path).save_hash("new").unwrap();

        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["password_hash"], "new");
        assert_eq!(saved["theme"], "dark");
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(config.upload_dir, PathBuf::from("static/uploads"));
    }
}
