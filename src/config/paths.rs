//! Where SkillBridge looks for its configuration
//!
//! `SKILLBRIDGE_CONFIG` names the file outright. Otherwise the file lives in
//! the config directory (`SKILLBRIDGE_CONFIG_DIR`, else `<XDG config>/skillbridge`)
//! as `config.json`, or `config.toml` when only that one exists.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "skillbridge";

/// Candidate file names, in preference order
const CONFIG_FILES: [&str; 2] = ["config.json", "config.toml"];

/// Get the configuration directory
pub fn config_dir() -> PathBuf {
    dir_from(|key| std::env::var(key).ok())
}

/// Get the main configuration file path
pub fn config_path() -> PathBuf {
    path_from(|key| std::env::var(key).ok())
}

fn dir_from(var: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = var("SKILLBRIDGE_CONFIG_DIR").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR)))
}

fn path_from(var: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(path) = var("SKILLBRIDGE_CONFIG").filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    file_in(&dir_from(var))
}

fn file_in(dir: &Path) -> PathBuf {
    CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .unwrap_or_else(|| dir.join(CONFIG_FILES[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_dir_ends_with_app_name() {
        let dir = dir_from(lookup(&[]));
        assert!(dir.ends_with(APP_DIR) || dir == Path::new(".skillbridge"));
        assert_eq!(path_from(lookup(&[])).parent(), Some(dir.as_path()));
    }

    #[test]
    fn test_config_dir_override() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().to_str().unwrap();

        let vars = lookup(&[("SKILLBRIDGE_CONFIG_DIR", dir)]);
        assert_eq!(dir_from(&vars), tmp.path());
        assert_eq!(path_from(&vars), tmp.path().join("config.json"));

        // An empty override falls back to the default location
        assert_ne!(dir_from(lookup(&[("SKILLBRIDGE_CONFIG_DIR", "")])), tmp.path());
    }

    #[test]
    fn test_toml_file_used_when_json_missing() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().to_str().unwrap();
        let vars = lookup(&[("SKILLBRIDGE_CONFIG_DIR", dir)]);

        std::fs::write(tmp.path().join("config.toml"), "").unwrap();
        assert_eq!(path_from(&vars), tmp.path().join("config.toml"));

        std::fs::write(tmp.path().join("config.json"), "{}").unwrap();
        assert_eq!(path_from(&vars), tmp.path().join("config.json"));
    }

    #[test]
    fn test_config_file_override_wins() {
        let vars = lookup(&[
            ("SKILLBRIDGE_CONFIG", "/etc/skillbridge/agent.toml"),
            ("SKILLBRIDGE_CONFIG_DIR", "/somewhere/else"),
        ]);
        assert_eq!(path_from(vars), PathBuf::from("/etc/skillbridge/agent.toml"));
    }
}
