use anyhow::{Context, Result};
use finmath_finance::ClassifierConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::finmath_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub input: InputSection,
    pub classifier: ClassifierSection,
    pub report: ReportSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputSection {
    /// Export read when `--csv` is not given
    pub csv: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierSection {
    pub n_clusters: usize,
    pub max_features: usize,
    pub seed: u64,
    /// Label table replacing the embedded one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportSection {
    pub top_vendors: usize,
    pub head_rows: usize,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            csv: PathBuf::from("Jan2May2025.csv"),
        }
    }
}

impl Default for ClassifierSection {
    fn default() -> Self {
        let defaults = ClassifierConfig::default();
        Self {
            n_clusters: defaults.n_clusters,
            max_features: defaults.max_features,
            seed: defaults.seed,
            labels: None,
        }
    }
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            top_vendors: 10,
            head_rows: 5,
        }
    }
}

impl ClassifierSection {
    pub fn to_classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            n_clusters: self.n_clusters,
            max_features: self.max_features,
            seed: self.seed,
            ..ClassifierConfig::default()
        }
    }
}

const CONFIG_FILE: &str = "config.toml";

/// Resolves the path only; the directory is created by `config init`.
pub fn config_path() -> Result<PathBuf> {
    Ok(finmath_home()?.join(CONFIG_FILE))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Missing file means defaults; missing keys fall back individually.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let home = finmath_home()?;
    let p = home.join(CONFIG_FILE);
    if init_config_in(&home)? {
        println!("Wrote {}", p.display());
    } else {
        println!("Config already exists: {}", p.display());
    }
    Ok(())
}

/// Write the default config into `dir`, creating it first. Returns false
/// when a config is already there.
pub fn init_config_in(dir: &Path) -> Result<bool> {
    let p = dir.join(CONFIG_FILE);
    if p.exists() {
        return Ok(false);
    }
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    save_config_to(&p, &Config::default())?;
    Ok(true)
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config_from(&p)?;
    let source = if p.exists() { "file" } else { "defaults" };
    println!("# {} ({})", p.display(), source);
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.input.csv, PathBuf::from("Jan2May2025.csv"));
        assert_eq!(cfg.classifier.n_clusters, 11);
        assert_eq!(cfg.classifier.max_features, 100);
        assert_eq!(cfg.classifier.seed, 42);
        assert_eq!(cfg.classifier.labels, None);
        assert_eq!(cfg.report.top_vendors, 10);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[classifier]\nseed = 7\nlabels = \"labels.toml\"\n").unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.classifier.seed, 7);
        assert_eq!(cfg.classifier.n_clusters, 11);
        assert_eq!(cfg.classifier.labels, Some(PathBuf::from("labels.toml")));
        assert_eq!(cfg.report.top_vendors, 10);
        assert_eq!(cfg.input.csv, PathBuf::from("Jan2May2025.csv"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.report.top_vendors = 3;
        cfg.input.csv = PathBuf::from("export.csv");
        save_config_to(&path, &cfg).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn test_invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[report]\ntop_vendors = \"ten\"\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }

    #[test]
    fn test_reading_does_not_create_home() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join(".finmath");

        let cfg = load_config_from(&home.join(CONFIG_FILE)).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(!home.exists());

        assert!(init_config_in(&home).unwrap());
        assert!(home.join(CONFIG_FILE).is_file());
        assert!(!init_config_in(&home).unwrap());
    }

    #[test]
    fn test_classifier_config_mapping() {
        let section = ClassifierSection {
            n_clusters: 4,
            max_features: 20,
            seed: 1,
            labels: None,
        };
        let c = section.to_classifier_config();
        assert_eq!((c.n_clusters, c.max_features, c.seed), (4, 20, 1));
        assert_eq!(c.top_terms, 5);
    }
}
