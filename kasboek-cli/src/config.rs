use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{default_rules_path, ensure_kasboek_home, kasboek_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rules: RulesSection,
    pub ingest: IngestSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesSection {
    /// Rule document location (default: ~/.kasboek/classification_rules.json)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSection {
    /// Bank used when `--bank` is omitted, e.g. "ING" or "ABN Amro"
    pub default_bank: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub json: bool,
}

impl Config {
    pub fn rules_path(&self) -> Result<PathBuf> {
        match &self.rules.path {
            Some(p) => Ok(p.clone()),
            None => default_rules_path(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(kasboek_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    ensure_kasboek_home()?;
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config {
        rules: RulesSection {
            path: Some(default_rules_path()?),
        },
        ..Config::default()
    };
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}
