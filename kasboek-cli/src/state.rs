use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$KASBOEK_HOME`, or `~/.kasboek`
pub fn kasboek_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("KASBOEK_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".kasboek"))
}

pub fn ensure_kasboek_home() -> Result<PathBuf> {
    let dir = kasboek_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_rules_path() -> Result<PathBuf> {
    Ok(kasboek_home()?.join("classification_rules.json"))
}
