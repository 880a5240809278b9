use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub formats: FormatsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatsSection {
    /// Bank/investment format sources, loaded in order. Custom formats are
    /// saved back to the first source.
    pub statement_sources: Vec<PathBuf>,
    /// Credit-card provider sources, loaded in order.
    pub credit_card_sources: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            formats: FormatsSection {
                statement_sources: vec![PathBuf::from("formats/statement_formats.json")],
                credit_card_sources: vec![PathBuf::from("formats/credit_card_formats.json")],
            },
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
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
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}
