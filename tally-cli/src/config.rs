use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_finance::ValuationMultiples;
use tally_ingest::{IngestOptions, NormalizeMode, PdfStrategy};

use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ingest: IngestSection,
    pub valuation: ValuationMultiples,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSection {
    /// "lines" or "table"
    pub pdf_strategy: PdfStrategy,
    /// Require Date, Description and Amount columns
    pub strict_columns: bool,
    pub fallback_encoding: String,
    pub min_encoding_confidence: f32,
    pub ocr_language: String,
    pub ocr_dpi: u32,
}

impl Default for IngestSection {
    fn default() -> Self {
        let opts = IngestOptions::default();
        Self {
            pdf_strategy: opts.pdf_strategy,
            strict_columns: opts.normalize_mode == NormalizeMode::Strict,
            fallback_encoding: opts.fallback_encoding,
            min_encoding_confidence: opts.min_encoding_confidence,
            ocr_language: opts.ocr_language,
            ocr_dpi: opts.ocr_dpi,
        }
    }
}

impl IngestSection {
    pub fn to_options(&self) -> IngestOptions {
        IngestOptions {
            pdf_strategy: self.pdf_strategy,
            normalize_mode: if self.strict_columns {
                NormalizeMode::Strict
            } else {
                NormalizeMode::Lenient
            },
            fallback_encoding: self.fallback_encoding.clone(),
            min_encoding_confidence: self.min_encoding_confidence,
            ocr_language: self.ocr_language.clone(),
            ocr_dpi: self.ocr_dpi,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
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

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config_from(&p)?;
    let source = if p.exists() { "file" } else { "defaults" };
    println!("# {} ({source})", p.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.ingest.ocr_dpi, 300);
        assert_eq!(cfg.valuation.dcf_multiple, 5.0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.ingest.pdf_strategy = PdfStrategy::Table;
        cfg.valuation.revenue_multiple = 2.0;
        save_config_to(&cfg, &p).unwrap();
        assert_eq!(load_config_from(&p).unwrap(), cfg);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[ingest]\nstrict_columns = true\npdf_strategy = \"table\"\n").unwrap();
        let cfg = load_config_from(&p).unwrap();
        let opts = cfg.ingest.to_options();
        assert_eq!(opts.normalize_mode, NormalizeMode::Strict);
        assert_eq!(opts.pdf_strategy, PdfStrategy::Table);
        assert_eq!(opts.fallback_encoding, "utf-8");
        assert_eq!(cfg.valuation, ValuationMultiples::default());
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[ingest\n").unwrap();
        assert!(load_config_from(&p).is_err());
    }
}
