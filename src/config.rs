//! User configuration loaded from `~/.driver-logbook/config.json`

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Offset, Utc};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::export::ExportLabels;
use crate::services::store::StorePolicy;
use crate::services::OdometerPolicy;
use crate::types::{Driver, LogbookError, Result};

const APP_DIR: &str = ".driver-logbook";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogbookConfig {
    /// Root of the report store; defaults to the app directory
    pub data_dir: Option<PathBuf>,
    pub driver: Driver,
    /// Meter maximum in km; absent means backwards readings are rejected
    pub odometer_rollover_km: Option<f64>,
    pub max_shift_hours: Option<f64>,
    /// Offset used when displaying stored UTC timestamps
    pub utc_offset_hours: i32,
    /// TTF/OTF font with Japanese glyphs for PDF export
    pub pdf_font_path: Option<PathBuf>,
    pub labels: ExportLabels,
}

impl Default for LogbookConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            driver: Driver::default(),
            odometer_rollover_km: None,
            max_shift_hours: None,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            pdf_font_path: None,
            labels: ExportLabels::default(),
        }
    }
}

impl LogbookConfig {
    /// `~/.driver-logbook`
    pub fn app_dir() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| LogbookError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(APP_DIR))
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join(CONFIG_FILE))
    }

    /// Load from `path`, or the default location. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            LogbookError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            LogbookError::Config(format!("Invalid config {}: {}", path.display(), e))
        })?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.utc_offset().is_none() {
            return Err(LogbookError::Config(format!(
                "utc_offset_hours {} is out of range",
                self.utc_offset_hours
            )));
        }
        if let Some(h) = self.max_shift_hours {
            if !(h > 0.0 && h <= 24.0) {
                return Err(LogbookError::Config(format!(
                    "max_shift_hours must be within (0, 24], got {}",
                    h
                )));
            }
        }
        if self.driver.id.trim().is_empty() {
            return Err(LogbookError::Config("driver.id must not be empty".into()));
        }
        Ok(())
    }

    fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours.checked_mul(3600)?)
    }

    /// Display offset; out-of-range values were rejected at load time
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset().unwrap_or_else(|| Utc.fix())
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::app_dir(),
        }
    }

    pub fn odometer_policy(&self) -> OdometerPolicy {
        OdometerPolicy::from_rollover_max(self.odometer_rollover_km)
    }

    pub fn store_policy(&self) -> StorePolicy {
        StorePolicy {
            odometer: self.odometer_policy(),
            max_shift_hours: self.max_shift_hours,
        }
    }

    /// Driver for this run, with an optional id override from `--user`
    pub fn driver(&self, user: Option<&str>) -> Driver {
        match user {
            Some(id) => Driver {
                id: id.to_string(),
                name: id.to_string(),
            },
            None => self.driver.clone(),
        }
    }
}
