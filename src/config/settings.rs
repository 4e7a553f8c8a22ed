use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::i18n::Language;
use crate::models::{Location, LocationZone};
use crate::prayer_times::calculator::{parse_madhab, parse_method};
use crate::prayer_times::{Granularity, PrayerCalculator};

fn default_method() -> String {
    "2".to_string()
}
fn default_madhab() -> String {
    "Shafi".to_string()
}
fn default_hijri_offset() -> i32 {
    0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationConfig {
    /// Method name (`MuslimWorldLeague`) or public API code (`3`).
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_madhab")]
    pub madhab: String,
    /// Days to add/subtract from the Hijri date for local moon sighting.
    #[serde(default = "default_hijri_offset")]
    pub hijri_offset: i32,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            madhab: default_madhab(),
            hijri_offset: default_hijri_offset(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(anyhow!("Unknown theme: {} (use dark or light)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockFormat {
    #[default]
    #[serde(rename = "24h")]
    H24,
    #[serde(rename = "12h")]
    H12,
}

impl FromStr for ClockFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "24h" | "24" => Ok(ClockFormat::H24),
            "12h" | "12" => Ok(ClockFormat::H12),
            _ => Err(anyhow!("Unknown clock format: {} (use 24h or 12h)", s)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub countdown: Granularity,
    #[serde(default)]
    pub clock: ClockFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub calculation: CalculationConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "waqt").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("waqt.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn validate(&self) -> Result<()> {
        self.location.validate()?;
        parse_method(&self.calculation.method)?;
        parse_madhab(&self.calculation.madhab)?;
        Ok(())
    }

    pub fn zone(&self) -> Result<LocationZone> {
        self.location.zone()
    }

    pub fn calculator(&self) -> Result<PrayerCalculator> {
        PrayerCalculator::for_location(
            &self.location,
            &self.calculation.method,
            &self.calculation.madhab,
        )
    }

    /// Canonical name for a `waqt set` key, aliases included.
    pub fn setting_name(key: &str) -> Option<&'static str> {
        let name = match key.trim() {
            "language" | "lang" => "language",
            "theme" => "theme",
            "countdown" => "countdown",
            "clock" => "clock",
            "method" => "method",
            "madhab" => "madhab",
            "hijri-offset" | "hijri_offset" => "hijri_offset",
            "timezone" => "timezone",
            _ => return None,
        };
        Some(name)
    }

    /// Apply a `waqt set <key> <value>` change. Returns the canonical value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<String> {
        let name = Self::setting_name(key).ok_or_else(|| unknown_setting(key))?;
        let canonical = match name {
            "language" => {
                self.display.language = value.parse()?;
                self.display.language.code().to_string()
            }
            "theme" => {
                self.display.theme = value.parse()?;
                self.display.theme.as_str().to_string()
            }
            "countdown" => {
                self.display.countdown = value.parse()?;
                self.display.countdown.as_str().to_string()
            }
            "clock" => {
                self.display.clock = value.parse()?;
                value.trim().to_lowercase()
            }
            "method" => {
                parse_method(value)?;
                self.calculation.method = value.trim().to_string();
                self.calculation.method.clone()
            }
            "madhab" => {
                parse_madhab(value)?;
                self.calculation.madhab = value.trim().to_string();
                self.calculation.madhab.clone()
            }
            "hijri_offset" => {
                let offset: i32 = value
                    .trim()
                    .parse()
                    .with_context(|| format!("'{}' is not a whole number of days", value))?;
                self.calculation.hijri_offset = offset;
                offset.to_string()
            }
            "timezone" => {
                LocationZone::parse(value)?;
                self.location.timezone = value.trim().to_string();
                self.location.timezone.clone()
            }
            _ => return Err(unknown_setting(key)),
        };
        Ok(canonical)
    }
}

fn unknown_setting(key: &str) -> anyhow::Error {
    anyhow!(
        "Unknown setting '{}'. Use: language, theme, countdown, clock, method, madhab, hijri-offset, timezone",
        key
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_mecca() {
        let config = AppConfig::default();
        assert_eq!(config.location.name, "Mecca");
        assert_eq!(config.calculation.method, "2");
        assert_eq!(config.display.language, Language::En);
        assert_eq!(config.display.countdown, Granularity::Seconds);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str("[display]\ntheme = \"light\"\n").unwrap();
        assert_eq!(config.display.theme, Theme::Light);
        assert_eq!(config.location.timezone, "Asia/Riyadh");
        assert_eq!(config.calculation.madhab, "Shafi");
    }

    #[test]
    fn set_validates_values() {
        let mut config = AppConfig::default();
        assert_eq!(config.set("language", "RU").unwrap(), "ru");
        assert_eq!(config.set("method", "MuslimWorldLeague").unwrap(), "MuslimWorldLeague");
        assert!(config.set("method", "99").is_err());
        assert!(config.set("theme", "sepia").is_err());
        assert!(config.set("colour", "red").is_err());
        assert_eq!(config.set("clock", "12h").unwrap(), "12h");
        assert_eq!(config.display.clock, ClockFormat::H12);
        assert_eq!(config.set("lang", "tr").unwrap(), "tr");
        assert_eq!(config.display.language, Language::Tr);
    }

    #[test]
    fn setting_aliases_share_one_name() {
        assert_eq!(AppConfig::setting_name("lang"), Some("language"));
        assert_eq!(AppConfig::setting_name("language"), Some("language"));
        assert_eq!(AppConfig::setting_name("hijri-offset"), Some("hijri_offset"));
        assert_eq!(AppConfig::setting_name("colour"), None);
    }
}
