use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::language::Language;

pub const DEFAULT_MAX_DIMENSION: u32 = 1200;
pub const DEFAULT_QUALITY: f32 = 0.7;

/// Bounds exposed by the host application's settings surface. Values loaded
/// from a file are clamped into these on load.
pub const MAX_DIMENSION_RANGE: RangeInclusive<u32> = 512..=2048;
pub const QUALITY_RANGE: RangeInclusive<f32> = 0.3..=1.0;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub language: Language,
    pub max_dimension: u32,
    pub quality: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: Language::English,
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: DEFAULT_QUALITY,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    api_key: Option<String>,
    language: Option<String>,
    max_dimension: Option<u32>,
    quality: Option<f32>,
}

/// Builds settings from defaults, an optional TOML file with partial fields,
/// and the `OPENAI_API_KEY` environment variable as a key fallback.
/// Persistence of the file itself is owned by the host application.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    if let Some(path) = path {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: SettingsFile =
            toml::from_str(&content).map_err(|source| Error::InvalidSettings {
                path: path.to_path_buf(),
                source,
            })?;
        settings.merge(parsed);
    }

    if settings.api_key.is_empty() {
        if let Some(key) = get_env("OPENAI_API_KEY") {
            settings.api_key = key;
        }
    }

    settings.clamp_ranges();
    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(key) = incoming.api_key {
            if !key.trim().is_empty() {
                self.api_key = key;
            }
        }
        if let Some(tag) = incoming.language {
            if !tag.trim().is_empty() {
                self.language = Language::from_tag(&tag);
            }
        }
        if let Some(dimension) = incoming.max_dimension {
            if dimension > 0 {
                self.max_dimension = dimension;
            }
        }
        if let Some(quality) = incoming.quality {
            if quality.is_finite() && quality > 0.0 {
                self.quality = quality;
            }
        }
    }

    fn clamp_ranges(&mut self) {
        self.max_dimension = self
            .max_dimension
            .clamp(*MAX_DIMENSION_RANGE.start(), *MAX_DIMENSION_RANGE.end());
        self.quality = self
            .quality
            .clamp(*QUALITY_RANGE.start(), *QUALITY_RANGE.end());
    }
}

fn get_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
