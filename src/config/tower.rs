use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::book::Rgb;
use crate::domain::palette::DEFAULT_PALETTE;
use crate::domain::tower::StackOrder;

/// Constants driving the tower layout and its rendering
///
/// Every field has a default, so a config file only needs the values it
/// wants to change. Layout code always works on [`TowerConfig::sanitized`]
/// values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TowerConfig {
    /// Height of a zero-page book before clamping
    pub base_height: f32,
    /// Pages per additional layout unit of height
    pub page_divisor: f32,
    pub min_height: f32,
    pub max_height: f32,
    /// Vertical space between stacked books
    pub gap: f32,
    pub book_width: f32,
    /// Magnitudes of the horizontal stagger, cycled by stacking index
    pub offset_steps: Vec<f32>,
    /// Padding around the tower when sizing the drawing surface
    pub margin: f32,
    /// Title characters kept before the marker is appended
    pub label_max_chars: usize,
    pub label_marker: String,
    pub order: StackOrder,
    /// Spine colors as `#rrggbb`
    pub palette: Vec<String>,
    pub pixels_per_unit: f32,
}

impl TowerConfig {
    pub const DEFAULT_BASE_HEIGHT: f32 = 1.0;
    pub const DEFAULT_PAGE_DIVISOR: f32 = 1500.0;
    pub const DEFAULT_MIN_HEIGHT: f32 = 1.0;
    pub const DEFAULT_MAX_HEIGHT: f32 = 1.8;
    pub const DEFAULT_BOOK_WIDTH: f32 = 4.0;
    pub const DEFAULT_MARGIN: f32 = 0.5;
    pub const DEFAULT_LABEL_MAX_CHARS: usize = 20;
    pub const DEFAULT_PIXELS_PER_UNIT: f32 = 60.0;
    pub const MIN_PIXELS_PER_UNIT: f32 = 4.0;
    pub const MAX_PIXELS_PER_UNIT: f32 = 400.0;

    /// Parses a JSON config document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TowerConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Reads and parses a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Returns a copy with every out-of-range value repaired
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut config = self.clone();

        config.base_height = self.effective_base_height();
        config.page_divisor = self.effective_page_divisor();
        (config.min_height, config.max_height) = self.height_range();

        config.gap = finite_or(config.gap, defaults.gap).max(0.0);
        config.book_width = positive_or(config.book_width, defaults.book_width);
        config.margin = finite_or(config.margin, defaults.margin).max(0.0);
        config.offset_steps = config
            .offset_steps
            .iter()
            .map(|step| step.abs())
            .filter(|step| step.is_finite())
            .collect();

        config.palette.retain(|hex| Rgb::from_hex(hex).is_some());
        if config.palette.is_empty() {
            config.palette = defaults.palette;
        }

        config.pixels_per_unit = positive_or(config.pixels_per_unit, defaults.pixels_per_unit)
            .clamp(Self::MIN_PIXELS_PER_UNIT, Self::MAX_PIXELS_PER_UNIT);

        config
    }

    /// Base height with non-finite or negative values repaired
    pub fn effective_base_height(&self) -> f32 {
        finite_or(self.base_height, Self::DEFAULT_BASE_HEIGHT).max(0.0)
    }

    /// Page divisor, falling back to the default unless positive and finite
    pub fn effective_page_divisor(&self) -> f32 {
        positive_or(self.page_divisor, Self::DEFAULT_PAGE_DIVISOR)
    }

    /// `(min, max)` height bounds, positive, finite and in order
    pub fn height_range(&self) -> (f32, f32) {
        let min = positive_or(self.min_height, Self::DEFAULT_MIN_HEIGHT);
        let max = positive_or(self.max_height, Self::DEFAULT_MAX_HEIGHT);
        if min > max { (max, min) } else { (min, max) }
    }

    /// Parsed palette; invalid entries are skipped
    pub fn palette_colors(&self) -> Vec<Rgb> {
        self.palette.iter().filter_map(|hex| Rgb::from_hex(hex)).collect()
    }
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            base_height: Self::DEFAULT_BASE_HEIGHT,
            page_divisor: Self::DEFAULT_PAGE_DIVISOR,
            min_height: Self::DEFAULT_MIN_HEIGHT,
            max_height: Self::DEFAULT_MAX_HEIGHT,
            gap: 0.0,
            book_width: Self::DEFAULT_BOOK_WIDTH,
            offset_steps: vec![0.15, 0.3, 0.45],
            margin: Self::DEFAULT_MARGIN,
            label_max_chars: Self::DEFAULT_LABEL_MAX_CHARS,
            label_marker: "...".to_string(),
            order: StackOrder::default(),
            palette: DEFAULT_PALETTE.iter().map(Rgb::to_hex).collect(),
            pixels_per_unit: Self::DEFAULT_PIXELS_PER_UNIT,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_already_sane() {
        let config = TowerConfig::default();
        assert_eq!(config.sanitized(), config);
        assert_eq!(config.palette_colors(), DEFAULT_PALETTE.to_vec());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = TowerConfig::from_json_str(r#"{ "gap": 0.4, "order": "reverse" }"#).unwrap();
        assert_eq!(config.gap, 0.4);
        assert_eq!(config.order, StackOrder::Reverse);
        assert_eq!(config.page_divisor, TowerConfig::DEFAULT_PAGE_DIVISOR);
        assert_eq!(config.label_marker, "...");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = TowerConfig::from_json_str("{ gap: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = TowerConfig::from_json_str(r#"{ "order": "sideways" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = TowerConfig::load("/definitely/not/here/tower.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn sanitize_repairs_bad_numbers() {
        let config = TowerConfig {
            page_divisor: 0.0,
            min_height: 2.0,
            max_height: 0.5,
            gap: -1.0,
            book_width: f32::NAN,
            margin: f32::INFINITY,
            offset_steps: vec![-0.2, f32::NAN, 0.4],
            pixels_per_unit: 10_000.0,
            ..TowerConfig::default()
        }
        .sanitized();

        assert_eq!(config.page_divisor, TowerConfig::DEFAULT_PAGE_DIVISOR);
        assert_eq!((config.min_height, config.max_height), (0.5, 2.0));
        assert_eq!(config.gap, 0.0);
        assert_eq!(config.book_width, TowerConfig::DEFAULT_BOOK_WIDTH);
        assert_eq!(config.margin, TowerConfig::DEFAULT_MARGIN);
        assert_eq!(config.offset_steps, vec![0.2, 0.4]);
        assert_eq!(config.pixels_per_unit, TowerConfig::MAX_PIXELS_PER_UNIT);
    }

    #[test]
    fn height_helpers_repair_without_cloning() {
        let config = TowerConfig {
            base_height: f32::NAN,
            page_divisor: -3.0,
            min_height: 2.0,
            max_height: f32::NEG_INFINITY,
            ..TowerConfig::default()
        };

        assert_eq!(config.effective_base_height(), TowerConfig::DEFAULT_BASE_HEIGHT);
        assert_eq!(config.effective_page_divisor(), TowerConfig::DEFAULT_PAGE_DIVISOR);
        assert_eq!(config.height_range(), (TowerConfig::DEFAULT_MAX_HEIGHT, 2.0));
    }

    #[test]
    fn sanitize_drops_bad_palette_entries() {
        let config = TowerConfig {
            palette: vec!["#112233".into(), "not a color".into()],
            ..TowerConfig::default()
        }
        .sanitized();
        assert_eq!(config.palette, vec!["#112233".to_string()]);

        let config = TowerConfig {
            palette: vec!["nope".into()],
            ..TowerConfig::default()
        }
        .sanitized();
        assert_eq!(config.palette.len(), DEFAULT_PALETTE.len());
    }
}
