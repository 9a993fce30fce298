//! Run configuration
//!
//! All thresholds used by the checkers live here. A config value is built
//! once by the caller (defaults, or a TOML file) and passed to the engine;
//! nothing is read from process-wide state.

use crate::error::ComplianceError;
use crate::units::{cm_to_pt, mm_to_pt};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared_types::MarginSide;
use std::fs;
use std::path::Path;

/// Complete configuration for one compliance run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    pub margins: MarginConfig,
    pub page_numbers: PageNumberConfig,
    pub quotes: QuoteConfig,
    pub graphics: GraphicsConfig,
}

impl ComplianceConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or the values fail [`ComplianceConfig::validate`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string. Missing keys take defaults.
    ///
    /// ```
    /// use compliance_engine::config::ComplianceConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ComplianceConfig::from_str(r#"
    ///     [margins]
    ///     tolerance_pt = 5.0
    /// "#)?;
    /// assert_eq!(config.margins.left_cm, 3.0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no checker can work with
    pub fn validate(&self) -> Result<(), ComplianceError> {
        let m = &self.margins;
        for side in MarginSide::ALL {
            if m.required_cm(side) < 0.0 {
                return Err(ComplianceError::Config(format!(
                    "margin {} must not be negative",
                    side.key()
                )));
            }
        }
        if m.tolerance_pt < 0.0 {
            return Err(ComplianceError::Config(
                "margin tolerance must not be negative".to_string(),
            ));
        }

        let p = &self.page_numbers;
        if p.bottom_zone_mm <= 0.0 || p.center_tolerance_mm < 0.0 {
            return Err(ComplianceError::Config(
                "page number zone must be positive and tolerance non-negative".to_string(),
            ));
        }
        if p.min_font_size > p.max_font_size {
            return Err(ComplianceError::Config(format!(
                "min_font_size {} exceeds max_font_size {}",
                p.min_font_size, p.max_font_size
            )));
        }
        if p.font_pattern.trim().is_empty() {
            return Err(ComplianceError::Config(
                "font_pattern must not be empty".to_string(),
            ));
        }

        let q = &self.quotes;
        if q.disallowed.is_empty() {
            return Err(ComplianceError::Config(
                "disallowed quote set must not be empty".to_string(),
            ));
        }
        if q.disallowed.contains('«') || q.disallowed.contains('»') {
            return Err(ComplianceError::Config(
                "guillemets are the accepted quote style and cannot be disallowed".to_string(),
            ));
        }

        let g = &self.graphics;
        if g.min_object_size_pt < 0.0
            || g.center_tolerance_pt < 0.0
            || g.margin_tolerance_pt < 0.0
            || g.table_margin_tolerance_pt < 0.0
        {
            return Err(ComplianceError::Config(
                "graphics thresholds must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Required page margins (centimeters) and measurement tolerance (points)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginConfig {
    pub left_cm: f64,
    pub right_cm: f64,
    pub top_cm: f64,
    pub bottom_cm: f64,
    pub tolerance_pt: f64,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            left_cm: 3.0,
            right_cm: 1.5,
            top_cm: 2.0,
            bottom_cm: 2.0,
            tolerance_pt: 3.0,
        }
    }
}

impl MarginConfig {
    pub fn required_cm(&self, side: MarginSide) -> f64 {
        match side {
            MarginSide::Left => self.left_cm,
            MarginSide::Right => self.right_cm,
            MarginSide::Top => self.top_cm,
            MarginSide::Bottom => self.bottom_cm,
        }
    }

    pub fn required_pt(&self, side: MarginSide) -> f64 {
        cm_to_pt(self.required_cm(side))
    }
}

/// Page-number placement rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageNumberConfig {
    /// Height of the band at the page foot scanned for numbers
    pub bottom_zone_mm: f64,
    /// Allowed horizontal deviation from the working-area center
    pub center_tolerance_mm: f64,
    /// Case-insensitive substring the font name must contain
    pub font_pattern: String,
    pub min_font_size: f64,
    pub max_font_size: f64,
}

impl Default for PageNumberConfig {
    fn default() -> Self {
        Self {
            bottom_zone_mm: 25.0,
            center_tolerance_mm: 10.0,
            font_pattern: "times".to_string(),
            min_font_size: 12.0,
            max_font_size: 14.0,
        }
    }
}

impl PageNumberConfig {
    pub fn bottom_zone_pt(&self) -> f64 {
        mm_to_pt(self.bottom_zone_mm)
    }

    pub fn center_tolerance_pt(&self) -> f64 {
        mm_to_pt(self.center_tolerance_mm)
    }
}

/// Quotation-mark rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    /// Every character in this string is a disallowed quotation glyph
    pub disallowed: String,
    /// Characters of context recorded on each side of a match
    pub context_chars: usize,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            disallowed: "\"'“”‘’„‚‹›".to_string(),
            context_chars: 30,
        }
    }
}

/// Placement rules for images, vector drawings and tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    /// Objects must exceed this size in both dimensions to be checked
    pub min_object_size_pt: f64,
    pub center_tolerance_pt: f64,
    pub margin_tolerance_pt: f64,
    pub table_margin_tolerance_pt: f64,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            min_object_size_pt: 20.0,
            center_tolerance_pt: 2.0,
            margin_tolerance_pt: 0.0,
            table_margin_tolerance_pt: 2.0,
        }
    }
}
