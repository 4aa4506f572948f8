//! Configuration management and validation.
//!
//! Provides configuration structures for reference table loading,
//! map rendering and per-run limits.

use crate::constants::{columns, map};
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// How the reference table is read
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Header of the primary identifier column
    pub primary_column: String,

    /// Header of the secondary identifier column
    pub secondary_column: String,

    /// Header of the label column
    pub label_column: String,

    /// Header of the Lambert-93 easting column
    pub x_column: String,

    /// Header of the Lambert-93 northing column
    pub y_column: String,

    /// Field delimiter; sniffed from the header line when `None`
    pub delimiter: Option<u8>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            primary_column: columns::PRIMARY.to_string(),
            secondary_column: columns::SECONDARY.to_string(),
            label_column: columns::LABEL.to_string(),
            x_column: columns::X.to_string(),
            y_column: columns::Y.to_string(),
            delimiter: None,
        }
    }
}

impl IndexConfig {
    /// Force a field delimiter instead of sniffing it
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Required column headers in (primary, secondary, label, x, y) order
    pub fn required_columns(&self) -> [&str; 5] {
        [
            self.primary_column.as_str(),
            self.secondary_column.as_str(),
            self.label_column.as_str(),
            self.x_column.as_str(),
            self.y_column.as_str(),
        ]
    }
}

/// Appearance of the generated map document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Document title, also shown in the legend box
    pub title: String,

    /// Hint line shown under the legend title
    pub hint: String,

    /// CSS colour of the markers
    pub marker_color: String,

    /// Zoom level when only one marker is drawn
    pub single_point_zoom: u8,

    /// Show the legend box
    pub show_legend: bool,

    /// Show the metric scale control
    pub show_scale: bool,

    /// Put markers in a named overlay toggled from a layer control
    pub layer_name: Option<String>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            title: map::DEFAULT_TITLE.to_string(),
            hint: map::DEFAULT_HINT.to_string(),
            marker_color: map::DEFAULT_MARKER_COLOR.to_string(),
            single_point_zoom: map::SINGLE_POINT_ZOOM,
            show_legend: true,
            show_scale: true,
            layer_name: None,
        }
    }
}

impl MapConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_marker_color(mut self, color: impl Into<String>) -> Self {
        self.marker_color = color.into();
        self
    }

    pub fn without_legend(mut self) -> Self {
        self.show_legend = false;
        self
    }

    pub fn with_layer(mut self, name: impl Into<String>) -> Self {
        self.layer_name = Some(name.into());
        self
    }

    /// Appearance of the map showing the whole reference table
    pub fn for_overview(self) -> Self {
        self.with_marker_color(map::OVERVIEW_MARKER_COLOR)
            .with_layer(map::OVERVIEW_LAYER_NAME)
    }
}

/// Global configuration for a viewer process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub index: IndexConfig,

    pub map: MapConfig,

    /// Maximum markers drawn per run; extra points are reported as failures
    pub max_markers: Option<usize>,
}

impl ViewerConfig {
    pub fn with_index(mut self, index: IndexConfig) -> Self {
        self.index = index;
        self
    }

    pub fn with_map(mut self, map: MapConfig) -> Self {
        self.map = map;
        self
    }

    pub fn with_max_markers(mut self, max_markers: usize) -> Self {
        self.max_markers = Some(max_markers);
        self
    }

    /// Read a JSON configuration file; omitted fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            PipelineError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            PipelineError::configuration(format!("invalid {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a usable run
    pub fn validate(&self) -> Result<()> {
        for column in self.index.required_columns() {
            if column.trim().is_empty() {
                return Err(PipelineError::configuration(
                    "reference column names must not be empty",
                ));
            }
        }

        if let Some(delimiter) = self.index.delimiter {
            if matches!(delimiter, b'"' | b'\n' | b'\r') {
                return Err(PipelineError::configuration(format!(
                    "invalid field delimiter: {:?}",
                    delimiter as char
                )));
            }
        }

        if self.max_markers == Some(0) {
            return Err(PipelineError::configuration(
                "max_markers must be at least 1",
            ));
        }

        if self.map.single_point_zoom > map::MAX_ZOOM {
            return Err(PipelineError::configuration(format!(
                "single_point_zoom {} exceeds maximum zoom {}",
                self.map.single_point_zoom,
                map::MAX_ZOOM
            )));
        }

        debug!("Configuration validated: {:?}", self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.index.primary_column, "codeCI");
        assert_eq!(config.max_markers, None);
    }

    #[test]
    fn test_zero_marker_limit_rejected() {
        let config = ViewerConfig {
            max_markers: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::Configuration { .. })
        ));
    }

    #[test]
    fn test_quote_delimiter_rejected() {
        let config =
            ViewerConfig::default().with_index(IndexConfig::default().with_delimiter(b'"'));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"{"max_markers": 25, "map": {"title": "Tournee"}, "index": {"delimiter": 59}}"#,
        )
        .unwrap();

        let config = ViewerConfig::from_file(file.path()).unwrap();

        assert_eq!(config.max_markers, Some(25));
        assert_eq!(config.map.title, "Tournee");
        assert_eq!(config.map.marker_color, map::DEFAULT_MARKER_COLOR);
        assert_eq!(config.index.delimiter, Some(b';'));
        assert_eq!(config.index.x_column, "XLambert93");
    }

    #[test]
    fn test_invalid_file_is_configuration_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"{ not json").unwrap();

        assert!(matches!(
            ViewerConfig::from_file(file.path()),
            Err(PipelineError::Configuration { .. })
        ));
        assert!(ViewerConfig::from_file(Path::new("/nonexistent/viewer.json")).is_err());
    }

    #[test]
    fn test_builders() {
        let config = ViewerConfig::default()
            .with_max_markers(100)
            .with_map(MapConfig::default().with_title("Tournée").without_legend());
        assert_eq!(config.max_markers, Some(100));
        assert_eq!(config.map.title, "Tournée");
        assert!(!config.map.show_legend);
    }
}
