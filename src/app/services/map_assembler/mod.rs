//! Interactive map document generation
//!
//! Builds one self-contained Leaflet page with a marker per resolved point
//! and writes it atomically: the document goes to a temporary file next to
//! the target and is then renamed over it, so a failed run never leaves a
//! truncated map behind.

use crate::config::MapConfig;
use crate::models::ResolvedPoint;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

pub mod template;

pub use template::{MapView, render_document};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no resolved points to draw")]
    NoPoints,

    #[error("cannot write map to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode marker data: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RenderError {
    /// Stable reason code for reports
    pub fn code(&self) -> &'static str {
        match self {
            RenderError::NoPoints => "no-points",
            RenderError::WriteFailed { .. } => "write-failed",
            RenderError::Encode(_) => "encode-failed",
        }
    }

    fn write_failed(path: &Path, source: std::io::Error) -> Self {
        RenderError::WriteFailed {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Renders resolved points into a map document on disk
#[derive(Debug, Clone, Default)]
pub struct MapAssembler {
    config: MapConfig,
}

impl MapAssembler {
    pub fn new(config: MapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Render `points` and write the document to `output_path`
    ///
    /// # Errors
    /// * `RenderError::NoPoints` if `points` is empty; nothing is written
    /// * `RenderError::WriteFailed` on any I/O failure; no partial file remains
    pub fn assemble(
        &self,
        points: &[ResolvedPoint],
        output_path: &Path,
    ) -> Result<PathBuf, RenderError> {
        if points.is_empty() {
            return Err(RenderError::NoPoints);
        }

        let document = render_document(points, &self.config)?;
        write_atomically(output_path, document.as_bytes())?;

        info!(
            "Map with {} marker(s) written to {}",
            points.len(),
            output_path.display()
        );
        Ok(output_path.to_path_buf())
    }
}

/// Write `contents` to `path` through a temporary file in the same directory
fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), RenderError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(directory).map_err(|e| RenderError::write_failed(path, e))?;

    let mut temp_file =
        NamedTempFile::new_in(directory).map_err(|e| RenderError::write_failed(path, e))?;
    debug!("Writing map through {}", temp_file.path().display());

    temp_file
        .write_all(contents)
        .and_then(|_| temp_file.flush())
        .map_err(|e| RenderError::write_failed(path, e))?;

    // Dropping the temp file on any error above removes it
    temp_file
        .persist(path)
        .map_err(|e| RenderError::write_failed(path, e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn point(
        line_number: usize,
        label: &str,
        description: Option<&str>,
        lon: f64,
        lat: f64,
    ) -> ResolvedPoint {
        ResolvedPoint {
            primary: "597120".to_string(),
            secondary: "BA".to_string(),
            label: label.to_string(),
            description: description.map(str::to_string),
            longitude: lon,
            latitude: lat,
            line_number,
        }
    }

    fn marker_lines(document: &str) -> String {
        document
            .lines()
            .find(|line| line.trim_start().starts_with("const markers"))
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_empty_points_rejected_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("map.html");

        let result = MapAssembler::default().assemble(&[], &output);

        assert!(matches!(result, Err(RenderError::NoPoints)));
        assert_eq!(result.unwrap_err().code(), "no-points");
        assert!(!output.exists());
    }

    #[test]
    fn test_document_contains_marker_details() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("map.html");
        let points = [point(1, "Site A", Some("My note"), 1.674275, 47.392787)];

        let written = MapAssembler::default().assemble(&points, &output).unwrap();
        assert_eq!(written, output);

        let document = fs::read_to_string(&output).unwrap();
        assert!(document.contains("Site A"));
        assert!(document.contains("597120.BA"));
        assert!(document.contains("My note"));
        assert!(document.contains("597120-BA: Site A"));
        assert!(document.contains("tile.openstreetmap.org"));
    }

    #[test]
    fn test_absent_description_is_null() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("map.html");
        let points = [point(1, "Site A", None, 1.67, 47.39)];

        MapAssembler::default().assemble(&points, &output).unwrap();
        let document = fs::read_to_string(&output).unwrap();
        assert!(marker_lines(&document).contains("\"description\":null"));
    }

    #[test]
    fn test_one_marker_per_point_including_duplicates() {
        let points = [
            point(1, "Site A", None, 1.67, 47.39),
            point(2, "Site A", None, 1.67, 47.39),
            point(3, "Langres", None, 5.33, 47.86),
        ];

        let document = render_document(&points, &MapConfig::default()).unwrap();
        assert_eq!(marker_lines(&document).matches("\"tooltip\"").count(), 3);
    }

    #[test]
    fn test_creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("nested").join("deeper").join("map.html");

        MapAssembler::default()
            .assemble(&[point(1, "Site A", None, 1.67, 47.39)], &output)
            .unwrap();

        assert!(output.exists());
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("map.html");
        let points = [
            point(1, "Site A", Some("note"), 1.67, 47.39),
            point(2, "Langres", None, 5.33, 47.86),
        ];
        let assembler = MapAssembler::default();

        assembler.assemble(&points, &output).unwrap();
        let first = fs::read_to_string(&output).unwrap();
        assembler.assemble(&points, &output).unwrap();
        let second = fs::read_to_string(&output).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_write_failure_leaves_no_file() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where a directory is expected
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let output = blocker.join("map.html");

        let result =
            MapAssembler::default().assemble(&[point(1, "Site A", None, 1.67, 47.39)], &output);

        match result {
            Err(error) => assert_eq!(error.code(), "write-failed"),
            Ok(_) => panic!("expected write failure"),
        }
        assert!(!output.exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_markup_in_text_is_neutralized() {
        let config = MapConfig::default().with_title("<b>Tournée</b>");
        let points = [
            point(1, "</script><script>alert(1)</script>", Some("a & b"), 1.67, 47.39),
            point(2, "<!--<script>", Some("-->"), 1.68, 47.40),
        ];

        let document = render_document(&points, &config).unwrap();
        let markers = marker_lines(&document);

        assert!(!document.contains("</script><script>alert(1)"));
        assert!(!document.contains("<!--<script>"));
        assert!(!markers.contains('<'));
        assert!(!markers.contains('>'));
        assert!(markers.contains("\\u003c!--\\u003cscript\\u003e"));
        assert!(markers.contains("a \\u0026 b"));
        assert!(document.contains("<title>&lt;b&gt;Tournée&lt;/b&gt;</title>"));
        // The page still has exactly its two script elements
        assert_eq!(document.matches("</script>").count(), 2);
    }

    #[test]
    fn test_placeholders_in_user_text_are_not_expanded() {
        let points = [point(1, "{{TITLE}}", Some("{{MARKERS}}"), 1.67, 47.39)];
        let document = render_document(&points, &MapConfig::default()).unwrap();
        assert!(document.contains("\"label\":\"{{TITLE}}\""));
        assert!(document.contains("\"description\":\"{{MARKERS}}\""));
    }

    #[test]
    fn test_view_fits_all_markers() {
        let points = [
            point(1, "A", None, 1.67, 47.39),
            point(2, "B", None, 5.33, 47.86),
            point(3, "C", None, 3.0, 43.2),
        ];

        let view = MapView::fit(&points, 14);

        assert!(view.bounds.is_some());
        for p in &points {
            assert!(view.contains(p.latitude, p.longitude));
        }
    }

    #[test]
    fn test_overlay_layer_only_when_configured() {
        let points = [point(1, "Site A", None, 1.67, 47.39)];

        let plain = render_document(&points, &MapConfig::default()).unwrap();
        assert!(plain.contains("\"layerName\":null"));

        let overview = render_document(&points, &MapConfig::default().for_overview()).unwrap();
        assert!(overview.contains("\"layerName\":\"Points de Référence\""));
        assert!(overview.contains("\"markerColor\":\"#2a81cb\""));
    }

    #[test]
    fn test_view_without_points_shows_france() {
        let view = MapView::fit(&[], 14);
        assert_eq!(view.bounds, None);
        assert_eq!(view.center, [46.0, 2.0]);
        assert_eq!(view.zoom, 6);
    }

    #[test]
    fn test_view_single_location_uses_zoom() {
        let points = [point(1, "A", None, 1.67, 47.39), point(2, "A", None, 1.67, 47.39)];

        let view = MapView::fit(&points, 12);

        assert_eq!(view.bounds, None);
        assert_eq!(view.center, [47.39, 1.67]);
        assert_eq!(view.zoom, 12);
    }
}
