//! Application constants for JBW Viewer
//!
//! Default file locations, reference table column names, Lambert-93
//! projection parameters and map rendering defaults.

// =============================================================================
// Default Locations
// =============================================================================

/// Reference table shipped with the application
pub const DEFAULT_REFERENCE_PATH: &str = "data/TTH_EXPLORER_REFERENTIEL_PR.csv";

/// Directory receiving generated maps
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// File name of the map generated for a request list
pub const DEFAULT_MAP_FILENAME: &str = "pr_specific_map.html";

/// File name of the map showing the whole reference table
pub const DEFAULT_OVERVIEW_FILENAME: &str = "pr_map.html";

/// Marker cap for the whole-table map
pub const DEFAULT_OVERVIEW_MAX_MARKERS: usize = 1000;

// =============================================================================
// Reference Table Columns
// =============================================================================

/// Default header names of the reference table
pub mod columns {
    /// First half of the composite identifier (CI code)
    pub const PRIMARY: &str = "codeCI";

    /// Second half of the composite identifier (CH code)
    pub const SECONDARY: &str = "codeCH";

    /// Human readable name of the point
    pub const LABEL: &str = "libelleCI";

    /// Lambert-93 easting in metres
    pub const X: &str = "XLambert93";

    /// Lambert-93 northing in metres
    pub const Y: &str = "YLambert93";
}

// =============================================================================
// Request Line Syntax
// =============================================================================

/// Separator between the two halves of a composite identifier
pub const IDENTIFIER_SEPARATOR: char = '-';

/// Separator between the identifier and the optional description
pub const DESCRIPTION_SEPARATOR: char = ';';

/// Lines starting with this character are ignored
pub const COMMENT_PREFIX: char = '#';

// =============================================================================
// Lambert-93 (EPSG:2154) Projection Parameters
// =============================================================================

/// Constants of the Lambert-93 conformal conic projection on GRS80,
/// as published by IGN for the inverse transformation.
pub mod lambert93 {
    /// Cone constant
    pub const N: f64 = 0.725_607_765_053_267;

    /// Projection constant (metres)
    pub const C: f64 = 11_754_255.426_096;

    /// Easting of the pole (metres)
    pub const XS: f64 = 700_000.0;

    /// Northing of the pole (metres)
    pub const YS: f64 = 12_655_612.049_876;

    /// Central meridian, 3 degrees east of Greenwich (radians)
    pub const LAMBDA0: f64 = 3.0 * std::f64::consts::PI / 180.0;

    /// First eccentricity of the GRS80 ellipsoid
    pub const E: f64 = 0.081_819_191_042_815_8;

    /// Convergence threshold for the latitude iteration (radians)
    pub const LATITUDE_EPSILON: f64 = 1e-11;

    /// Upper bound on latitude iterations
    pub const MAX_ITERATIONS: usize = 100;
}

// =============================================================================
// Map Rendering
// =============================================================================

pub mod map {
    /// Leaflet release loaded by generated documents
    pub const LEAFLET_VERSION: &str = "1.9.4";

    /// OpenStreetMap standard tile layer
    pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

    pub const TILE_ATTRIBUTION: &str =
        "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

    pub const MAX_ZOOM: u8 = 19;

    /// Zoom used when the map holds a single marker
    pub const SINGLE_POINT_ZOOM: u8 = 14;

    /// Fallback centre of mainland France (lat, lon)
    pub const FRANCE_CENTER: [f64; 2] = [46.0, 2.0];

    /// Zoom showing the whole of mainland France
    pub const OVERVIEW_ZOOM: u8 = 6;

    pub const DEFAULT_TITLE: &str = "JBW Viewer";

    pub const DEFAULT_HINT: &str = "Cliquez sur un marqueur pour plus d'informations";

    pub const DEFAULT_MARKER_COLOR: &str = "#d7263d";

    /// Marker colour of the whole-table map
    pub const OVERVIEW_MARKER_COLOR: &str = "#2a81cb";

    /// Name of the toggleable overlay holding the whole-table markers
    pub const OVERVIEW_LAYER_NAME: &str = "Points de Référence";

    pub const POPUP_MAX_WIDTH: u32 = 300;
}
