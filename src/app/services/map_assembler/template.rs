//! Leaflet document template and its rendering.
//!
//! The page is kept as a `&'static str` with `{{PLACEHOLDER}}` slots so the
//! generated file needs nothing at view time beyond the Leaflet CDN and the
//! OpenStreetMap tile servers. Marker data is injected as JSON and popups are
//! built with DOM text nodes, so labels and descriptions are never parsed as
//! HTML.

use crate::config::MapConfig;
use crate::constants::map::{
    FRANCE_CENTER, LEAFLET_VERSION, MAX_ZOOM, OVERVIEW_ZOOM, POPUP_MAX_WIDTH, TILE_ATTRIBUTION,
    TILE_URL,
};
use crate::models::ResolvedPoint;
use serde::Serialize;

pub const MAP_HTML: &str = r#"<!doctype html>
<html lang="fr">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <link rel="stylesheet" crossorigin=""
        href="https://unpkg.com/leaflet@{{LEAFLET_VERSION}}/dist/leaflet.css" />
  <script crossorigin=""
          src="https://unpkg.com/leaflet@{{LEAFLET_VERSION}}/dist/leaflet.js"></script>
  <style>
    html, body { height: 100%; margin: 0; }
    #map { position: absolute; inset: 0; }
    .pr-popup { font-family: Arial, sans-serif; }
    .pr-popup h4 { margin: 0 0 6px 0; }
    .pr-popup p { margin: 2px 0; }
    .pr-popup .pr-description { color: blue; }
    .pr-legend {
      background: white; border: 2px solid grey; padding: 10px;
      font: 14px Arial, sans-serif; max-width: 220px;
    }
    .pr-legend p { margin: 2px 0; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    const markers = {{MARKERS}};
    const view = {{VIEW}};
    const options = {{OPTIONS}};

    const map = L.map('map');
    L.tileLayer(options.tileUrl, {
      maxZoom: options.maxZoom,
      attribution: options.attribution
    }).addTo(map);

    if (options.showScale) {
      L.control.scale({ imperial: false }).addTo(map);
    }

    const layer = options.layerName ? L.layerGroup().addTo(map) : map;
    if (options.layerName) {
      L.control.layers(null, { [options.layerName]: layer }, { collapsed: false }).addTo(map);
    }

    function line(parent, name, value, className) {
      const p = document.createElement('p');
      const strong = document.createElement('strong');
      strong.textContent = name;
      p.appendChild(strong);
      if (className) {
        p.appendChild(document.createElement('br'));
        const span = document.createElement('span');
        span.className = className;
        span.textContent = value;
        p.appendChild(span);
      } else {
        p.appendChild(document.createTextNode(' ' + value));
      }
      parent.appendChild(p);
    }

    function popup(marker) {
      const root = document.createElement('div');
      root.className = 'pr-popup';
      const heading = document.createElement('h4');
      heading.textContent = 'Point Remarquable';
      root.appendChild(heading);
      line(root, 'Libellé:', marker.label);
      line(root, 'PR:', marker.code);
      if (marker.description) {
        line(root, 'Description:', marker.description, 'pr-description');
      }
      return root;
    }

    for (const marker of markers) {
      L.circleMarker([marker.lat, marker.lon], {
        radius: 8,
        color: options.markerColor,
        fillColor: options.markerColor,
        fillOpacity: 0.85,
        weight: 2
      })
        .bindPopup(popup(marker), { maxWidth: options.popupMaxWidth })
        .bindTooltip(marker.tooltip)
        .addTo(layer);
    }

    if (view.bounds) {
      map.fitBounds(view.bounds, { padding: [30, 30] });
    } else {
      map.setView(view.center, view.zoom);
    }

    if (options.showLegend) {
      const legend = L.control({ position: 'bottomleft' });
      legend.onAdd = function () {
        const div = L.DomUtil.create('div', 'pr-legend');
        const title = document.createElement('p');
        const bold = document.createElement('b');
        bold.textContent = options.title;
        title.appendChild(bold);
        div.appendChild(title);
        const hint = document.createElement('p');
        hint.textContent = options.hint;
        div.appendChild(hint);
        return div;
      };
      legend.addTo(map);
    }
  </script>
</body>
</html>
"#;

/// One marker as embedded in the document
#[derive(Debug, Clone, Serialize)]
pub struct MarkerData<'a> {
    pub lat: f64,
    pub lon: f64,
    pub label: &'a str,
    /// Identifier as `primary.secondary`
    pub code: String,
    pub description: Option<&'a str>,
    /// `primary-secondary: label`
    pub tooltip: String,
}

impl<'a> From<&'a ResolvedPoint> for MarkerData<'a> {
    fn from(point: &'a ResolvedPoint) -> Self {
        Self {
            lat: point.latitude,
            lon: point.longitude,
            label: &point.label,
            code: point.display_code(),
            description: point.description.as_deref(),
            tooltip: format!("{}: {}", point.request_code(), point.label),
        }
    }
}

/// Initial viewport: fitted bounds, or centre + zoom for a single location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub bounds: Option<[[f64; 2]; 2]>,
    pub center: [f64; 2],
    pub zoom: u8,
}

impl MapView {
    /// Viewport containing every point
    pub fn fit(points: &[ResolvedPoint], single_point_zoom: u8) -> Self {
        if points.is_empty() {
            return Self {
                bounds: None,
                center: FRANCE_CENTER,
                zoom: OVERVIEW_ZOOM,
            };
        }

        let (mut min_lat, mut min_lon) = (f64::INFINITY, f64::INFINITY);
        let (mut max_lat, mut max_lon) = (f64::NEG_INFINITY, f64::NEG_INFINITY);

        for point in points {
            min_lat = min_lat.min(point.latitude);
            max_lat = max_lat.max(point.latitude);
            min_lon = min_lon.min(point.longitude);
            max_lon = max_lon.max(point.longitude);
        }

        let center = [(min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0];
        let bounds = (min_lat < max_lat || min_lon < max_lon)
            .then_some([[min_lat, min_lon], [max_lat, max_lon]]);

        Self {
            bounds,
            center,
            zoom: single_point_zoom,
        }
    }

    /// Whether a position lies inside the initial view
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        match self.bounds {
            Some([[min_lat, min_lon], [max_lat, max_lon]]) => {
                (min_lat..=max_lat).contains(&latitude) && (min_lon..=max_lon).contains(&longitude)
            }
            None => self.center == [latitude, longitude],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageOptions<'a> {
    title: &'a str,
    hint: &'a str,
    marker_color: &'a str,
    show_legend: bool,
    show_scale: bool,
    tile_url: &'a str,
    attribution: &'a str,
    max_zoom: u8,
    popup_max_width: u32,
    layer_name: Option<&'a str>,
}

/// Render the full document for `points`
pub fn render_document(
    points: &[ResolvedPoint],
    config: &MapConfig,
) -> Result<String, serde_json::Error> {
    let markers: Vec<MarkerData<'_>> = points.iter().map(MarkerData::from).collect();
    let view = MapView::fit(points, config.single_point_zoom);
    let options = PageOptions {
        title: &config.title,
        hint: &config.hint,
        marker_color: &config.marker_color,
        show_legend: config.show_legend,
        show_scale: config.show_scale,
        tile_url: TILE_URL,
        attribution: TILE_ATTRIBUTION,
        max_zoom: MAX_ZOOM,
        popup_max_width: POPUP_MAX_WIDTH,
        layer_name: config.layer_name.as_deref(),
    };

    let title = escape_html(&config.title);
    let view = script_json(&view)?;
    let options = script_json(&options)?;
    let markers = script_json(&markers)?;

    Ok(fill_template(
        MAP_HTML,
        &[
            ("TITLE", &title),
            ("LEAFLET_VERSION", LEAFLET_VERSION),
            ("VIEW", &view),
            ("OPTIONS", &options),
            ("MARKERS", &markers),
        ],
    ))
}

/// Substitute `{{NAME}}` slots in one pass; inserted values are never rescanned
fn fill_template(template: &str, slots: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let slot = after.find("}}").and_then(|end| {
            let name = &after[..end];
            slots
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });

        match slot {
            Some((value, end)) => {
                output.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                output.push_str("{{");
                rest = after;
            }
        }
    }

    output.push_str(rest);
    output
}

/// Serialize for embedding inside a `<script>` element
///
/// `<`, `>` and `&` only occur inside JSON strings, where their `\uXXXX`
/// forms decode to the same text; no `</script>` or `<!--` can survive.
fn script_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            _ => escaped.push(c),
        }
    }
    Ok(escaped)
}

/// Escape text for an HTML text node
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
