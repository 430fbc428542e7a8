//! Leaflet HTML rendering for finalized maps.

use super::artifact::FinalizedMap;
use super::overlay::OverlaySpec;

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Quote a string as a JavaScript literal that is safe inside `<script>`.
fn js_string(s: &str) -> String {
    // serde_json quoting is valid JS; "</" must not close the script element.
    serde_json::Value::String(s.to_string())
        .to_string()
        .replace("</", "<\\/")
}

/// Image URL for an overlay, percent-encoding the file name.
fn image_url(overlay: &OverlaySpec) -> String {
    match overlay.image_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/{}", dir, urlencoding::encode(file)),
        None => urlencoding::encode(&overlay.image_path).into_owned(),
    }
}

fn overlay_js(overlay: &OverlaySpec) -> String {
    let [[south, west], [north, east]] = overlay.bounds.corners();
    format!(
        "        {{ name: {name}, url: {url}, bounds: [[{south}, {west}], [{north}, {east}]], opacity: {opacity}, interactive: {interactive} }}",
        name = js_string(&overlay.name),
        url = js_string(&image_url(overlay)),
        opacity = overlay.opacity,
        interactive = overlay.interactive,
    )
}

/// Generate a Leaflet page showing the base map, every overlay and a
/// layer control.
///
/// Overlays are added in insertion order, so later overlays stack on top and
/// the control lists them in the same order.
pub fn render_html(map: &FinalizedMap) -> String {
    let [latitude, longitude] = map.artifact.center;
    let zoom = map.artifact.zoom;

    let overlays: Vec<String> = map.artifact.overlays.iter().map(overlay_js).collect();

    let legend: Vec<String> = map
        .layer_control
        .entries
        .iter()
        .map(|name| format!("            <li>{}</li>", html_escape(name)))
        .collect();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Interactive Map - {latitude}, {longitude}</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <style>
        html, body {{
            margin: 0;
            padding: 0;
            height: 100%;
        }}
        #map {{
            width: 100vw;
            height: 100vh;
        }}
        noscript ul {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
        }}
    </style>
</head>
<body>
    <div id="map"></div>
    <noscript>
        <ul>
{legend}
        </ul>
    </noscript>

    <script>
        const map = L.map('map').setView([{latitude}, {longitude}], {zoom});

        L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
            maxZoom: 19,
            attribution: '&copy; OpenStreetMap contributors'
        }}).addTo(map);

        const overlays = [
{overlays}
        ];

        const control = {{}};
        for (const o of overlays) {{
            const layer = L.imageOverlay(o.url, o.bounds, {{
                opacity: o.opacity,
                interactive: o.interactive
            }}).addTo(map);
            control[o.name] = layer;
        }}

        L.control.layers(null, control).addTo(map);
    </script>
</body>
</html>
"##,
        legend = legend.join("\n"),
        overlays = overlays.join(",\n"),
    )
}
