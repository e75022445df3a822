//! Map rendering: marker-script generation and template injection.
//!
//! The renderer owns the final, fatal phase of the run. It generates one
//! marker statement plus one click binding per resolved marker, wraps
//! them in a single `function points() { ... }`, splices that body into
//! the `<script id="points">` placeholder of the template, and writes the
//! result atomically (temp file + rename) so a crashed run never leaves a
//! partial artifact.
//!
//! Generation is deterministic: identical ordered input produces
//! byte-identical script text. The marker index is the only
//! disambiguator between the generated identifiers.
//!
//! ## Escaping
//!
//! Pin descriptions and image URLs are attacker-ish input: a quote can
//! end the JS string literal and an angle bracket can close the script
//! element. Interpolated text is therefore escaped twice over — JS-string
//! metacharacters are backslash-escaped and angle brackets become
//! `\u003C`/`\u003E`, while the image URL is additionally entity-escaped
//! for its attribute-value position inside the info-window markup.

use crate::error::MapinterestError;
use crate::output::ResolvedMarker;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

/// Matches the placeholder script element reserved for the generated body.
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)(<script[^>]*\bid\s*=\s*["']points["'][^>]*>).*?(</script>)"#)
        .expect("placeholder regex is valid")
});

/// Escape a string for interpolation into a single-quoted JS string literal.
///
/// Angle brackets use `\uXXXX` escapes so the script content can never
/// contain a literal `</script>` regardless of input.
fn js_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a string for an HTML attribute value position.
fn attr_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Generate the `points()` script body for the given markers, in index order.
///
/// Each marker contributes a creation statement and a click binding that
/// opens an info window with the pin's image; `marker{i}` is always
/// paired with `info{i}`.
pub fn marker_script(markers: &[ResolvedMarker]) -> String {
    let mut script = String::from("function points() {\n");
    for marker in markers {
        let i = marker.index;
        let title = js_escape(&marker.description);
        // Entity-escape first (attribute position), then JS-escape what's
        // left for the surrounding string literal.
        let src = js_escape(&attr_escape(&marker.image_url));
        script.push_str(&format!(
            "var marker{i} = new google.maps.Marker({{position: new google.maps.LatLng({lat}, {lng}), map: map, title: '{title}'}});\n",
            lat = marker.location.latitude,
            lng = marker.location.longitude,
        ));
        script.push_str(&format!(
            "google.maps.event.addListener(marker{i}, 'click', function() {{\n"
        ));
        script.push_str(&format!(
            "    var info{i} = new google.maps.InfoWindow({{content: '<img src=\"{src}\">', disableAutoPan: true}});\n"
        ));
        script.push_str(&format!("    info{i}.open(map, marker{i});\n"));
        script.push_str("});\n");
    }
    script.push_str("}\n");
    script
}

/// Render the map: load the template, inject the generated script into
/// the placeholder, and write the artifact to `output_path`, overwriting
/// any existing file.
///
/// Template problems are fatal — they are installation errors, not
/// runtime data errors — and nothing is written when they occur.
pub async fn render_map(
    markers: &[ResolvedMarker],
    template_path: &Path,
    output_path: &Path,
) -> Result<(), MapinterestError> {
    let template = match tokio::fs::read_to_string(template_path).await {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(MapinterestError::TemplateMissing {
                path: template_path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(MapinterestError::TemplateCorrupt {
                path: template_path.to_path_buf(),
                detail: e.to_string(),
            });
        }
    };

    if !PLACEHOLDER_RE.is_match(&template) {
        return Err(MapinterestError::TemplateCorrupt {
            path: template_path.to_path_buf(),
            detail: "no <script id=\"points\"> placeholder element".into(),
        });
    }

    let script = marker_script(markers);
    debug!("Generated {} bytes of marker script", script.len());

    // Closure replacement: the script may contain `$`, which must not be
    // treated as a capture-group reference.
    let document = PLACEHOLDER_RE
        .replacen(&template, 1, |caps: &regex::Captures<'_>| {
            format!("{}\n{}{}", &caps[1], script, &caps[2])
        })
        .into_owned();

    // Atomic write: temp file + rename, so interrupted runs leave no
    // partial artifact behind.
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                MapinterestError::OutputWriteFailed {
                    path: output_path.to_path_buf(),
                    source: e,
                }
            })?;
        }
    }

    let tmp_path = output_path.with_extension("html.tmp");
    tokio::fs::write(&tmp_path, &document).await.map_err(|e| {
        MapinterestError::OutputWriteFailed {
            path: output_path.to_path_buf(),
            source: e,
        }
    })?;
    tokio::fs::rename(&tmp_path, output_path).await.map_err(|e| {
        MapinterestError::OutputWriteFailed {
            path: output_path.to_path_buf(),
            source: e,
        }
    })?;

    info!("Map written to {}", output_path.display());
    Ok(())
}
