//! HTML page construction
//!
//! Interpolates the serialized node tree and resolved options into a fixed
//! page template. The page loads d3 and the mind-map view library either from
//! a CDN or from scripts embedded straight into the document, renders the
//! tree into `svg#mindmap`, and publishes the finished map as `window.mm`.

use crate::error::{Error, Result};
use crate::options::MarkmapOptions;
use crate::transform::MapNode;
use crate::AssetSource;

const PAGE_TEMPLATE: &str = include_str!("../html/mindmap.html");

/// Default CDN bundle for d3
pub const D3_CDN_URL: &str = "https://cdn.jsdelivr.net/npm/d3@7";
/// Default CDN bundle for the mind-map view library
pub const MARKMAP_VIEW_CDN_URL: &str = "https://cdn.jsdelivr.net/npm/markmap-view@0.18";

/// The expression the screenshot driver polls to know the page has rendered.
/// Shared with the page bootstrap script; the two must not drift.
pub const RENDER_SIGNAL_EXPR: &str = r#"typeof window.mm !== "undefined""#;

/// Build the self-contained mind-map page.
///
/// The tree and options are embedded verbatim as JSON (already valid JS);
/// only the title passes through the HTML escaper.
pub fn build_page(
    root: &MapNode,
    options: &MarkmapOptions,
    title: &str,
    color_freeze_level: u32,
    assets: &AssetSource,
) -> Result<String> {
    let root_json =
        serde_json::to_string(root).map_err(|e| Error::Template(format!("node tree: {e}")))?;
    let options_json =
        serde_json::to_string(options).map_err(|e| Error::Template(format!("options: {e}")))?;

    Ok(PAGE_TEMPLATE
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{ASSETS}}", &assets_html(assets))
        .replace("{{ROOT_JSON}}", &root_json)
        .replace("{{OPTIONS_JSON}}", &options_json)
        .replace("{{COLOR_FREEZE_LEVEL}}", &color_freeze_level.to_string()))
}

fn assets_html(assets: &AssetSource) -> String {
    match assets {
        AssetSource::Cdn {
            d3_url,
            markmap_url,
        } => format!(
            "<script src=\"{}\"></script>\n<script src=\"{}\"></script>",
            escape_html(d3_url),
            escape_html(markmap_url)
        ),
        AssetSource::Embedded { d3_js, markmap_js } => {
            format!("<script>\n{d3_js}\n</script>\n<script>\n{markmap_js}\n</script>")
        }
    }
}

/// Escape text for embedding into HTML element or attribute content.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
