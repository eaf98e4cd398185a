//! Mindsnap
//!
//! Converts Markdown text into a self-contained interactive mind-map HTML
//! page and, optionally, rasterizes that page to a PNG screenshot through a
//! one-shot headless Chrome session.
//!
//! # Features
//!
//! - **Tree transform**: Markdown headings and bullets fold into the node
//!   tree the mind-map renderer consumes
//! - **Two asset modes**: the page links d3 and the view library from a CDN,
//!   or embeds them for fully offline rendering
//! - **Scoped capture** (`capture` feature, default): one browser session per
//!   screenshot, torn down even on failure
//!
//! # Example
//!
//! ```no_run
//! use mindsnap::RenderRequest;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = RenderRequest {
//!     markdown: "# Plan\n\n## Phase 1\n\n- kickoff\n".to_string(),
//!     ..Default::default()
//! };
//! let response = mindsnap::execute(&request).await?;
//! println!("{} bytes of HTML", response.html.len());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod options;
pub mod template;
pub mod transform;

pub mod node;
pub use node::{render_page, RenderResponse, ScreenshotResult};

#[cfg(feature = "capture")]
pub mod capture;

#[cfg(feature = "capture")]
pub mod snapshot;

#[cfg(feature = "capture")]
pub use node::execute;
#[cfg(feature = "capture")]
pub use snapshot::{capture_page, Snapshotter};

pub use options::MarkmapOptions;
pub use template::build_page;
pub use transform::{transform, Frontmatter, MapNode, Transformed};

/// One render request: the Markdown input plus every knob the node exposes.
///
/// Field defaults mirror the node's parameter defaults; serialization uses
/// camelCase so requests round-trip with workflow payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderRequest {
    /// Markdown content to convert
    pub markdown: String,
    /// Title for the generated page
    pub title: String,
    /// Freeze branch colors at this depth (0 = no freeze)
    pub color_freeze_level: u32,
    /// Maximum node level expanded on first render (-1 = expand all)
    pub initial_expand_level: i32,
    /// Maximum node content width in pixels (0 = unlimited)
    pub max_width: u32,
    /// Whether zooming is enabled
    pub zoom: bool,
    /// Whether panning is enabled
    pub pan: bool,
    /// Name of the output field carrying the HTML
    pub output_field: String,
    /// Where the page sources its renderer scripts
    pub assets: AssetSource,
    /// Capture a screenshot of the rendered page when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<ScreenshotOptions>,
}

impl RenderRequest {
    pub const DEFAULT_TITLE: &'static str = "Markmap";
    pub const DEFAULT_OUTPUT_FIELD: &'static str = "html";
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            markdown: String::new(),
            title: Self::DEFAULT_TITLE.to_string(),
            color_freeze_level: 0,
            initial_expand_level: -1,
            max_width: 0,
            zoom: true,
            pan: true,
            output_field: Self::DEFAULT_OUTPUT_FIELD.to_string(),
            assets: AssetSource::default(),
            screenshot: None,
        }
    }
}

/// Where the generated page gets d3 and the mind-map view library from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum AssetSource {
    /// `<script src>` tags pointing at CDN bundles
    #[serde(rename_all = "camelCase")]
    Cdn { d3_url: String, markmap_url: String },
    /// Script text inlined into the page, so it renders without network access
    #[serde(rename_all = "camelCase")]
    Embedded { d3_js: String, markmap_js: String },
}

impl AssetSource {
    /// Embed `d3.min.js` and `markmap-view.min.js` read from a directory.
    pub fn embedded_from_dir(dir: &Path) -> Result<Self> {
        let read = |name: &str| -> Result<String> {
            let path = dir.join(name);
            std::fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("reading {}: {}", path.display(), e)))
        };
        Ok(Self::Embedded {
            d3_js: read("d3.min.js")?,
            markmap_js: read("markmap-view.min.js")?,
        })
    }
}

impl Default for AssetSource {
    fn default() -> Self {
        Self::Cdn {
            d3_url: template::D3_CDN_URL.to_string(),
            markmap_url: template::MARKMAP_VIEW_CDN_URL.to_string(),
        }
    }
}

/// Screenshot capture configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreenshotOptions {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// Fixed settle time after the render signal, for the entry animation
    pub wait_ms: u64,
    /// Capture the full document extent instead of the viewport
    pub full_page: bool,
    /// How long to wait for the page's render signal
    pub signal_timeout_ms: u64,
    /// Explicit Chrome/Chromium executable to launch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,
}

impl Default for ScreenshotOptions {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            wait_ms: 2000,
            full_page: false,
            signal_timeout_ms: 10_000,
            chrome_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request() {
        let request = RenderRequest::default();
        assert_eq!(request.title, "Markmap");
        assert_eq!(request.initial_expand_level, -1);
        assert!(request.zoom);
        assert!(request.pan);
        assert_eq!(request.output_field, "html");
        assert!(request.screenshot.is_none());
    }

    #[test]
    fn test_default_screenshot_options() {
        let options = ScreenshotOptions::default();
        assert_eq!(options.width, 1920);
        assert_eq!(options.height, 1080);
        assert_eq!(options.wait_ms, 2000);
        assert!(!options.full_page);
    }

    #[test]
    fn request_round_trips_as_camel_case_json() {
        let request = RenderRequest {
            markdown: "# T".to_string(),
            color_freeze_level: 2,
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["colorFreezeLevel"], 2);
        assert_eq!(json["outputField"], "html");
        assert_eq!(json["assets"]["source"], "cdn");
        let back: RenderRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn partial_request_json_fills_defaults() {
        let back: RenderRequest = serde_json::from_str(r##"{"markdown":"# T"}"##).unwrap();
        assert_eq!(back.markdown, "# T");
        assert_eq!(back.title, "Markmap");
        assert_eq!(back.initial_expand_level, -1);
    }
}
