//! Workflow-node orchestration
//!
//! The request/response surface of the automation node: transform the
//! Markdown, resolve options, build the page, and capture a screenshot when
//! one was asked for.

#[cfg(feature = "capture")]
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::{options, template, transform, RenderRequest};

/// A captured screenshot, base64-encoded for transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotResult {
    pub data_base64: String,
    pub mime_type: String,
    /// Suggested file name (`markmap-<unix millis>.png`)
    pub file_name: String,
}

/// The node's output: the page HTML plus an optional screenshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    /// Field name the HTML should land under when merged into an item
    pub output_field: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<ScreenshotResult>,
}

impl RenderResponse {
    /// Merge the response into a workflow item's JSON fields: the HTML under
    /// `output_field`, and base64 screenshot fields alongside when present.
    pub fn merge_into(&self, item: &mut serde_json::Map<String, Value>) {
        item.insert(self.output_field.clone(), Value::String(self.html.clone()));
        if let Some(shot) = &self.screenshot {
            item.insert(
                "screenshotBase64".to_string(),
                Value::String(shot.data_base64.clone()),
            );
            item.insert(
                "screenshotMimeType".to_string(),
                Value::String(shot.mime_type.clone()),
            );
        }
    }
}

/// Build the mind-map page for a request without touching a browser.
///
/// A `title:` in the document front-matter is used when the request leaves
/// the title at its default.
pub fn render_page(request: &RenderRequest) -> Result<String> {
    let transformed = transform::transform(&request.markdown);
    let resolved = options::resolve(transformed.frontmatter.markmap.as_ref(), request);
    let title = match &transformed.frontmatter.title {
        Some(t) if request.title == RenderRequest::DEFAULT_TITLE => t.as_str(),
        _ => request.title.as_str(),
    };
    template::build_page(
        &transformed.root,
        &resolved,
        title,
        request.color_freeze_level,
        &request.assets,
    )
}

/// Execute one request end to end.
#[cfg(feature = "capture")]
pub async fn execute(request: &RenderRequest) -> Result<RenderResponse> {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

    let html = render_page(request)?;
    let screenshot = match &request.screenshot {
        Some(shot_options) => {
            let png = crate::snapshot::capture_page(&html, shot_options).await?;
            Some(ScreenshotResult {
                data_base64: BASE64.encode(&png),
                mime_type: "image/png".to_string(),
                file_name: format!("markmap-{}.png", unix_millis()),
            })
        }
        None => None,
    };

    Ok(RenderResponse {
        output_field: request.output_field.clone(),
        html,
        screenshot,
    })
}

#[cfg(feature = "capture")]
fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
