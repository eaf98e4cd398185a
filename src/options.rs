//! Renderer option resolution
//!
//! Merges the document's front-matter `markmap:` options with user-supplied
//! overrides into the JSON options object the page script feeds to
//! `markmap.deriveOptions`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RenderRequest;

/// The JSON options object understood by the mind-map renderer.
///
/// Unknown front-matter keys are preserved through `extra` so documents can
/// use renderer options this struct does not name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkmapOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_freeze_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_expand_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing_horizontal: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing_vertical: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Resolve the final options object: front-matter first, overrides on top.
///
/// Override fields apply only when they differ from their "unset" sentinel
/// (-1 expand level, 0 max width, enabled zoom/pan). `color_freeze_level` is
/// deliberately absent here: the page script applies it after
/// `deriveOptions`, so it travels to the template separately.
pub fn resolve(frontmatter: Option<&Value>, overrides: &RenderRequest) -> MarkmapOptions {
    let mut options = match frontmatter {
        Some(v) => serde_json::from_value(v.clone()).unwrap_or_else(|_| {
            // Mis-typed front-matter still reaches the renderer untouched;
            // deriveOptions decides what to do with it.
            let mut fallback = MarkmapOptions::default();
            if let Value::Object(map) = v {
                fallback.extra = map.clone();
            }
            fallback
        }),
        None => MarkmapOptions::default(),
    };

    if overrides.initial_expand_level != -1 {
        options.initial_expand_level = Some(overrides.initial_expand_level);
    }
    if overrides.max_width > 0 {
        options.max_width = Some(overrides.max_width);
    }
    if !overrides.zoom {
        options.zoom = Some(false);
    }
    if !overrides.pan {
        options.pan = Some(false);
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_produce_empty_object() {
        let req = RenderRequest::default();
        let options = resolve(None, &req);
        assert_eq!(serde_json::to_value(&options).unwrap(), json!({}));
    }

    #[test]
    fn front_matter_options_pass_through() {
        let fm = json!({"maxWidth": 240, "spacingVertical": 10, "colorFreezeLevel": 2});
        let req = RenderRequest::default();
        let options = resolve(Some(&fm), &req);
        assert_eq!(options.max_width, Some(240));
        assert_eq!(options.spacing_vertical, Some(10));
        assert_eq!(options.color_freeze_level, Some(2));
    }

    #[test]
    fn overrides_apply_only_when_set() {
        let req = RenderRequest {
            initial_expand_level: 2,
            max_width: 300,
            zoom: false,
            ..Default::default()
        };
        let options = resolve(None, &req);
        assert_eq!(options.initial_expand_level, Some(2));
        assert_eq!(options.max_width, Some(300));
        assert_eq!(options.zoom, Some(false));
        // pan stays enabled, so it is omitted entirely
        assert_eq!(options.pan, None);
    }

    #[test]
    fn overrides_win_over_front_matter() {
        let fm = json!({"maxWidth": 240, "zoom": true});
        let req = RenderRequest {
            max_width: 500,
            zoom: false,
            ..Default::default()
        };
        let options = resolve(Some(&fm), &req);
        assert_eq!(options.max_width, Some(500));
        assert_eq!(options.zoom, Some(false));
    }

    #[test]
    fn sentinel_values_leave_front_matter_untouched() {
        let fm = json!({"initialExpandLevel": 3, "maxWidth": 120});
        let req = RenderRequest::default(); // -1 / 0 / true / true
        let options = resolve(Some(&fm), &req);
        assert_eq!(options.initial_expand_level, Some(3));
        assert_eq!(options.max_width, Some(120));
    }

    #[test]
    fn unknown_front_matter_keys_are_preserved() {
        let fm = json!({"autoFit": true, "maxWidth": 100});
        let options = resolve(Some(&fm), &RenderRequest::default());
        let out = serde_json::to_value(&options).unwrap();
        assert_eq!(out["autoFit"], true);
        assert_eq!(out["maxWidth"], 100);
    }
}
