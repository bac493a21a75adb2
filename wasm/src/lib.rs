use mission_graph::{Vec2, layout_json};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LayoutOptions {
    width: f32,
    height: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

fn parse_options(options_json: Option<String>) -> Result<LayoutOptions, String> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| error.to_string()),
        None => Ok(LayoutOptions::default()),
    }
}

fn layout_with_options(snapshot_json: &str, options: LayoutOptions) -> Result<String, String> {
    layout_json(snapshot_json, Vec2::new(options.width, options.height))
        .map_err(|error| format!("{error:#}"))
}

/// Lays out a snapshot and returns the placed scene as JSON.
#[wasm_bindgen]
pub fn layout(snapshot_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json).map_err(|error| JsValue::from_str(&error))?;
    layout_with_options(snapshot_json, options).map_err(|error| JsValue::from_str(&error))
}
