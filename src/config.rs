use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Fallback node size when the host does not measure nodes itself.
    pub node_width: f32,
    pub node_height: f32,
    pub node_padding_x: f32,
    pub node_padding_y: f32,
    /// Extra room past the last column/row of the content plane.
    pub content_slack: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 220.0,
            node_height: 64.0,
            node_padding_x: 12.0,
            node_padding_y: 8.0,
            content_slack: 16.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub zoom_speed: f32,
    /// Background grid cell size in content pixels.
    pub grid_cell_px: f32,
    pub canvas_scale_factor: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            min_scale: 0.3,
            max_scale: 3.0,
            zoom_speed: 0.1,
            grid_cell_px: 64.0 * 4.0,
            canvas_scale_factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutSection {
    node_width: Option<f32>,
    node_height: Option<f32>,
    node_padding_x: Option<f32>,
    node_padding_y: Option<f32>,
    content_slack: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewportSection {
    width: Option<f32>,
    height: Option<f32>,
    min_scale: Option<f32>,
    max_scale: Option<f32>,
    zoom_speed: Option<f32>,
    grid_cell_px: Option<f32>,
    canvas_scale_factor: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutSection>,
    viewport: Option<ViewportSection>,
}

/// Loads the config file at `path` over the defaults. The file is JSON5, so plain JSON
/// works too; absent fields keep their default.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_width {
            config.layout.node_width = v;
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = v;
        }
        if let Some(v) = layout.node_padding_x {
            config.layout.node_padding_x = v;
        }
        if let Some(v) = layout.node_padding_y {
            config.layout.node_padding_y = v;
        }
        if let Some(v) = layout.content_slack {
            config.layout.content_slack = v;
        }
    }

    if let Some(viewport) = parsed.viewport {
        if let Some(v) = viewport.width {
            config.viewport.width = v;
        }
        if let Some(v) = viewport.height {
            config.viewport.height = v;
        }
        if let Some(v) = viewport.min_scale {
            config.viewport.min_scale = v.max(0.01);
        }
        if let Some(v) = viewport.max_scale {
            config.viewport.max_scale = v.max(0.01);
        }
        if let Some(v) = viewport.zoom_speed {
            config.viewport.zoom_speed = v;
        }
        if let Some(v) = viewport.grid_cell_px {
            config.viewport.grid_cell_px = v;
        }
        if let Some(v) = viewport.canvas_scale_factor {
            config.viewport.canvas_scale_factor = v;
        }
    }

    if config.viewport.min_scale > config.viewport.max_scale {
        config.viewport.max_scale = config.viewport.min_scale;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = parse_config(
            r#"{
                // json5 comments are fine
                layout: { nodeWidth: 180 },
                viewport: { gridCellPx: 128, minScale: 5 },
            }"#,
        )
        .unwrap();
        assert_eq!(config.layout.node_width, 180.0);
        assert_eq!(config.layout.node_height, 64.0);
        assert_eq!(config.viewport.grid_cell_px, 128.0);
        assert_eq!(config.viewport.min_scale, 5.0);
        assert_eq!(config.viewport.max_scale, 5.0);
    }

    #[test]
    fn plain_json_is_accepted() {
        let config = parse_config(r#"{"viewport": {"width": 640, "height": 480}}"#).unwrap();
        assert_eq!(config.viewport.width, 640.0);
        assert_eq!(config.viewport.height, 480.0);
    }

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.viewport.grid_cell_px, 256.0);
    }
}
