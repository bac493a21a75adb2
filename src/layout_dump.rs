use crate::config::Config;
use crate::geometry::{ContentTransform, Rect, Vec2};
use crate::ir::{GraphSnapshot, NodeKind};
use crate::view::GraphView;
use crate::viewport::{GridPhase, UvRect};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDump {
    pub width: f32,
    pub height: f32,
    pub transform: ContentTransform,
    pub grid_phase: GridPhase,
    pub grid_uv: Option<UvRect>,
    pub focus_active: bool,
    pub focus_anchor: Option<String>,
    pub nodes: Vec<NodeDump>,
    pub connections: Vec<ConnectionDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub kind: NodeKind,
    pub id: String,
    pub layer: usize,
    pub row: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Viewport pixel rect under the current transform.
    pub screen: Rect,
    pub output_port: bool,
    pub highlighted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDump {
    pub from: String,
    pub to: String,
    pub points: Vec<[f32; 2]>,
    pub highlighted: bool,
}

fn point(v: Vec2) -> [f32; 2] {
    [v.x, v.y]
}

impl SceneDump {
    pub fn from_view(view: &GraphView) -> Self {
        let scene = view.scene();
        let transform = view.transform();
        let nodes = scene
            .nodes
            .iter()
            .map(|(id, node)| NodeDump {
                kind: node.kind(),
                id: node.key().id.clone(),
                layer: node.record.layer,
                row: node.record.row,
                x: node.rect.min.x,
                y: node.rect.min.y,
                width: node.rect.width(),
                height: node.rect.height(),
                screen: Rect::from_corners(
                    transform.pixel_of_local(node.rect.min),
                    transform.pixel_of_local(node.rect.max),
                ),
                output_port: node.output_port_visible,
                highlighted: scene.connections.is_node_highlighted(id),
            })
            .collect();

        let connections = scene
            .connections
            .iter()
            .filter_map(|conn| {
                let from = scene.nodes.get(conn.from)?;
                let to = scene.nodes.get(conn.to)?;
                Some(ConnectionDump {
                    from: from.key().to_string(),
                    to: to.key().to_string(),
                    points: vec![point(from.center()), point(to.center())],
                    highlighted: scene.connections.is_edge_highlighted(conn.id),
                })
            })
            .collect();

        let focus = view.focus();
        SceneDump {
            width: scene.content_size.x,
            height: scene.content_size.y,
            transform: *transform,
            grid_phase: view.grid_phase(),
            grid_uv: view.grid_uv(),
            focus_active: focus.active,
            focus_anchor: focus.anchor.as_ref().map(ToString::to_string),
            nodes,
            connections,
        }
    }
}

pub fn write_scene_dump(path: &Path, view: &GraphView) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = SceneDump::from_view(view);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

/// Lays out a snapshot with the default host and returns its scene dump as JSON.
pub fn layout_json(input: &str, viewport: Vec2) -> anyhow::Result<String> {
    let snapshot = GraphSnapshot::from_json(input)?;
    let mut config = Config::default();
    config.viewport.width = viewport.x;
    config.viewport.height = viewport.y;
    let mut view = GraphView::with_default_host(config);
    view.rebuild(snapshot, true, true);
    Ok(serde_json::to_string_pretty(&SceneDump::from_view(&view))?)
}
