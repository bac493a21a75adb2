use crate::config::load_config;
use crate::ir::{GraphSnapshot, NodeKey};
use crate::layout_dump::{SceneDump, write_scene_dump};
use crate::view::GraphView;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "mgraph", version, about = "Lay out and inspect objective/outcome graphs")]
pub struct Args {
    /// Snapshot JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Viewport height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Toggle focus on a node after the first build, e.g. `objective:A`. Repeatable.
    #[arg(long = "focus", value_name = "KIND:ID")]
    pub focus: Vec<NodeKey>,

    /// What to write
    #[arg(short = 'f', long = "format", value_enum, default_value = "scene")]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Placed nodes, connections and viewport state
    Scene,
    /// The displayed snapshot with layers and rows filled in
    Snapshot,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.viewport.width = width;
    }
    if let Some(height) = args.height {
        config.viewport.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let snapshot = GraphSnapshot::from_json(&input).context("invalid snapshot")?;

    let mut view = GraphView::with_default_host(config);
    view.rebuild(snapshot, true, true);
    for key in &args.focus {
        if view.node(key).is_none() {
            anyhow::bail!("--focus {key}: no such node");
        }
        view.toggle_focus(key);
        info!(
            "focus {key}: active={}, nodes={}",
            view.focus().active,
            view.scene().nodes.len()
        );
    }
    view.frame();

    match (args.format, args.output.as_deref()) {
        (OutputFormat::Scene, Some(path)) => write_scene_dump(path, &view),
        (format, output) => write_output(&render(&view, format)?, output),
    }
}

/// Serializes the view in the requested format.
pub fn render(view: &GraphView, format: OutputFormat) -> Result<String> {
    let json = match format {
        OutputFormat::Scene => serde_json::to_string_pretty(&SceneDump::from_view(view))?,
        OutputFormat::Snapshot => view.displayed_snapshot().to_json_pretty()?,
    };
    Ok(json)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(json: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn focus_keys_parse() {
        let args = Args::try_parse_from([
            "mgraph",
            "-i",
            "graph.json",
            "--focus",
            "outcome:X",
            "--focus",
            "objective:A",
            "-f",
            "snapshot",
        ])
        .unwrap();
        assert_eq!(
            args.focus,
            vec![NodeKey::outcome("X"), NodeKey::objective("A")]
        );
        assert_eq!(args.format, OutputFormat::Snapshot);
        assert!(Args::try_parse_from(["mgraph", "--focus", "widget:A"]).is_err());
    }
}
