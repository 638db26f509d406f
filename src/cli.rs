use crate::config::{load_config, Config};
use crate::controller::DiagramController;
use crate::directive::RenderPass;
use crate::ir::InputDocument;
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{render_svg, write_output};
use crate::scene::Scene;
use crate::selection::InitialSelection;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "gtr", version, about = "Time-indexed group tree renderer")]
pub struct Args {
    /// Input file (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Date to show after the initial render
    #[arg(long = "date")]
    pub date: Option<String>,

    /// Edge attribute driving stroke width. Defaults to the first edge metadata key.
    #[arg(long = "edge-key")]
    pub edge_key: Option<String>,

    /// Node attribute shown under each node. Defaults to the first node metadata key.
    #[arg(long = "node-key")]
    pub node_key: Option<String>,

    /// Node id to collapse or expand, in order. May be repeated.
    #[arg(long = "toggle")]
    pub toggle: Vec<String>,

    /// Milliseconds to advance after the last pass; settles every transition if omitted
    #[arg(long = "frame-ms")]
    pub frame_ms: Option<f64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

#[derive(Debug, Serialize)]
struct PassDump<'a> {
    step: String,
    #[serde(flatten)]
    pass: &'a RenderPass,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let document = InputDocument::from_json(&input).context("Failed to parse group tree input")?;
    let initial = initial_selection(&document, &args);
    info!(
        runs = document.data.len(),
        edge_key = %initial.edge_key,
        node_key = %initial.node_key,
        "loaded group tree input"
    );

    let passes = replay(&document, initial, &args, &config)?;
    let mut scene = Scene::new();
    for (_, pass) in &passes {
        scene.apply_pass(pass);
    }
    match args.frame_ms {
        Some(ms) => scene.advance(ms),
        None => scene.settle(),
    }

    match args.output_format {
        OutputFormat::Json => {
            let dump: Vec<PassDump> = passes
                .iter()
                .map(|(step, pass)| PassDump {
                    step: step.clone(),
                    pass,
                })
                .collect();
            let json = serde_json::to_string_pretty(&dump)?;
            write_output(&json, args.output.as_deref())?;
        }
        OutputFormat::Svg => {
            let svg = render_svg(&scene, &config.theme, &config);
            write_output(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&render_svg(&scene, &config.theme, &config), &output, &config)?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // a second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn initial_selection(document: &InputDocument, args: &Args) -> InitialSelection {
    let edge_key = args
        .edge_key
        .clone()
        .or_else(|| document.edge_metadata_list.first().map(|m| m.key.clone()))
        .unwrap_or_default();
    let node_key = args
        .node_key
        .clone()
        .or_else(|| document.node_metadata_list.first().map(|m| m.key.clone()))
        .unwrap_or_default();
    let date = document.first_date().unwrap_or_default();
    InitialSelection::new(&edge_key, &node_key, date)
}

/// Runs the construction pass, the requested date change and each toggle in order.
fn replay(
    document: &InputDocument,
    initial: InitialSelection,
    args: &Args,
    config: &Config,
) -> Result<Vec<(String, RenderPass)>> {
    let (mut controller, first) = DiagramController::from_document(document, initial, config);
    let mut passes = vec![("initial".to_string(), first)];
    if let Some(date) = args.date.as_deref() {
        passes.push((format!("date {date}"), controller.set_date(date)?));
    }
    for node_id in &args.toggle {
        passes.push((format!("toggle {node_id}"), controller.toggle_branch(node_id)?));
    }
    Ok(passes)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    write_output_png(svg, output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = r#"{
        "data": [{
            "dates": ["2020-01-01", "2020-02-01"],
            "tree": {
                "node_label": "FIELD",
                "edge_label": "",
                "node_type": "Group",
                "node_data": {"pressure": [120, 118]},
                "edge_data": {},
                "children": [{
                    "node_label": "W1",
                    "edge_label": "BR-W1",
                    "node_type": "Well",
                    "node_data": {"pressure": [80, 79]},
                    "edge_data": {"oilrate": [100, 0]},
                    "children": []
                }]
            }
        }],
        "edge_metadata_list": [{"key": "oilrate", "label": "Oil Rate", "unit": "Sm3/day"}],
        "node_metadata_list": [{"key": "pressure", "label": "Pressure", "unit": "bar"}]
    }"#;

    #[test]
    fn defaults_to_first_metadata_keys_and_date() {
        let document = InputDocument::from_json(INPUT).unwrap();
        let args = Args::parse_from(["gtr"]);
        let initial = initial_selection(&document, &args);
        assert_eq!(initial, InitialSelection::new("oilrate", "pressure", "2020-01-01"));
    }

    #[test]
    fn replay_records_each_step() {
        let document = InputDocument::from_json(INPUT).unwrap();
        let args = Args::parse_from(["gtr", "--date", "2020-02-01", "--toggle", "FIELD"]);
        let initial = initial_selection(&document, &args);
        let passes = replay(&document, initial, &args, &Config::default()).unwrap();
        let steps: Vec<&str> = passes.iter().map(|(step, _)| step.as_str()).collect();
        assert_eq!(steps, ["initial", "date 2020-02-01", "toggle FIELD"]);
    }

    #[test]
    fn replay_rejects_unknown_date() {
        let document = InputDocument::from_json(INPUT).unwrap();
        let args = Args::parse_from(["gtr", "--date", "1999-01-01"]);
        let initial = initial_selection(&document, &args);
        let err = replay(&document, initial, &args, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("1999-01-01"));
    }
}
