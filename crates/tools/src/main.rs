use std::fs;
use std::io::Read;
use std::path::PathBuf;

use catalog::Catalog;
use clap::Parser;
use scene::ViewSync;
use scene::config::EngineConfig;
use scene::renderer::RecordingRenderer;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Replays a map browsing session against the view-sync engine and prints
/// the resulting renderer commands as JSON lines.
#[derive(Debug, Parser)]
#[command(name = "tour", version)]
struct Args {
    /// Session script; read from stdin when omitted.
    script: Option<PathBuf>,

    /// Catalog JSON (array of points). Defaults to the built-in Kyoto catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Engine config JSON. Missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Renderer reports animation completion (enables `settle`).
    #[arg(long)]
    completion: bool,

    /// Print engine counters after the session.
    #[arg(long)]
    metrics: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
            Catalog::from_json_str(&raw).map_err(|e| format!("{path:?}: {e}"))?
        }
        None => Catalog::builtin().map_err(|e| e.to_string())?,
    };

    let config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
            EngineConfig::from_json_str(&raw).map_err(|e| format!("{path:?}: {e}"))?
        }
        None => EngineConfig::default(),
    };

    let script = match &args.script {
        Some(path) => fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("read stdin: {e}"))?;
            buf
        }
    };
    let steps = tools::parse_script(&script).map_err(|e| e.to_string())?;

    let renderer = if args.completion {
        RecordingRenderer::with_completion()
    } else {
        RecordingRenderer::new()
    };
    let mut engine = ViewSync::new(catalog, config, renderer).map_err(|e| e.to_string())?;

    info!(steps = steps.len(), "replaying session");
    engine.start();
    let initial = engine.renderer_mut().drain();
    let events: Vec<String> = engine
        .drain_events()
        .into_iter()
        .map(|ev| format!("{}: {}", ev.kind, ev.message))
        .collect();
    println!(
        "{}",
        serde_json::json!({ "at": 0.0, "step": "start", "commands": initial, "events": events })
    );

    for report in tools::run(&mut engine, &steps) {
        let line = serde_json::to_string(&report).map_err(|e| format!("json: {e}"))?;
        println!("{line}");
    }

    if args.metrics {
        let snap = engine.metrics().snapshot();
        let counters: serde_json::Map<String, serde_json::Value> = snap
            .counters
            .into_iter()
            .map(|(k, v)| (k, v.into()))
            .collect();
        println!("{}", serde_json::json!({ "metrics": counters }));
    }
    Ok(())
}
