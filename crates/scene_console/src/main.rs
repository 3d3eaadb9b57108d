//! # scene-console
//!
//! Loads an optional scene document, runs console commands against it and
//! optionally writes the scene back out.
//!
//! Commands come from the trailing arguments, one command per argument, or,
//! when there are none, from stdin one per line.

mod commands;

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use scene_component::AttributeChange;
use scene_manager::{Scene, SceneConfig};
use tracing::info;

use commands::{CommandResult, Console, DocumentFormat};

#[derive(Parser)]
#[command(name = "scene-console", about = "Inspect and edit entity-component scenes")]
struct Args {
    /// Scene document (XML) to load before running commands
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Write the scene to this file after running commands
    #[arg(long)]
    save: Option<PathBuf>,

    /// Render documents as JSON instead of XML
    #[arg(long)]
    json: bool,

    /// Commands to run, e.g. "EditDynComp(1, add, EC_DynamicComponent, speed, real, 2)"
    commands: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut scene = Scene::new(SceneConfig::default());
    if let Some(path) = &args.scene {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        let report = scene
            .load_xml(&text, AttributeChange::LocalOnly)
            .with_context(|| format!("loading scene {}", path.display()))?;
        info!(
            path = %path.display(),
            created = report.entities_created,
            skipped = report.skipped_components.len(),
            "scene loaded"
        );
    }

    let format = if args.json {
        DocumentFormat::Json
    } else {
        DocumentFormat::Xml
    };
    let mut console = Console::new(scene, format);

    if args.commands.is_empty() {
        for line in io::stdin().lock().lines() {
            run(&mut console, &line.context("reading stdin")?);
        }
    } else {
        for line in &args.commands {
            run(&mut console, line);
        }
    }

    if let Some(path) = &args.save {
        let text = console.render_scene()?;
        std::fs::write(path, text).with_context(|| format!("writing scene {}", path.display()))?;
        info!(path = %path.display(), "scene saved");
    }

    Ok(())
}

fn run(console: &mut Console, line: &str) {
    match console.execute(line) {
        CommandResult::Success(Some(output)) => println!("{output}"),
        CommandResult::Success(None) => {}
        CommandResult::Failure(message) => eprintln!("error: {message}"),
    }
}
