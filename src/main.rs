use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;

use scene_export::{
    ExportConfig, LogObserver, SceneExporter, load_scene_gltf, pipeline::VertexLayout, scene::Selection,
};

#[derive(Parser, Debug)]
#[command(name = "scene-export")]
#[command(about = "Exports a scene into model, mapping and material documents", version)]
struct Args {
    /// glTF scene to export (.gltf or .glb)
    scene: PathBuf,
    /// TOML file with export settings; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Name of the model in single-file mode
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    mesh_dir: Option<PathBuf>,
    #[arg(long)]
    material_dir: Option<PathBuf>,
    #[arg(long)]
    image_dir: Option<PathBuf>,
    /// Write each root object into its own model
    #[arg(long)]
    separate: bool,
    /// Export every object, not just the selected ones
    #[arg(long)]
    all: bool,
    /// Drop unused vertices instead of padding attribute arrays with nulls
    #[arg(long)]
    compact: bool,
    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn export_config(&self) -> anyhow::Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::from_toml_file(path)?,
            None => ExportConfig::default(),
        };
        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        if let Some(dir) = &self.mesh_dir {
            config.mesh_dir = dir.clone();
        }
        if let Some(dir) = &self.material_dir {
            config.material_dir = dir.clone();
        }
        if let Some(dir) = &self.image_dir {
            config.image_dir = dir.clone();
        }
        if self.separate {
            config.separate_hierarchies = true;
        }
        if self.all {
            config.selection = Selection::All;
        }
        if self.compact {
            config.vertex_layout = VertexLayout::Compact;
        }
        let base = self
            .scene
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(config.resolve(&base))
    }
}

fn run(args: &Args) -> anyhow::Result<bool> {
    let config = args.export_config()?;
    let scene = load_scene_gltf(&args.scene).with_context(|| format!("Failed to load {}", args.scene.display()))?;
    let report = SceneExporter::new(&config).with_observer(LogObserver).export(&scene)?;
    log::info!(
        "Exported {} hierarchy(ies), {} failed",
        report.exported.len(),
        report.failed.len()
    );
    for (name, err) in &report.failed {
        eprintln!("{}: {:#}", name, err);
    }
    Ok(report.is_success())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
