use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use radiograph_annotate::app::AnnotateApp;
use radiograph_annotate::config::EditorConfig;
use radiograph_annotate::record::HistoryRecord;
use radiograph_annotate::save::JsonFileClient;
use radiograph_annotate::session::{ImageSource, Session};

#[derive(Parser)]
#[command(name = "radiograph-annotate", about = "Edit boxes and masks on a radiograph")]
struct Cli {
    /// Prediction record (JSON) to edit
    record: PathBuf,

    /// Radiograph image the record refers to
    image: PathBuf,

    /// Where to write the edited record [default: <record>.edited.json]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Editor settings (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn default_output(record: &Path) -> PathBuf {
    let stem = record
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("record");
    record.with_file_name(format!("{stem}.edited.json"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let record = HistoryRecord::load(&cli.record)
        .with_context(|| format!("failed to read record {}", cli.record.display()))?;
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    let client = Arc::new(JsonFileClient::new(
        cli.output.unwrap_or_else(|| default_output(&cli.record)),
    ));
    tracing::info!(
        record = %cli.record.display(),
        output = %client.path().display(),
        "opening editor"
    );

    let default_label = config.drawing.default_class_name.clone();
    let session = Session::open(record, ImageSource::Path(cli.image.clone()), config);

    let title = format!(
        "radiograph-annotate: {}",
        cli.image
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    );
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(AnnotateApp::new(session, client, default_label)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run eframe: {e}"))
}
