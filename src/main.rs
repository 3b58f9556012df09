mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use retouch_core::pipeline::{ColorRenderer, Pipeline};
use retouch_gpu::GpuColorRenderer;
use retouch_session::{Editor, EditorConfig, Session, export, load_decoded_image};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "retouch", version, about = "Replay an edit script on a photo")]
struct Args {
    /// Source image.
    input: PathBuf,

    /// Where to write the edited image; the extension picks the format.
    output: PathBuf,

    /// JSON array of edit steps.
    #[arg(long)]
    script: Option<PathBuf>,

    /// JSON editor configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run the color stage on the GPU, falling back to the CPU.
    #[arg(long)]
    gpu: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let steps = match &args.script {
        Some(path) => script::load(path)?,
        None => Vec::new(),
    };

    let source = load_decoded_image(&args.input)
        .await
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    let renderer = color_renderer(args.gpu).await;
    let mut session = Session::new(Editor::with_renderer(source, config, renderer)?);

    script::run(&mut session, &steps)?;
    let image = session.editor_mut().get_modified_file()?;
    export::save(&image, &args.output)?;

    let stats = session.editor().stats();
    info!(
        steps = steps.len(),
        color_runs = stats.color_runs,
        geometry_runs = stats.geometry_runs,
        fallbacks = stats.fallbacks,
        "done"
    );
    session.close();
    Ok(())
}

async fn color_renderer(gpu: bool) -> Box<dyn ColorRenderer> {
    if !gpu {
        return Box::new(Pipeline::new());
    }
    match GpuColorRenderer::new().await {
        Ok(renderer) => {
            info!(adapter = renderer.adapter_name(), "using gpu color renderer");
            Box::new(renderer)
        }
        Err(err) => {
            warn!(error = %err, "gpu unavailable, using cpu color renderer");
            Box::new(Pipeline::new())
        }
    }
}
