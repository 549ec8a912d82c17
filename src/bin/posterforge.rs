use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use posterforge::provider::{DirFontProvider, StaticFontProvider};
use posterforge::state::poster::ExportFormat;
use posterforge::style::definition::Feature;
use posterforge::{
    EngineConfig, ExportEngine, ExportOptions, FeatureToggleSet, FeatureToggles, FontProvider,
    FontSet, ProviderConfig, StyleRegistry, Watermark,
};

#[derive(Parser, Debug)]
#[command(name = "posterforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered map styles and their default feature toggles.
    Styles,
    /// Export a poster snapshot to PNG, JPEG, or PDF.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Poster state JSON (any supported version).
    #[arg(long)]
    state: PathBuf,

    /// Output file or directory. Defaults to a name derived from the city and date.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Engine config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// GeoJSON features for the vector map provider.
    #[arg(long, conflicts_with = "tiles")]
    features: Option<PathBuf>,

    /// Directory of `{z}/{x}/{y}.png` raster tiles.
    #[arg(long)]
    tiles: Option<PathBuf>,

    /// Directory of `.ttf`/`.otf` files named after their family.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Override the format stored in the poster state.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Overlay a tiled watermark with this text.
    #[arg(long)]
    watermark: Option<String>,

    /// Date used in the default file name (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<chrono::NaiveDate>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpg,
    Pdf,
}

impl From<FormatChoice> for ExportFormat {
    fn from(value: FormatChoice) -> Self {
        match value {
            FormatChoice::Png => ExportFormat::Png,
            FormatChoice::Jpg => ExportFormat::Jpg,
            FormatChoice::Pdf => ExportFormat::Pdf,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Styles => cmd_styles(),
        Command::Export(args) => {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("start async runtime")?;
            rt.block_on(cmd_export(args))
        }
    }
}

fn cmd_styles() -> anyhow::Result<()> {
    for def in StyleRegistry::builtin().iter() {
        let toggles = FeatureToggleSet::merged(&FeatureToggles::default(), &def.toggles);
        let on: Vec<&str> = Feature::ALL
            .into_iter()
            .filter(|f| toggles.get(*f))
            .map(Feature::key)
            .collect();
        let filter = def
            .filter
            .map(|f| format!(" filter={f:?}"))
            .unwrap_or_default();
        println!("{:<14} {:<20} [{}]{filter}", def.id, def.name, on.join(","));
    }
    Ok(())
}

async fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.state)
        .with_context(|| format!("read poster state '{}'", args.state.display()))?;
    let mut state = posterforge::state::from_json(&json)
        .with_context(|| format!("parse poster state '{}'", args.state.display()))?;
    if let Some(format) = args.format {
        state.export.format = format.into();
    }

    let config = match &args.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    }
    .with_env_overrides(|k| std::env::var(k).ok())?;

    let fonts: Arc<dyn FontProvider> = match &args.fonts {
        Some(dir) => Arc::new(DirFontProvider::new(dir)),
        None => Arc::new(StaticFontProvider::new(FontSet::new())),
    };

    let provider_cfg = match (&args.features, &args.tiles) {
        (Some(features), _) => ProviderConfig::Vector {
            features: features.clone(),
        },
        (None, Some(dir)) => ProviderConfig::Tiles {
            dir: Some(dir.clone()),
            url: None,
            api_key: None,
        },
        (None, None) => config.provider.clone().context(
            "no map provider: pass --features or --tiles, or set `provider` in the config",
        )?,
    };
    let label_fonts = fonts
        .ensure_loaded(&[state.text.typography.body_font.clone()])
        .await;
    let map = provider_cfg.build(config.retry, label_fonts).await?;

    let options = ExportOptions {
        watermark: args.watermark.map(|text| Watermark {
            text,
            ..Watermark::default()
        }),
    };

    let engine = ExportEngine::new(config, map, fonts);
    let report = engine.export(&state, &options).await?;
    for d in &report.degraded {
        eprintln!("warning: exported without {}: {}", d.asset, d.reason);
    }

    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let file_name = posterforge::export_file_name(&state, date, state.export.format);
    let out = resolve_out_path(args.out.as_deref(), &file_name);
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, &report.asset.bytes)
        .with_context(|| format!("write '{}'", out.display()))?;

    eprintln!(
        "wrote {} ({}x{}, {})",
        out.display(),
        report.asset.width,
        report.asset.height,
        report.asset.mime_type
    );
    Ok(())
}

fn resolve_out_path(out: Option<&Path>, file_name: &str) -> PathBuf {
    match out {
        Some(p) if p.is_dir() => p.join(file_name),
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}
