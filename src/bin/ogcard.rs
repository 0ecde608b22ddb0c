use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use sha2::Digest as _;

use ogcard::{
    CaptureBackend, CardNode, CardRenderer, CpuCapture, DirectorySink, ExportOutcome, Exporter,
    FontConfig, FontSet, FormInput, LogoFetcher, ServerConfig, SvgCapture,
    assets::logo::{DEFAULT_LOGO_MAX_BYTES, DEFAULT_LOGO_TIMEOUT},
    foundation::core::Canvas,
    parse_query,
};

#[derive(Parser, Debug)]
#[command(name = "ogcard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve `GET /api/og`.
    Serve(ServerConfig),
    /// Render one card from a query string to a PNG file.
    Render(RenderArgs),
    /// Print the computed layout for a query string as JSON.
    Layout(LayoutArgs),
    /// Run the form-to-download path: compose, capture and save a card.
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
struct FontArgs {
    /// Extra directory scanned for font files.
    #[arg(long, env = "OGCARD_FONT_DIR")]
    font_dir: Option<PathBuf>,

    /// Skip the host's system fonts.
    #[arg(long, env = "OGCARD_NO_SYSTEM_FONTS")]
    no_system_fonts: bool,
}

impl FontArgs {
    fn load(&self) -> Arc<FontSet> {
        Arc::new(FontSet::load(&FontConfig {
            font_dir: self.font_dir.clone(),
            system_fonts: !self.no_system_fonts,
        }))
    }
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Query string, e.g. `company=Acme&batch=Summer%202027`.
    #[arg(long, default_value = "")]
    query: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Query string.
    #[arg(long, default_value = "")]
    query: String,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Form answers as JSON; `logo_path` is resolved next to this file.
    #[arg(long)]
    form: PathBuf,

    /// Directory receiving the PNG.
    #[arg(long)]
    out_dir: PathBuf,

    /// Capture backend.
    #[arg(long, value_enum, default_value_t = BackendChoice::Svg)]
    backend: BackendChoice,

    /// Capture timeout in milliseconds.
    #[arg(long, env = "OGCARD_CAPTURE_TIMEOUT_MS", default_value_t = 10_000)]
    timeout_ms: u64,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Svg,
    Cpu,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(cfg) => actix_web::rt::System::new().block_on(ogcard::server::run(cfg)),
        Command::Render(args) => runtime()?.block_on(cmd_render(args)),
        Command::Layout(args) => cmd_layout(args),
        Command::Export(args) => runtime()?.block_on(cmd_export(args)),
    }
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let model = parse_query(&args.query);
    let fetcher = LogoFetcher::new(DEFAULT_LOGO_TIMEOUT, DEFAULT_LOGO_MAX_BYTES)?;
    let logo = fetcher.resolve(model.logo()).await;

    let renderer = CardRenderer::new(args.fonts.load());
    let png = renderer.render_png(&model, logo.as_ref())?;

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, &png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    println!("{} sha256={}", args.out.display(), sha256_hex(&png));
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let model = parse_query(&args.query);
    let layout = CardRenderer::new(args.fonts.load()).layout(&model);
    let json = serde_json::to_string_pretty(&layout).context("serialize layout")?;
    println!("{json}");
    Ok(())
}

async fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.form)
        .with_context(|| format!("read form '{}'", args.form.display()))?;
    let base_dir = args.form.parent().unwrap_or_else(|| Path::new("."));
    let model = FormInput::from_json(&text)?.into_form(base_dir)?.submit()?;

    let fonts = args.fonts.load();
    let mut node = CardNode::compose(model, Canvas::OG, &fonts);
    let fetcher = LogoFetcher::new(DEFAULT_LOGO_TIMEOUT, DEFAULT_LOGO_MAX_BYTES)?;
    node.load_logo(&fetcher).await;

    let backend: Arc<dyn CaptureBackend> = match args.backend {
        BackendChoice::Svg => Arc::new(SvgCapture::new(fonts)),
        BackendChoice::Cpu => Arc::new(CpuCapture::new(fonts)),
    };
    let exporter = Exporter::new(backend, Arc::new(DirectorySink::new(&args.out_dir)))
        .with_timeout(Duration::from_millis(args.timeout_ms));

    match exporter.export(&node).await {
        ExportOutcome::Saved { path, .. } => {
            println!("{}", path.display());
            Ok(())
        }
        ExportOutcome::Busy => anyhow::bail!("an export is already in progress"),
        ExportOutcome::Failed(reason) => anyhow::bail!("export failed: {reason}"),
    }
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
