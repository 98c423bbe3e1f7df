use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use slidereel::{
    CaptureCapabilities, CompositorStyle, FfmpegCapabilities, Fps, HostServices, RenderConfig,
    SlideshowEngine, Storyboard, Surface, select_format,
};

#[derive(Parser, Debug)]
#[command(name = "slidereel", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the storyboard to a video file (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Still(StillArgs),
    /// Report capture support and the output format that would be used.
    Caps,
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Storyboard JSON (array of scenes, or `{ "scenes": [...] }`).
    #[arg(long)]
    storyboard: PathBuf,

    /// Output width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Font file for titles and captions. Text is skipped without one.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output path. Defaults to `slideshow.<ext>` for the selected format.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Capture frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Draw on a virtual clock instead of waiting for real time.
    #[arg(long, default_value_t = false)]
    offline: bool,
}

#[derive(Args, Debug)]
struct StillArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Timeline position in seconds.
    #[arg(long)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Still(args) => cmd_still(args),
        Command::Caps => cmd_caps(),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_engine(scene: &SceneArgs, fps: u32, host: HostServices) -> anyhow::Result<SlideshowEngine> {
    let storyboard = Storyboard::from_path(&scene.storyboard)?;
    let config = RenderConfig {
        width: scene.width,
        height: scene.height,
        fps: Fps::new(fps, 1)?,
        total_duration: None,
    };
    let style = CompositorStyle {
        font_path: scene.font.clone(),
        ..CompositorStyle::default()
    };
    let engine = SlideshowEngine::new(storyboard, config, style, host)?;
    engine.mount_surface(Surface::new(config.canvas())?)?;
    Ok(engine)
}

fn assets_root(storyboard: &Path) -> &Path {
    storyboard.parent().unwrap_or_else(|| Path::new("."))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut host = HostServices::system(assets_root(&args.scene.storyboard));
    if args.offline {
        host = host.with_stepped_pacer(60.0);
    }
    let engine = build_engine(&args.scene, args.fps, host)?;
    if !engine.capture_supported() {
        anyhow::bail!("video capture is unavailable: install ffmpeg and make sure it is on PATH");
    }

    let artifact = engine.render()?;
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(format!("slideshow.{}", artifact.extension())));
    if out.extension().and_then(|e| e.to_str()) != Some(artifact.extension()) {
        tracing::warn!(
            path = %out.display(),
            mime = artifact.mime_type(),
            "output extension does not match the encoded format"
        );
    }
    artifact.write_to(&out)?;

    eprintln!(
        "wrote {} ({} bytes, {})",
        out.display(),
        artifact.len(),
        artifact.mime_type()
    );
    Ok(())
}

fn cmd_still(args: StillArgs) -> anyhow::Result<()> {
    let host = HostServices::system(assets_root(&args.scene.storyboard));
    let engine = build_engine(&args.scene, 30, host)?;
    let frame = engine.render_still(args.at)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    // Composed frames are flattened to opaque, so premultiplied bytes equal straight ones.
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_caps() -> anyhow::Result<()> {
    let caps = FfmpegCapabilities::probe();
    if !caps.capture_supported() {
        println!("capture: unsupported (ffmpeg not found)");
        return Ok(());
    }
    println!("capture: supported");
    println!("format: {}", select_format(&caps));
    Ok(())
}
