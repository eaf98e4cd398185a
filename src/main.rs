use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use mindsnap::{AssetSource, RenderRequest};

#[derive(Parser)]
#[command(
    name = "mindsnap",
    version,
    about = "Convert Markdown into an interactive mind-map HTML page, optionally captured as PNG"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the mind-map HTML page
    Render(RenderArgs),
    /// Build the page and capture a PNG screenshot of it
    #[cfg(feature = "capture")]
    Snapshot(SnapshotArgs),
}

#[derive(Args)]
struct PageArgs {
    /// Input Markdown file, or `-` for stdin
    input: PathBuf,

    /// Title for the generated page
    #[arg(long)]
    title: Option<String>,

    /// Freeze branch colors at this depth (0 disables)
    #[arg(long, default_value_t = 0)]
    color_freeze_level: u32,

    /// Maximum node level expanded on first render (-1 expands all)
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    initial_expand_level: i32,

    /// Maximum node content width in pixels (0 is unlimited)
    #[arg(long, default_value_t = 0)]
    max_width: u32,

    /// Disable zooming on the map
    #[arg(long)]
    no_zoom: bool,

    /// Disable panning on the map
    #[arg(long)]
    no_pan: bool,

    /// Embed renderer scripts into the page instead of linking a CDN
    #[arg(long, requires = "assets_dir")]
    offline: bool,

    /// Directory holding d3.min.js and markmap-view.min.js for --offline
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Override the d3 CDN URL
    #[arg(long)]
    d3_url: Option<String>,

    /// Override the markmap-view CDN URL
    #[arg(long)]
    markmap_url: Option<String>,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    page: PageArgs,

    /// Output HTML file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[cfg(feature = "capture")]
#[derive(Args)]
struct SnapshotArgs {
    #[command(flatten)]
    page: PageArgs,

    /// Output PNG file
    #[arg(short, long)]
    output: PathBuf,

    /// Also write the generated HTML page to this path
    #[arg(long)]
    html_out: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Settle time after the map renders, in milliseconds
    #[arg(long, default_value_t = 2000)]
    wait_ms: u64,

    /// Capture the full document extent instead of the viewport
    #[arg(long)]
    full_page: bool,

    /// Chrome/Chromium executable to launch
    #[arg(long)]
    chrome: Option<PathBuf>,
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading Markdown from stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn build_request(page: &PageArgs) -> anyhow::Result<RenderRequest> {
    let markdown = read_input(&page.input)?;

    let assets = if page.offline {
        // `requires` guarantees the directory is present.
        let dir = page.assets_dir.as_deref().unwrap_or(Path::new("."));
        AssetSource::embedded_from_dir(dir)?
    } else {
        let AssetSource::Cdn {
            d3_url,
            markmap_url,
        } = AssetSource::default()
        else {
            unreachable!("default asset source is the CDN variant");
        };
        AssetSource::Cdn {
            d3_url: page.d3_url.clone().unwrap_or(d3_url),
            markmap_url: page.markmap_url.clone().unwrap_or(markmap_url),
        }
    };

    Ok(RenderRequest {
        markdown,
        title: page
            .title
            .clone()
            .unwrap_or_else(|| RenderRequest::DEFAULT_TITLE.to_string()),
        color_freeze_level: page.color_freeze_level,
        initial_expand_level: page.initial_expand_level,
        max_width: page.max_width,
        zoom: !page.no_zoom,
        pan: !page.no_pan,
        assets,
        ..Default::default()
    })
}

fn write_html(html: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, html).with_context(|| format!("writing {}", path.display()))?
        }
        None => io::stdout()
            .write_all(html.as_bytes())
            .context("writing HTML to stdout")?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => {
            let request = build_request(&args.page)?;
            let html = mindsnap::render_page(&request)?;
            write_html(&html, args.output.as_deref())?;
        }
        #[cfg(feature = "capture")]
        Command::Snapshot(args) => {
            let request = build_request(&args.page)?;
            let html = mindsnap::render_page(&request)?;
            if let Some(path) = &args.html_out {
                write_html(&html, Some(path))?;
            }

            let shot_options = mindsnap::ScreenshotOptions {
                width: args.width,
                height: args.height,
                wait_ms: args.wait_ms,
                full_page: args.full_page,
                chrome_path: args.chrome.clone(),
                ..Default::default()
            };
            let png = mindsnap::capture_page(&html, &shot_options).await?;
            fs::write(&args.output, &png)
                .with_context(|| format!("writing {}", args.output.display()))?;
            eprintln!(
                "wrote {} ({} bytes)",
                args.output.display(),
                png.len()
            );
        }
    }

    Ok(())
}
