use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use fenwatch::config::{self, RenderConfig};
use fenwatch::render::{self, RenderMode};
use fenwatch::pipeline::PipelineSummary;
use fenwatch::{DEFAULT_FEED_URL, PipelineError, Validation, pipeline};
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let matches = Command::new("fenwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Follows a live chess TV feed and renders the current position")
        .arg(
            Arg::new("render")
                .long("render")
                .value_name("MODE")
                .help("Where boards go: text (stdout) or image (PNG file)")
                .default_value("text")
                .value_parser(["text", "image"]),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("JSON render config (square size, colors, asset dir, output path)"),
        )
        .arg(
            Arg::new("feed-url")
                .long("feed-url")
                .value_name("URL")
                .help("Newline-delimited JSON feed to follow")
                .default_value(DEFAULT_FEED_URL),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Reject positions that do not parse as complete FEN")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    // Logs go to stderr so text boards on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mode: RenderMode = matches
        .get_one::<String>("render")
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or_default();
    let render_config = match matches.get_one::<String>("config") {
        Some(path) => config::load_config(Path::new(path))?,
        None => RenderConfig::default(),
    };
    let url = matches
        .get_one::<String>("feed-url")
        .map(String::as_str)
        .unwrap_or(DEFAULT_FEED_URL);
    let validation = if matches.get_flag("strict") {
        Validation::Strict
    } else {
        Validation::Lenient
    };

    info!(%url, %mode, %validation, "fenwatch starting");

    let renderer = render::build_renderer(mode, render_config);
    let summary = finish(pipeline::run(url, renderer, validation).await)?;

    info!(
        forwarded = summary.feed.forwarded,
        skipped = summary.feed.skipped,
        rendered = summary.rendered,
        "Feed finished"
    );
    Ok(())
}

/// Logs a failed run before it leaves `main`, which then exits non-zero.
fn finish(result: Result<PipelineSummary, PipelineError>) -> Result<PipelineSummary> {
    result
        .inspect_err(|e| error!(error = %e, "Feed pipeline failed"))
        .context("Feed pipeline failed")
}
