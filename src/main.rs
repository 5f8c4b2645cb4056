//! Light-field study replay - entry point.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Replay a recorded light-field study session from a JSONL event script.
#[derive(Parser, Debug)]
#[command(name = "lfstudy")]
#[command(version)]
#[command(about = "Headless replay driver for light-field perceptual study sessions")]
pub struct Args {
    /// Path to the JSONL event script
    pub script: PathBuf,

    /// Directory holding <scene>_depth.png depth maps
    #[arg(long)]
    pub scenes: PathBuf,

    /// Directory the session logs are written to
    #[arg(long, default_value = "logs")]
    pub out: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Echo every rendered image path to stdout
    #[arg(long)]
    pub print_renders: bool,

    /// Path for diagnostic (tracing) output (defaults to the platform state dir)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let diagnostics = lfstudy::logging::init(args.log_file.clone())?;

    let study_file = lfstudy::config::load_study_file_with_precedence(args.config.clone())?;
    let config = lfstudy::config::merge_study_file(study_file);
    config.validate()?;

    info!(script = %args.script.display(), "replaying study session");

    let script = std::fs::read_to_string(&args.script)?;
    let events = lfstudy::replay::parse_script(&script)?;

    let summary = lfstudy::replay::run_script(
        &events,
        &config,
        lfstudy::replay::TraceSink::new(args.print_renders),
        lfstudy::depth::FsDepthMaps::new(&args.scenes),
        &args.out,
        chrono::Utc::now(),
    )?;

    info!(
        answers = summary.answers_recorded,
        completed = summary.completed,
        dropped = summary.dropped_log_lines,
        "replay finished"
    );
    eprintln!(
        "Recorded {} answer(s), session {}. Logs: {} / {} (diagnostics: {})",
        summary.answers_recorded,
        if summary.completed {
            "complete"
        } else {
            "incomplete"
        },
        summary.tracking_path.display(),
        summary.answers_path.display(),
        diagnostics.display(),
    );
    if summary.dropped_log_lines > 0 {
        eprintln!(
            "Warning: {} log line(s) were dropped due to write failures",
            summary.dropped_log_lines
        );
    }

    Ok(())
}
