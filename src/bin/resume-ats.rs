//! CLI binary for resume-ats.
//!
//! `serve` starts the web form; `analyze` and `match` run one action from
//! the terminal. All three share the same configuration flags.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use resume_ats::server::{self, ServerConfig};
use resume_ats::{
    AtsConfig, AtsError, Backend, InteractionController, PdfiumRasterizer, PromptKind,
    UploadedResume,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the web form on http://127.0.0.1:8501
  resume-ats serve

  # Critique a résumé against a job description
  resume-ats analyze --resume cv.pdf --job "Looking for a Python Developer"

  # Match percentage, job description from a file, JSON output
  resume-ats match --resume cv.pdf --job-file posting.txt --json

  # Use another vision provider through edgequake-llm
  resume-ats --provider openai --model gpt-4.1-mini analyze --resume cv.pdf --job-file posting.txt

ENVIRONMENT VARIABLES:
  GOOGLE_API_KEY          Gemini API key (required for the default provider)
  GEMINI_API_KEY          Fallback for GOOGLE_API_KEY
  RESUME_ATS_PROVIDER     gemini (default), openai, anthropic, ollama, …
  RESUME_ATS_MODEL        Model ID (default: gemini-1.5-flash)
  RESUME_ATS_API_BASE     Gemini API base URL
  PDFIUM_LIB_PATH         Directory containing libpdfium
  RUST_LOG                Log filter, overrides --verbose/--quiet

A .env file in the working directory is loaded before reading these.
"#;

/// Review a résumé PDF against a job description with a vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "resume-ats",
    version,
    about = "Review a résumé PDF against a job description with a vision LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Model ID (default: gemini-1.5-flash).
    #[arg(long, global = true, env = "RESUME_ATS_MODEL")]
    model: Option<String>,

    /// Provider: gemini, openai, anthropic, ollama, …
    #[arg(long, global = true, env = "RESUME_ATS_PROVIDER")]
    provider: Option<String>,

    /// Longest edge of the rendered first page, in pixels.
    #[arg(long, global = true, env = "RESUME_ATS_MAX_PIXELS")]
    max_pixels: Option<u32>,

    /// JPEG quality sent to the model (1–100).
    #[arg(long, global = true, env = "RESUME_ATS_JPEG_QUALITY",
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: Option<u8>,

    /// Model call timeout in seconds.
    #[arg(long, global = true, env = "RESUME_ATS_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "RESUME_ATS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, global = true, env = "RESUME_ATS_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the upload form over HTTP.
    Serve {
        #[arg(long, env = "RESUME_ATS_HOST", default_value = "127.0.0.1")]
        host: String,
        #[arg(long, env = "RESUME_ATS_PORT", default_value_t = 8501)]
        port: u16,
    },
    /// Critique the résumé against the job description.
    Analyze(ActionArgs),
    /// Match percentage, missing keywords and final thoughts.
    Match(ActionArgs),
}

#[derive(Args, Debug)]
struct ActionArgs {
    /// Résumé PDF. Only the first page is read.
    #[arg(short, long)]
    resume: Option<PathBuf>,

    /// Job description text.
    #[arg(short, long, conflicts_with = "job_file")]
    job: Option<String>,

    /// Read the job description from this file.
    #[arg(long)]
    job_file: Option<PathBuf>,

    /// Print the full result as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Configuration (fatal when the credential is missing) ─────────────
    let config = build_config(&cli).context("Startup failed")?;
    let controller =
        Arc::new(InteractionController::from_config(&config).context("Startup failed")?);

    match cli.command {
        Command::Serve { ref host, port } => {
            if let Err(e) = PdfiumRasterizer::new(&config).probe() {
                warn!("{}", e);
            }
            let server_config = ServerConfig {
                host: host.clone(),
                port,
            };
            server::run(server_config, controller)
                .await
                .context("Server stopped")?;
        }
        Command::Analyze(ref args) => run_action(&cli, &controller, PromptKind::Critique, args).await?,
        Command::Match(ref args) => run_action(&cli, &controller, PromptKind::Match, args).await?,
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<AtsConfig, AtsError> {
    let mut builder = AtsConfig::builder_from_env();
    if let Some(ref provider) = cli.provider {
        builder = builder.backend(Backend::from_name(provider));
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.as_str());
    }
    if let Some(px) = cli.max_pixels {
        builder = builder.max_rendered_pixels(px);
    }
    if let Some(q) = cli.jpeg_quality {
        builder = builder.jpeg_quality(q);
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    builder.build()
}

async fn run_action(
    cli: &Cli,
    controller: &InteractionController,
    kind: PromptKind,
    args: &ActionArgs,
) -> Result<()> {
    let resume = match args.resume {
        Some(ref path) => Some(
            UploadedResume::from_path(path)
                .await
                .with_context(|| format!("Cannot read résumé {}", path.display()))?,
        ),
        None => None,
    };

    let job_description = match (&args.job, &args.job_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot read job description {}", path.display()))?,
        (None, None) => String::new(),
    };

    let spinner = (!cli.quiet && !args.json).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(kind.progress_message());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let result = controller.run(kind, resume, &job_description).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{} {}", red("✘"), e);
            std::process::exit(1);
        }
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize result")?
        );
        return Ok(());
    }

    if !cli.quiet {
        eprintln!(
            "{} {}  {}",
            green("✔"),
            kind.success_message(),
            format_args!("{}ms via {}/{}", output.stats.total_ms, output.provider, output.model)
        );
        println!("{}\n", bold(kind.result_heading()));
    }
    println!("{}", output.text);
    Ok(())
}
