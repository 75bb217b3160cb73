//! CLI binary for certscan.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ServiceConfig` and either serves HTTP or processes one local file.

use anyhow::{Context, Result};
use certscan::{server, AppState, DocumentProcessor, ServiceConfig};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve the upload page and API on 0.0.0.0:8000
  certscan serve

  # Serve on another port with uploads kept elsewhere
  certscan serve --port 9000 --upload-dir /var/lib/certscan/uploads

  # Run OCR + extraction on a local file and print the record
  certscan extract marksheet.pdf --pretty

  # Use an edgequake-llm provider instead of Groq
  OPENAI_API_KEY=sk-... certscan --provider openai --model gpt-4.1-mini serve

HTTP API:
  GET  /            landing page
  POST /upload/     multipart field "file" (png, jpg, jpeg, pdf) → record JSON
  POST /chatbot/    {"text": "..."} → {"response": "..."}
  GET  /static/*    files from --static-dir

ENVIRONMENT VARIABLES:
  GROQ_API_KEY            Groq API key (default provider)
  CERTSCAN_*              Every flag, e.g. CERTSCAN_PORT=9000
  RUST_LOG                Log filter, overrides --verbose

  A .env file in the working directory is loaded before flags are parsed.

SETUP:
  1. apt install tesseract-ocr libpdfium (or pass --pdfium-library)
  2. export GROQ_API_KEY=gsk_...
  3. certscan serve

  The ocrs models (~12 MB) are downloaded on first start into --model-dir.
"#;

/// Extract candidate records from scanned certificates and mark sheets.
#[derive(Parser, Debug)]
#[command(
    name = "certscan",
    version,
    about = "OCR uploaded certificates and extract the candidate record with an LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    llm: LlmArgs,

    #[command(flatten)]
    ocr: OcrArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "CERTSCAN_VERBOSE")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeArgs),
    /// Process one local file and print the record as JSON.
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Bind address.
    #[arg(long, env = "CERTSCAN_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Bind port.
    #[arg(short, long, env = "CERTSCAN_PORT", default_value_t = 8000)]
    port: u16,

    /// Directory uploads are written to.
    #[arg(long, env = "CERTSCAN_UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Directory served under /static.
    #[arg(long, env = "CERTSCAN_STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,

    /// Largest accepted request body, in MiB.
    #[arg(long, env = "CERTSCAN_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// png, jpg, jpeg or pdf file.
    file: PathBuf,

    /// Pretty-print the JSON record.
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct LlmArgs {
    /// LLM provider: groq (native) or any edgequake-llm provider (openai, anthropic, gemini, ollama).
    #[arg(long, global = true, env = "CERTSCAN_PROVIDER", default_value = "groq")]
    provider: String,

    /// Model for structured extraction.
    #[arg(long, global = true, env = "CERTSCAN_MODEL", default_value = certscan::config::DEFAULT_MODEL)]
    model: String,

    /// Model for the chat endpoint [default: same as --model].
    #[arg(long, global = true, env = "CERTSCAN_CHAT_MODEL")]
    chat_model: Option<String>,

    /// Sampling temperature for the chat endpoint (0.0–2.0).
    #[arg(long, global = true, env = "CERTSCAN_CHAT_TEMPERATURE", default_value_t = 0.7)]
    chat_temperature: f32,

    /// Max LLM output tokens per reply.
    #[arg(long, global = true, env = "CERTSCAN_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// Groq API root.
    #[arg(long, global = true, env = "CERTSCAN_BASE_URL", default_value = certscan::config::GROQ_BASE_URL)]
    base_url: String,

    /// Groq API key.
    #[arg(long, global = true, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Args, Debug)]
struct OcrArgs {
    /// Where the ocrs models are cached.
    #[arg(long, global = true, env = "CERTSCAN_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Tesseract language for PDF pages.
    #[arg(long, global = true, env = "CERTSCAN_TESSERACT_LANG", default_value = "eng")]
    tesseract_lang: String,

    /// Rendering DPI for PDF pages (72–600).
    #[arg(long, global = true, env = "CERTSCAN_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Explicit path to libpdfium.
    #[arg(long, global = true, env = "CERTSCAN_PDFIUM_LIBRARY")]
    pdfium_library: Option<PathBuf>,
}

fn build_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut builder = ServiceConfig::builder()
        .provider(&cli.llm.provider)
        .extraction_model(&cli.llm.model)
        .chat_model(cli.llm.chat_model.as_deref().unwrap_or(&cli.llm.model))
        .chat_temperature(cli.llm.chat_temperature)
        .max_tokens(cli.llm.max_tokens)
        .base_url(&cli.llm.base_url)
        .tesseract_language(&cli.ocr.tesseract_lang)
        .dpi(cli.ocr.dpi);

    let api_key = cli
        .llm
        .api_key
        .clone()
        .or_else(|| std::env::var("CERTSCAN_API_KEY").ok());
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref dir) = cli.ocr.model_dir {
        builder = builder.model_dir(dir);
    }
    if let Some(ref lib) = cli.ocr.pdfium_library {
        builder = builder.pdfium_library(lib);
    }
    if let Command::Serve(ref serve) = cli.command {
        builder = builder
            .host(&serve.host)
            .port(serve.port)
            .upload_dir(&serve.upload_dir)
            .static_dir(&serve.static_dir)
            .max_upload_bytes(serve.max_upload_mb.saturating_mul(1024 * 1024));
    }

    builder.build().context("Invalid configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine; a malformed one is not.
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e).context("Failed to load .env"),
    }

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let level = if cli.verbose { "debug" } else { "info" };
    // The Groq key is sent as a header, which the provider reports as "no API key".
    let filter = format!("{level},edgequake_llm::providers::openai_compatible=error");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    match cli.command {
        Command::Serve(_) => {
            let state = AppState::from_config(&config)
                .await
                .context("Failed to initialise OCR and LLM backends")?;
            server::serve(&config, state).await.context("Server failed")?;
        }
        Command::Extract(ref args) => {
            let start = Instant::now();
            let processor = DocumentProcessor::from_config(&config)
                .await
                .context("Failed to initialise OCR and LLM backends")?;
            let record = processor
                .process_path(&args.file)
                .await
                .with_context(|| format!("Failed to process {}", args.file.display()))?;

            let json = if args.pretty {
                serde_json::to_string_pretty(&record)
            } else {
                serde_json::to_string(&record)
            }
            .context("Failed to serialize record")?;
            println!("{}", json);

            eprintln!(
                "{} {}  {}",
                green("✔"),
                record.file_name,
                dim(&format!("{:.1}s", start.elapsed().as_secs_f64()))
            );
        }
    }

    Ok(())
}
