//! apiforge: design a REST API with a team of AI agents.
//!
//! Interviews you about the API you want, then writes to the output
//! directory:
//!
//!   api_requirements.json       requirements document
//!   api_architecture.json       architecture document
//!   api_endpoints.json          endpoint designs
//!   openapi_specification.json  OpenAPI 3.0 specification
//!   api_documentation.md        markdown documentation
//!
//! Requires OPENAI_API_KEY environment variable.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use apiforge::config::{API_KEY_ENV, Config};
use apiforge::console::Terminal;
use apiforge::driver::Driver;
use apiforge::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Parser)]
#[command(name = "apiforge", about = "Interactive multi-agent REST API designer")]
struct Args {
    /// API key (or set OPENAI_API_KEY env var)
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Model to use for every agent
    #[arg(long, env = "APIFORGE_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory the artifacts are written into
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Max tokens per model reply
    #[arg(long, default_value_t = 4096)]
    max_tokens: u32,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apiforge=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e
                .downcast_ref::<apiforge::Error>()
                .map(apiforge::Error::exit_code)
                .unwrap_or(1);
            eprintln!("error: {e:#}");
            ExitCode::from(code as u8)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::from_parts(
        args.api_key,
        &args.model,
        &args.base_url,
        args.output_dir,
        args.max_tokens,
        args.timeout_secs,
    )?;

    tracing::info!(
        model = %config.model,
        base_url = %config.base_url,
        output_dir = %config.output_dir.display(),
        "Starting apiforge"
    );

    let mut driver = Driver::from_config(config)?;
    let mut console = Terminal::new();
    let report = driver.run(&mut console).await?;

    tracing::info!(
        session = %report.session_id,
        files = report.written.len(),
        elapsed_secs = (report.finished_at - report.started_at).num_seconds(),
        "Run finished"
    );
    Ok(())
}
