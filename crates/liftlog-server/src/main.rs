//! Liftlog Server CLI
//!
//! Starts the HTTP server that turns workout notes into structured sets.

use liftlog_server::{config::ServerConfig, start_server, ServerError};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let mut config = match args.get(1).map(String::as_str) {
        None => ServerConfig::default(),
        Some("--help") => {
            print_help();
            process::exit(0);
        }
        Some("--config") => match args.get(2) {
            Some(path) => ServerConfig::from_file(path)?,
            None => {
                eprintln!("Error: --config requires a path");
                print_usage();
                process::exit(2);
            }
        },
        Some(other) => {
            eprintln!("Error: unrecognized argument '{}'", other);
            print_usage();
            process::exit(2);
        }
    };

    config.apply_env(|key| env::var(key).ok())?;

    start_server(config).await
}

fn print_usage() {
    eprintln!("USAGE:");
    eprintln!("    liftlog-server [--config <path-to-config.toml>]");
}

fn print_help() {
    println!("Liftlog Server - Workout log parsing over HTTP");
    println!();
    println!("USAGE:");
    println!("    liftlog-server [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    OPENAI_API_KEY         Inference service credential (required)");
    println!("    OPENAI_BASE_URL        Inference service root URL");
    println!("    PORT / LIFTLOG_PORT    Port to bind (default: 8000)");
    println!("    LIFTLOG_BIND_ADDRESS   Address to bind (default: 0.0.0.0)");
    println!("    LIFTLOG_MODEL          Model identifier (default: gpt-4o-mini)");
    println!("    LIFTLOG_TIMEOUT_SECS   Model call timeout (default: 8)");
    println!("    RUST_LOG               Log filter (default: info)");
    println!();
    println!("ENDPOINTS:");
    println!("    POST /parse            {{\"text\": \"...\"}} -> {{\"sets\": [...]}}");
    println!("    GET  /, GET /health    Liveness probe");
    println!();
}
