use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};

#[derive(Parser)]
#[command(name = "stream-probe")]
#[command(about = "Send a request through the gateway and print chunks as they arrive", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Bearer token forwarded to the upstream.
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the assistant a question
    Chat {
        #[arg(short, long)]
        message: String,
    },
    /// Submit a life event for ingestion
    Feed {
        #[arg(long)]
        text: String,

        /// Optional attachment
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    let started = Instant::now();
    let res = match cli.command {
        Commands::Chat { message } => {
            client
                .post(format!("{}/api/chat/stream", cli.url))
                .headers(headers)
                .json(&serde_json::json!({ "message": message }))
                .send()
                .await?
        }
        Commands::Feed { text, file } => {
            let mut form = Form::new().text("text", text);
            if let Some(path) = file {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload".to_string());
                let bytes = tokio::fs::read(&path).await?;
                form = form.part("file", Part::bytes(bytes).file_name(name));
            }
            client
                .post(format!("{}/api/feed/stream", cli.url))
                .headers(headers)
                .multipart(form)
                .send()
                .await?
        }
    };

    print_stream(res, started).await
}

async fn print_stream(
    mut res: reqwest::Response,
    started: Instant,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    eprintln!("[{:>6} ms] headers received ({})", started.elapsed().as_millis(), status);
    while let Some(chunk) = res.chunk().await? {
        println!(
            "[{:>6} ms] {} bytes: {}",
            started.elapsed().as_millis(),
            chunk.len(),
            String::from_utf8_lossy(&chunk).escape_debug()
        );
    }
    eprintln!("[{:>6} ms] stream closed", started.elapsed().as_millis());
    Ok(())
}
