use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Client CLI for the copilot proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Bearer token forwarded to the copilot service.
    #[arg(short, long, env = "COPILOT_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check proxy liveness
    Health,
    /// Send a JSON chat body and stream the reply to stdout
    Chat {
        /// Request body, e.g. '{"message":"hi"}'
        body: String,

        #[arg(short, long, value_enum, default_value_t = Endpoint::Chat)]
        endpoint: Endpoint,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Endpoint {
    Chat,
    Copilot,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Chat => "/chat",
            Endpoint::Copilot => "/copilot",
        }
    }
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

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url))
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Chat { body, endpoint } => {
            let body: Value = serde_json::from_str(&body)?;
            let res = client.post(format!("{}{}", cli.url, endpoint.path()))
                .headers(headers)
                .json(&body)
                .send()
                .await?;
            stream_body(res).await?;
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;
    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn stream_body(mut res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
    }

    let mut stdout = tokio::io::stdout();
    while let Some(chunk) = res.chunk().await? {
        stdout.write_all(&chunk).await?;
        stdout.flush().await?;
    }
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
