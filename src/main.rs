use std::io::Read;
use std::path::PathBuf;

use clap::Parser;

use qr_contact::{extract, Config};

#[derive(Parser)]
#[command(name = "qr_contact", about = "Extract a structured contact from a scanned QR payload")]
struct Cli {
    /// Raw payload text (reads stdin when omitted)
    payload: Option<String>,

    /// Read the payload from a file instead
    #[arg(short, long, conflicts_with = "payload")]
    file: Option<PathBuf>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let payload = if let Some(file) = cli.file {
        std::fs::read_to_string(file)?
    } else if let Some(payload) = cli.payload {
        payload
    } else {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    };

    let config = Config::from_env();
    let result = extract(&payload, &config).await;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
