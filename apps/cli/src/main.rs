use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, DuckGenerator, GenerationController, HttpDuckClient, RequestState,
};
use shared::domain::ImageSource;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "duck", about = "Describe your dream duck and hatch it")]
struct Cli {
    /// Overrides DUCK_AGENT_ENDPOINT / duck.toml.
    #[arg(long)]
    agent_endpoint: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Generate {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
        #[arg(long, short, default_value = "duck.png")]
        output: PathBuf,
    },
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(endpoint) = cli.agent_endpoint {
        settings.agent_endpoint = endpoint;
    }
    if let Some(secs) = cli.timeout_secs {
        settings.request_timeout_secs = secs;
    }
    let client = HttpDuckClient::from_settings(&settings).context("invalid client settings")?;

    match cli.command {
        Command::Generate {
            description,
            output,
        } => generate(&client, description.join(" "), output).await,
        Command::Health => match client.check_health().await {
            Ok(()) => {
                println!("Quack! The duck pond at {} is open.", client.base_url());
                Ok(())
            }
            Err(err) => bail!("{}", err.user_message()),
        },
    }
}

async fn generate(client: &HttpDuckClient, description: String, output: PathBuf) -> Result<()> {
    let mut controller = GenerationController::new();
    controller.set_prompt(description);
    println!("{}", client_core::controller::LOADING_LABEL);

    let result = match controller.run(client).await {
        RequestState::Succeeded(result) => result.clone(),
        RequestState::Failed { message, .. } => bail!("{message}"),
        state => bail!("generation ended in unexpected state {state:?}"),
    };

    if result.is_fallback {
        println!("(fallback duck)");
    }
    println!("{}", result.message);

    match ImageSource::parse(&result.image) {
        Some(ImageSource::DataUri { .. }) => {
            let bytes = client
                .load_image_bytes(&result.image)
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message()))?;
            fs::write(&output, bytes)
                .with_context(|| format!("failed to write duck to '{}'", output.display()))?;
            println!("saved to {}", output.display());
        }
        _ => println!("image: {}", result.image),
    }

    Ok(())
}
