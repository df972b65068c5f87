//! Command-line wallet for diagency agents.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use diagency_client::{ClientConfig, WalletLogin, WalletProvider, WalletService};
use diagency_core::{PreviewDescriptor, VerificationState};
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// diagency wallet CLI
#[derive(Parser)]
#[command(name = "diagency", version, about = "Digital credential wallet for diagency agents")]
struct Cli {
    /// Path to the wallet initialization descriptor
    #[arg(long, env = "DIAGENCY_DESCRIPTOR")]
    descriptor: PathBuf,

    /// Account name
    #[arg(short, long, env = "DIAGENCY_USERNAME")]
    username: String,

    /// Account password
    #[arg(short, long, env = "DIAGENCY_PASSWORD", hide_env_values = true)]
    password: String,

    /// Request timeout in seconds
    #[arg(long, env = "DIAGENCY_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Verification state the wallet lists
    #[arg(long, env = "DIAGENCY_VERIFICATION_STATE", default_value = "passed")]
    verification_state: VerificationState,

    /// Log filter used when RUST_LOG is unset
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the wallet contents
    Wallet,

    /// Preview an invitation without acting on it
    Preview {
        /// Invitation URL
        url: String,
    },

    /// Accept a credential offer
    Accept {
        /// Invitation URL of the offer
        url: String,
    },

    /// Reject a credential offer
    Reject {
        /// Invitation URL of the offer
        url: String,
    },

    /// Generate a proof for a verification request
    Prove {
        /// Invitation URL of the request
        url: String,
    },

    /// Share a generated proof
    Share {
        /// Verification id
        id: String,
    },

    /// Decline a verification request
    RejectProof {
        /// Verification id
        id: String,
    },

    /// Delete a stored credential
    DeleteCredential {
        /// Credential id
        id: String,
    },
}

fn init_logging(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set global default subscriber")
}

fn print(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn wallet_summary(service: &WalletService) -> Result<Value> {
    let wallet = service.wallet();
    Ok(json!({
        "agent": wallet.agent,
        "connections": wallet.connections,
        "invitations": wallet.invitations,
        "credentials": serde_json::to_value(&wallet.credentials)?,
        "verifications": wallet.verifications,
    }))
}

async fn open(cli: &Cli) -> Result<WalletService> {
    let descriptor = std::fs::read_to_string(&cli.descriptor)
        .with_context(|| format!("failed to read {}", cli.descriptor.display()))?;

    let config = ClientConfig {
        timeout: cli.timeout,
        verification_state: cli.verification_state,
        ..ClientConfig::default()
    };
    let provider = WalletProvider::new(config)?;
    let wallet = provider
        .initiate(&WalletLogin {
            descriptor,
            username: cli.username.clone(),
            password: cli.password.clone(),
        })
        .await?;

    debug!(base_uri = %wallet.base_uri, "Wallet opened");
    Ok(WalletService::from_provider(&provider, wallet)?)
}

async fn handle_offer(service: &mut WalletService, url: &str, accept: bool) -> Result<()> {
    let PreviewDescriptor::Credential(offer) = service.preview(url).await? else {
        return Err(anyhow!("{url} is not a credential offer"));
    };
    let credential = if accept {
        service.accept_credential(&offer).await?
    } else {
        service.reject_credential(&offer).await?
    };
    info!(id = credential.id(), state = %credential.state(), "Offer handled");
    print(&credential.to_json()?)
}

async fn run(cli: Cli) -> Result<()> {
    let mut service = open(&cli).await?;

    match cli.command {
        Commands::Wallet => print(&wallet_summary(&service)?)?,
        Commands::Preview { url } => {
            let preview = service.preview(&url).await?;
            print(preview.json_representation())?;
        }
        Commands::Accept { url } => handle_offer(&mut service, &url, true).await?,
        Commands::Reject { url } => handle_offer(&mut service, &url, false).await?,
        Commands::Prove { url } => {
            let PreviewDescriptor::Verification(request) = service.preview(&url).await? else {
                return Err(anyhow!("{url} is not a verification request"));
            };
            let verification = service.generate_proof(&request).await?;
            print(&serde_json::to_value(verification)?)?;
        }
        Commands::Share { id } => {
            let verification = service.share_proof(&id).await?;
            print(&serde_json::to_value(verification)?)?;
        }
        Commands::RejectProof { id } => {
            let verification = service.reject_proof(&id).await?;
            print(&serde_json::to_value(verification)?)?;
        }
        Commands::DeleteCredential { id } => {
            service.delete_credential(&id).await?;
            print(&json!({"deleted": id}))?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    run(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_reject_proof() {
        let cli = Cli::try_parse_from([
            "diagency",
            "--descriptor",
            "agency.json",
            "-u",
            "alice",
            "-p",
            "secret",
            "--verification-state",
            "PROOF_SHARED",
            "reject-proof",
            "v1",
        ])
        .unwrap();

        assert_eq!(cli.verification_state, VerificationState::ProofShared);
        assert!(matches!(cli.command, Commands::RejectProof { id } if id == "v1"));
    }
}
