//! Aegis Gateway CLI - run prompts through the security pipeline from the shell

use std::path::PathBuf;

use clap::Parser;

use aegis_core::{Gateway, GatewayConfig, Request, Role};
use aegis_ledger::AuditLedger;

#[derive(Parser)]
#[command(name = "aegis")]
#[command(about = "Aegis Gateway - Security Firewall for LLM Traffic")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run a single prompt through the gateway and print the verdict envelope
    Scan {
        /// Prompt text to evaluate
        #[arg(short, long)]
        prompt: String,
        /// Caller role (admin, developer, user, guest)
        #[arg(short, long, default_value = "user")]
        role: String,
        /// Sanitization mode override (detect, mask, redact)
        #[arg(short, long)]
        mode: Option<String>,
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Check configuration validity
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "config/aegis.json")]
        config: PathBuf,
    },
    /// Verify the audit ledger hash chain
    Verify {
        /// Audit database path
        #[arg(short, long)]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    match cli.command {
        Some(Commands::Scan {
            prompt,
            role,
            mode,
            config,
        }) => {
            let mut config = match config {
                Some(path) => GatewayConfig::from_json_file(&path)?,
                None => GatewayConfig::default(),
            };
            if let Some(mode) = mode {
                config.pii.mode = mode.to_ascii_lowercase().parse()?;
            }
            let role: Role = role.parse()?;

            let gateway = Gateway::with_echo_model(config)?;
            let verdict = gateway.process(&Request::new(prompt, role)).await?;

            println!("{}", serde_json::to_string_pretty(&verdict.envelope())?);
            if let Some(text) = &verdict.response_text {
                println!("--- response ---");
                println!("{text}");
            }
        }
        Some(Commands::Check { config }) => {
            match GatewayConfig::from_json_file(&config) {
                Ok(_) => println!("Config OK: {}", config.display()),
                Err(e) => {
                    println!("Config INVALID: {e}");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Verify { db }) => {
            let ledger = AuditLedger::open(&db)?;
            match ledger.verify()? {
                aegis_ledger::ChainVerification::Intact { length } => {
                    println!("Ledger OK: {length} entries, chain intact");
                }
                aegis_ledger::ChainVerification::Broken { sequence_no, detail } => {
                    println!("Ledger BROKEN at entry {sequence_no}: {detail}");
                    std::process::exit(1);
                }
            }
        }
        None => {
            println!("Aegis Gateway v0.1.0 - Use --help for commands");
        }
    }

    Ok(())
}
