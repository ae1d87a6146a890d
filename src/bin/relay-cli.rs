use clap::{Parser, Subcommand};
use relay_client::{RelayClient, Submission};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Send test submissions to a running form relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Submission path on the relay.
    #[arg(short, long, default_value = "/submit")]
    path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check relay status
    Health,
    /// Submit a contact form
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        /// Kind of site requested
        #[arg(long = "type")]
        kind: String,
        #[arg(long)]
        budget: String,
        #[arg(long)]
        deadline: String,
        #[arg(long)]
        message: String,
        /// Pretend to come from this client address (X-Forwarded-For)
        #[arg(long)]
        forwarded_for: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let client = RelayClient::new(&cli.url).with_submit_path(&cli.path);

    match cli.command {
        Commands::Health => {
            let status = client.health().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Submit {
            name,
            email,
            phone,
            kind,
            budget,
            deadline,
            message,
            forwarded_for,
        } => {
            let submission = Submission {
                name,
                email,
                phone,
                kind,
                budget,
                deadline,
                message,
            };
            let reply = client
                .submit_raw(&serde_json::to_value(&submission)?, forwarded_for.as_deref())
                .await?;

            if !reply.is_success() {
                eprintln!(
                    "Error: relay returned status {}: {}",
                    reply.status,
                    reply.error().unwrap_or("(no message)")
                );
            }
            println!("{}", serde_json::to_string_pretty(&reply.body)?);
        }
    }

    Ok(())
}
