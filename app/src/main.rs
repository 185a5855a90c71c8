use clap::Parser;

use datasci_chat_lib::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = datasci_chat_lib::run(cli).await {
        tracing::error!("Fatal error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
