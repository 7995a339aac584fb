use clap::Parser;
use gdrive_upload::cli::{run, Cli};
use gdrive_upload::logging;
use gdrive_upload_core::masking::SecretRegistry;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load environment
    dotenvy::dotenv().ok();

    let secrets = SecretRegistry::new();
    logging::init(secrets.clone());

    let cli = Cli::parse();
    let actions = cli.actions(secrets);

    match run(&cli, &actions).await {
        Ok(report) => {
            tracing::info!(download_url = %report.download_url, "gdrive-upload finished");
        }
        Err(e) => {
            // Single fatal exit point: one masked ::error:: line, then status 1.
            actions.fail(&e.to_string());
            std::process::exit(1);
        }
    }
}
