use clap::Parser;
use dotenvy::dotenv;
use ppt_mvp::client::{SelectedFile, TemplateUploader, UploadOutcome};
use ppt_mvp::config::ClientConfig;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Send a PPTX template to the backend's upload endpoint
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Template to upload. Without it nothing is sent.
    file: Option<PathBuf>,

    /// Upload endpoint (overrides UPLOAD_URL)
    #[arg(long)]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upload_template=info,ppt_mvp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = args.url.as_deref() {
        config = config.with_upload_url(url)?;
    }

    let mut uploader = TemplateUploader::from_config(&config);
    info!("🎯 Upload endpoint: {}", uploader.endpoint());
    if let Some(path) = &args.file {
        let file = SelectedFile::from_path(path).await?;
        uploader.select(file);
    }

    match uploader.upload().await {
        UploadOutcome::NothingSelected => {
            info!("📭 No file selected, nothing to upload.");
        }
        UploadOutcome::Delivered(_) => {
            info!("✅ Upload complete.");
        }
        UploadOutcome::Failed(_) => {
            error!("❌ Template was not uploaded.");
            std::process::exit(1);
        }
    }

    Ok(())
}
