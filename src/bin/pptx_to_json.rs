use clap::Parser;
use dotenvy::dotenv;
use ppt_mvp::services::pptx::{DirectorySink, PptxPackage, parse_presentation, write_bundle};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Convert a PPTX template into presentation JSON and exported assets
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Template to convert
    file: PathBuf,

    /// Directory receiving the JSON, the assets and the optional XML bundle
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Also write every presentation part into a single `<stem>.xml` bundle
    #[arg(long)]
    xml: bool,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pptx_to_json=info,ppt_mvp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let stem = args
        .file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("presentation")
        .to_string();
    let bytes = std::fs::read(&args.file)?;

    info!("📂 Parsing {}", args.file.display());

    let mut sink = DirectorySink::new(&args.out_dir)?;
    info!("🖼️  Exporting assets to {}", sink.root().display());
    let presentation = parse_presentation(bytes.clone(), &mut sink)?;

    let json_path = args.out_dir.join(format!("{}.json", stem));
    std::fs::write(&json_path, serde_json::to_vec_pretty(&presentation)?)?;
    info!(
        "✅ Wrote {} slides to {}",
        presentation.slides.len(),
        json_path.display()
    );

    if args.xml {
        let mut package = PptxPackage::from_bytes(bytes)?;
        let (xml, summary) = write_bundle(&mut package)?;
        let xml_path = args.out_dir.join(format!("{}.xml", stem));
        std::fs::write(&xml_path, xml)?;
        info!(
            "📦 Bundled {} slides, {} layouts, {} masters and {} themes into {}",
            summary.slides,
            summary.layouts,
            summary.masters,
            summary.themes,
            xml_path.display()
        );
    }

    Ok(())
}
