use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use storestyle::cdp::CdpRenderer;
use storestyle::{CaptureConfig, ExtractOptions, StyleExtractor};

/// Extract the color palette and primary button style of a storefront
#[derive(Parser, Debug)]
#[command(name = "storestyle", version, about)]
struct Cli {
    /// Shop URL to visit
    url: String,

    /// Capture the given URL instead of looking up a product page
    #[arg(long)]
    no_product_page: bool,

    /// Hide cookie banners, popups and overlays before capturing
    #[arg(long)]
    remove_overlays: bool,

    /// Navigation timeout in milliseconds
    #[arg(long, default_value_t = 30000)]
    timeout_ms: u64,

    /// Write the profile JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = CaptureConfig {
        timeout_ms: cli.timeout_ms,
        ..Default::default()
    };
    let options = ExtractOptions {
        use_product_page: !cli.no_product_page,
        remove_overlays: cli.remove_overlays,
    };

    let renderer = Arc::new(CdpRenderer::launch(config.clone())?);
    let extractor = StyleExtractor::new(renderer, config)?;
    let profile = extractor.extract(&cli.url, &options).await?;

    let json = serde_json::to_string_pretty(&profile)?;
    match cli.output {
        Some(path) => {
            std::fs::write(&path, json)?;
            log::info!("profile written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
