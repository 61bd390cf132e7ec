//! Posts the embedded sample PNG to a running NFT Upload Server.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nft_upload_server::trigger::send_sample;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "nft_upload_server=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let base_url =
        std::env::var("UPLOAD_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let uri = send_sample(&reqwest::Client::new(), &base_url)
        .await
        .with_context(|| format!("Sample upload to {} failed", base_url))?;

    println!("{}", uri);
    Ok(())
}
