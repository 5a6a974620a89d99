use clap::Parser;
use doc_extract_server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();
    log::debug!("{:?}", config);

    doc_extract_server::run(config).await
}
