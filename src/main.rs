use clap::Parser;

use certwatch::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    certwatch::init_logging();
    certwatch::run(config).await
}
