use env_logger::Env;
use review_crawler::{configuration::get_configuration, startup::run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration()?;

    let output_file = run(configuration).await?;
    log::info!("Saved crawl results to {}", output_file.display());

    Ok(())
}
