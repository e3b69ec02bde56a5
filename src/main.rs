use dotenv::dotenv;
use env_logger::Env;

use roulette::commands::start;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    start().await
}
