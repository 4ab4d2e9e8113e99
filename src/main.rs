use anyhow::Result;
use calview::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
