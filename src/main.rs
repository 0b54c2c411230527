use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    quorus::node::cli::run_cli().await
}
