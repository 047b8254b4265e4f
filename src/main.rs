#[tokio::main]
async fn main() -> anyhow::Result<()> {
    navis_cli::cli::run().await
}
