#[tokio::main]
async fn main() -> anyhow::Result<()> {
    portfolio_backend_lib::run().await
}
