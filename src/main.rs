#[tokio::main]
async fn main() -> std::io::Result<()> {
    arena_rounds::run_with_config().await
}
