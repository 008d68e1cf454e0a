use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    achievement_migrate_cli::main_entry().await
}
