use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    codeprep_cli::main_entry().await
}
