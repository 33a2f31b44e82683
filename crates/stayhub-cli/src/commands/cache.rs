use anyhow::{Context, Result};
use stayhub_application::AppContext;

pub async fn clear(ctx: &AppContext) -> Result<()> {
    ctx.client()
        .reset_store()
        .await
        .context("Failed to clear cache")?;
    println!("Cache cleared");
    Ok(())
}
