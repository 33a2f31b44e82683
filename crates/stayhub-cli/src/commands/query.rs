use anyhow::{Context, Result, bail};
use serde_json::Value;
use stayhub_application::AppContext;
use stayhub_client::Operation;
use stayhub_core::config::FetchPolicy;
use std::path::Path;

pub async fn run(
    ctx: &AppContext,
    file: &Path,
    vars: Option<&str>,
    network_only: bool,
) -> Result<()> {
    let document = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut operation = Operation::new(document);
    if let Some(vars) = vars {
        let variables: Value = serde_json::from_str(vars).context("--vars is not valid JSON")?;
        if !variables.is_object() {
            bail!("--vars must be a JSON object");
        }
        operation = operation.with_variables(variables);
    }
    if network_only {
        operation = operation.with_fetch_policy(FetchPolicy::NetworkOnly);
    }

    let data = ctx.client().execute(operation).await?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
