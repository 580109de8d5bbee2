use crate::Config;
use anyhow::{bail, Result};
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Request `/health` from a running server. Any non-2xx answer is an error.
pub async fn perform_health_check(config: &Config) -> Result<()> {
	let url = config.health_check_url();
	let response = reqwest::Client::builder().timeout(CHECK_TIMEOUT).build()?.get(&url).send().await?;

	let status = response.status();
	if !status.is_success() {
		bail!("health check of {url} failed: HTTP {status}");
	}

	tracing::debug!(%url, %status, "health check passed");
	Ok(())
}
