// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anchor_bot::config::parse_config;
use anchor_bot::discord::{run_bot, set_up_client};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "anchor_bot=info,twilight_gateway=warn";

#[tokio::main]
async fn main() -> miette::Result<()> {
	let config = parse_config("config.kdl").await?;

	let filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => {
			let directives = config.logging.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
			EnvFilter::try_new(directives).into_diagnostic()?
		}
	};
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let http_client = set_up_client(&config);
	run_bot(&config, http_client).await
}
