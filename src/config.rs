// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use kdl::{KdlDocument, KdlError, KdlValue};
use miette::Diagnostic;
use thiserror::Error;
use tokio::fs::read_to_string;
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

#[derive(Debug)]
pub struct ConfigData {
	pub discord: DiscordConfig,
	pub logging: LoggingConfig,
}

#[derive(Debug)]
pub struct DiscordConfig {
	pub bot_token: String,
	/// The user allowed to use owner-only commands. Without one, nobody can use them.
	pub owner_id: Option<Id<UserMarker>>,
}

#[derive(Debug, Default)]
pub struct LoggingConfig {
	/// Log filter directives, used when `RUST_LOG` isn't set.
	pub filter: Option<String>,
}

#[derive(Debug, Diagnostic, Error)]
pub enum ConfigError {
	#[error("failed to read config file {path}")]
	Read {
		path: String,
		#[source]
		source: std::io::Error,
	},
	#[error(transparent)]
	#[diagnostic(transparent)]
	Syntax(#[from] KdlError),
	#[error("missing required config setting `{0}`")]
	#[diagnostic(help("see config.example.kdl for the expected layout"))]
	Missing(&'static str),
	#[error("config setting `{setting}` must be {expected}")]
	Invalid {
		setting: &'static str,
		expected: &'static str,
	},
}

pub async fn parse_config(config_path: &str) -> Result<ConfigData, ConfigError> {
	let config_file_contents = read_to_string(config_path).await.map_err(|source| ConfigError::Read {
		path: config_path.to_string(),
		source,
	})?;
	parse_config_text(&config_file_contents)
}

pub fn parse_config_text(config_file_contents: &str) -> Result<ConfigData, ConfigError> {
	let document: KdlDocument = config_file_contents.parse()?;

	let Some(discord) = document.get("discord").and_then(|node| node.children()) else {
		return Err(ConfigError::Missing("discord"));
	};
	let Some(bot_token) = discord.get_arg("bot_token") else {
		return Err(ConfigError::Missing("discord.bot_token"));
	};
	let bot_token = match bot_token.as_string() {
		Some(token) if !token.is_empty() => token.to_string(),
		_ => {
			return Err(ConfigError::Invalid {
				setting: "discord.bot_token",
				expected: "a non-empty string",
			});
		}
	};
	let owner_id = discord.get_arg("owner_id").map(parse_user_id).transpose()?;

	let filter = match document
		.get("logging")
		.and_then(|node| node.children())
		.and_then(|logging| logging.get_arg("filter"))
	{
		Some(value) => match value.as_string() {
			Some(filter) => Some(filter.to_string()),
			None => {
				return Err(ConfigError::Invalid {
					setting: "logging.filter",
					expected: "a string",
				});
			}
		},
		None => None,
	};

	Ok(ConfigData {
		discord: DiscordConfig { bot_token, owner_id },
		logging: LoggingConfig { filter },
	})
}

/// User IDs may be written either as integers or as strings.
fn parse_user_id(value: &KdlValue) -> Result<Id<UserMarker>, ConfigError> {
	let id = match value {
		KdlValue::Integer(id) => u64::try_from(*id).ok(),
		KdlValue::String(id) => id.parse::<u64>().ok(),
		_ => None,
	};
	id.and_then(Id::new_checked).ok_or(ConfigError::Invalid {
		setting: "discord.owner_id",
		expected: "a Discord user ID",
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn full_config() {
		let config = parse_config_text(
			r#"
			discord {
				bot_token "abc.def"
				owner_id 1318639481003184128
			}
			logging {
				filter "anchor_bot=debug"
			}
			"#,
		)
		.unwrap();
		assert_eq!(config.discord.bot_token, "abc.def");
		assert_eq!(config.discord.owner_id, Some(Id::new(1318639481003184128)));
		assert_eq!(config.logging.filter.as_deref(), Some("anchor_bot=debug"));
	}

	#[test]
	fn owner_and_logging_are_optional() {
		let config = parse_config_text("discord {\n\tbot_token \"abc\"\n}\n").unwrap();
		assert_eq!(config.discord.owner_id, None);
		assert_eq!(config.logging.filter, None);
	}

	#[test]
	fn owner_id_as_string() {
		let config = parse_config_text("discord {\n\tbot_token \"abc\"\n\towner_id \"42\"\n}\n").unwrap();
		assert_eq!(config.discord.owner_id, Some(Id::new(42)));
	}

	#[test]
	fn token_is_required() {
		assert!(matches!(parse_config_text("logging"), Err(ConfigError::Missing("discord"))));
		assert!(matches!(
			parse_config_text("discord {\n\towner_id 42\n}\n"),
			Err(ConfigError::Missing("discord.bot_token"))
		));
		assert!(matches!(
			parse_config_text("discord {\n\tbot_token 42\n}\n"),
			Err(ConfigError::Invalid {
				setting: "discord.bot_token",
				..
			})
		));
	}

	#[test]
	fn bad_owner_id_is_rejected() {
		for owner in ["-5", "0", "\"owner\"", "#true"] {
			let config = format!("discord {{\n\tbot_token \"abc\"\n\towner_id {}\n}}\n", owner);
			assert!(
				matches!(
					parse_config_text(&config),
					Err(ConfigError::Invalid {
						setting: "discord.owner_id",
						..
					})
				),
				"{} was accepted",
				owner
			);
		}
	}

	#[test]
	fn syntax_errors_are_reported() {
		assert!(matches!(parse_config_text("discord {"), Err(ConfigError::Syntax(_))));
	}
}
