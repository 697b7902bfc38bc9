// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{string_option, subcommand};
use crate::discord::state::BotState;
use crate::discord::utils::format::{format_time_ago, join_within_limit};
use crate::discord::utils::responses::{SUCCESS_COLOR, WARNING_COLOR, send_embed, send_ephemeral_message};
use crate::discord::utils::timestamp::now_timestamp;
use crate::model::{AfkEntry, DEFAULT_AFK_REASON, MAX_AFK_REASON_LENGTH};
use crate::store::afk::AfkToggle;
use chrono::Utc;
use miette::{IntoDiagnostic, bail};
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandDataOption};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, GuildMarker};
use twilight_util::builder::command::{CommandBuilder, StringBuilder, SubCommandBuilder};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};
use twilight_validate::embed::DESCRIPTION_LENGTH;

pub fn command_definition() -> Command {
	let reason_option = StringBuilder::new("reason", "Reason for being AFK (optional)")
		.max_length(MAX_AFK_REASON_LENGTH)
		.build();

	let set_subcommand = SubCommandBuilder::new("set", "Set your AFK status")
		.option(reason_option)
		.build();
	let list_subcommand = SubCommandBuilder::new("list", "List all AFK users in the server").build();

	CommandBuilder::new("afk", "AFK status management", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.option(set_subcommand)
		.option(list_subcommand)
		.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let Some(guild_id) = interaction.guild_id else {
		bail!("AFK command was used outside of a guild");
	};

	let (subcommand_name, options) = subcommand(command_data)?;
	match subcommand_name {
		"set" => toggle_afk(interaction, options, guild_id, http_client, application_id, bot_state).await,
		"list" => list_afk(interaction, guild_id, http_client, application_id, bot_state).await,
		_ => bail!("Unknown afk subcommand encountered: {}", subcommand_name),
	}
}

async fn toggle_afk(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
	guild_id: Id<GuildMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let Some(user) = interaction.author() else {
		bail!("AFK command was used without a user");
	};
	let reason = string_option(options, "reason")?.unwrap_or(DEFAULT_AFK_REASON);

	let display_name = interaction
		.member
		.as_ref()
		.and_then(|member| member.nick.clone())
		.or_else(|| user.global_name.clone())
		.unwrap_or_else(|| user.name.clone());
	let entry = AfkEntry {
		user_id: user.id,
		username: user.name.clone(),
		display_name,
		reason: reason.to_string(),
		timestamp: Utc::now().timestamp_millis(),
	};

	let embed = match bot_state.afk.toggle(guild_id, entry).await {
		AfkToggle::Set(entry) => EmbedBuilder::new()
			.title("AFK Status Set")
			.description(format!("You are now AFK: **{}**", entry.reason))
			.color(WARNING_COLOR),
		AfkToggle::Cleared => EmbedBuilder::new()
			.title("AFK Status Removed")
			.description("Welcome back! Your AFK status has been removed.")
			.color(SUCCESS_COLOR),
	};
	let embed = embed
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

async fn list_afk(
	interaction: &InteractionCreate,
	guild_id: Id<GuildMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let entries = bot_state.afk.list(guild_id).await;
	if entries.is_empty() {
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			"No users are currently AFK in this server.",
		)
		.await;
	}

	let now = Utc::now().timestamp_millis();
	let lines: Vec<String> = entries.iter().map(|entry| afk_list_line(entry, now)).collect();
	let guild_name = bot_state
		.guild_name(guild_id)
		.unwrap_or_else(|| String::from("this server"));
	let footer = EmbedFooterBuilder::new(format!("{} user(s) currently AFK", entries.len())).build();
	let embed = EmbedBuilder::new()
		.title(format!("AFK Users in {}", guild_name))
		.description(join_within_limit(&lines, "\n\n", DESCRIPTION_LENGTH))
		.color(WARNING_COLOR)
		.footer(footer)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

fn afk_list_line(entry: &AfkEntry, now_millis: i64) -> String {
	let elapsed_seconds = (now_millis - entry.timestamp) / 1000;
	format!(
		"• **{}** - {}\n  *AFK since {} ago*",
		entry.display_name,
		entry.reason,
		format_time_ago(elapsed_seconds)
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn list_line_shows_elapsed_time() {
		let entry = AfkEntry {
			user_id: Id::new(1),
			username: String::from("sayu"),
			display_name: String::from("Sayu"),
			reason: String::from(DEFAULT_AFK_REASON),
			timestamp: 1_000_000,
		};
		assert_eq!(
			afk_list_line(&entry, 1_000_000 + 2 * 3_600_000 + 500),
			"• **Sayu** - No reason provided\n  *AFK since 2 hours ago*"
		);
		assert_eq!(
			afk_list_line(&entry, 1_010_000),
			"• **Sayu** - No reason provided\n  *AFK since a few seconds ago*"
		);
	}
}
