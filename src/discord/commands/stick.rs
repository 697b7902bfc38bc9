// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{string_option, subcommand};
use crate::discord::state::BotState;
use crate::discord::utils::format::join_within_limit;
use crate::discord::utils::permissions::{bot_permissions, member_permissions, missing_permission_message};
use crate::discord::utils::responses::{
	DEFAULT_COLOR, ERROR_COLOR, SUCCESS_COLOR, WARNING_COLOR, send_embed, send_ephemeral_embed, send_ephemeral_message,
};
use crate::discord::utils::timestamp::now_timestamp;
use crate::model::MAX_STICKY_MESSAGE_LENGTH;
use crate::store::sticky::{StickyError, StickySummary};
use miette::{IntoDiagnostic, bail};
use twilight_http::client::Client;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandDataOption};
use twilight_model::channel::message::Embed;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, ChannelMarker, GuildMarker};
use twilight_util::builder::command::{CommandBuilder, StringBuilder, SubCommandBuilder};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};
use twilight_validate::embed::DESCRIPTION_LENGTH;

pub fn command_definition() -> Command {
	let message_option = StringBuilder::new("message", "The message to stick")
		.required(true)
		.max_length(MAX_STICKY_MESSAGE_LENGTH)
		.build();

	let set_subcommand = SubCommandBuilder::new("set", "Set a sticky message for this channel")
		.option(message_option)
		.build();
	let stop_subcommand =
		SubCommandBuilder::new("stop", "Stop the sticky message in this channel (keeps it saved)").build();
	let start_subcommand = SubCommandBuilder::new("start", "Start the sticky message in this channel").build();
	let remove_subcommand =
		SubCommandBuilder::new("remove", "Remove the sticky message from this channel permanently").build();
	let stickies_subcommand = SubCommandBuilder::new("stickies", "List all sticky messages in this server").build();

	CommandBuilder::new("stick", "Manage sticky messages in channels", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.default_member_permissions(Permissions::MANAGE_MESSAGES)
		.option(set_subcommand)
		.option(stop_subcommand)
		.option(start_subcommand)
		.option(remove_subcommand)
		.option(stickies_subcommand)
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
		bail!("Stick command was used outside of a guild");
	};
	let Some(channel_id) = interaction.channel.as_ref().map(|channel| channel.id) else {
		bail!("Stick command was used without a channel");
	};

	if let Some(message) = missing_permission_message(
		member_permissions(interaction),
		bot_permissions(interaction),
		Permissions::MANAGE_MESSAGES,
		"Manage Messages",
	) {
		return send_ephemeral_message(interaction, http_client, application_id, message).await;
	}

	let (subcommand_name, options) = subcommand(command_data)?;
	match subcommand_name {
		"set" => set_sticky(interaction, options, guild_id, channel_id, http_client, application_id, bot_state).await,
		"stop" => stop_sticky(interaction, channel_id, http_client, application_id, bot_state).await,
		"start" => start_sticky(interaction, channel_id, http_client, application_id, bot_state).await,
		"remove" => remove_sticky(interaction, channel_id, http_client, application_id, bot_state).await,
		"stickies" => list_stickies(interaction, guild_id, http_client, application_id, bot_state).await,
		_ => bail!("Unknown stick subcommand encountered: {}", subcommand_name),
	}
}

async fn set_sticky(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
	guild_id: Id<GuildMarker>,
	channel_id: Id<ChannelMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let Some(message) = string_option(options, "message")? else {
		bail!("Command data is malformed; expected `/stick set` to have required option `message`");
	};

	bot_state
		.stickies
		.set(channel_id, guild_id, message.to_string())
		.await?;

	let embed = confirmation_embed(StickyChange::Set, channel_id)?;
	send_ephemeral_embed(interaction, http_client, application_id, embed).await
}

async fn stop_sticky(
	interaction: &InteractionCreate,
	channel_id: Id<ChannelMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	match bot_state.stickies.stop(channel_id).await {
		Ok(()) => {
			let embed = confirmation_embed(StickyChange::Stopped, channel_id)?;
			send_ephemeral_embed(interaction, http_client, application_id, embed).await
		}
		Err(error) => report_sticky_error(interaction, error, http_client, application_id).await,
	}
}

async fn start_sticky(
	interaction: &InteractionCreate,
	channel_id: Id<ChannelMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	match bot_state.stickies.start(channel_id).await {
		Ok(()) => {
			let embed = confirmation_embed(StickyChange::Started, channel_id)?;
			send_ephemeral_embed(interaction, http_client, application_id, embed).await
		}
		Err(StickyError::NotConfigured) => {
			send_ephemeral_message(
				interaction,
				http_client,
				application_id,
				"There is no sticky message set for this channel. Use `/stick set` first.",
			)
			.await
		}
		Err(error) => report_sticky_error(interaction, error, http_client, application_id).await,
	}
}

async fn remove_sticky(
	interaction: &InteractionCreate,
	channel_id: Id<ChannelMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	match bot_state.stickies.remove(channel_id).await {
		Ok(()) => {
			let embed = confirmation_embed(StickyChange::Removed, channel_id)?;
			send_ephemeral_embed(interaction, http_client, application_id, embed).await
		}
		Err(error) => report_sticky_error(interaction, error, http_client, application_id).await,
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum StickyChange {
	Set,
	Stopped,
	Started,
	Removed,
}

/// The reply to a change is only shown to the user who made it, so the sticky stays the last public message.
fn confirmation_embed(change: StickyChange, channel_id: Id<ChannelMarker>) -> miette::Result<Embed> {
	let channel = channel_id.mention();
	let (title, description, color) = match change {
		StickyChange::Set => (
			"Sticky Message Set",
			format!("Sticky message has been set for {}.", channel),
			SUCCESS_COLOR,
		),
		StickyChange::Stopped => (
			"Sticky Message Stopped",
			format!(
				"Sticky message has been stopped in {}. Use `/stick start` to start it again.",
				channel
			),
			WARNING_COLOR,
		),
		StickyChange::Started => (
			"Sticky Message Started",
			format!("Sticky message has been started in {}.", channel),
			SUCCESS_COLOR,
		),
		StickyChange::Removed => (
			"Sticky Message Removed",
			format!("Sticky message has been permanently removed from {}.", channel),
			ERROR_COLOR,
		),
	};
	let embed = EmbedBuilder::new()
		.title(title)
		.description(description)
		.color(color)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	Ok(embed)
}

async fn list_stickies(
	interaction: &InteractionCreate,
	guild_id: Id<GuildMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let stickies = bot_state.stickies.list(guild_id).await;
	if stickies.is_empty() {
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			"There are no sticky messages set in this server.",
		)
		.await;
	}

	let lines: Vec<String> = stickies.iter().map(sticky_list_line).collect();
	let guild_name = bot_state
		.guild_name(guild_id)
		.unwrap_or_else(|| String::from("this server"));
	let footer = EmbedFooterBuilder::new(format!("{} sticky message(s) found", stickies.len())).build();
	let embed = EmbedBuilder::new()
		.title(format!("Sticky Messages in {}", guild_name))
		.description(join_within_limit(&lines, "\n\n", DESCRIPTION_LENGTH))
		.color(DEFAULT_COLOR)
		.footer(footer)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

fn sticky_list_line(sticky: &StickySummary) -> String {
	let status = if sticky.active { "🟢 Active" } else { "🔴 Stopped" };
	format!("**{}** - {}\n> {}", sticky.channel_id.mention(), status, sticky.preview)
}

/// Tells the user why a sticky operation can't be done. Post failures are returned as errors instead.
async fn report_sticky_error(
	interaction: &InteractionCreate,
	error: StickyError,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	let message = match error {
		StickyError::NotConfigured => "There is no sticky message set for this channel.",
		StickyError::AlreadyActive => "The sticky message is already active in this channel.",
		StickyError::AlreadyStopped => "The sticky message is already stopped in this channel.",
		StickyError::ExternalOperationFailed(_) => return Err(error.into()),
	};
	send_ephemeral_message(interaction, http_client, application_id, message).await
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn list_lines_show_status() {
		let active = StickySummary {
			channel_id: Id::new(5),
			active: true,
			preview: String::from("Read the rules"),
		};
		assert_eq!(sticky_list_line(&active), "**<#5>** - 🟢 Active\n> Read the rules");

		let stopped = StickySummary {
			active: false,
			..active
		};
		assert_eq!(sticky_list_line(&stopped), "**<#5>** - 🔴 Stopped\n> Read the rules");
	}

	#[test]
	fn confirmations_do_not_repeat_the_sticky_text() {
		let embed = confirmation_embed(StickyChange::Set, Id::new(5)).unwrap();
		assert_eq!(embed.title.as_deref(), Some("Sticky Message Set"));
		assert_eq!(embed.description.as_deref(), Some("Sticky message has been set for <#5>."));
		assert_eq!(embed.color, Some(SUCCESS_COLOR));
	}

	#[test]
	fn confirmation_colors_follow_the_change() {
		let colors: Vec<Option<u32>> = [
			StickyChange::Set,
			StickyChange::Stopped,
			StickyChange::Started,
			StickyChange::Removed,
		]
		.into_iter()
		.map(|change| confirmation_embed(change, Id::new(5)).unwrap().color)
		.collect();
		assert_eq!(
			colors,
			vec![Some(SUCCESS_COLOR), Some(WARNING_COLOR), Some(SUCCESS_COLOR), Some(ERROR_COLOR)]
		);
	}

	#[test]
	fn sticky_command_is_guild_only() {
		let command = command_definition();
		assert_eq!(command.name, "stick");
		assert_eq!(command.contexts, Some(vec![InteractionContextType::Guild]));
		let subcommands: Vec<&str> = command.options.iter().map(|option| option.name.as_str()).collect();
		assert_eq!(subcommands, vec!["set", "stop", "start", "remove", "stickies"]);
	}
}
