// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{integer_option, string_option, subcommand};
use crate::discord::state::BotState;
use crate::discord::utils::pagination::{page_count, page_slice, requested_page};
use crate::discord::utils::responses::{
	ERROR_COLOR, OWNER_ONLY, SUCCESS_COLOR, send_embed, send_ephemeral_message, send_message,
};
use crate::discord::utils::timestamp::now_timestamp;
use crate::store::blacklist::parse_server_id;
use miette::{IntoDiagnostic, bail};
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandDataOption};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, GuildMarker};
use twilight_util::builder::command::{CommandBuilder, IntegerBuilder, StringBuilder, SubCommandBuilder};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};

const SERVERS_PER_PAGE: usize = 10;
const UNKNOWN_SERVER: &str = "Unknown Server";

pub fn command_definition() -> Command {
	let page_option = IntegerBuilder::new("page", "Page number (default: 1)")
		.min_value(1)
		.build();
	let remove_server_option = StringBuilder::new("serverid", "Server ID to remove from blacklist")
		.required(true)
		.build();
	let add_server_option = StringBuilder::new("serverid", "Server ID to blacklist")
		.required(true)
		.build();

	let list_subcommand = SubCommandBuilder::new("list", "Display all currently blacklisted servers with pagination")
		.option(page_option)
		.build();
	let remove_subcommand = SubCommandBuilder::new("remove", "Remove a server from the blacklist")
		.option(remove_server_option)
		.build();
	let server_subcommand = SubCommandBuilder::new("server", "Blacklist a server from using bot commands")
		.option(add_server_option)
		.build();

	CommandBuilder::new("blacklist", "Manage server blacklist (Owner only)", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild, InteractionContextType::BotDm])
		.option(list_subcommand)
		.option(remove_subcommand)
		.option(server_subcommand)
		.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let is_owner = interaction
		.author_id()
		.is_some_and(|user_id| bot_state.is_owner(user_id));
	if !is_owner {
		return send_ephemeral_message(interaction, http_client, application_id, OWNER_ONLY).await;
	}

	let (subcommand_name, options) = subcommand(command_data)?;
	match subcommand_name {
		"list" => list_blacklist(interaction, options, http_client, application_id, bot_state).await,
		"remove" => remove_from_blacklist(interaction, options, http_client, application_id, bot_state).await,
		"server" => add_to_blacklist(interaction, options, http_client, application_id, bot_state).await,
		_ => bail!("Unknown blacklist subcommand encountered: {}", subcommand_name),
	}
}

async fn list_blacklist(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let Some(page) = requested_page(integer_option(options, "page")?) else {
		bail!("Command data is malformed; `/blacklist list` page is below the minimum");
	};

	let blacklisted = bot_state.blacklist.list().await;
	if blacklisted.is_empty() {
		return send_message(
			interaction,
			http_client,
			application_id,
			"No servers are currently blacklisted.",
		)
		.await;
	}

	let total_pages = page_count(blacklisted.len(), SERVERS_PER_PAGE);
	if page > total_pages {
		return send_message(
			interaction,
			http_client,
			application_id,
			format!(
				"Invalid page number. There are {} page(s) of blacklisted servers.",
				total_pages
			),
		)
		.await;
	}

	let first_number = (page - 1) * SERVERS_PER_PAGE + 1;
	let mut lines = Vec::new();
	for (index, guild_id) in page_slice(&blacklisted, page, SERVERS_PER_PAGE).iter().enumerate() {
		let server_name = server_name(*guild_id, http_client, bot_state).await;
		lines.push(format!("{}. **{}** ({})", first_number + index, server_name, guild_id));
	}

	let footer = EmbedFooterBuilder::new(format!(
		"Page {} of {} • {} total blacklisted servers",
		page,
		total_pages,
		blacklisted.len()
	))
	.build();
	let embed = EmbedBuilder::new()
		.title("🚫 Blacklisted Servers")
		.description(lines.join("\n"))
		.footer(footer)
		.color(ERROR_COLOR)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

async fn remove_from_blacklist(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let Some(server_id_text) = string_option(options, "serverid")? else {
		bail!("Command data is malformed; expected `/blacklist remove` to have required option `serverid`");
	};
	let Some(guild_id) = parse_server_id(server_id_text) else {
		return send_ephemeral_message(interaction, http_client, application_id, invalid_server_id(server_id_text))
			.await;
	};

	if !bot_state.blacklist.remove(guild_id).await {
		return send_message(
			interaction,
			http_client,
			application_id,
			format!("Server `{}` is not currently blacklisted.", guild_id),
		)
		.await;
	}
	tracing::info!(%guild_id, "Server removed from the blacklist");

	let server_name = server_name(guild_id, http_client, bot_state).await;
	let embed = EmbedBuilder::new()
		.title("✅ Server Removed from Blacklist")
		.description(format!(
			"**{}** (`{}`) has been removed from the blacklist.\nMembers can now use bot commands again.",
			server_name, guild_id
		))
		.color(SUCCESS_COLOR)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

async fn add_to_blacklist(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let Some(server_id_text) = string_option(options, "serverid")? else {
		bail!("Command data is malformed; expected `/blacklist server` to have required option `serverid`");
	};
	let Some(guild_id) = parse_server_id(server_id_text) else {
		return send_ephemeral_message(interaction, http_client, application_id, invalid_server_id(server_id_text))
			.await;
	};

	if !bot_state.blacklist.add(guild_id).await {
		return send_message(
			interaction,
			http_client,
			application_id,
			format!("Server `{}` is already blacklisted.", guild_id),
		)
		.await;
	}
	tracing::info!(%guild_id, "Server added to the blacklist");

	let server_name = server_name(guild_id, http_client, bot_state).await;
	let embed = EmbedBuilder::new()
		.title("🚫 Server Blacklisted")
		.description(format!(
			"**{}** (`{}`) has been added to the blacklist.\nMembers can no longer use bot commands.",
			server_name, guild_id
		))
		.color(ERROR_COLOR)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

fn invalid_server_id(server_id_text: &str) -> String {
	format!("`{}` is not a valid server ID.", server_id_text.replace('`', ""))
}

/// Looks up a server's name, first in the cache and then over the API. Servers the bot can't see are unknown.
async fn server_name(guild_id: Id<GuildMarker>, http_client: &Client, bot_state: &BotState) -> String {
	if let Some(name) = bot_state.guild_name(guild_id) {
		return name;
	}
	let guild = match http_client.guild(guild_id).await {
		Ok(response) => response.model().await.ok(),
		Err(_) => None,
	};
	guild
		.map(|guild| guild.name)
		.unwrap_or_else(|| String::from(UNKNOWN_SERVER))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn invalid_ids_are_quoted_safely() {
		assert_eq!(invalid_server_id("abc"), "`abc` is not a valid server ID.");
		assert_eq!(invalid_server_id("a`b"), "`ab` is not a valid server ID.");
	}

	#[test]
	fn blacklist_is_usable_in_direct_messages() {
		let command = command_definition();
		assert_eq!(
			command.contexts,
			Some(vec![InteractionContextType::Guild, InteractionContextType::BotDm])
		);
		assert_eq!(command.default_member_permissions, None);
	}
}
