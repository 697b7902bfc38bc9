// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{command_definitions, integer_option, subcommand};
use crate::discord::state::BotState;
use crate::discord::utils::format::format_uptime;
use crate::discord::utils::pagination::{page_count, page_slice, requested_page};
use crate::discord::utils::responses::{DEFAULT_COLOR, OWNER_ONLY, send_embed, send_ephemeral_message};
use crate::discord::utils::timestamp::now_timestamp;
use miette::{IntoDiagnostic, bail};
use std::time::Instant;
use twilight_http::client::Client;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandDataOption};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, GuildMarker};
use twilight_util::builder::command::{CommandBuilder, IntegerBuilder, SubCommandBuilder};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder};

const SERVERS_PER_PAGE: usize = 10;

pub fn command_definition() -> Command {
	let page_option = IntegerBuilder::new("page", "Page number (default: 1)")
		.min_value(1)
		.build();

	let ping_subcommand = SubCommandBuilder::new("ping", "Check bot latency and API response time").build();
	let uptime_subcommand = SubCommandBuilder::new("uptime", "Display bot uptime").build();
	let stats_subcommand = SubCommandBuilder::new("stats", "Display bot statistics").build();
	let invite_subcommand = SubCommandBuilder::new("invite", "Get bot invite link").build();
	let serverlist_subcommand = SubCommandBuilder::new("serverlist", "List all servers the bot is in (Owner only)")
		.option(page_option)
		.build();

	CommandBuilder::new("bot", "Bot information and utility commands", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild, InteractionContextType::BotDm])
		.option(ping_subcommand)
		.option(uptime_subcommand)
		.option(stats_subcommand)
		.option(invite_subcommand)
		.option(serverlist_subcommand)
		.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let (subcommand_name, options) = subcommand(command_data)?;
	match subcommand_name {
		"ping" => ping(interaction, http_client, application_id).await,
		"uptime" => uptime(interaction, http_client, application_id, bot_state).await,
		"stats" => stats(interaction, http_client, application_id, bot_state).await,
		"invite" => invite(interaction, http_client, application_id).await,
		"serverlist" => server_list(interaction, options, http_client, application_id, bot_state).await,
		_ => bail!("Unknown bot subcommand encountered: {}", subcommand_name),
	}
}

/// Times a lightweight API request.
async fn ping(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	let start = Instant::now();
	http_client.current_user().await.into_diagnostic()?;
	let latency = start.elapsed().as_millis();

	let latency_field = EmbedFieldBuilder::new("API Latency", format!("{}ms", latency))
		.inline()
		.build();
	let embed = EmbedBuilder::new()
		.title("🏓 Pong!")
		.field(latency_field)
		.color(DEFAULT_COLOR)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

async fn uptime(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let uptime = format_uptime(bot_state.started_at.elapsed());
	let embed = EmbedBuilder::new()
		.title("⏰ Bot Uptime")
		.description(format!("Bot has been running for: **{}**", uptime))
		.color(DEFAULT_COLOR)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

async fn stats(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let cache_stats = bot_state.cache.stats();
	let fields = [
		("Servers", cache_stats.guilds().to_string()),
		("Users", cache_stats.users().to_string()),
		("Channels", cache_stats.channels().to_string()),
		("Commands", command_definitions().len().to_string()),
		("Uptime", format_uptime(bot_state.started_at.elapsed())),
		("Version", env!("CARGO_PKG_VERSION").to_string()),
	];

	let footer = EmbedFooterBuilder::new(format!("Bot ID: {}", bot_state.bot_user_id)).build();
	let mut embed = EmbedBuilder::new()
		.title("📊 Bot Statistics")
		.color(DEFAULT_COLOR)
		.footer(footer);
	for (name, value) in fields {
		embed = embed.field(EmbedFieldBuilder::new(name, value).inline());
	}
	let embed = embed
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

async fn invite(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	let link_field = EmbedFieldBuilder::new(
		"Invite Link",
		format!("[Click here to invite]({})", invite_url(application_id)),
	)
	.build();
	let permissions_field = EmbedFieldBuilder::new(
		"Permissions",
		"The bot will request the necessary permissions to function properly.",
	)
	.build();
	let embed = EmbedBuilder::new()
		.title("🔗 Invite Bot")
		.description("Click the link below to invite me to your server!")
		.field(link_field)
		.field(permissions_field)
		.color(DEFAULT_COLOR)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

/// The permissions the bot's features use.
fn invite_permissions() -> Permissions {
	Permissions::VIEW_CHANNEL
		| Permissions::SEND_MESSAGES
		| Permissions::EMBED_LINKS
		| Permissions::READ_MESSAGE_HISTORY
		| Permissions::USE_SLASH_COMMANDS
		| Permissions::MANAGE_ROLES
		| Permissions::MANAGE_CHANNELS
		| Permissions::MANAGE_GUILD_EXPRESSIONS
		| Permissions::MANAGE_MESSAGES
		| Permissions::BAN_MEMBERS
}

fn invite_url(application_id: Id<ApplicationMarker>) -> String {
	format!(
		"https://discord.com/api/oauth2/authorize?client_id={}&permissions={}&scope=bot%20applications.commands",
		application_id,
		invite_permissions().bits()
	)
}

async fn server_list(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
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

	let Some(page) = requested_page(integer_option(options, "page")?) else {
		bail!("Command data is malformed; `/bot serverlist` page is below the minimum");
	};

	let mut servers: Vec<(Id<GuildMarker>, String, Option<u64>)> = bot_state
		.cache
		.iter()
		.guilds()
		.map(|entry| {
			let guild = entry.value();
			(guild.id(), guild.name().to_string(), guild.member_count())
		})
		.collect();
	servers.sort_by_key(|(guild_id, _, _)| *guild_id);

	let total_pages = page_count(servers.len(), SERVERS_PER_PAGE);
	if page > total_pages {
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			format!("Invalid page number. There are {} page(s) of servers.", total_pages),
		)
		.await;
	}

	let first_number = (page - 1) * SERVERS_PER_PAGE + 1;
	let description: Vec<String> = page_slice(&servers, page, SERVERS_PER_PAGE)
		.iter()
		.enumerate()
		.map(|(index, (guild_id, name, member_count))| {
			let member_count = member_count.map_or_else(|| String::from("Unknown"), |count| count.to_string());
			format!(
				"{}. **{}**\n   Members: {}\n   Server ID: {}",
				first_number + index,
				name,
				member_count,
				guild_id
			)
		})
		.collect();

	let footer = EmbedFooterBuilder::new(format!(
		"Page {} of {} • {} total servers",
		page,
		total_pages,
		servers.len()
	))
	.build();
	let embed = EmbedBuilder::new()
		.title("🤖 Bot Server List")
		.description(description.join("\n\n"))
		.footer(footer)
		.color(DEFAULT_COLOR)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn invite_url_requests_bot_permissions() {
		let url = invite_url(Id::new(1234));
		assert!(url.starts_with("https://discord.com/api/oauth2/authorize?client_id=1234&permissions="));
		assert!(url.ends_with("&scope=bot%20applications.commands"));

		let permissions = invite_permissions();
		assert!(permissions.contains(Permissions::MANAGE_MESSAGES | Permissions::MANAGE_ROLES));
		assert!(!permissions.contains(Permissions::ADMINISTRATOR));
		assert!(url.contains(&format!("permissions={}&", permissions.bits())));
	}

	#[test]
	fn every_command_is_counted() {
		let names: Vec<String> = command_definitions().into_iter().map(|command| command.name).collect();
		assert_eq!(names, vec![
				"afk",
				"autorole",
				"blacklist",
				"bot",
				"channel",
				"emoji",
				"role",
				"server",
				"stick"
			]);
	}
}
