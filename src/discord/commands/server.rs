// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{integer_option, subcommand};
use crate::discord::state::BotState;
use crate::discord::utils::emoji_pages::{emoji_page_buttons, emoji_page_count, emoji_page_embed, fetch_emoji_entries};
use crate::discord::utils::format::lines_within_limit;
use crate::discord::utils::pagination::requested_page;
use crate::discord::utils::permissions::{bot_permissions, member_permissions, missing_permission_message};
use crate::discord::utils::responses::{
	DEFAULT_COLOR, ERROR_COLOR, send_embed, send_ephemeral_message, send_message, send_response,
};
use crate::discord::utils::timestamp::{datetime_from_id, discord_timestamp_tag, now_timestamp};
use miette::{IntoDiagnostic, bail};
use std::future::IntoFuture;
use twilight_http::client::Client;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandDataOption};
use twilight_model::channel::ChannelType;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::{Ban, Permissions};
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, GuildMarker};
use twilight_util::builder::InteractionResponseDataBuilder;
use twilight_util::builder::command::{CommandBuilder, IntegerBuilder, SubCommandBuilder};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder, ImageSource};
use twilight_validate::embed::DESCRIPTION_LENGTH;

const BANS_SHOWN: usize = 25;
const BAN_SEPARATOR: &str = "\n\n";
const MEMBERS_COUNTED: u16 = 1000;

pub fn command_definition() -> Command {
	let page_option = IntegerBuilder::new("page", "Page number (default: 1)")
		.min_value(1)
		.build();

	let info_subcommand = SubCommandBuilder::new("info", "Display detailed server information").build();
	let emojis_subcommand = SubCommandBuilder::new("emojis", "Display all custom server emojis with pagination")
		.option(page_option)
		.build();
	let banlist_subcommand =
		SubCommandBuilder::new("banlist", "View server ban list (requires Ban Members permission)").build();
	let membercount_subcommand =
		SubCommandBuilder::new("membercount", "Show breakdown of members (humans vs bots)").build();

	CommandBuilder::new("server", "Server information commands", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.option(info_subcommand)
		.option(emojis_subcommand)
		.option(banlist_subcommand)
		.option(membercount_subcommand)
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
		bail!("Server command was used outside of a guild");
	};

	let (subcommand_name, options) = subcommand(command_data)?;
	match subcommand_name {
		"info" => server_info(interaction, guild_id, http_client, application_id).await,
		"emojis" => server_emojis(interaction, options, guild_id, http_client, application_id, bot_state).await,
		"banlist" => ban_list(interaction, guild_id, http_client, application_id).await,
		"membercount" => member_count(interaction, guild_id, http_client, application_id).await,
		_ => bail!("Unknown server subcommand encountered: {}", subcommand_name),
	}
}

async fn server_info(
	interaction: &InteractionCreate,
	guild_id: Id<GuildMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	let guild_future = http_client.guild(guild_id).with_counts(true).into_future();
	let channels_future = http_client.guild_channels(guild_id).into_future();
	let (guild, channels) = tokio::join!(guild_future, channels_future);
	let guild = guild.into_diagnostic()?.model().await.into_diagnostic()?;
	let channels = channels.into_diagnostic()?.models().await.into_diagnostic()?;

	let text_channels = channels
		.iter()
		.filter(|channel| channel.kind == ChannelType::GuildText)
		.count();
	let voice_channels = channels
		.iter()
		.filter(|channel| channel.kind == ChannelType::GuildVoice)
		.count();
	let created = datetime_from_id(guild.id)
		.map(|created| discord_timestamp_tag(&created))
		.unwrap_or_else(|| String::from("Unknown"));
	let member_count = guild
		.approximate_member_count
		.map_or_else(|| String::from("Unknown"), |count| count.to_string());

	let fields = [
		("Server Name", guild.name.clone()),
		("Server ID", guild.id.to_string()),
		("Owner", guild.owner_id.mention().to_string()),
		("Created", created),
		("Member Count", member_count),
		("Boost Level", format!("Level {}", u8::from(guild.premium_tier))),
		("Boost Count", guild.premium_subscription_count.unwrap_or(0).to_string()),
		("Verification Level", format!("{:?}", guild.verification_level)),
		("Text Channels", text_channels.to_string()),
		("Voice Channels", voice_channels.to_string()),
		("Roles", guild.roles.len().to_string()),
		("Emojis", guild.emojis.len().to_string()),
	];

	let mut embed = EmbedBuilder::new()
		.title(format!("{} Server Information", guild.name))
		.color(DEFAULT_COLOR);
	if let Some(icon) = guild.icon {
		let icon_url = format!("https://cdn.discordapp.com/icons/{}/{}.png", guild.id, icon);
		embed = embed.thumbnail(ImageSource::url(icon_url).into_diagnostic()?);
	}
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

async fn server_emojis(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
	guild_id: Id<GuildMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let Some(page) = requested_page(integer_option(options, "page")?) else {
		bail!("Command data is malformed; `/server emojis` page is below the minimum");
	};

	let emojis = fetch_emoji_entries(guild_id, http_client).await?;
	if emojis.is_empty() {
		return send_message(interaction, http_client, application_id, "This server has no custom emojis.").await;
	}

	let total_pages = emoji_page_count(emojis.len());
	if page > total_pages {
		return send_message(
			interaction,
			http_client,
			application_id,
			format!("Invalid page number. This server has {} page(s) of emojis.", total_pages),
		)
		.await;
	}

	let guild_name = bot_state
		.guild_name(guild_id)
		.unwrap_or_else(|| String::from("Server"));
	let embed = emoji_page_embed(&guild_name, &emojis, page).into_diagnostic()?;
	let buttons = emoji_page_buttons(guild_id, page, total_pages);
	let response = InteractionResponseDataBuilder::new()
		.embeds([embed])
		.components([buttons])
		.allowed_mentions(AllowedMentions::default())
		.build();
	send_response(interaction, http_client, application_id, response).await
}

async fn ban_list(
	interaction: &InteractionCreate,
	guild_id: Id<GuildMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	if let Some(message) = missing_permission_message(
		member_permissions(interaction),
		bot_permissions(interaction),
		Permissions::BAN_MEMBERS,
		"Ban Members",
	) {
		return send_ephemeral_message(interaction, http_client, application_id, message).await;
	}

	let bans = match http_client.bans(guild_id).await {
		Ok(response) => response.models().await.into_diagnostic()?,
		Err(error) => {
			tracing::warn!(source = ?error, %guild_id, "Failed to fetch a server's ban list");
			return send_ephemeral_message(
				interaction,
				http_client,
				application_id,
				"Failed to fetch ban list. Make sure the bot has the necessary permissions.",
			)
			.await;
		}
	};
	if bans.is_empty() {
		return send_message(interaction, http_client, application_id, "This server has no banned users.").await;
	}

	let entries: Vec<String> = bans.iter().take(BANS_SHOWN).map(ban_list_entry).collect();
	let lines = ban_list_lines(&entries);
	let guild_name = http_client
		.guild(guild_id)
		.await
		.into_diagnostic()?
		.model()
		.await
		.into_diagnostic()?
		.name;
	let footer = EmbedFooterBuilder::new(format!(
		"Showing {} of {} banned users",
		lines.len(),
		bans.len()
	))
	.build();
	let embed = EmbedBuilder::new()
		.title(format!("{} Ban List", guild_name))
		.description(lines.join(BAN_SEPARATOR))
		.footer(footer)
		.color(ERROR_COLOR)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

/// The entries that fit in the embed description.
fn ban_list_lines(entries: &[String]) -> &[String] {
	&entries[..lines_within_limit(entries, BAN_SEPARATOR, DESCRIPTION_LENGTH)]
}

fn ban_list_entry(ban: &Ban) -> String {
	let reason = ban.reason.as_deref().unwrap_or("No reason provided");
	format!("**{}** ({})\nReason: {}", ban.user.name, ban.user.id, reason)
}

async fn member_count(
	interaction: &InteractionCreate,
	guild_id: Id<GuildMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	let guild_future = http_client.guild(guild_id).with_counts(true).into_future();
	let members_future = http_client
		.guild_members(guild_id)
		.limit(MEMBERS_COUNTED)
		.into_future();
	let (guild, members) = tokio::join!(guild_future, members_future);
	let guild = guild.into_diagnostic()?.model().await.into_diagnostic()?;
	let members = members.into_diagnostic()?.models().await.into_diagnostic()?;

	let bots = members.iter().filter(|member| member.user.bot).count();
	let humans = members.len() - bots;
	let total = guild.approximate_member_count.unwrap_or(members.len() as u64);

	let fields = [
		("Total Members", total.to_string()),
		("Humans", humans.to_string()),
		("Bots", bots.to_string()),
		("Human Percentage", percentage(humans, members.len())),
		("Bot Percentage", percentage(bots, members.len())),
	];
	let mut embed = EmbedBuilder::new()
		.title(format!("{} Member Statistics", guild.name))
		.color(DEFAULT_COLOR);
	for (name, value) in fields {
		embed = embed.field(EmbedFieldBuilder::new(name, value).inline());
	}
	if total > members.len() as u64 {
		let footer = EmbedFooterBuilder::new(format!("Humans and bots counted from the first {} members", members.len()));
		embed = embed.footer(footer);
	}
	let embed = embed
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

fn percentage(part: usize, whole: usize) -> String {
	if whole == 0 {
		return String::from("0.0%");
	}
	format!("{:.1}%", part as f64 / whole as f64 * 100.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn long_ban_reasons_stay_within_the_description_limit() {
		let entries: Vec<String> = (0..25)
			.map(|index| format!("**user{}** ({})\nReason: {}", index, index + 1, "x".repeat(512)))
			.collect();
		let lines = ban_list_lines(&entries);
		assert_eq!(lines.len(), 7);
		let description = lines.join(BAN_SEPARATOR);
		assert!(description.chars().count() <= DESCRIPTION_LENGTH);
		assert!(description.starts_with("**user0**"));
		assert!(EmbedBuilder::new().description(description).validate().is_ok());
	}

	#[test]
	fn percentages_have_one_decimal() {
		assert_eq!(percentage(1, 3), "33.3%");
		assert_eq!(percentage(2, 3), "66.7%");
		assert_eq!(percentage(5, 5), "100.0%");
		assert_eq!(percentage(0, 0), "0.0%");
	}
}
