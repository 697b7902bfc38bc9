// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{string_option, subcommand};
use crate::discord::state::BotState;
use crate::discord::utils::api_errors::{MAXIMUM_EMOJIS_REACHED, MISSING_PERMISSIONS, api_error_code};
use crate::discord::utils::permissions::{bot_permissions, member_permissions, missing_permission_message};
use crate::discord::utils::responses::{
	BLURPLE_COLOR, ERROR_COLOR, SUCCESS_COLOR, send_embed, send_ephemeral_message,
};
use crate::discord::utils::timestamp::{datetime_from_id, discord_timestamp_tag, now_timestamp};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use miette::{IntoDiagnostic, bail};
use twilight_http::client::Client;
use twilight_http::request::AuditLogReason;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, EmojiMarker, GuildMarker};
use twilight_util::builder::command::{CommandBuilder, StringBuilder, SubCommandBuilder};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, ImageSource};

const MIN_EMOJI_NAME_LENGTH: usize = 2;
const MAX_EMOJI_NAME_LENGTH: usize = 32;

pub fn command_definition() -> Command {
	let info_subcommand = SubCommandBuilder::new("info", "Display information about an emoji")
		.option(
			StringBuilder::new("emoji", "The emoji to get information about")
				.required(true)
				.build(),
		)
		.build();
	let steal_subcommand = SubCommandBuilder::new("steal", "Steal an emoji from another server")
		.option(StringBuilder::new("emoji", "The emoji to steal").required(true).build())
		.option(
			StringBuilder::new("name", "Custom name for the emoji (optional)")
				.max_length(MAX_EMOJI_NAME_LENGTH as u16)
				.build(),
		)
		.build();
	let delete_subcommand = SubCommandBuilder::new("delete", "Delete an emoji from this server")
		.option(StringBuilder::new("emoji", "The emoji to delete").required(true).build())
		.build();

	CommandBuilder::new("emoji", "Emoji management commands", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.default_member_permissions(Permissions::MANAGE_GUILD_EXPRESSIONS)
		.option(info_subcommand)
		.option(steal_subcommand)
		.option(delete_subcommand)
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
		bail!("Emoji command was used outside of a guild");
	};

	let (subcommand_name, options) = subcommand(command_data)?;
	if subcommand_name != "info" {
		if let Some(message) = missing_permission_message(
			member_permissions(interaction),
			bot_permissions(interaction),
			Permissions::MANAGE_GUILD_EXPRESSIONS,
			"Manage Expressions",
		) {
			return send_ephemeral_message(interaction, http_client, application_id, message).await;
		}
	}

	let Some(emoji_input) = string_option(options, "emoji")? else {
		bail!("Command data is malformed; expected `/emoji {}` to have required option `emoji`", subcommand_name);
	};
	let Some(emoji) = parse_custom_emoji(emoji_input) else {
		let message = match subcommand_name {
			"info" => "Please provide a valid custom emoji (not a Unicode emoji).",
			"steal" => "Please provide a valid custom emoji to steal.",
			_ => "Please provide a valid custom emoji to delete.",
		};
		return send_ephemeral_message(interaction, http_client, application_id, message).await;
	};

	match subcommand_name {
		"info" => emoji_info(interaction, guild_id, &emoji, http_client, application_id, bot_state).await,
		"steal" => {
			let name = string_option(options, "name")?.unwrap_or(emoji.name);
			steal_emoji(interaction, guild_id, &emoji, name, http_client, application_id, bot_state).await
		}
		"delete" => delete_emoji(interaction, guild_id, &emoji, http_client, application_id).await,
		_ => bail!("Unknown emoji subcommand encountered: {}", subcommand_name),
	}
}

/// A custom emoji as written in message markup: `<:name:id>` or `<a:name:id>`.
#[derive(Debug, Eq, PartialEq)]
struct CustomEmoji<'a> {
	animated: bool,
	name: &'a str,
	id: Id<EmojiMarker>,
}

impl CustomEmoji<'_> {
	fn url(&self) -> String {
		emoji_url(self.id, self.animated)
	}
}

fn emoji_url(id: Id<EmojiMarker>, animated: bool) -> String {
	let extension = if animated { "gif" } else { "png" };
	format!("https://cdn.discordapp.com/emojis/{}.{}", id, extension)
}

fn emoji_markup(name: &str, id: Id<EmojiMarker>, animated: bool) -> String {
	let prefix = if animated { "a" } else { "" };
	format!("<{}:{}:{}>", prefix, name, id)
}

/// Finds the first custom emoji anywhere in the input.
fn parse_custom_emoji(input: &str) -> Option<CustomEmoji<'_>> {
	input
		.match_indices('<')
		.find_map(|(start, _)| parse_emoji_markup(&input[start + 1..]))
}

fn parse_emoji_markup(markup: &str) -> Option<CustomEmoji<'_>> {
	let (animated, rest) = match markup.strip_prefix("a:") {
		Some(rest) => (true, rest),
		None => (false, markup.strip_prefix(':')?),
	};
	let (name, rest) = rest.split_once(':')?;
	let (id, _) = rest.split_once('>')?;
	if name.is_empty() || !name.chars().all(is_word_char) {
		return None;
	}
	if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
		return None;
	}
	let id = id.parse().ok().and_then(Id::new_checked)?;
	Some(CustomEmoji { animated, name, id })
}

fn is_word_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_'
}

fn valid_emoji_name(name: &str) -> bool {
	(MIN_EMOJI_NAME_LENGTH..=MAX_EMOJI_NAME_LENGTH).contains(&name.chars().count()) && name.chars().all(is_word_char)
}

fn image_data_uri(image: &[u8], animated: bool) -> String {
	let media_type = if animated { "image/gif" } else { "image/png" };
	format!("data:{};base64,{}", media_type, STANDARD.encode(image))
}

fn steal_failure_message(error_code: Option<u64>) -> String {
	let detail = match error_code {
		Some(MAXIMUM_EMOJIS_REACHED) => "This server has reached the maximum number of emojis.",
		Some(MISSING_PERMISSIONS) => "Bot lacks permissions to manage emojis.",
		_ => "Please try again later.",
	};
	format!("Failed to steal the emoji. {}", detail)
}

fn delete_failure_message(error_code: Option<u64>) -> String {
	let detail = match error_code {
		Some(MISSING_PERMISSIONS) => "Bot lacks permissions to manage emojis.",
		_ => "Please try again later.",
	};
	format!("Failed to delete the emoji. {}", detail)
}

fn yes_no(value: bool) -> String {
	String::from(if value { "Yes" } else { "No" })
}

async fn emoji_info(
	interaction: &InteractionCreate,
	guild_id: Id<GuildMarker>,
	emoji: &CustomEmoji<'_>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	// Emojis from other servers can't be fetched, so their markup is all there is to go on.
	let guild_emoji = match http_client.emoji(guild_id, emoji.id).await {
		Ok(response) => Some(response.model().await.into_diagnostic()?),
		Err(error) => {
			tracing::debug!(source = ?error, emoji_id = %emoji.id, "Emoji isn't from this server");
			None
		}
	};
	let (name, animated) = match guild_emoji.as_ref() {
		Some(guild_emoji) => (guild_emoji.name.as_str(), guild_emoji.animated),
		None => (emoji.name, emoji.animated),
	};
	let url = emoji_url(emoji.id, animated);
	let created = datetime_from_id(emoji.id)
		.map(|created| discord_timestamp_tag(&created))
		.unwrap_or_else(|| String::from("Unknown"));

	let mut fields = vec![
		("Name", name.to_string()),
		("ID", emoji.id.to_string()),
		("Animated", yes_no(animated)),
		("Created", created),
		("URL", format!("[Click here]({})", url)),
	];
	if guild_emoji.is_some() {
		let server_name = bot_state
			.guild_name(guild_id)
			.unwrap_or_else(|| String::from("This server"));
		fields.push(("Server", server_name));
	}

	let mut embed = EmbedBuilder::new()
		.title(format!("Emoji Information: {}", name))
		.thumbnail(ImageSource::url(&url).into_diagnostic()?)
		.color(BLURPLE_COLOR);
	for (field_name, value) in fields {
		embed = embed.field(EmbedFieldBuilder::new(field_name, value).inline());
	}
	let embed = embed
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

async fn download_image(web_client: &reqwest::Client, url: &str) -> Result<Vec<u8>, reqwest::Error> {
	let response = web_client.get(url).send().await?.error_for_status()?;
	Ok(response.bytes().await?.to_vec())
}

async fn steal_emoji(
	interaction: &InteractionCreate,
	guild_id: Id<GuildMarker>,
	emoji: &CustomEmoji<'_>,
	name: &str,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	if !valid_emoji_name(name) {
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			"Emoji names must be 2 to 32 characters long and use only letters, numbers and underscores.",
		)
		.await;
	}

	let existing_emojis = http_client
		.emojis(guild_id)
		.await
		.into_diagnostic()?
		.models()
		.await
		.into_diagnostic()?;
	if existing_emojis.iter().any(|existing| existing.name == name) {
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			format!("An emoji with the name \"{}\" already exists in this server.", name),
		)
		.await;
	}

	let image = match download_image(&bot_state.web_client, &emoji.url()).await {
		Ok(image) => image,
		Err(error) => {
			tracing::warn!(source = ?error, emoji_id = %emoji.id, "Failed to download an emoji image");
			return send_ephemeral_message(interaction, http_client, application_id, steal_failure_message(None))
				.await;
		}
	};
	let image = image_data_uri(&image, emoji.animated);

	let user_name = interaction.author().map_or("unknown user", |user| user.name.as_str());
	let create_result = http_client
		.create_emoji(guild_id, name, &image)
		.reason(&format!("Emoji stolen by {}", user_name))
		.await;
	let created = match create_result {
		Ok(response) => response.model().await.into_diagnostic()?,
		Err(error) => {
			tracing::warn!(source = ?error, %guild_id, emoji_id = %emoji.id, "Failed to create a stolen emoji");
			let message = steal_failure_message(api_error_code(&error));
			return send_ephemeral_message(interaction, http_client, application_id, message).await;
		}
	};
	tracing::info!(%guild_id, emoji_id = %created.id, name = %created.name, "Stole an emoji");

	let embed = EmbedBuilder::new()
		.title("Emoji Stolen Successfully!")
		.description(format!(
			"{} has been added to this server.",
			emoji_markup(&created.name, created.id, created.animated)
		))
		.field(EmbedFieldBuilder::new("Name", created.name.clone()).inline())
		.field(EmbedFieldBuilder::new("ID", created.id.to_string()).inline())
		.field(EmbedFieldBuilder::new("Animated", yes_no(created.animated)).inline())
		.thumbnail(ImageSource::url(emoji_url(created.id, created.animated)).into_diagnostic()?)
		.color(SUCCESS_COLOR)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

async fn delete_emoji(
	interaction: &InteractionCreate,
	guild_id: Id<GuildMarker>,
	emoji: &CustomEmoji<'_>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	if http_client.emoji(guild_id, emoji.id).await.is_err() {
		return send_ephemeral_message(interaction, http_client, application_id, "Emoji not found in this server.")
			.await;
	}

	let user_name = interaction.author().map_or("unknown user", |user| user.name.as_str());
	let delete_result = http_client
		.delete_emoji(guild_id, emoji.id)
		.reason(&format!("Emoji deleted by {}", user_name))
		.await;
	if let Err(error) = delete_result {
		tracing::warn!(source = ?error, %guild_id, emoji_id = %emoji.id, "Failed to delete an emoji");
		let message = delete_failure_message(api_error_code(&error));
		return send_ephemeral_message(interaction, http_client, application_id, message).await;
	}
	tracing::info!(%guild_id, emoji_id = %emoji.id, "Deleted an emoji");

	let embed = EmbedBuilder::new()
		.title("Emoji Deleted Successfully!")
		.description(format!("The emoji \"{}\" has been removed from this server.", emoji.name))
		.color(ERROR_COLOR)
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
	fn parses_static_and_animated_markup() {
		assert_eq!(
			parse_custom_emoji("<:anchor:123456789>"),
			Some(CustomEmoji {
				animated: false,
				name: "anchor",
				id: Id::new(123456789),
			})
		);
		let animated = parse_custom_emoji("look <a:wave_hi:42> here").unwrap();
		assert!(animated.animated);
		assert_eq!(animated.name, "wave_hi");
		assert_eq!(animated.url(), "https://cdn.discordapp.com/emojis/42.gif");
	}

	#[test]
	fn rejects_unicode_and_broken_markup() {
		assert_eq!(parse_custom_emoji("😀"), None);
		assert_eq!(parse_custom_emoji("<:anchor:>"), None);
		assert_eq!(parse_custom_emoji("<:bad-name:12>"), None);
		assert_eq!(parse_custom_emoji("<:anchor:12x>"), None);
		assert_eq!(parse_custom_emoji("<:anchor:0>"), None);
		assert_eq!(parse_custom_emoji("<b:anchor:12>"), None);
	}

	#[test]
	fn skips_stray_brackets_before_the_emoji() {
		let emoji = parse_custom_emoji("a < b <:anchor:7>").unwrap();
		assert_eq!(emoji.id, Id::new(7));
		assert_eq!(emoji_markup(emoji.name, emoji.id, false), "<:anchor:7>");
	}

	#[test]
	fn emoji_names_follow_discord_rules() {
		assert!(valid_emoji_name("ok"));
		assert!(valid_emoji_name("pin_2"));
		assert!(!valid_emoji_name("x"));
		assert!(!valid_emoji_name("has space"));
		assert!(!valid_emoji_name(&"a".repeat(33)));
	}

	#[test]
	fn images_upload_as_data_uris() {
		assert_eq!(image_data_uri(b"png", false), "data:image/png;base64,cG5n");
		assert!(image_data_uri(b"gif", true).starts_with("data:image/gif;base64,"));
	}

	#[test]
	fn failures_explain_discord_errors() {
		assert_eq!(
			steal_failure_message(Some(MAXIMUM_EMOJIS_REACHED)),
			"Failed to steal the emoji. This server has reached the maximum number of emojis."
		);
		assert_eq!(
			steal_failure_message(Some(MISSING_PERMISSIONS)),
			"Failed to steal the emoji. Bot lacks permissions to manage emojis."
		);
		assert_eq!(steal_failure_message(None), "Failed to steal the emoji. Please try again later.");
		assert_eq!(
			delete_failure_message(Some(MAXIMUM_EMOJIS_REACHED)),
			"Failed to delete the emoji. Please try again later."
		);
	}

	#[test]
	fn steal_and_delete_are_registered() {
		let command = command_definition();
		let names: Vec<&str> = command.options.iter().map(|option| option.name.as_str()).collect();
		assert_eq!(names, ["info", "steal", "delete"]);
		assert_eq!(
			command.default_member_permissions,
			Some(Permissions::MANAGE_GUILD_EXPRESSIONS)
		);
	}
}
