// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{channel_option, string_option, subcommand};
use crate::discord::state::BotState;
use crate::discord::utils::permissions::{bot_permissions, member_permissions, missing_permission_message};
use crate::discord::utils::responses::{
	DEFAULT_COLOR, ERROR_COLOR, SUCCESS_COLOR, defer_response, send_embed, send_ephemeral_message,
	update_deferred_embed,
};
use crate::discord::utils::timestamp::{datetime_from_id, discord_timestamp_tag, now_timestamp};
use miette::{IntoDiagnostic, bail};
use twilight_http::client::Client;
use twilight_http::request::AuditLogReason;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandDataOption};
use twilight_model::channel::permission_overwrite::{
	PermissionOverwrite as ChannelOverwrite, PermissionOverwriteType as ChannelOverwriteType,
};
use twilight_model::channel::{Channel, ChannelType};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::http::permission_overwrite::{PermissionOverwrite, PermissionOverwriteType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, ChannelMarker, GenericMarker, GuildMarker};
use twilight_util::builder::command::{ChannelBuilder, CommandBuilder, StringBuilder, SubCommandBuilder};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};

const MAX_CHANNEL_NAME_LENGTH: u16 = 100;

pub fn command_definition() -> Command {
	let unhideall_subcommand = SubCommandBuilder::new("unhideall", "Unhide all channels for @everyone role").build();
	let hideall_subcommand = SubCommandBuilder::new("hideall", "Hide all channels from @everyone role").build();
	let unlockall_subcommand = SubCommandBuilder::new("unlockall", "Unlock all channels for @everyone role").build();
	let lockall_subcommand = SubCommandBuilder::new("lockall", "Lock all channels from @everyone role").build();
	let clone_subcommand = SubCommandBuilder::new("clone", "Clone a channel")
		.option(
			ChannelBuilder::new("channel", "Channel to clone")
				.required(true)
				.build(),
		)
		.option(
			StringBuilder::new("name", "Name for the cloned channel (optional)")
				.max_length(MAX_CHANNEL_NAME_LENGTH)
				.build(),
		)
		.build();
	let delete_subcommand = SubCommandBuilder::new("delete", "Delete a channel")
		.option(
			ChannelBuilder::new("channel", "Channel to delete")
				.required(true)
				.build(),
		)
		.build();
	let info_subcommand = SubCommandBuilder::new("info", "Display detailed information about a channel")
		.option(
			ChannelBuilder::new(
				"channel",
				"Channel to get information about (defaults to current channel)",
			)
			.build(),
		)
		.build();
	let lock_subcommand = SubCommandBuilder::new("lock", "Lock a specific channel from @everyone role")
		.option(ChannelBuilder::new("channel", "Channel to lock").required(true).build())
		.build();
	let unlock_subcommand = SubCommandBuilder::new("unlock", "Unlock a specific channel for @everyone role")
		.option(
			ChannelBuilder::new("channel", "Channel to unlock")
				.required(true)
				.build(),
		)
		.build();

	CommandBuilder::new("channel", "Channel management commands", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.default_member_permissions(Permissions::MANAGE_CHANNELS)
		.option(unhideall_subcommand)
		.option(hideall_subcommand)
		.option(unlockall_subcommand)
		.option(lockall_subcommand)
		.option(clone_subcommand)
		.option(delete_subcommand)
		.option(info_subcommand)
		.option(lock_subcommand)
		.option(unlock_subcommand)
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
		bail!("Channel command was used outside of a guild");
	};

	if let Some(message) = missing_permission_message(
		member_permissions(interaction),
		bot_permissions(interaction),
		Permissions::MANAGE_CHANNELS,
		"Manage Channels",
	) {
		return send_ephemeral_message(interaction, http_client, application_id, message).await;
	}

	let (subcommand_name, options) = subcommand(command_data)?;
	match subcommand_name {
		"unhideall" => change_all_channels(interaction, guild_id, BulkChannelChange::Unhide, http_client, application_id).await,
		"hideall" => change_all_channels(interaction, guild_id, BulkChannelChange::Hide, http_client, application_id).await,
		"unlockall" => change_all_channels(interaction, guild_id, BulkChannelChange::Unlock, http_client, application_id).await,
		"lockall" => change_all_channels(interaction, guild_id, BulkChannelChange::Lock, http_client, application_id).await,
		"clone" => clone_channel(interaction, options, guild_id, http_client, application_id).await,
		"delete" => delete_channel(interaction, command_data, options, http_client, application_id).await,
		"info" => channel_info(interaction, options, http_client, application_id, bot_state).await,
		"lock" => lock_channel(interaction, options, guild_id, OverwriteChange::Deny, http_client, application_id).await,
		"unlock" => lock_channel(interaction, options, guild_id, OverwriteChange::Reset, http_client, application_id).await,
		_ => bail!("Unknown channel subcommand encountered: {}", subcommand_name),
	}
}

fn audit_reason(interaction: &InteractionCreate, action: &str) -> String {
	let user_name = interaction.author().map_or("unknown user", |user| user.name.as_str());
	format!("{} by {}", action, user_name)
}

/// Whether @everyone's overwrite should deny permissions or go back to what the roles allow.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum OverwriteChange {
	Deny,
	Reset,
}

/// Builds the new @everyone overwrite for a channel, keeping whatever else the existing overwrite sets.
fn everyone_overwrite(
	guild_id: Id<GuildMarker>,
	existing_overwrites: &[ChannelOverwrite],
	permissions: Permissions,
	change: OverwriteChange,
) -> PermissionOverwrite {
	let everyone_id: Id<GenericMarker> = guild_id.cast();
	let (mut allow, mut deny) = existing_overwrites
		.iter()
		.find(|overwrite| overwrite.id == everyone_id && overwrite.kind == ChannelOverwriteType::Role)
		.map_or((Permissions::empty(), Permissions::empty()), |overwrite| {
			(overwrite.allow, overwrite.deny)
		});
	allow.remove(permissions);
	match change {
		OverwriteChange::Deny => deny.insert(permissions),
		OverwriteChange::Reset => deny.remove(permissions),
	}
	PermissionOverwrite {
		allow: Some(allow),
		deny: Some(deny),
		id: everyone_id,
		kind: PermissionOverwriteType::Role,
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BulkChannelChange {
	Hide,
	Unhide,
	Lock,
	Unlock,
}

impl BulkChannelChange {
	fn permissions(self) -> Permissions {
		match self {
			Self::Hide | Self::Unhide => Permissions::VIEW_CHANNEL,
			Self::Lock | Self::Unlock => Permissions::SEND_MESSAGES | Permissions::SPEAK,
		}
	}

	fn overwrite_change(self) -> OverwriteChange {
		match self {
			Self::Hide | Self::Lock => OverwriteChange::Deny,
			Self::Unhide | Self::Unlock => OverwriteChange::Reset,
		}
	}

	/// Categories can be hidden but there's nothing in them to lock.
	fn applies_to(self, kind: ChannelType) -> bool {
		match self {
			Self::Hide | Self::Unhide => matches!(
				kind,
				ChannelType::GuildText | ChannelType::GuildVoice | ChannelType::GuildCategory
			),
			Self::Lock | Self::Unlock => matches!(kind, ChannelType::GuildText | ChannelType::GuildVoice),
		}
	}

	fn title(self) -> &'static str {
		match self {
			Self::Hide => "Channels Hidden",
			Self::Unhide => "Channels Unhidden",
			Self::Lock => "Channels Locked",
			Self::Unlock => "Channels Unlocked",
		}
	}

	fn color(self) -> u32 {
		match self.overwrite_change() {
			OverwriteChange::Deny => ERROR_COLOR,
			OverwriteChange::Reset => SUCCESS_COLOR,
		}
	}

	fn summary(self, succeeded: usize, failed: usize) -> String {
		let (done, direction, verb) = match self {
			Self::Hide => ("hidden", "from", "hide"),
			Self::Unhide => ("unhidden", "for", "unhide"),
			Self::Lock => ("locked", "from", "lock"),
			Self::Unlock => ("unlocked", "for", "unlock"),
		};
		let mut summary = format!("Successfully {} {} channels {} @everyone.", done, succeeded, direction);
		if failed > 0 {
			summary.push_str(&format!("\nFailed to {} {} channels.", verb, failed));
		}
		summary
	}
}

async fn change_all_channels(
	interaction: &InteractionCreate,
	guild_id: Id<GuildMarker>,
	change: BulkChannelChange,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	defer_response(interaction, http_client, application_id).await?;

	let channels = http_client
		.guild_channels(guild_id)
		.await
		.into_diagnostic()?
		.models()
		.await
		.into_diagnostic()?;
	let reason = audit_reason(interaction, "Bulk channel permission change");

	let mut succeeded = 0;
	let mut failed = 0;
	for channel in channels.iter().filter(|channel| change.applies_to(channel.kind)) {
		let overwrite = everyone_overwrite(
			guild_id,
			channel.permission_overwrites.as_deref().unwrap_or_default(),
			change.permissions(),
			change.overwrite_change(),
		);
		let update_result = http_client
			.update_channel_permission(channel.id, &overwrite)
			.reason(&reason)
			.await;
		match update_result {
			Ok(_) => succeeded += 1,
			Err(error) => {
				tracing::warn!(source = ?error, %guild_id, channel_id = %channel.id, ?change, "Failed to change a channel's permissions in bulk");
				failed += 1;
			}
		}
	}
	tracing::info!(%guild_id, ?change, succeeded, failed, "Bulk channel change finished");

	let embed = EmbedBuilder::new()
		.title(change.title())
		.description(change.summary(succeeded, failed))
		.color(change.color())
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	update_deferred_embed(interaction, http_client, application_id, embed).await
}

/// Converts an existing overwrite into the form used when creating a channel.
fn request_overwrite(overwrite: &ChannelOverwrite) -> Option<PermissionOverwrite> {
	let kind = match overwrite.kind {
		ChannelOverwriteType::Member => PermissionOverwriteType::Member,
		ChannelOverwriteType::Role => PermissionOverwriteType::Role,
		_ => return None,
	};
	Some(PermissionOverwrite {
		allow: Some(overwrite.allow),
		deny: Some(overwrite.deny),
		id: overwrite.id,
		kind,
	})
}

fn clone_name(source_name: Option<&str>, requested_name: Option<&str>) -> String {
	match requested_name {
		Some(name) => name.to_string(),
		None => format!("{}-clone", source_name.unwrap_or("channel")),
	}
}

async fn clone_channel(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
	guild_id: Id<GuildMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	let Some(source_id) = channel_option(options, "channel")? else {
		bail!("Command data is malformed; expected `/channel clone` to have required option `channel`");
	};
	let source = fetch_channel(source_id, http_client).await?;
	let name = clone_name(source.name.as_deref(), string_option(options, "name")?);
	let overwrites: Vec<ChannelOverwrite> = source
		.permission_overwrites
		.iter()
		.flatten()
		.filter(|overwrite| request_overwrite(overwrite).is_some())
		.cloned()
		.collect();

	let reason = audit_reason(interaction, "Cloned");
	let mut request = http_client
		.create_guild_channel(guild_id, &name)
		.kind(source.kind)
		.permission_overwrites(&overwrites);
	if let Some(topic) = source.topic.as_deref() {
		request = request.topic(topic);
	}
	if let Some(nsfw) = source.nsfw {
		request = request.nsfw(nsfw);
	}
	if let Some(parent_id) = source.parent_id {
		request = request.parent_id(parent_id);
	}
	if let Some(rate_limit) = source.rate_limit_per_user {
		request = request.rate_limit_per_user(rate_limit);
	}
	if let Some(bitrate) = source.bitrate {
		request = request.bitrate(bitrate);
	}
	if let Some(user_limit) = source.user_limit.and_then(|limit| u16::try_from(limit).ok()) {
		request = request.user_limit(user_limit);
	}

	let cloned = match request.reason(&reason).await {
		Ok(response) => response.model().await.into_diagnostic()?,
		Err(error) => {
			tracing::warn!(source = ?error, %guild_id, %source_id, "Failed to clone a channel");
			return send_ephemeral_message(
				interaction,
				http_client,
				application_id,
				"Failed to clone the channel. Make sure I have the necessary permissions.",
			)
			.await;
		}
	};

	let embed = EmbedBuilder::new()
		.title("Channel Cloned")
		.description(format!(
			"Successfully cloned {} to {}",
			source_id.mention(),
			cloned.id.mention()
		))
		.color(DEFAULT_COLOR)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

async fn delete_channel(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	options: &[CommandDataOption],
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	let Some(channel_id) = channel_option(options, "channel")? else {
		bail!("Command data is malformed; expected `/channel delete` to have required option `channel`");
	};
	if interaction.channel.as_ref().map(|channel| channel.id) == Some(channel_id) {
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			"You cannot delete the channel you are currently in.",
		)
		.await;
	}
	let Some(channel) = command_data
		.resolved
		.as_ref()
		.and_then(|resolved| resolved.channels.get(&channel_id))
	else {
		bail!("Command data is malformed; channel {} wasn't resolved", channel_id);
	};

	let delete_result = http_client
		.delete_channel(channel_id)
		.reason(&audit_reason(interaction, "Deleted"))
		.await;
	if let Err(error) = delete_result {
		tracing::warn!(source = ?error, %channel_id, "Failed to delete a channel");
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			"Failed to delete the channel. Make sure I have the necessary permissions.",
		)
		.await;
	}
	tracing::info!(%channel_id, name = %channel.name, "Deleted a channel");

	let embed = EmbedBuilder::new()
		.title("Channel Deleted")
		.description(format!(
			"Successfully deleted **{}** ({})",
			channel.name,
			channel_type_name(channel.kind)
		))
		.color(ERROR_COLOR)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

fn channel_type_name(kind: ChannelType) -> &'static str {
	match kind {
		ChannelType::GuildText => "Text Channel",
		ChannelType::GuildVoice => "Voice Channel",
		ChannelType::GuildCategory => "Category",
		ChannelType::GuildAnnouncement => "Announcement Channel",
		ChannelType::AnnouncementThread => "Announcement Thread",
		ChannelType::PublicThread => "Public Thread",
		ChannelType::PrivateThread => "Private Thread",
		ChannelType::GuildStageVoice => "Stage Channel",
		ChannelType::GuildForum => "Forum Channel",
		_ => "Unknown",
	}
}

async fn fetch_channel(channel_id: Id<ChannelMarker>, http_client: &Client) -> miette::Result<Channel> {
	http_client
		.channel(channel_id)
		.await
		.into_diagnostic()?
		.model()
		.await
		.into_diagnostic()
}

async fn channel_info(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let channel_id = match channel_option(options, "channel")? {
		Some(channel_id) => channel_id,
		None => {
			let Some(channel) = interaction.channel.as_ref() else {
				bail!("Channel info was requested without a channel");
			};
			channel.id
		}
	};
	let channel = fetch_channel(channel_id, http_client).await?;
	let name = channel.name.clone().unwrap_or_default();

	let created = datetime_from_id(channel.id)
		.map(|created| discord_timestamp_tag(&created))
		.unwrap_or_else(|| String::from("Unknown"));
	let mut fields = vec![
		("Channel Name", name.clone(), true),
		("Channel ID", channel.id.to_string(), true),
		("Type", channel_type_name(channel.kind).to_string(), true),
		("Created", created, true),
		(
			"Position",
			channel
				.position
				.map_or_else(|| String::from("N/A"), |position| position.to_string()),
			true,
		),
		(
			"NSFW",
			String::from(if channel.nsfw.unwrap_or(false) { "Yes" } else { "No" }),
			true,
		),
	];
	if let Some(topic) = channel.topic.as_ref().filter(|topic| !topic.is_empty()) {
		fields.push(("Topic", topic.clone(), false));
	}
	if matches!(channel.kind, ChannelType::GuildText | ChannelType::GuildAnnouncement) {
		let slowmode = match channel.rate_limit_per_user {
			Some(seconds) if seconds > 0 => format!("{} seconds", seconds),
			_ => String::from("Disabled"),
		};
		fields.push(("Slowmode", slowmode, true));
	}
	if matches!(channel.kind, ChannelType::GuildVoice | ChannelType::GuildStageVoice) {
		let user_limit = match channel.user_limit {
			Some(limit) if limit > 0 => limit.to_string(),
			_ => String::from("Unlimited"),
		};
		fields.push(("User Limit", user_limit, true));
		fields.push((
			"Bitrate",
			format!("{} kbps", channel.bitrate.unwrap_or(0) / 1000),
			true,
		));
	}
	if let Some(category_name) = channel
		.parent_id
		.and_then(|parent_id| bot_state.cache.channel(parent_id))
		.and_then(|parent| parent.name.clone())
	{
		fields.push(("Category", category_name, true));
	}
	let overwrite_count = channel.permission_overwrites.as_ref().map_or(0, Vec::len);
	fields.push(("Permission Overwrites", overwrite_count.to_string(), true));

	let mut embed = EmbedBuilder::new()
		.title(format!("Channel Information: #{}", name))
		.color(DEFAULT_COLOR);
	for (field_name, value, inline) in fields {
		let field = EmbedFieldBuilder::new(field_name, value);
		embed = embed.field(if inline { field.inline() } else { field });
	}
	let embed = embed
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

/// The permission that locking takes away in a channel of this kind.
fn lock_permission(kind: ChannelType) -> Option<Permissions> {
	match kind {
		ChannelType::GuildText | ChannelType::GuildAnnouncement => Some(Permissions::SEND_MESSAGES),
		ChannelType::GuildVoice | ChannelType::GuildStageVoice => Some(Permissions::SPEAK),
		_ => None,
	}
}

async fn lock_channel(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
	guild_id: Id<GuildMarker>,
	change: OverwriteChange,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	let verb = match change {
		OverwriteChange::Deny => "lock",
		OverwriteChange::Reset => "unlock",
	};
	let Some(channel_id) = channel_option(options, "channel")? else {
		bail!("Command data is malformed; expected `/channel {}` to have required option `channel`", verb);
	};
	let channel = fetch_channel(channel_id, http_client).await?;
	let Some(permission) = lock_permission(channel.kind) else {
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			format!("This channel type cannot be {}ed.", verb),
		)
		.await;
	};

	let overwrite = everyone_overwrite(
		guild_id,
		channel.permission_overwrites.as_deref().unwrap_or_default(),
		permission,
		change,
	);
	let update_result = http_client
		.update_channel_permission(channel_id, &overwrite)
		.reason(&audit_reason(interaction, if change == OverwriteChange::Deny { "Locked" } else { "Unlocked" }))
		.await;
	if let Err(error) = update_result {
		tracing::warn!(source = ?error, %channel_id, ?change, "Failed to change a channel's lock");
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			format!("Failed to {} the channel. Make sure I have the necessary permissions.", verb),
		)
		.await;
	}

	let (title, description, color) = match change {
		OverwriteChange::Deny => (
			"Channel Locked",
			format!("Successfully locked {} from @everyone.", channel_id.mention()),
			ERROR_COLOR,
		),
		OverwriteChange::Reset => (
			"Channel Unlocked",
			format!("Successfully unlocked {} for @everyone.", channel_id.mention()),
			SUCCESS_COLOR,
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
	send_embed(interaction, http_client, application_id, embed).await
}

#[cfg(test)]
mod tests {
	use super::*;

	const GUILD: Id<GuildMarker> = Id::new(500);

	fn role_overwrite(id: u64, allow: Permissions, deny: Permissions) -> ChannelOverwrite {
		ChannelOverwrite {
			allow,
			deny,
			id: Id::new(id),
			kind: ChannelOverwriteType::Role,
		}
	}

	#[test]
	fn locking_keeps_other_everyone_permissions() {
		let existing = [
			role_overwrite(
				500,
				Permissions::ATTACH_FILES | Permissions::SEND_MESSAGES,
				Permissions::ADD_REACTIONS,
			),
			role_overwrite(77, Permissions::empty(), Permissions::VIEW_CHANNEL),
		];
		let overwrite = everyone_overwrite(GUILD, &existing, Permissions::SEND_MESSAGES, OverwriteChange::Deny);
		assert_eq!(overwrite.id, Id::new(500));
		assert_eq!(overwrite.kind, PermissionOverwriteType::Role);
		assert_eq!(overwrite.allow, Some(Permissions::ATTACH_FILES));
		assert_eq!(
			overwrite.deny,
			Some(Permissions::ADD_REACTIONS | Permissions::SEND_MESSAGES)
		);
	}

	#[test]
	fn unlocking_resets_to_role_permissions() {
		let existing = [role_overwrite(
			500,
			Permissions::empty(),
			Permissions::SEND_MESSAGES | Permissions::SPEAK,
		)];
		let overwrite = everyone_overwrite(GUILD, &existing, Permissions::SEND_MESSAGES, OverwriteChange::Reset);
		assert_eq!(overwrite.allow, Some(Permissions::empty()));
		assert_eq!(overwrite.deny, Some(Permissions::SPEAK));

		let fresh = everyone_overwrite(GUILD, &[], Permissions::VIEW_CHANNEL, OverwriteChange::Deny);
		assert_eq!(fresh.deny, Some(Permissions::VIEW_CHANNEL));
	}

	#[test]
	fn bulk_changes_pick_channel_kinds() {
		assert!(BulkChannelChange::Hide.applies_to(ChannelType::GuildCategory));
		assert!(!BulkChannelChange::Lock.applies_to(ChannelType::GuildCategory));
		assert!(BulkChannelChange::Unlock.applies_to(ChannelType::GuildVoice));
		assert!(!BulkChannelChange::Unhide.applies_to(ChannelType::PublicThread));
		assert_eq!(
			BulkChannelChange::Lock.permissions(),
			Permissions::SEND_MESSAGES | Permissions::SPEAK
		);
	}

	#[test]
	fn bulk_summaries_read_naturally() {
		assert_eq!(
			BulkChannelChange::Hide.summary(8, 0),
			"Successfully hidden 8 channels from @everyone."
		);
		assert_eq!(
			BulkChannelChange::Unlock.summary(3, 1),
			"Successfully unlocked 3 channels for @everyone.\nFailed to unlock 1 channels."
		);
		assert_eq!(BulkChannelChange::Lock.color(), ERROR_COLOR);
		assert_eq!(BulkChannelChange::Unhide.color(), SUCCESS_COLOR);
	}

	#[test]
	fn only_text_and_voice_channels_lock() {
		assert_eq!(lock_permission(ChannelType::GuildAnnouncement), Some(Permissions::SEND_MESSAGES));
		assert_eq!(lock_permission(ChannelType::GuildStageVoice), Some(Permissions::SPEAK));
		assert_eq!(lock_permission(ChannelType::GuildCategory), None);
		assert_eq!(lock_permission(ChannelType::GuildForum), None);
	}

	#[test]
	fn clones_copy_overwrites_and_default_their_name() {
		let overwrite = ChannelOverwrite {
			allow: Permissions::VIEW_CHANNEL,
			deny: Permissions::SEND_MESSAGES,
			id: Id::new(9),
			kind: ChannelOverwriteType::Member,
		};
		let converted = request_overwrite(&overwrite).unwrap();
		assert_eq!(converted.allow, Some(Permissions::VIEW_CHANNEL));
		assert_eq!(converted.deny, Some(Permissions::SEND_MESSAGES));
		assert_eq!(converted.kind, PermissionOverwriteType::Member);

		assert_eq!(clone_name(Some("general"), None), "general-clone");
		assert_eq!(clone_name(Some("general"), Some("lounge")), "lounge");
	}

	#[test]
	fn channel_types_have_readable_names() {
		assert_eq!(channel_type_name(ChannelType::GuildText), "Text Channel");
		assert_eq!(channel_type_name(ChannelType::GuildForum), "Forum Channel");
		assert_eq!(channel_type_name(ChannelType::Private), "Unknown");
	}
}
