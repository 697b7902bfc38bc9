// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker};

/// The longest sticky message text accepted.
pub const MAX_STICKY_MESSAGE_LENGTH: u16 = 2000;

/// The longest AFK reason accepted.
pub const MAX_AFK_REASON_LENGTH: u16 = 200;

/// The reason recorded when a user goes AFK without giving one.
pub const DEFAULT_AFK_REASON: &str = "No reason provided";

/// A sticky message configured for a channel.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyRecord {
	/// The channel the sticky message is kept at the bottom of. There is at most one record per channel.
	pub channel_id: Id<ChannelMarker>,
	/// The guild containing the channel. Used for listing the stickies of a server.
	pub guild_id: Id<GuildMarker>,
	/// The text that's reposted.
	pub message: String,
	/// Whether the message is reposted on new activity in the channel.
	///
	/// Stopped records keep their text so they can be started again.
	pub active: bool,
	/// The most recently posted copy of the sticky message, if one is still expected to exist.
	///
	/// This message is deleted before any new copy is posted and before the record is removed.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_posted_message_id: Option<Id<MessageMarker>>,
}

impl StickyRecord {
	pub fn new(channel_id: Id<ChannelMarker>, guild_id: Id<GuildMarker>, message: String) -> Self {
		Self {
			channel_id,
			guild_id,
			message,
			active: true,
			last_posted_message_id: None,
		}
	}
}

/// A user's AFK status in a guild.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AfkEntry {
	/// The user who is AFK.
	pub user_id: Id<UserMarker>,
	/// The user's account name.
	pub username: String,
	/// The name shown for the user in the guild at the time they went AFK.
	pub display_name: String,
	/// Why the user is AFK. Defaults to [DEFAULT_AFK_REASON].
	pub reason: String,
	/// When the user went AFK, in milliseconds since the Unix epoch.
	pub timestamp: i64,
}
