// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::sticky_channel::DiscordStickyChannel;
use crate::store::afk::AfkRegistry;
use crate::store::autorole::AutoRoleRegistry;
use crate::store::blacklist::Blacklist;
use crate::store::sticky::StickyTracker;
use std::time::Instant;
use twilight_cache_inmemory::DefaultInMemoryCache;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, UserMarker};

/// Everything the event handlers share. Created once when the bot connects.
pub struct BotState {
	pub stickies: StickyTracker<DiscordStickyChannel>,
	pub afk: AfkRegistry,
	pub autoroles: AutoRoleRegistry,
	pub blacklist: Blacklist,
	pub cache: DefaultInMemoryCache,
	pub owner_id: Option<Id<UserMarker>>,
	pub bot_user_id: Id<UserMarker>,
	pub started_at: Instant,
	/// Plain HTTP client for fetching files outside the Discord API.
	pub web_client: reqwest::Client,
}

impl BotState {
	pub fn is_owner(&self, user_id: Id<UserMarker>) -> bool {
		self.owner_id == Some(user_id)
	}

	/// Gets the name of a guild the bot is in from the cache.
	pub fn guild_name(&self, guild_id: Id<GuildMarker>) -> Option<String> {
		self.cache.guild(guild_id).map(|guild| guild.name().to_string())
	}
}
