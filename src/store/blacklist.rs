// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeSet;
use tokio::sync::RwLock;
use twilight_model::id::Id;
use twilight_model::id::marker::GuildMarker;

/// Servers whose members may not use the bot's commands.
#[derive(Default)]
pub struct Blacklist {
	guilds: RwLock<BTreeSet<Id<GuildMarker>>>,
}

impl Blacklist {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns false if the server was already blacklisted.
	pub async fn add(&self, guild_id: Id<GuildMarker>) -> bool {
		self.guilds.write().await.insert(guild_id)
	}

	/// Returns false if the server wasn't blacklisted.
	pub async fn remove(&self, guild_id: Id<GuildMarker>) -> bool {
		self.guilds.write().await.remove(&guild_id)
	}

	pub async fn contains(&self, guild_id: Id<GuildMarker>) -> bool {
		self.guilds.read().await.contains(&guild_id)
	}

	pub async fn list(&self) -> Vec<Id<GuildMarker>> {
		self.guilds.read().await.iter().copied().collect()
	}
}

/// Parses a server ID given as text. Only plain decimal IDs are accepted.
pub fn parse_server_id(text: &str) -> Option<Id<GuildMarker>> {
	let text = text.trim();
	if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
		return None;
	}
	text.parse::<u64>().ok().and_then(Id::new_checked)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn add_remove_contains() {
		let blacklist = Blacklist::new();
		let guild = Id::new(42);

		assert!(!blacklist.contains(guild).await);
		assert!(blacklist.add(guild).await);
		assert!(!blacklist.add(guild).await);
		assert!(blacklist.contains(guild).await);
		assert!(blacklist.remove(guild).await);
		assert!(!blacklist.remove(guild).await);
		assert!(!blacklist.contains(guild).await);
	}

	#[tokio::test]
	async fn list_is_ordered() {
		let blacklist = Blacklist::new();
		for guild in [30, 10, 20] {
			blacklist.add(Id::new(guild)).await;
		}
		assert_eq!(blacklist.list().await, vec![Id::new(10), Id::new(20), Id::new(30)]);
	}

	#[test]
	fn server_ids_must_be_numeric() {
		assert_eq!(parse_server_id("1318639481003184128"), Some(Id::new(1318639481003184128)));
		assert_eq!(parse_server_id(" 12 "), Some(Id::new(12)));
		assert_eq!(parse_server_id("abc"), None);
		assert_eq!(parse_server_id("-12"), None);
		assert_eq!(parse_server_id("+12"), None);
		assert_eq!(parse_server_id(""), None);
		assert_eq!(parse_server_id("0"), None);
		assert_eq!(parse_server_id("99999999999999999999999"), None);
	}
}
