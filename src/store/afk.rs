// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::model::AfkEntry;
use std::collections::HashMap;
use tokio::sync::RwLock;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, UserMarker};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AfkToggle {
	Set(AfkEntry),
	Cleared,
}

/// Tracks which users are AFK in each guild.
#[derive(Default)]
pub struct AfkRegistry {
	entries: RwLock<HashMap<(Id<GuildMarker>, Id<UserMarker>), AfkEntry>>,
}

impl AfkRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks the user in the entry as AFK, or clears their AFK status if they already were.
	pub async fn toggle(&self, guild_id: Id<GuildMarker>, entry: AfkEntry) -> AfkToggle {
		let mut entries = self.entries.write().await;
		let key = (guild_id, entry.user_id);
		if entries.remove(&key).is_some() {
			return AfkToggle::Cleared;
		}
		entries.insert(key, entry.clone());
		AfkToggle::Set(entry)
	}

	/// Gets everyone AFK in the guild, longest AFK first.
	pub async fn list(&self, guild_id: Id<GuildMarker>) -> Vec<AfkEntry> {
		let mut guild_entries: Vec<AfkEntry> = self
			.entries
			.read()
			.await
			.iter()
			.filter(|((entry_guild_id, _), _)| *entry_guild_id == guild_id)
			.map(|(_, entry)| entry.clone())
			.collect();
		guild_entries.sort_by_key(|entry| (entry.timestamp, entry.user_id));
		guild_entries
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(user_id: u64, timestamp: i64) -> AfkEntry {
		AfkEntry {
			user_id: Id::new(user_id),
			username: format!("user{}", user_id),
			display_name: format!("User {}", user_id),
			reason: String::from("lunch"),
			timestamp,
		}
	}

	#[tokio::test]
	async fn toggling_twice_clears() {
		let registry = AfkRegistry::new();
		let guild = Id::new(1);

		assert_eq!(registry.toggle(guild, entry(5, 100)).await, AfkToggle::Set(entry(5, 100)));
		assert_eq!(registry.list(guild).await.len(), 1);
		assert_eq!(registry.toggle(guild, entry(5, 200)).await, AfkToggle::Cleared);
		assert!(registry.list(guild).await.is_empty());
	}

	#[tokio::test]
	async fn status_is_per_guild() {
		let registry = AfkRegistry::new();
		registry.toggle(Id::new(1), entry(5, 100)).await;
		assert_eq!(
			registry.toggle(Id::new(2), entry(5, 100)).await,
			AfkToggle::Set(entry(5, 100))
		);
		assert_eq!(registry.list(Id::new(1)).await, vec![entry(5, 100)]);
		assert!(registry.list(Id::new(3)).await.is_empty());
	}

	#[tokio::test]
	async fn list_is_oldest_first() {
		let registry = AfkRegistry::new();
		let guild = Id::new(1);
		registry.toggle(guild, entry(1, 300)).await;
		registry.toggle(guild, entry(2, 100)).await;
		registry.toggle(guild, entry(3, 200)).await;

		let users: Vec<u64> = registry
			.list(guild)
			.await
			.iter()
			.map(|entry| entry.user_id.get())
			.collect();
		assert_eq!(users, vec![2, 3, 1]);
	}
}
