// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use tokio::sync::RwLock;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, RoleMarker};

/// The roles given to new members of each guild, in the order they were added.
#[derive(Default)]
pub struct AutoRoleRegistry {
	roles: RwLock<HashMap<Id<GuildMarker>, Vec<Id<RoleMarker>>>>,
}

impl AutoRoleRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a role to the guild's auto-roles. Returns false if it was already one.
	pub async fn add(&self, guild_id: Id<GuildMarker>, role_id: Id<RoleMarker>) -> bool {
		let mut roles = self.roles.write().await;
		let guild_roles = roles.entry(guild_id).or_default();
		if guild_roles.contains(&role_id) {
			return false;
		}
		guild_roles.push(role_id);
		true
	}

	/// Removes a role from the guild's auto-roles. Returns false if it wasn't one.
	pub async fn remove(&self, guild_id: Id<GuildMarker>, role_id: Id<RoleMarker>) -> bool {
		let mut roles = self.roles.write().await;
		let Some(guild_roles) = roles.get_mut(&guild_id) else {
			return false;
		};
		let Some(position) = guild_roles.iter().position(|id| *id == role_id) else {
			return false;
		};
		guild_roles.remove(position);
		if guild_roles.is_empty() {
			roles.remove(&guild_id);
		}
		true
	}

	pub async fn list(&self, guild_id: Id<GuildMarker>) -> Vec<Id<RoleMarker>> {
		self.roles.read().await.get(&guild_id).cloned().unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const GUILD: Id<GuildMarker> = Id::new(1);

	#[tokio::test]
	async fn duplicates_are_reported() {
		let registry = AutoRoleRegistry::new();
		assert!(registry.add(GUILD, Id::new(10)).await);
		assert!(!registry.add(GUILD, Id::new(10)).await);
		assert_eq!(registry.list(GUILD).await, vec![Id::new(10)]);
	}

	#[tokio::test]
	async fn removing_missing_roles_is_reported() {
		let registry = AutoRoleRegistry::new();
		assert!(!registry.remove(GUILD, Id::new(10)).await);
		registry.add(GUILD, Id::new(10)).await;
		assert!(registry.remove(GUILD, Id::new(10)).await);
		assert!(!registry.remove(GUILD, Id::new(10)).await);
		assert!(registry.list(GUILD).await.is_empty());
	}

	#[tokio::test]
	async fn order_is_kept() {
		let registry = AutoRoleRegistry::new();
		for role in [30, 10, 20] {
			registry.add(GUILD, Id::new(role)).await;
		}
		registry.remove(GUILD, Id::new(10)).await;
		registry.add(GUILD, Id::new(10)).await;
		assert_eq!(
			registry.list(GUILD).await,
			vec![Id::new(30), Id::new(20), Id::new(10)]
		);
		assert!(registry.list(Id::new(2)).await.is_empty());
	}
}
