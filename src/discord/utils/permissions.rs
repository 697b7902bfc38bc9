// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::IntoDiagnostic;
use std::collections::HashMap;
use std::future::IntoFuture;
use twilight_http::client::Client;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, RoleMarker, UserMarker};

/// The permissions of the member who used the command, in the channel it was used in.
pub fn member_permissions(interaction: &InteractionCreate) -> Permissions {
	interaction
		.member
		.as_ref()
		.and_then(|member| member.permissions)
		.unwrap_or_else(Permissions::empty)
}

/// The permissions the bot has in the channel the interaction came from.
pub fn bot_permissions(interaction: &InteractionCreate) -> Permissions {
	interaction.app_permissions.unwrap_or_else(Permissions::empty)
}

pub fn has_permissions(granted: Permissions, required: Permissions) -> bool {
	granted.contains(Permissions::ADMINISTRATOR) || granted.contains(required)
}

/// Checks that both the bot and the member have a permission, giving the message to show if one doesn't.
pub fn missing_permission_message(
	member: Permissions,
	bot: Permissions,
	required: Permissions,
	permission_name: &str,
) -> Option<String> {
	if !has_permissions(bot, required) {
		return Some(format!(
			"I need the \"{}\" permission to execute this command.",
			permission_name
		));
	}
	if !has_permissions(member, required) {
		return Some(format!(
			"You need the \"{}\" permission to use this command.",
			permission_name
		));
	}
	None
}

/// The guild's roles along with where the bot sits among them.
pub struct BotRoleHierarchy {
	pub role_positions: HashMap<Id<RoleMarker>, i64>,
	pub highest_position: i64,
}

impl BotRoleHierarchy {
	/// Whether a role is below the bot's highest role, so the bot is able to hand it out.
	pub fn can_manage(&self, role_position: i64) -> bool {
		role_position < self.highest_position
	}
}

/// Gets the roles of a guild and the position of the bot's highest role in it.
pub async fn bot_role_hierarchy(
	guild_id: Id<GuildMarker>,
	bot_user_id: Id<UserMarker>,
	http_client: &Client,
) -> miette::Result<BotRoleHierarchy> {
	let bot_member_future = http_client.guild_member(guild_id, bot_user_id).into_future();
	let guild_roles_future = http_client.roles(guild_id).into_future();
	let (bot_member, guild_roles) = tokio::join!(bot_member_future, guild_roles_future);

	let bot_member = bot_member.into_diagnostic()?.model().await.into_diagnostic()?;
	let guild_roles = guild_roles.into_diagnostic()?.models().await.into_diagnostic()?;

	let role_positions: HashMap<Id<RoleMarker>, i64> =
		guild_roles.iter().map(|role| (role.id, role.position)).collect();
	let highest_position = highest_role_position(&bot_member.roles, &role_positions);
	Ok(BotRoleHierarchy {
		role_positions,
		highest_position,
	})
}

/// Every member has the @everyone role at position 0, so that's the lowest a member's highest role can be.
fn highest_role_position(member_roles: &[Id<RoleMarker>], role_positions: &HashMap<Id<RoleMarker>, i64>) -> i64 {
	member_roles
		.iter()
		.filter_map(|role_id| role_positions.get(role_id))
		.copied()
		.max()
		.unwrap_or(0)
		.max(0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn administrators_have_everything() {
		assert!(has_permissions(Permissions::ADMINISTRATOR, Permissions::MANAGE_ROLES));
		assert!(has_permissions(
			Permissions::MANAGE_ROLES | Permissions::SEND_MESSAGES,
			Permissions::MANAGE_ROLES
		));
		assert!(!has_permissions(Permissions::SEND_MESSAGES, Permissions::MANAGE_ROLES));
	}

	#[test]
	fn bot_permissions_are_checked_first() {
		let message = missing_permission_message(
			Permissions::empty(),
			Permissions::empty(),
			Permissions::MANAGE_MESSAGES,
			"Manage Messages",
		);
		assert_eq!(
			message.as_deref(),
			Some("I need the \"Manage Messages\" permission to execute this command.")
		);

		let message = missing_permission_message(
			Permissions::empty(),
			Permissions::MANAGE_MESSAGES,
			Permissions::MANAGE_MESSAGES,
			"Manage Messages",
		);
		assert_eq!(
			message.as_deref(),
			Some("You need the \"Manage Messages\" permission to use this command.")
		);

		assert_eq!(
			missing_permission_message(
				Permissions::ADMINISTRATOR,
				Permissions::MANAGE_MESSAGES,
				Permissions::MANAGE_MESSAGES,
				"Manage Messages"
			),
			None
		);
	}

	#[test]
	fn highest_role_is_found() {
		let role_positions: HashMap<Id<RoleMarker>, i64> =
			HashMap::from([(Id::new(1), 0), (Id::new(2), 5), (Id::new(3), 2)]);
		assert_eq!(highest_role_position(&[Id::new(3), Id::new(2)], &role_positions), 5);
		assert_eq!(highest_role_position(&[Id::new(99)], &role_positions), 0);
		assert_eq!(highest_role_position(&[], &role_positions), 0);

		let hierarchy = BotRoleHierarchy {
			role_positions,
			highest_position: 5,
		};
		assert!(hierarchy.can_manage(4));
		assert!(!hierarchy.can_manage(5));
		assert!(!hierarchy.can_manage(6));
	}
}
