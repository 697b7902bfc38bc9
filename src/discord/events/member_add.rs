// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::state::BotState;
use crate::discord::utils::permissions::{BotRoleHierarchy, bot_role_hierarchy};
use twilight_http::client::Client;
use twilight_http::request::AuditLogReason;
use twilight_model::gateway::payload::incoming::MemberAdd;
use twilight_model::id::Id;
use twilight_model::id::marker::RoleMarker;

/// Gives a new member the guild's auto-roles.
///
/// Failing to give one role doesn't stop the others from being given.
pub async fn apply_autoroles(member: &MemberAdd, http_client: &Client, bot_state: &BotState) -> miette::Result<()> {
	let guild_id = member.guild_id;
	let user_id = member.member.user.id;

	let role_ids = bot_state.autoroles.list(guild_id).await;
	if role_ids.is_empty() {
		return Ok(());
	}

	let hierarchy = bot_role_hierarchy(guild_id, bot_state.bot_user_id, http_client).await?;
	for role_id in assignable_roles(&role_ids, &hierarchy) {
		let add_result = http_client
			.add_guild_member_role(guild_id, user_id, role_id)
			.reason("Auto-role for new member")
			.await;
		match add_result {
			Ok(_) => tracing::info!(%guild_id, %user_id, %role_id, "Added auto-role to new member"),
			Err(error) => {
				tracing::error!(source = ?error, %guild_id, %user_id, %role_id, "Failed to add auto-role to new member")
			}
		}
	}

	Ok(())
}

/// Roles that were deleted or that are above the bot can't be given, so they're skipped.
fn assignable_roles(role_ids: &[Id<RoleMarker>], hierarchy: &BotRoleHierarchy) -> Vec<Id<RoleMarker>> {
	role_ids
		.iter()
		.copied()
		.filter(|role_id| {
			hierarchy
				.role_positions
				.get(role_id)
				.is_some_and(|position| hierarchy.can_manage(*position))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	#[test]
	fn skips_missing_and_higher_roles() {
		let hierarchy = BotRoleHierarchy {
			role_positions: HashMap::from([(Id::new(1), 1), (Id::new(2), 5), (Id::new(3), 9), (Id::new(4), 2)]),
			highest_position: 5,
		};
		let configured = [Id::new(4), Id::new(2), Id::new(99), Id::new(3), Id::new(1)];
		assert_eq!(assignable_roles(&configured, &hierarchy), vec![Id::new(4), Id::new(1)]);
	}
}
