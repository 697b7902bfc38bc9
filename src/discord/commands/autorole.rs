// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{resolved_role, subcommand};
use crate::discord::state::BotState;
use crate::discord::utils::format::join_within_limit;
use crate::discord::utils::permissions::{
	bot_permissions, bot_role_hierarchy, member_permissions, missing_permission_message,
};
use crate::discord::utils::responses::{DEFAULT_COLOR, send_embed, send_ephemeral_message};
use crate::discord::utils::timestamp::now_timestamp;
use miette::{IntoDiagnostic, bail};
use twilight_http::client::Client;
use twilight_mention::fmt::Mention;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandDataOption};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::{Permissions, Role};
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, GuildMarker, RoleMarker};
use twilight_util::builder::command::{CommandBuilder, RoleBuilder, SubCommandBuilder};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};
use twilight_validate::embed::DESCRIPTION_LENGTH;

pub fn command_definition() -> Command {
	let add_role_option = RoleBuilder::new("role", "Role to add to auto-roles")
		.required(true)
		.build();
	let remove_role_option = RoleBuilder::new("role", "Role to remove from auto-roles")
		.required(true)
		.build();

	let list_subcommand = SubCommandBuilder::new("list", "List all auto-roles").build();
	let add_subcommand = SubCommandBuilder::new("add", "Add a role to auto-roles")
		.option(add_role_option)
		.build();
	let remove_subcommand = SubCommandBuilder::new("remove", "Remove a role from auto-roles")
		.option(remove_role_option)
		.build();

	CommandBuilder::new("autorole", "Manage auto-roles for new members", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.default_member_permissions(Permissions::MANAGE_ROLES)
		.option(list_subcommand)
		.option(add_subcommand)
		.option(remove_subcommand)
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
		bail!("Autorole command was used outside of a guild");
	};

	if let Some(message) = missing_permission_message(
		member_permissions(interaction),
		bot_permissions(interaction),
		Permissions::MANAGE_ROLES,
		"Manage Roles",
	) {
		return send_ephemeral_message(interaction, http_client, application_id, message).await;
	}

	let (subcommand_name, options) = subcommand(command_data)?;
	match subcommand_name {
		"list" => list_autoroles(interaction, guild_id, http_client, application_id, bot_state).await,
		"add" => {
			add_autorole(
				interaction,
				command_data,
				options,
				guild_id,
				http_client,
				application_id,
				bot_state,
			)
			.await
		}
		"remove" => {
			remove_autorole(
				interaction,
				command_data,
				options,
				guild_id,
				http_client,
				application_id,
				bot_state,
			)
			.await
		}
		_ => bail!("Unknown autorole subcommand encountered: {}", subcommand_name),
	}
}

async fn list_autoroles(
	interaction: &InteractionCreate,
	guild_id: Id<GuildMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let role_ids = bot_state.autoroles.list(guild_id).await;
	if role_ids.is_empty() {
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			"No auto-roles have been set up for this server.",
		)
		.await;
	}

	let lines: Vec<String> = role_ids
		.iter()
		.map(|role_id| autorole_list_line(*role_id, bot_state.cache.role(*role_id).is_some()))
		.collect();
	let footer = EmbedFooterBuilder::new(format!("{} auto-role(s) configured", role_ids.len())).build();
	let embed = EmbedBuilder::new()
		.title("Auto-Roles List")
		.description(join_within_limit(&lines, "\n", DESCRIPTION_LENGTH))
		.color(DEFAULT_COLOR)
		.footer(footer)
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

fn autorole_list_line(role_id: Id<RoleMarker>, role_exists: bool) -> String {
	if role_exists {
		format!("• {} ({})", role_id.mention(), role_id)
	} else {
		format!("• Deleted Role ({})", role_id)
	}
}

async fn add_autorole(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	options: &[CommandDataOption],
	guild_id: Id<GuildMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let role = resolved_role(command_data, options, "autorole add")?;

	let hierarchy = bot_role_hierarchy(guild_id, bot_state.bot_user_id, http_client).await?;
	if !hierarchy.can_manage(role.position) {
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			"I cannot manage this role because it is higher than or equal to my highest role.",
		)
		.await;
	}
	if role.managed {
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			"I cannot add this role to auto-roles because it is managed by an integration.",
		)
		.await;
	}

	if !bot_state.autoroles.add(guild_id, role.id).await {
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			format!("**{}** is already in the auto-roles list.", role.name),
		)
		.await;
	}

	let embed = EmbedBuilder::new()
		.title("Auto-Role Added")
		.description(format!(
			"Successfully added **{}** to auto-roles.\nNew members will automatically receive this role.",
			role.name
		))
		.color(role_color(role))
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

async fn remove_autorole(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	options: &[CommandDataOption],
	guild_id: Id<GuildMarker>,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let role = resolved_role(command_data, options, "autorole remove")?;

	if !bot_state.autoroles.remove(guild_id, role.id).await {
		return send_ephemeral_message(
			interaction,
			http_client,
			application_id,
			format!("**{}** is not in the auto-roles list.", role.name),
		)
		.await;
	}

	let embed = EmbedBuilder::new()
		.title("Auto-Role Removed")
		.description(format!(
			"Successfully removed **{}** from auto-roles.\nNew members will no longer automatically receive this role.",
			role.name
		))
		.color(role_color(role))
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	send_embed(interaction, http_client, application_id, embed).await
}

/// Roles without a color show as the default color.
pub(super) fn role_color(role: &Role) -> u32 {
	if role.color == 0 { DEFAULT_COLOR } else { role.color }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deleted_roles_are_listed_by_id() {
		assert_eq!(autorole_list_line(Id::new(12), true), "• <@&12> (12)");
		assert_eq!(autorole_list_line(Id::new(12), false), "• Deleted Role (12)");
	}
}
