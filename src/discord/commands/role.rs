// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::autorole::role_color;
use super::{resolved_role, string_option, subcommand, user_option};
use crate::discord::state::BotState;
use crate::discord::utils::api_errors::is_missing_permissions;
use crate::discord::utils::permissions::{
	bot_permissions, bot_role_hierarchy, member_permissions, missing_permission_message,
};
use crate::discord::utils::responses::{
	DEFAULT_COLOR, ERROR_COLOR, defer_response, send_embed, send_ephemeral_message, update_deferred_embed,
};
use crate::discord::utils::timestamp::now_timestamp;
use miette::{IntoDiagnostic, bail};
use thiserror::Error;
use twilight_http::client::Client;
use twilight_http::request::AuditLogReason;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandDataOption};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::{Member, Permissions, Role};
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, GuildMarker, UserMarker};
use twilight_util::builder::command::{CommandBuilder, RoleBuilder, StringBuilder, SubCommandBuilder, UserBuilder};
use twilight_util::builder::embed::EmbedBuilder;

const MAX_ROLE_NAME_LENGTH: u16 = 100;
const MEMBERS_PER_REQUEST: u16 = 1000;

const ROLE_TOO_HIGH: &str = "I cannot manage this role because it is higher than or equal to my highest role.";
const ROLE_PERMISSION_DENIED: &str =
	"I don't have permission to manage this role. Make sure my role is higher than the target role.";

pub fn command_definition() -> Command {
	let all_subcommand = SubCommandBuilder::new("all", "Add a role to all members")
		.option(
			RoleBuilder::new("role", "Role to add to all members")
				.required(true)
				.build(),
		)
		.build();
	let removeall_subcommand = SubCommandBuilder::new("removeall", "Remove a role from all members")
		.option(
			RoleBuilder::new("role", "Role to remove from all members")
				.required(true)
				.build(),
		)
		.build();
	let add_subcommand = SubCommandBuilder::new("add", "Add a role to a specific user")
		.option(RoleBuilder::new("role", "Role to add").required(true).build())
		.option(
			UserBuilder::new("user", "User to add the role to")
				.required(true)
				.build(),
		)
		.build();
	let remove_subcommand = SubCommandBuilder::new("remove", "Remove a role from a specific user")
		.option(RoleBuilder::new("role", "Role to remove").required(true).build())
		.option(
			UserBuilder::new("user", "User to remove the role from")
				.required(true)
				.build(),
		)
		.build();
	let name_subcommand = SubCommandBuilder::new("name", "Change the name of a role")
		.option(RoleBuilder::new("role", "Role to rename").required(true).build())
		.option(
			StringBuilder::new("name", "New name for the role")
				.required(true)
				.max_length(MAX_ROLE_NAME_LENGTH)
				.build(),
		)
		.build();
	let delete_subcommand = SubCommandBuilder::new("delete", "Delete a role")
		.option(RoleBuilder::new("role", "Role to delete").required(true).build())
		.build();
	let color_subcommand = SubCommandBuilder::new("color", "Change the color of a role")
		.option(
			RoleBuilder::new("role", "Role to change color")
				.required(true)
				.build(),
		)
		.option(
			StringBuilder::new("color", "New color (hex code like #FF0000 or color name)")
				.required(true)
				.build(),
		)
		.build();

	CommandBuilder::new("role", "Role management commands", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.default_member_permissions(Permissions::MANAGE_ROLES)
		.option(all_subcommand)
		.option(removeall_subcommand)
		.option(add_subcommand)
		.option(remove_subcommand)
		.option(name_subcommand)
		.option(delete_subcommand)
		.option(color_subcommand)
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
		bail!("Role command was used outside of a guild");
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
	let role = resolved_role(command_data, options, &format!("role {}", subcommand_name))?;

	let hierarchy = bot_role_hierarchy(guild_id, bot_state.bot_user_id, http_client).await?;
	if !hierarchy.can_manage(role.position) {
		return send_ephemeral_message(interaction, http_client, application_id, ROLE_TOO_HIGH).await;
	}

	let context = RoleContext {
		interaction,
		http_client,
		application_id,
		guild_id,
		role,
	};
	match subcommand_name {
		"all" => change_role_for_everyone(&context, BulkRoleChange::Add).await,
		"removeall" => change_role_for_everyone(&context, BulkRoleChange::Remove).await,
		"add" => add_role_to_member(&context, options).await,
		"remove" => remove_role_from_member(&context, options).await,
		"name" => rename_role(&context, options).await,
		"delete" => delete_role(&context).await,
		"color" => recolor_role(&context, options).await,
		_ => bail!("Unknown role subcommand encountered: {}", subcommand_name),
	}
}

struct RoleContext<'a> {
	interaction: &'a InteractionCreate,
	http_client: &'a Client,
	application_id: Id<ApplicationMarker>,
	guild_id: Id<GuildMarker>,
	role: &'a Role,
}

impl RoleContext<'_> {
	fn audit_reason(&self, action: &str) -> String {
		let user_name = self
			.interaction
			.author()
			.map_or("unknown user", |user| user.name.as_str());
		format!("{} by {}", action, user_name)
	}

	async fn reply(&self, title: &str, description: String, color: u32) -> miette::Result<()> {
		let embed = EmbedBuilder::new()
			.title(title)
			.description(description)
			.color(color)
			.timestamp(now_timestamp().into_diagnostic()?)
			.validate()
			.into_diagnostic()?
			.build();
		send_embed(self.interaction, self.http_client, self.application_id, embed).await
	}

	async fn refuse(&self, message: impl Into<String>) -> miette::Result<()> {
		send_ephemeral_message(self.interaction, self.http_client, self.application_id, message).await
	}

	/// Reports a failed role change to the user. Failures other than missing permissions are passed on.
	async fn report_failure(&self, error: twilight_http::Error) -> miette::Result<()> {
		if is_missing_permissions(&error) {
			return self.refuse(ROLE_PERMISSION_DENIED).await;
		}
		Err::<(), _>(error).into_diagnostic()
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BulkRoleChange {
	Add,
	Remove,
}

impl BulkRoleChange {
	/// Bots are left out when the role is handed out to everyone, but lose it when it's taken from everyone.
	fn applies_to(self, has_role: bool, is_bot: bool) -> bool {
		match self {
			Self::Add => !has_role && !is_bot,
			Self::Remove => has_role,
		}
	}

	fn summary(self, role_name: &str, succeeded: usize, failed: usize) -> String {
		let mut summary = match self {
			Self::Add => format!("Successfully added **{}** to {} members.", role_name, succeeded),
			Self::Remove => format!("Successfully removed **{}** from {} members.", role_name, succeeded),
		};
		if failed > 0 {
			let failure = match self {
				Self::Add => format!("\nFailed to add to {} members.", failed),
				Self::Remove => format!("\nFailed to remove from {} members.", failed),
			};
			summary.push_str(&failure);
		}
		summary
	}
}

async fn change_role_for_everyone(context: &RoleContext<'_>, change: BulkRoleChange) -> miette::Result<()> {
	defer_response(context.interaction, context.http_client, context.application_id).await?;

	let role = context.role;
	let members = fetch_all_members(context.guild_id, context.http_client).await?;
	let reason = context.audit_reason("Bulk role change");

	let mut succeeded = 0;
	let mut failed = 0;
	for member in members
		.iter()
		.filter(|member| change.applies_to(member.roles.contains(&role.id), member.user.bot))
	{
		let user_id = member.user.id;
		let result = match change {
			BulkRoleChange::Add => {
				context
					.http_client
					.add_guild_member_role(context.guild_id, user_id, role.id)
					.reason(&reason)
					.await
			}
			BulkRoleChange::Remove => {
				context
					.http_client
					.remove_guild_member_role(context.guild_id, user_id, role.id)
					.reason(&reason)
					.await
			}
		};
		match result {
			Ok(_) => succeeded += 1,
			Err(error) => {
				tracing::warn!(source = ?error, guild_id = %context.guild_id, %user_id, role_id = %role.id, "Failed to change a member's role in bulk");
				failed += 1;
			}
		}
	}
	tracing::info!(guild_id = %context.guild_id, role_id = %role.id, ?change, succeeded, failed, "Bulk role change finished");

	let title = match change {
		BulkRoleChange::Add => "Role Added to All Members",
		BulkRoleChange::Remove => "Role Removed from All Members",
	};
	let embed = EmbedBuilder::new()
		.title(title)
		.description(change.summary(&role.name, succeeded, failed))
		.color(role_color(role))
		.timestamp(now_timestamp().into_diagnostic()?)
		.validate()
		.into_diagnostic()?
		.build();
	update_deferred_embed(context.interaction, context.http_client, context.application_id, embed).await
}

/// Lists every member of a guild, a page of members at a time.
async fn fetch_all_members(guild_id: Id<GuildMarker>, http_client: &Client) -> miette::Result<Vec<Member>> {
	let mut members: Vec<Member> = Vec::new();
	let mut after: Option<Id<UserMarker>> = None;
	loop {
		let request = http_client.guild_members(guild_id).limit(MEMBERS_PER_REQUEST);
		let request = match after {
			Some(user_id) => request.after(user_id),
			None => request,
		};
		let page = request.await.into_diagnostic()?.models().await.into_diagnostic()?;
		let page_size = page.len();
		after = page.last().map(|member| member.user.id);
		members.extend(page);
		if page_size < usize::from(MEMBERS_PER_REQUEST) {
			return Ok(members);
		}
	}
}

async fn add_role_to_member(context: &RoleContext<'_>, options: &[CommandDataOption]) -> miette::Result<()> {
	let Some(user_id) = user_option(options, "user")? else {
		bail!("Command data is malformed; expected `/role add` to have required option `user`");
	};
	let role = context.role;
	let member = context
		.http_client
		.guild_member(context.guild_id, user_id)
		.await
		.into_diagnostic()?
		.model()
		.await
		.into_diagnostic()?;
	if member.roles.contains(&role.id) {
		return context
			.refuse(format!("{} already has the **{}** role.", member.user.name, role.name))
			.await;
	}

	let add_result = context
		.http_client
		.add_guild_member_role(context.guild_id, user_id, role.id)
		.reason(&context.audit_reason("Role added"))
		.await;
	if let Err(error) = add_result {
		return context.report_failure(error).await;
	}

	context
		.reply(
			"Role Added",
			format!("Successfully added **{}** to {}", role.name, member.user.name),
			role_color(role),
		)
		.await
}

async fn remove_role_from_member(context: &RoleContext<'_>, options: &[CommandDataOption]) -> miette::Result<()> {
	let Some(user_id) = user_option(options, "user")? else {
		bail!("Command data is malformed; expected `/role remove` to have required option `user`");
	};
	let role = context.role;
	let member = context
		.http_client
		.guild_member(context.guild_id, user_id)
		.await
		.into_diagnostic()?
		.model()
		.await
		.into_diagnostic()?;
	if !member.roles.contains(&role.id) {
		return context
			.refuse(format!("{} doesn't have the **{}** role.", member.user.name, role.name))
			.await;
	}

	let remove_result = context
		.http_client
		.remove_guild_member_role(context.guild_id, user_id, role.id)
		.reason(&context.audit_reason("Role removed"))
		.await;
	if let Err(error) = remove_result {
		return context.report_failure(error).await;
	}

	context
		.reply(
			"Role Removed",
			format!("Successfully removed **{}** from {}", role.name, member.user.name),
			role_color(role),
		)
		.await
}

async fn rename_role(context: &RoleContext<'_>, options: &[CommandDataOption]) -> miette::Result<()> {
	let Some(new_name) = string_option(options, "name")? else {
		bail!("Command data is malformed; expected `/role name` to have required option `name`");
	};
	let role = context.role;

	let update_result = context
		.http_client
		.update_role(context.guild_id, role.id)
		.name(Some(new_name))
		.reason(&context.audit_reason("Role renamed"))
		.await;
	if let Err(error) = update_result {
		return context.report_failure(error).await;
	}

	context
		.reply(
			"Role Name Changed",
			format!(
				"Successfully changed role name from **{}** to **{}**",
				role.name, new_name
			),
			role_color(role),
		)
		.await
}

async fn delete_role(context: &RoleContext<'_>) -> miette::Result<()> {
	let role = context.role;
	if role.managed {
		return context
			.refuse("I cannot delete this role because it is managed by an integration.")
			.await;
	}

	let delete_result = context
		.http_client
		.delete_role(context.guild_id, role.id)
		.reason(&context.audit_reason("Role deleted"))
		.await;
	if let Err(error) = delete_result {
		return context.report_failure(error).await;
	}
	tracing::info!(guild_id = %context.guild_id, role_id = %role.id, "Deleted a role");

	context
		.reply(
			"Role Deleted",
			format!("Successfully deleted the **{}** role", role.name),
			ERROR_COLOR,
		)
		.await
}

async fn recolor_role(context: &RoleContext<'_>, options: &[CommandDataOption]) -> miette::Result<()> {
	let Some(color_input) = string_option(options, "color")? else {
		bail!("Command data is malformed; expected `/role color` to have required option `color`");
	};
	let color = match parse_role_color(color_input) {
		Ok(color) => color,
		Err(error) => return context.refuse(error.to_string()).await,
	};
	let role = context.role;

	let update_result = context
		.http_client
		.update_role(context.guild_id, role.id)
		.color(Some(color))
		.reason(&context.audit_reason("Role color changed"))
		.await;
	if let Err(error) = update_result {
		return context.report_failure(error).await;
	}

	let embed_color = if color == 0 { DEFAULT_COLOR } else { color };
	context
		.reply(
			"Role Color Changed",
			format!("Successfully changed **{}** color to {}", role.name, color_input),
			embed_color,
		)
		.await
}

#[derive(Debug, Eq, Error, PartialEq)]
enum ColorParseError {
	#[error("Invalid hex color code. Please use format like #FF0000")]
	InvalidHex,
	#[error("Invalid color name or hex code. Use color names like \"red\", \"blue\" or hex codes like \"#FF0000\"")]
	UnknownName,
}

const NAMED_COLORS: [(&str, u32); 12] = [
	("red", 0xFF0000),
	("green", 0x00FF00),
	("blue", 0x0000FF),
	("yellow", 0xFFFF00),
	("orange", 0xFFA500),
	("purple", 0x800080),
	("pink", 0xFFC0CB),
	("cyan", 0x00FFFF),
	("white", 0xFFFFFF),
	("black", 0x000000),
	("gray", 0x808080),
	("grey", 0x808080),
];

/// Reads a color given as `#RRGGBB` or as one of a few color names.
fn parse_role_color(input: &str) -> Result<u32, ColorParseError> {
	let input = input.trim();
	if let Some(hex) = input.strip_prefix('#') {
		if hex.is_empty() || hex.len() > 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
			return Err(ColorParseError::InvalidHex);
		}
		return u32::from_str_radix(hex, 16).map_err(|_| ColorParseError::InvalidHex);
	}

	let name = input.to_lowercase();
	NAMED_COLORS
		.iter()
		.find(|(color_name, _)| *color_name == name)
		.map(|(_, color)| *color)
		.ok_or(ColorParseError::UnknownName)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn colors_parse_from_hex_and_names() {
		assert_eq!(parse_role_color("#FF0000"), Ok(0xFF0000));
		assert_eq!(parse_role_color("#00ae86"), Ok(0x00AE86));
		assert_eq!(parse_role_color("Orange"), Ok(0xFFA500));
		assert_eq!(parse_role_color(" grey "), Ok(0x808080));
		assert_eq!(parse_role_color("black"), Ok(0));
	}

	#[test]
	fn bad_colors_are_rejected() {
		assert_eq!(parse_role_color("#"), Err(ColorParseError::InvalidHex));
		assert_eq!(parse_role_color("#GG0000"), Err(ColorParseError::InvalidHex));
		assert_eq!(parse_role_color("#1234567"), Err(ColorParseError::InvalidHex));
		assert_eq!(parse_role_color("chartreuse"), Err(ColorParseError::UnknownName));
		assert_eq!(parse_role_color("FF0000"), Err(ColorParseError::UnknownName));
	}

	#[test]
	fn bulk_changes_pick_the_right_members() {
		assert!(BulkRoleChange::Add.applies_to(false, false));
		assert!(!BulkRoleChange::Add.applies_to(true, false));
		assert!(!BulkRoleChange::Add.applies_to(false, true));
		assert!(BulkRoleChange::Remove.applies_to(true, true));
		assert!(!BulkRoleChange::Remove.applies_to(false, false));
	}

	#[test]
	fn bulk_summaries_mention_failures() {
		assert_eq!(
			BulkRoleChange::Add.summary("Member", 12, 0),
			"Successfully added **Member** to 12 members."
		);
		assert_eq!(
			BulkRoleChange::Remove.summary("Member", 3, 2),
			"Successfully removed **Member** from 3 members.\nFailed to remove from 2 members."
		);
	}

	#[test]
	fn role_command_requires_manage_roles() {
		let command = command_definition();
		assert_eq!(command.default_member_permissions, Some(Permissions::MANAGE_ROLES));
		let subcommands: Vec<&str> = command.options.iter().map(|option| option.name.as_str()).collect();
		assert_eq!(
			subcommands,
			vec!["all", "removeall", "add", "remove", "name", "delete", "color"]
		);
	}
}
