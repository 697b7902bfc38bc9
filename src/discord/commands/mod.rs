// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::state::BotState;
use super::utils::responses::{COMMAND_FAILED, GUILD_BLACKLISTED, send_ephemeral_message};
use miette::bail;
use std::sync::Arc;
use twilight_http::client::Client;
use twilight_model::application::command::Command;
use twilight_model::application::interaction::application_command::{CommandData, CommandDataOption, CommandOptionValue};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Role;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, ChannelMarker, RoleMarker, UserMarker};

mod afk;
mod autorole;
mod blacklist;
mod bot;
mod channel;
mod emoji;
mod role;
mod server;
mod stick;

pub fn command_definitions() -> Vec<Command> {
	vec![
		afk::command_definition(),
		autorole::command_definition(),
		blacklist::command_definition(),
		bot::command_definition(),
		channel::command_definition(),
		emoji::command_definition(),
		role::command_definition(),
		server::command_definition(),
		stick::command_definition(),
	]
}

pub async fn route_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	if command_data.name != "blacklist" {
		if let Some(guild_id) = interaction.guild_id {
			if bot_state.blacklist.contains(guild_id).await {
				return send_ephemeral_message(interaction, http_client, application_id, GUILD_BLACKLISTED).await;
			}
		}
	}

	let command_result = match command_data.name.as_str() {
		"afk" => afk::handle_command(interaction, command_data, http_client, application_id, bot_state).await,
		"autorole" => autorole::handle_command(interaction, command_data, http_client, application_id, bot_state).await,
		"blacklist" => {
			blacklist::handle_command(interaction, command_data, http_client, application_id, bot_state).await
		}
		"bot" => bot::handle_command(interaction, command_data, http_client, application_id, bot_state).await,
		"channel" => channel::handle_command(interaction, command_data, http_client, application_id, bot_state).await,
		"emoji" => emoji::handle_command(interaction, command_data, http_client, application_id, bot_state).await,
		"role" => role::handle_command(interaction, command_data, http_client, application_id, bot_state).await,
		"server" => server::handle_command(interaction, command_data, http_client, application_id, bot_state).await,
		"stick" => stick::handle_command(interaction, command_data, http_client, application_id, bot_state).await,
		_ => bail!("Unknown command encountered: {}\n{:?}", command_data.name, command_data),
	};

	if command_result.is_err() {
		// Fails if the handler already responded.
		if let Err(error) = send_ephemeral_message(interaction, http_client, application_id, COMMAND_FAILED).await {
			tracing::debug!(source = ?error, "Couldn't tell the user their command failed");
		}
	}
	command_result
}

/// Gets the subcommand that was used and its options.
fn subcommand<'a>(command_data: &'a CommandData) -> miette::Result<(&'a str, &'a [CommandDataOption])> {
	let Some(subcommand) = command_data.options.first() else {
		bail!("Command data is malformed; expected `/{}` to have a subcommand", command_data.name);
	};
	let CommandOptionValue::SubCommand(values) = &subcommand.value else {
		bail!(
			"Command data is malformed; expected `/{} {}` to be a subcommand",
			command_data.name,
			subcommand.name
		);
	};
	Ok((subcommand.name.as_str(), values.as_slice()))
}

fn string_option<'a>(options: &'a [CommandDataOption], name: &str) -> miette::Result<Option<&'a str>> {
	match options.iter().find(|option| option.name == name).map(|option| &option.value) {
		Some(CommandOptionValue::String(value)) => Ok(Some(value.as_str())),
		Some(other) => bail!("Command data is malformed; expected option `{}` to be a string, got {:?}", name, other),
		None => Ok(None),
	}
}

fn integer_option(options: &[CommandDataOption], name: &str) -> miette::Result<Option<i64>> {
	match options.iter().find(|option| option.name == name).map(|option| &option.value) {
		Some(CommandOptionValue::Integer(value)) => Ok(Some(*value)),
		Some(other) => bail!("Command data is malformed; expected option `{}` to be an integer, got {:?}", name, other),
		None => Ok(None),
	}
}

fn role_option(options: &[CommandDataOption], name: &str) -> miette::Result<Option<Id<RoleMarker>>> {
	match options.iter().find(|option| option.name == name).map(|option| &option.value) {
		Some(CommandOptionValue::Role(role_id)) => Ok(Some(*role_id)),
		Some(other) => bail!("Command data is malformed; expected option `{}` to be a role, got {:?}", name, other),
		None => Ok(None),
	}
}

fn user_option(options: &[CommandDataOption], name: &str) -> miette::Result<Option<Id<UserMarker>>> {
	match options.iter().find(|option| option.name == name).map(|option| &option.value) {
		Some(CommandOptionValue::User(user_id)) => Ok(Some(*user_id)),
		Some(other) => bail!("Command data is malformed; expected option `{}` to be a user, got {:?}", name, other),
		None => Ok(None),
	}
}

fn channel_option(options: &[CommandDataOption], name: &str) -> miette::Result<Option<Id<ChannelMarker>>> {
	match options.iter().find(|option| option.name == name).map(|option| &option.value) {
		Some(CommandOptionValue::Channel(channel_id)) => Ok(Some(*channel_id)),
		Some(other) => bail!("Command data is malformed; expected option `{}` to be a channel, got {:?}", name, other),
		None => Ok(None),
	}
}

/// Gets the full role data Discord sends along with a required role option.
fn resolved_role<'a>(
	command_data: &'a CommandData,
	options: &[CommandDataOption],
	command_path: &str,
) -> miette::Result<&'a Role> {
	let Some(role_id) = role_option(options, "role")? else {
		bail!(
			"Command data is malformed; expected `/{}` to have required option `role`",
			command_path
		);
	};
	let Some(role) = command_data
		.resolved
		.as_ref()
		.and_then(|resolved| resolved.roles.get(&role_id))
	else {
		bail!("Command data is malformed; role {} wasn't resolved", role_id);
	};
	Ok(role)
}
