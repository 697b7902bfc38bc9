// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::IntoDiagnostic;
use twilight_http::client::Client;
use twilight_model::channel::message::{AllowedMentions, Embed, MessageFlags};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::InteractionResponseDataBuilder;

pub const COMMAND_FAILED: &str = "There was an error while executing this command!";
pub const GUILD_BLACKLISTED: &str = "This server has been blacklisted from using bot commands.";
pub const OWNER_ONLY: &str = "This command can only be used by the bot owner.";

pub const DEFAULT_COLOR: u32 = 0x00AE86;
pub const SUCCESS_COLOR: u32 = 0x00FF00;
pub const WARNING_COLOR: u32 = 0xFFFF00;
pub const ERROR_COLOR: u32 = 0xFF0000;
pub const BLURPLE_COLOR: u32 = 0x5865F2;

pub async fn send_response(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	response_data: InteractionResponseData,
) -> miette::Result<()> {
	let response = InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(response_data),
	};
	http_client
		.interaction(application_id)
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;
	Ok(())
}

/// Replies with a plain message only the user who used the command can see.
pub async fn send_ephemeral_message(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	content: impl Into<String>,
) -> miette::Result<()> {
	let response = InteractionResponseDataBuilder::new()
		.content(content)
		.flags(MessageFlags::EPHEMERAL)
		.allowed_mentions(AllowedMentions::default())
		.build();
	send_response(interaction, http_client, application_id, response).await
}

/// Replies with a plain message visible to the channel.
pub async fn send_message(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	content: impl Into<String>,
) -> miette::Result<()> {
	let response = InteractionResponseDataBuilder::new()
		.content(content)
		.allowed_mentions(AllowedMentions::default())
		.build();
	send_response(interaction, http_client, application_id, response).await
}

pub async fn send_embed(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	embed: Embed,
) -> miette::Result<()> {
	let response = InteractionResponseDataBuilder::new()
		.embeds([embed])
		.allowed_mentions(AllowedMentions::default())
		.build();
	send_response(interaction, http_client, application_id, response).await
}

/// Replies with an embed only the user who used the command can see.
pub async fn send_ephemeral_embed(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	embed: Embed,
) -> miette::Result<()> {
	send_response(interaction, http_client, application_id, ephemeral_embed_data(embed)).await
}

fn ephemeral_embed_data(embed: Embed) -> InteractionResponseData {
	InteractionResponseDataBuilder::new()
		.embeds([embed])
		.flags(MessageFlags::EPHEMERAL)
		.allowed_mentions(AllowedMentions::default())
		.build()
}

/// Acknowledges a command that takes longer than Discord's response window.
/// Finish it with [`update_deferred_embed`].
pub async fn defer_response(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	let response = InteractionResponse {
		kind: InteractionResponseType::DeferredChannelMessageWithSource,
		data: None,
	};
	http_client
		.interaction(application_id)
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;
	Ok(())
}

pub async fn update_deferred_embed(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	embed: Embed,
) -> miette::Result<()> {
	http_client
		.interaction(application_id)
		.update_response(&interaction.token)
		.embeds(Some(&[embed]))
		.await
		.into_diagnostic()?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use twilight_util::builder::embed::EmbedBuilder;

	#[test]
	fn ephemeral_embeds_are_flagged() {
		let embed = EmbedBuilder::new().title("Done").build();
		let data = ephemeral_embed_data(embed.clone());
		assert_eq!(data.flags, Some(MessageFlags::EPHEMERAL));
		assert_eq!(data.embeds, Some(vec![embed]));
	}
}
