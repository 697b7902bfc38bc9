// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::state::BotState;
use crate::discord::utils::emoji_pages::{emoji_page_buttons, emoji_page_count, emoji_page_embed, fetch_emoji_entries};
use crate::discord::utils::pagination::PageAction;
use miette::{IntoDiagnostic, bail, ensure};
use twilight_http::client::Client;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, GuildMarker};
use twilight_util::builder::InteractionResponseDataBuilder;

/// A parsed `emojis/<action>/<guild>/<page>` button ID.
#[derive(Debug, Eq, PartialEq)]
struct EmojiPageButton {
	action: PageAction,
	guild_id: Id<GuildMarker>,
	current_page: usize,
}

fn parse_page_button(custom_id_path: &[&str]) -> Option<EmojiPageButton> {
	let [_, action, guild_id, current_page] = custom_id_path else {
		return None;
	};
	let action = PageAction::from_custom_id_part(action)?;
	let guild_id = guild_id.parse::<u64>().ok().and_then(Id::new_checked)?;
	let current_page = current_page.parse().ok()?;
	Some(EmojiPageButton {
		action,
		guild_id,
		current_page,
	})
}

/// Re-renders the emoji list in place at the page the button points to.
pub async fn handle_page_button(
	interaction: &InteractionCreate,
	custom_id_path: &[&str],
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let Some(button) = parse_page_button(custom_id_path) else {
		bail!("Malformed emoji page button ID: {}", custom_id_path.join("/"));
	};
	ensure!(
		interaction.guild_id == Some(button.guild_id),
		"Emoji page button for guild {} was used outside of it",
		button.guild_id
	);

	let emojis = fetch_emoji_entries(button.guild_id, http_client).await?;
	let response = if emojis.is_empty() {
		InteractionResponseDataBuilder::new()
			.content("This server has no custom emojis.")
			.embeds([])
			.components([])
			.build()
	} else {
		let total_pages = emoji_page_count(emojis.len());
		let page = button.action.target_page(button.current_page, total_pages);
		let guild_name = bot_state
			.guild_name(button.guild_id)
			.unwrap_or_else(|| String::from("Server"));
		let embed = emoji_page_embed(&guild_name, &emojis, page).into_diagnostic()?;
		InteractionResponseDataBuilder::new()
			.embeds([embed])
			.components([emoji_page_buttons(button.guild_id, page, total_pages)])
			.allowed_mentions(AllowedMentions::default())
			.build()
	};

	let response = InteractionResponse {
		kind: InteractionResponseType::UpdateMessage,
		data: Some(response),
	};
	http_client
		.interaction(application_id)
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_button_ids() {
		assert_eq!(
			parse_page_button(&["emojis", "next", "42", "3"]),
			Some(EmojiPageButton {
				action: PageAction::Next,
				guild_id: Id::new(42),
				current_page: 3,
			})
		);
		assert_eq!(parse_page_button(&["emojis", "next", "42"]), None);
		assert_eq!(parse_page_button(&["emojis", "skip", "42", "3"]), None);
		assert_eq!(parse_page_button(&["emojis", "next", "0", "3"]), None);
		assert_eq!(parse_page_button(&["emojis", "next", "42", "x"]), None);
	}
}
