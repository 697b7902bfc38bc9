// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::pagination::{PageAction, page_count, page_slice};
use super::responses::DEFAULT_COLOR;
use miette::IntoDiagnostic;
use twilight_http::client::Client;
use twilight_model::channel::message::Embed;
use twilight_model::channel::message::component::{ActionRow, Button, ButtonStyle, Component};
use twilight_model::guild::Emoji;
use twilight_model::id::Id;
use twilight_model::id::marker::{EmojiMarker, GuildMarker};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};
use twilight_validate::embed::EmbedValidationError;

pub const EMOJIS_PER_PAGE: usize = 20;

/// The parts of a custom emoji shown in the emoji list.
#[derive(Clone, Debug)]
pub struct EmojiEntry {
	pub id: Id<EmojiMarker>,
	pub name: String,
	pub animated: bool,
}

impl From<&Emoji> for EmojiEntry {
	fn from(emoji: &Emoji) -> Self {
		Self {
			id: emoji.id,
			name: emoji.name.clone(),
			animated: emoji.animated,
		}
	}
}

impl EmojiEntry {
	fn list_line(&self) -> String {
		let animated_prefix = if self.animated { "a" } else { "" };
		format!("<{}:{}:{}> `:{}:`", animated_prefix, self.name, self.id, self.name)
	}
}

/// Gets the guild's custom emojis in the order Discord lists them.
pub async fn fetch_emoji_entries(guild_id: Id<GuildMarker>, http_client: &Client) -> miette::Result<Vec<EmojiEntry>> {
	let emojis = http_client
		.emojis(guild_id)
		.await
		.into_diagnostic()?
		.models()
		.await
		.into_diagnostic()?;
	Ok(emojis.iter().map(EmojiEntry::from).collect())
}

pub fn emoji_page_count(emoji_count: usize) -> usize {
	page_count(emoji_count, EMOJIS_PER_PAGE)
}

pub fn emoji_page_embed(guild_name: &str, emojis: &[EmojiEntry], page: usize) -> Result<Embed, EmbedValidationError> {
	let total_pages = emoji_page_count(emojis.len());
	let lines: Vec<String> = page_slice(emojis, page, EMOJIS_PER_PAGE)
		.iter()
		.map(EmojiEntry::list_line)
		.collect();
	let footer = EmbedFooterBuilder::new(format!(
		"Page {} of {} • {} total emojis",
		page,
		total_pages,
		emojis.len()
	))
	.build();
	Ok(EmbedBuilder::new()
		.title(format!("{} Custom Emojis", guild_name))
		.description(lines.join("\n"))
		.footer(footer)
		.color(DEFAULT_COLOR)
		.validate()?
		.build())
}

/// Builds the First/Previous/Next/Last buttons for a page of the emoji list.
pub fn emoji_page_buttons(guild_id: Id<GuildMarker>, page: usize, total_pages: usize) -> Component {
	let on_first_page = page <= 1;
	let on_last_page = page >= total_pages;
	let buttons = [
		(PageAction::First, "⏮️ First", ButtonStyle::Secondary, on_first_page),
		(PageAction::Previous, "⬅️ Previous", ButtonStyle::Primary, on_first_page),
		(PageAction::Next, "Next ➡️", ButtonStyle::Primary, on_last_page),
		(PageAction::Last, "Last ⏭️", ButtonStyle::Secondary, on_last_page),
	]
	.into_iter()
	.map(|(action, label, style, disabled)| {
		Component::Button(Button {
			custom_id: Some(format!("emojis/{}/{}/{}", action.custom_id_part(), guild_id.get(), page)),
			disabled,
			emoji: None,
			label: Some(String::from(label)),
			style,
			url: None,
			sku_id: None,
		})
	})
	.collect();
	Component::ActionRow(ActionRow { components: buttons })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn emojis(count: u64) -> Vec<EmojiEntry> {
		(1..=count)
			.map(|id| EmojiEntry {
				id: Id::new(id),
				name: format!("emoji{}", id),
				animated: id % 2 == 0,
			})
			.collect()
	}

	fn buttons(component: Component) -> Vec<Button> {
		let Component::ActionRow(row) = component else {
			panic!("expected an action row");
		};
		row.components
			.into_iter()
			.map(|component| match component {
				Component::Button(button) => button,
				other => panic!("expected a button, got {:?}", other),
			})
			.collect()
	}

	#[test]
	fn page_shows_its_emojis() {
		let embed = emoji_page_embed("Test Server", &emojis(45), 3).unwrap();
		assert_eq!(embed.title.as_deref(), Some("Test Server Custom Emojis"));
		let description = embed.description.unwrap();
		assert_eq!(description.lines().count(), 5);
		assert!(description.starts_with("<:emoji41:41> `:emoji41:`"));
		assert!(description.contains("<a:emoji42:42> `:emoji42:`"));
		assert_eq!(embed.footer.unwrap().text, "Page 3 of 3 • 45 total emojis");
	}

	#[test]
	fn buttons_carry_the_current_page() {
		let buttons = buttons(emoji_page_buttons(Id::new(7), 2, 3));
		let custom_ids: Vec<&str> = buttons
			.iter()
			.filter_map(|button| button.custom_id.as_deref())
			.collect();
		assert_eq!(
			custom_ids,
			vec!["emojis/first/7/2", "emojis/prev/7/2", "emojis/next/7/2", "emojis/last/7/2"]
		);
		assert!(buttons.iter().all(|button| !button.disabled));
	}

	#[test]
	fn buttons_disable_at_the_ends() {
		let disabled: Vec<bool> = buttons(emoji_page_buttons(Id::new(7), 1, 1))
			.iter()
			.map(|button| button.disabled)
			.collect();
		assert_eq!(disabled, vec![true, true, true, true]);

		let disabled: Vec<bool> = buttons(emoji_page_buttons(Id::new(7), 1, 2))
			.iter()
			.map(|button| button.disabled)
			.collect();
		assert_eq!(disabled, vec![true, true, false, false]);
	}
}
