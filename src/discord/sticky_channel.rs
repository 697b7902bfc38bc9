// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::utils::responses::DEFAULT_COLOR;
use crate::store::sticky::{DeleteOutcome, PostError, StickyChannel};
use async_trait::async_trait;
use std::sync::Arc;
use twilight_http::client::Client;
use twilight_model::channel::message::{AllowedMentions, Embed};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};
use twilight_util::builder::embed::EmbedBuilder;
use twilight_validate::embed::EmbedValidationError;

/// Posts sticky messages to Discord channels.
pub struct DiscordStickyChannel {
	http_client: Arc<Client>,
}

impl DiscordStickyChannel {
	pub fn new(http_client: Arc<Client>) -> Self {
		Self { http_client }
	}
}

#[async_trait]
impl StickyChannel for DiscordStickyChannel {
	async fn post(&self, channel_id: Id<ChannelMarker>, text: &str) -> Result<Id<MessageMarker>, PostError> {
		let embed = sticky_embed(text).map_err(PostError::new)?;
		let message = self
			.http_client
			.create_message(channel_id)
			.embeds(&[embed])
			.allowed_mentions(Some(&AllowedMentions::default()))
			.await
			.map_err(PostError::new)?
			.model()
			.await
			.map_err(PostError::new)?;
		Ok(message.id)
	}

	async fn delete(&self, channel_id: Id<ChannelMarker>, message_id: Id<MessageMarker>) -> DeleteOutcome {
		match self.http_client.delete_message(channel_id, message_id).await {
			Ok(_) => DeleteOutcome::Deleted,
			Err(error) => {
				tracing::debug!(source = ?error, %channel_id, %message_id, "Previous sticky message couldn't be deleted");
				DeleteOutcome::Gone
			}
		}
	}
}

fn sticky_embed(text: &str) -> Result<Embed, EmbedValidationError> {
	Ok(EmbedBuilder::new()
		.title("📌 Sticky Message")
		.description(text)
		.color(DEFAULT_COLOR)
		.validate()?
		.build())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::MAX_STICKY_MESSAGE_LENGTH;

	#[test]
	fn longest_sticky_fits_in_an_embed() {
		let text = "a".repeat(usize::from(MAX_STICKY_MESSAGE_LENGTH));
		let embed = sticky_embed(&text).unwrap();
		assert_eq!(embed.title.as_deref(), Some("📌 Sticky Message"));
		assert_eq!(embed.description.as_deref(), Some(text.as_str()));
	}
}
