// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::state::BotState;
use twilight_model::channel::Message;

/// Keeps the channel's sticky message (if it has one) below the new message.
pub async fn handle_message(message: &Message, bot_state: &BotState) -> miette::Result<()> {
	if message.guild_id.is_none() {
		return Ok(());
	}
	bot_state
		.stickies
		.on_channel_activity(message.channel_id, message.author.bot)
		.await?;
	Ok(())
}
