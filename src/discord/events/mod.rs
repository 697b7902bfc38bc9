// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::state::BotState;
use twilight_http::client::Client;
use twilight_model::gateway::event::Event;

mod member_add;
mod message_create;

/// Routes the gateway events that aren't interactions.
pub async fn route_events(event: &Event, http_client: &Client, bot_state: &BotState) -> miette::Result<()> {
	match event {
		Event::MessageCreate(message) => message_create::handle_message(&message.0, bot_state).await?,
		Event::MemberAdd(member) => member_add::apply_autoroles(member, http_client, bot_state).await?,
		_ => (),
	}
	Ok(())
}
