// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::state::BotState;
use miette::bail;
use twilight_http::client::Client;
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

mod emojis;

/// Routes button presses by the first part of their `/`-separated custom ID.
pub async fn route_interaction(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let custom_id_path: Vec<&str> = interaction_data.custom_id.split('/').collect();

	match custom_id_path.first().copied() {
		Some("emojis") => {
			emojis::handle_page_button(interaction, &custom_id_path, http_client, application_id, bot_state).await
		}
		_ => bail!(
			"Unexpected interaction encountered: {}\n{:?}",
			interaction_data.custom_id,
			interaction_data
		),
	}
}
