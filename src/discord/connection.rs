// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::commands::{command_definitions, route_command};
use super::events::route_events;
use super::interactions::route_interaction;
use super::state::BotState;
use super::sticky_channel::DiscordStickyChannel;
use crate::config::ConfigData;
use crate::store::afk::AfkRegistry;
use crate::store::autorole::AutoRoleRegistry;
use crate::store::blacklist::Blacklist;
use crate::store::sticky::StickyTracker;
use miette::IntoDiagnostic;
use std::sync::Arc;
use std::time::Instant;
use twilight_cache_inmemory::{DefaultInMemoryCache, ResourceType};
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt};
use twilight_http::client::Client;
use twilight_model::application::interaction::InteractionData;
use twilight_model::gateway::event::Event;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

pub fn set_up_client(config: &ConfigData) -> Arc<Client> {
	Arc::new(Client::new(config.discord.bot_token.clone()))
}

pub async fn run_bot(config: &ConfigData, http_client: Arc<Client>) -> miette::Result<()> {
	let intents = Intents::GUILDS | Intents::GUILD_MEMBERS | Intents::GUILD_MESSAGES;

	let mut shard = Shard::new(ShardId::ONE, config.discord.bot_token.clone(), intents);

	let cache = DefaultInMemoryCache::builder()
		.resource_types(ResourceType::all())
		.build();

	let application_id = {
		let application_response = http_client.current_user_application().await.into_diagnostic()?;
		application_response.model().await.into_diagnostic()?.id
	};
	let bot_user_id = {
		let user_response = http_client.current_user().await.into_diagnostic()?;
		user_response.model().await.into_diagnostic()?.id
	};

	{
		let interaction_client = http_client.interaction(application_id);
		let commands = command_definitions();
		interaction_client
			.set_global_commands(&commands)
			.await
			.into_diagnostic()?;
		tracing::info!(count = commands.len(), "Registered global commands");
	}

	if config.discord.owner_id.is_none() {
		tracing::warn!("No bot owner is configured; owner-only commands will be refused for everyone");
	}

	let bot_state = Arc::new(BotState {
		stickies: StickyTracker::new(DiscordStickyChannel::new(Arc::clone(&http_client))),
		afk: AfkRegistry::new(),
		autoroles: AutoRoleRegistry::new(),
		blacklist: Blacklist::new(),
		cache,
		owner_id: config.discord.owner_id,
		bot_user_id,
		started_at: Instant::now(),
		web_client: reqwest::Client::new(),
	});

	while let Some(event) = shard.next_event(EventTypeFlags::all()).await {
		let event = match event {
			Ok(event) => event,
			Err(error) => {
				tracing::warn!(source = ?error, "error receiving event");
				continue;
			}
		};
		bot_state.cache.update(&event);

		tokio::spawn(handle_event(
			event,
			Arc::clone(&http_client),
			application_id,
			Arc::clone(&bot_state),
		));
	}

	Ok(())
}

async fn handle_event(
	event: Event,
	http_client: Arc<Client>,
	application_id: Id<ApplicationMarker>,
	bot_state: Arc<BotState>,
) {
	let event_result = handle_event_route(event, &http_client, application_id, &bot_state).await;
	if let Err(error) = event_result {
		tracing::error!(source = ?error, "An error occurred handling a gateway event");
	}
}

async fn handle_event_route(
	event: Event,
	http_client: &Arc<Client>,
	application_id: Id<ApplicationMarker>,
	bot_state: &BotState,
) -> miette::Result<()> {
	tracing::debug!("Incoming gateway message: {:?}", event);
	match event {
		Event::InteractionCreate(interaction) => match &interaction.data {
			Some(InteractionData::ApplicationCommand(command_data)) => {
				route_command(&interaction, command_data, http_client, application_id, bot_state).await?;
			}
			Some(InteractionData::MessageComponent(interaction_data)) => {
				route_interaction(&interaction, interaction_data, http_client, application_id, bot_state).await?;
			}
			_ => (),
		},
		Event::Ready(ready) => {
			tracing::info!(guilds = ready.guilds.len(), user = %ready.user.name, "Discord gateway is ready");
		}
		event => route_events(&event, http_client, bot_state).await?,
	}
	Ok(())
}
