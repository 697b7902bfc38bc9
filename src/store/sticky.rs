// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::model::StickyRecord;
use async_trait::async_trait;
use miette::Diagnostic;
use std::collections::BTreeMap;
use std::error::Error;
use thiserror::Error;
use tokio::sync::RwLock;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker};

/// The number of characters of a sticky message shown in listings before it's cut off.
pub const PREVIEW_LENGTH: usize = 50;

/// Failure reported by a [StickyChannel] when posting a message.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct PostError(Box<dyn Error + Send + Sync>);

impl PostError {
	pub fn new(error: impl Error + Send + Sync + 'static) -> Self {
		Self(Box::new(error))
	}
}

/// What happened to a previously posted sticky message when it was deleted.
///
/// Deletion is best-effort, so callers are free to ignore this.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeleteOutcome {
	Deleted,
	/// The message couldn't be deleted; most likely it was already deleted by someone else.
	Gone,
}

#[derive(Debug, Diagnostic, Error)]
pub enum StickyError {
	#[error("there is no sticky message set for this channel")]
	NotConfigured,
	#[error("the sticky message is already active in this channel")]
	AlreadyActive,
	#[error("the sticky message is already stopped in this channel")]
	AlreadyStopped,
	#[error("failed to post the sticky message")]
	ExternalOperationFailed(#[source] PostError),
}

/// The messaging operations the sticky tracker needs from the chat platform.
#[async_trait]
pub trait StickyChannel: Send + Sync {
	/// Posts the sticky text to the channel, returning the ID of the new message.
	async fn post(&self, channel_id: Id<ChannelMarker>, text: &str) -> Result<Id<MessageMarker>, PostError>;

	/// Deletes a previously posted sticky message.
	async fn delete(&self, channel_id: Id<ChannelMarker>, message_id: Id<MessageMarker>) -> DeleteOutcome;
}

/// Summary of a sticky message for listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StickySummary {
	pub channel_id: Id<ChannelMarker>,
	pub active: bool,
	pub preview: String,
}

/// Tracks the sticky message of each channel and keeps a single copy of it at the bottom of the channel.
///
/// The record map is never locked across a call to the [StickyChannel].
pub struct StickyTracker<C> {
	channel: C,
	records: RwLock<BTreeMap<Id<ChannelMarker>, StickyRecord>>,
}

impl<C: StickyChannel> StickyTracker<C> {
	pub fn new(channel: C) -> Self {
		Self {
			channel,
			records: RwLock::new(BTreeMap::new()),
		}
	}

	/// Sets (or replaces) the sticky message for a channel and posts it right away.
	pub async fn set(
		&self,
		channel_id: Id<ChannelMarker>,
		guild_id: Id<GuildMarker>,
		message: String,
	) -> Result<(), StickyError> {
		let previous_post = {
			let mut records = self.records.write().await;
			let previous_post = records
				.get(&channel_id)
				.and_then(|record| record.last_posted_message_id);
			records.insert(channel_id, StickyRecord::new(channel_id, guild_id, message.clone()));
			previous_post
		};

		self.repost(channel_id, previous_post, &message).await
	}

	/// Stops reposting in a channel, keeping the message text so it can be started again.
	pub async fn stop(&self, channel_id: Id<ChannelMarker>) -> Result<(), StickyError> {
		let previous_post = {
			let mut records = self.records.write().await;
			let Some(record) = records.get_mut(&channel_id) else {
				return Err(StickyError::NotConfigured);
			};
			if !record.active {
				return Err(StickyError::AlreadyStopped);
			}
			record.active = false;
			record.last_posted_message_id.take()
		};

		if let Some(message_id) = previous_post {
			self.channel.delete(channel_id, message_id).await;
		}
		Ok(())
	}

	/// Starts a stopped sticky message again, posting the stored text.
	pub async fn start(&self, channel_id: Id<ChannelMarker>) -> Result<(), StickyError> {
		let (message, previous_post) = {
			let mut records = self.records.write().await;
			let Some(record) = records.get_mut(&channel_id) else {
				return Err(StickyError::NotConfigured);
			};
			if record.active {
				return Err(StickyError::AlreadyActive);
			}
			record.active = true;
			(record.message.clone(), record.last_posted_message_id.take())
		};

		self.repost(channel_id, previous_post, &message).await
	}

	/// Removes the sticky message from a channel entirely.
	pub async fn remove(&self, channel_id: Id<ChannelMarker>) -> Result<(), StickyError> {
		let Some(record) = self.records.write().await.remove(&channel_id) else {
			return Err(StickyError::NotConfigured);
		};

		if let Some(message_id) = record.last_posted_message_id {
			self.channel.delete(channel_id, message_id).await;
		}
		Ok(())
	}

	/// Lists the sticky messages configured in a guild, ordered by channel.
	pub async fn list(&self, guild_id: Id<GuildMarker>) -> Vec<StickySummary> {
		self.records
			.read()
			.await
			.values()
			.filter(|record| record.guild_id == guild_id)
			.map(|record| StickySummary {
				channel_id: record.channel_id,
				active: record.active,
				preview: preview(&record.message),
			})
			.collect()
	}

	pub async fn get(&self, channel_id: Id<ChannelMarker>) -> Option<StickyRecord> {
		self.records.read().await.get(&channel_id).cloned()
	}

	/// Moves the sticky message of a channel back to the bottom after someone posts there.
	///
	/// Messages from bots (including the sticky posts themselves) are ignored.
	pub async fn on_channel_activity(
		&self,
		channel_id: Id<ChannelMarker>,
		author_is_bot: bool,
	) -> Result<(), StickyError> {
		if author_is_bot {
			return Ok(());
		}

		let (message, previous_post) = {
			let mut records = self.records.write().await;
			let Some(record) = records.get_mut(&channel_id) else {
				return Ok(());
			};
			if !record.active {
				return Ok(());
			}
			(record.message.clone(), record.last_posted_message_id.take())
		};

		self.repost(channel_id, previous_post, &message).await
	}

	/// Deletes the previous post (if any) and posts a new copy of the text.
	///
	/// If the record changed while the new copy was being posted, the copy that's no longer wanted is deleted so only
	/// one sticky message is left in the channel.
	async fn repost(
		&self,
		channel_id: Id<ChannelMarker>,
		previous_post: Option<Id<MessageMarker>>,
		text: &str,
	) -> Result<(), StickyError> {
		if let Some(message_id) = previous_post {
			self.channel.delete(channel_id, message_id).await;
		}

		let posted = self
			.channel
			.post(channel_id, text)
			.await
			.map_err(StickyError::ExternalOperationFailed)?;

		let unwanted_post = {
			let mut records = self.records.write().await;
			match records.get_mut(&channel_id) {
				Some(record) if record.active && record.message == text => record.last_posted_message_id.replace(posted),
				_ => Some(posted),
			}
		};

		if let Some(message_id) = unwanted_post {
			tracing::debug!(%channel_id, %message_id, "Deleting superseded sticky message");
			self.channel.delete(channel_id, message_id).await;
		}
		Ok(())
	}
}

/// Shortens a sticky message for display in listings.
pub fn preview(message: &str) -> String {
	match message.char_indices().nth(PREVIEW_LENGTH) {
		Some((cut_index, _)) => format!("{}...", &message[..cut_index]),
		None => message.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
	use std::sync::{Arc, Mutex};
	use tokio::sync::Notify;

	#[derive(Clone, Debug, Eq, PartialEq)]
	enum Call {
		Post(Id<ChannelMarker>, String),
		Delete(Id<ChannelMarker>, Id<MessageMarker>),
	}

	#[derive(Clone, Default)]
	struct RecordingChannel {
		calls: Arc<Mutex<Vec<Call>>>,
		next_message_id: Arc<AtomicU64>,
		fail_posts: Arc<AtomicBool>,
		post_gate: Arc<Mutex<Option<Arc<Notify>>>>,
	}

	impl RecordingChannel {
		fn calls(&self) -> Vec<Call> {
			self.calls.lock().unwrap().clone()
		}

		/// Makes every later post wait for the returned gate before completing.
		fn hold_posts(&self) -> Arc<Notify> {
			let gate = Arc::new(Notify::new());
			*self.post_gate.lock().unwrap() = Some(Arc::clone(&gate));
			gate
		}

		fn deleted_ids(&self) -> Vec<Id<MessageMarker>> {
			self.calls()
				.into_iter()
				.filter_map(|call| match call {
					Call::Delete(_, message_id) => Some(message_id),
					Call::Post(..) => None,
				})
				.collect()
		}

		async fn wait_for_posts(&self, count: usize) {
			while self.posts().len() < count {
				tokio::task::yield_now().await;
			}
		}

		fn clear(&self) {
			self.calls.lock().unwrap().clear();
		}

		fn posts(&self) -> Vec<String> {
			self.calls()
				.into_iter()
				.filter_map(|call| match call {
					Call::Post(_, text) => Some(text),
					Call::Delete(..) => None,
				})
				.collect()
		}

		fn deletes(&self) -> usize {
			self.calls()
				.iter()
				.filter(|call| matches!(call, Call::Delete(..)))
				.count()
		}
	}

	#[async_trait]
	impl StickyChannel for RecordingChannel {
		async fn post(&self, channel_id: Id<ChannelMarker>, text: &str) -> Result<Id<MessageMarker>, PostError> {
			self.calls.lock().unwrap().push(Call::Post(channel_id, text.to_string()));
			if self.fail_posts.load(Ordering::SeqCst) {
				return Err(PostError("missing access".into()));
			}
			let id = self.next_message_id.fetch_add(1, Ordering::SeqCst) + 100;
			let gate = self.post_gate.lock().unwrap().clone();
			if let Some(gate) = gate {
				gate.notified().await;
			}
			Ok(Id::new(id))
		}

		async fn delete(&self, channel_id: Id<ChannelMarker>, message_id: Id<MessageMarker>) -> DeleteOutcome {
			self.calls.lock().unwrap().push(Call::Delete(channel_id, message_id));
			// Every delete "fails" the way an already-deleted message would; it mustn't matter.
			DeleteOutcome::Gone
		}
	}

	fn tracker() -> (StickyTracker<RecordingChannel>, RecordingChannel) {
		let channel = RecordingChannel::default();
		(StickyTracker::new(channel.clone()), channel)
	}

	const C1: Id<ChannelMarker> = Id::new(1);
	const C2: Id<ChannelMarker> = Id::new(2);
	const C3: Id<ChannelMarker> = Id::new(3);
	const G1: Id<GuildMarker> = Id::new(10);
	const G2: Id<GuildMarker> = Id::new(20);

	#[tokio::test]
	async fn welcome_scenario() {
		let (tracker, channel) = tracker();

		tracker.set(C1, G1, String::from("Welcome!")).await.unwrap();
		let record = tracker.get(C1).await.unwrap();
		assert_eq!(record.message, "Welcome!");
		assert!(record.active);
		assert_eq!(channel.calls(), vec![Call::Post(C1, String::from("Welcome!"))]);
		let first_post = record.last_posted_message_id.unwrap();

		channel.clear();
		tracker.on_channel_activity(C1, false).await.unwrap();
		assert_eq!(channel.deletes(), 1);
		assert_eq!(channel.posts(), vec![String::from("Welcome!")]);
		let second_post = tracker.get(C1).await.unwrap().last_posted_message_id.unwrap();
		assert_ne!(first_post, second_post);
		assert_eq!(channel.calls()[0], Call::Delete(C1, first_post));

		channel.clear();
		tracker.stop(C1).await.unwrap();
		let record = tracker.get(C1).await.unwrap();
		assert!(!record.active);
		assert_eq!(record.last_posted_message_id, None);
		assert_eq!(channel.calls(), vec![Call::Delete(C1, second_post)]);

		channel.clear();
		tracker.start(C1).await.unwrap();
		assert!(tracker.get(C1).await.unwrap().active);
		assert_eq!(channel.calls(), vec![Call::Post(C1, String::from("Welcome!"))]);
	}

	#[tokio::test]
	async fn stop_without_set_is_not_configured() {
		let (tracker, channel) = tracker();
		assert!(matches!(tracker.stop(C2).await, Err(StickyError::NotConfigured)));
		assert!(matches!(tracker.start(C2).await, Err(StickyError::NotConfigured)));
		assert!(matches!(tracker.remove(C2).await, Err(StickyError::NotConfigured)));
		assert!(channel.calls().is_empty());
	}

	#[tokio::test]
	async fn set_twice_overwrites() {
		let (tracker, channel) = tracker();
		tracker.set(C1, G1, String::from("first")).await.unwrap();
		let first_post = tracker.get(C1).await.unwrap().last_posted_message_id.unwrap();
		tracker.set(C1, G1, String::from("second")).await.unwrap();

		let stickies = tracker.list(G1).await;
		assert_eq!(stickies.len(), 1);
		let record = tracker.get(C1).await.unwrap();
		assert_eq!(record.message, "second");
		assert!(record.active);
		assert!(channel.calls().contains(&Call::Delete(C1, first_post)));
	}

	#[tokio::test]
	async fn repeated_start_and_stop_are_rejected() {
		let (tracker, _channel) = tracker();
		tracker.set(C1, G1, String::from("hi")).await.unwrap();
		assert!(matches!(tracker.start(C1).await, Err(StickyError::AlreadyActive)));
		tracker.stop(C1).await.unwrap();
		assert!(matches!(tracker.stop(C1).await, Err(StickyError::AlreadyStopped)));
	}

	#[tokio::test]
	async fn remove_forgets_the_channel() {
		let (tracker, channel) = tracker();
		tracker.set(C1, G1, String::from("hi")).await.unwrap();
		let post = tracker.get(C1).await.unwrap().last_posted_message_id.unwrap();

		channel.clear();
		tracker.remove(C1).await.unwrap();
		assert_eq!(channel.calls(), vec![Call::Delete(C1, post)]);
		assert!(tracker.get(C1).await.is_none());
		assert!(tracker.list(G1).await.is_empty());
	}

	#[tokio::test]
	async fn bot_messages_never_repost() {
		let (tracker, channel) = tracker();
		tracker.set(C1, G1, String::from("hi")).await.unwrap();
		channel.clear();

		tracker.on_channel_activity(C1, true).await.unwrap();
		tracker.on_channel_activity(C3, true).await.unwrap();
		assert!(channel.calls().is_empty());
	}

	#[tokio::test]
	async fn inactive_or_missing_records_never_repost() {
		let (tracker, channel) = tracker();
		tracker.set(C1, G1, String::from("hi")).await.unwrap();
		tracker.stop(C1).await.unwrap();
		channel.clear();

		tracker.on_channel_activity(C1, false).await.unwrap();
		tracker.on_channel_activity(C3, false).await.unwrap();
		assert!(channel.calls().is_empty());
	}

	#[tokio::test]
	async fn failed_post_is_reported() {
		let (tracker, channel) = tracker();
		channel.fail_posts.store(true, Ordering::SeqCst);
		assert!(matches!(
			tracker.set(C1, G1, String::from("hi")).await,
			Err(StickyError::ExternalOperationFailed(_))
		));
		// The record is still kept, so the next message in the channel tries again.
		assert!(tracker.get(C1).await.unwrap().active);

		channel.fail_posts.store(false, Ordering::SeqCst);
		tracker.on_channel_activity(C1, false).await.unwrap();
		assert!(tracker.get(C1).await.unwrap().last_posted_message_id.is_some());
	}

	#[tokio::test]
	async fn list_filters_by_guild() {
		let (tracker, _channel) = tracker();
		tracker.set(C2, G1, String::from("two")).await.unwrap();
		tracker.set(C1, G1, String::from("one")).await.unwrap();
		tracker.set(C3, G2, String::from("three")).await.unwrap();
		tracker.stop(C2).await.unwrap();

		let stickies = tracker.list(G1).await;
		assert_eq!(
			stickies,
			vec![
				StickySummary {
					channel_id: C1,
					active: true,
					preview: String::from("one"),
				},
				StickySummary {
					channel_id: C2,
					active: false,
					preview: String::from("two"),
				},
			]
		);
	}

	#[test]
	fn long_messages_are_previewed() {
		let long = "x".repeat(51);
		assert_eq!(preview(&long), format!("{}...", "x".repeat(50)));
		assert_eq!(preview(&"y".repeat(50)), "y".repeat(50));
		let accented = "é".repeat(60);
		assert_eq!(preview(&accented).chars().count(), 53);
	}

	#[test]
	fn record_serializes_with_camel_case_fields() {
		let mut record = StickyRecord::new(C1, G1, String::from("Welcome!"));
		let value = serde_json::to_value(&record).unwrap();
		assert_eq!(
			value,
			serde_json::json!({
				"channelId": "1",
				"guildId": "10",
				"message": "Welcome!",
				"active": true,
			})
		);

		record.last_posted_message_id = Some(Id::new(5));
		let value = serde_json::to_value(&record).unwrap();
		assert_eq!(value["lastPostedMessageId"], "5");
	}

	#[tokio::test]
	async fn repost_finishing_after_stop_deletes_its_own_post() {
		let (tracker, channel) = tracker();
		tracker.set(C1, G1, String::from("hi")).await.unwrap();
		let gate = channel.hold_posts();

		let activity = tracker.on_channel_activity(C1, false);
		let stop = async {
			channel.wait_for_posts(2).await;
			tracker.stop(C1).await.unwrap();
			gate.notify_waiters();
		};
		let (activity_result, ()) = tokio::join!(activity, stop);
		activity_result.unwrap();

		assert_eq!(
			channel.calls(),
			vec![
				Call::Post(C1, String::from("hi")),
				Call::Delete(C1, Id::new(100)),
				Call::Post(C1, String::from("hi")),
				Call::Delete(C1, Id::new(101)),
			]
		);
		let record = tracker.get(C1).await.unwrap();
		assert!(!record.active);
		assert_eq!(record.last_posted_message_id, None);
	}

	#[tokio::test]
	async fn repost_finishing_after_remove_deletes_its_own_post() {
		let (tracker, channel) = tracker();
		tracker.set(C1, G1, String::from("hi")).await.unwrap();
		let gate = channel.hold_posts();

		let activity = tracker.on_channel_activity(C1, false);
		let remove = async {
			channel.wait_for_posts(2).await;
			tracker.remove(C1).await.unwrap();
			gate.notify_waiters();
		};
		let (activity_result, ()) = tokio::join!(activity, remove);
		activity_result.unwrap();

		assert_eq!(channel.deleted_ids(), vec![Id::new(100), Id::new(101)]);
		assert_eq!(tracker.get(C1).await, None);
	}

	#[tokio::test]
	async fn concurrent_activity_leaves_one_sticky() {
		let (tracker, channel) = tracker();
		tracker.set(C1, G1, String::from("hi")).await.unwrap();
		let gate = channel.hold_posts();

		let first = tracker.on_channel_activity(C1, false);
		let second = tracker.on_channel_activity(C1, false);
		let release = async {
			channel.wait_for_posts(3).await;
			gate.notify_waiters();
		};
		let (first_result, second_result, ()) = tokio::join!(first, second, release);
		first_result.unwrap();
		second_result.unwrap();

		let deleted = channel.deleted_ids();
		let surviving: Vec<Id<MessageMarker>> = (100..103)
			.map(Id::new)
			.filter(|message_id| !deleted.contains(message_id))
			.collect();
		assert_eq!(surviving.len(), 1);
		let record = tracker.get(C1).await.unwrap();
		assert!(record.active);
		assert_eq!(record.last_posted_message_id, Some(surviving[0]));
	}
}
