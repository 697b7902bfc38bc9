// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, TimeZone, Utc};
use twilight_model::util::datetime::{Timestamp, TimestampParseError};
use twilight_util::snowflake::Snowflake;

/// Gets the timestamp from the ID snowflake. If any failures occur in the conversion, returns `None`.
pub fn datetime_from_id(id: impl Snowflake) -> Option<DateTime<Utc>> {
	let timestamp = id.timestamp();
	Utc.timestamp_millis_opt(timestamp).single()
}

/// Gets the [Timestamp] for the current time, for use in embeds.
pub fn now_timestamp() -> Result<Timestamp, TimestampParseError> {
	Timestamp::from_micros(Utc::now().timestamp_micros())
}

/// Formats a time as a Discord timestamp markdown tag, which each user sees in their own time zone.
pub fn discord_timestamp_tag(datetime: &DateTime<Utc>) -> String {
	format!("<t:{}:F>", datetime.timestamp())
}

#[cfg(test)]
mod tests {
	use super::*;
	use twilight_model::id::Id;
	use twilight_model::id::marker::GuildMarker;

	#[test]
	fn snowflake_creation_time() {
		let id: Id<GuildMarker> = Id::new(175928847299117063);
		let datetime = datetime_from_id(id).unwrap();
		assert_eq!(datetime.timestamp_millis(), 1462015105796);
		assert_eq!(discord_timestamp_tag(&datetime), "<t:1462015105:F>");
	}
}
