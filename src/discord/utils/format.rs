// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::time::Duration;

const TIME_AGO_UNITS: [(&str, i64); 6] = [
	("year", 31_536_000),
	("month", 2_592_000),
	("week", 604_800),
	("day", 86_400),
	("hour", 3_600),
	("minute", 60),
];

/// Describes an elapsed number of seconds using the largest whole unit that fits, e.g. "3 hours".
pub fn format_time_ago(elapsed_seconds: i64) -> String {
	for (unit, unit_seconds) in TIME_AGO_UNITS {
		let count = elapsed_seconds / unit_seconds;
		if count >= 1 {
			let plural = if count > 1 { "s" } else { "" };
			return format!("{} {}{}", count, unit, plural);
		}
	}
	String::from("a few seconds")
}

/// Formats an uptime as `1d 2h 3m 4s`, leaving out zero days, hours, and minutes.
pub fn format_uptime(uptime: Duration) -> String {
	let total_seconds = uptime.as_secs();
	let days = total_seconds / 86_400;
	let hours = (total_seconds % 86_400) / 3_600;
	let minutes = (total_seconds % 3_600) / 60;
	let seconds = total_seconds % 60;

	let mut uptime_string = String::new();
	if days > 0 {
		uptime_string.push_str(&format!("{}d ", days));
	}
	if hours > 0 {
		uptime_string.push_str(&format!("{}h ", hours));
	}
	if minutes > 0 {
		uptime_string.push_str(&format!("{}m ", minutes));
	}
	uptime_string.push_str(&format!("{}s", seconds));
	uptime_string
}

/// Joins lines for an embed description, leaving off whole lines that would go past `limit` characters.
pub fn join_within_limit(lines: &[String], separator: &str, limit: usize) -> String {
	lines[..lines_within_limit(lines, separator, limit)].join(separator)
}

/// The number of leading lines [`join_within_limit`] keeps.
pub fn lines_within_limit(lines: &[String], separator: &str, limit: usize) -> usize {
	let separator_length = separator.chars().count();
	let mut length = 0;
	for (index, line) in lines.iter().enumerate() {
		let added_length = if index == 0 {
			line.chars().count()
		} else {
			separator_length + line.chars().count()
		};
		if length + added_length > limit {
			return index;
		}
		length += added_length;
	}
	lines.len()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn time_ago_uses_largest_unit() {
		assert_eq!(format_time_ago(0), "a few seconds");
		assert_eq!(format_time_ago(59), "a few seconds");
		assert_eq!(format_time_ago(60), "1 minute");
		assert_eq!(format_time_ago(150), "2 minutes");
		assert_eq!(format_time_ago(3_600), "1 hour");
		assert_eq!(format_time_ago(86_400 * 2 + 5), "2 days");
		assert_eq!(format_time_ago(604_800), "1 week");
		assert_eq!(format_time_ago(2_592_000 * 3), "3 months");
		assert_eq!(format_time_ago(31_536_000), "1 year");
	}

	#[test]
	fn negative_elapsed_time_is_recent() {
		assert_eq!(format_time_ago(-30), "a few seconds");
	}

	#[test]
	fn uptime_skips_empty_units() {
		assert_eq!(format_uptime(Duration::from_secs(0)), "0s");
		assert_eq!(format_uptime(Duration::from_secs(61)), "1m 1s");
		assert_eq!(format_uptime(Duration::from_secs(3_600)), "1h 0s");
		assert_eq!(format_uptime(Duration::from_secs(86_400 + 7_200 + 180 + 4)), "1d 2h 3m 4s");
		assert_eq!(format_uptime(Duration::from_millis(1_999)), "1s");
	}

	#[test]
	fn joined_lines_stay_within_limit() {
		let lines = vec![String::from("aaaa"), String::from("bbbb"), String::from("cccc")];
		assert_eq!(join_within_limit(&lines, "\n", 100), "aaaa\nbbbb\ncccc");
		assert_eq!(join_within_limit(&lines, "\n", 9), "aaaa\nbbbb");
		assert_eq!(join_within_limit(&lines, "\n", 8), "aaaa");
		assert_eq!(join_within_limit(&lines, "\n", 3), "");
	}
}
