// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// The number of pages needed to show `total` items, `per_page` at a time.
pub fn page_count(total: usize, per_page: usize) -> usize {
	total.div_ceil(per_page)
}

/// Gets the items shown on a 1-based page. Pages past the end are empty.
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
	let start = page.saturating_sub(1).saturating_mul(per_page).min(items.len());
	let end = start.saturating_add(per_page).min(items.len());
	&items[start..end]
}

/// Reads a page option value. Missing values are the first page, and values below 1 are rejected.
pub fn requested_page(page: Option<i64>) -> Option<usize> {
	match page {
		None => Some(1),
		Some(page) if page >= 1 => usize::try_from(page).ok(),
		Some(_) => None,
	}
}

/// A pagination button.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageAction {
	First,
	Previous,
	Next,
	Last,
}

impl PageAction {
	pub fn from_custom_id_part(part: &str) -> Option<Self> {
		match part {
			"first" => Some(Self::First),
			"prev" => Some(Self::Previous),
			"next" => Some(Self::Next),
			"last" => Some(Self::Last),
			_ => None,
		}
	}

	pub fn custom_id_part(&self) -> &'static str {
		match self {
			Self::First => "first",
			Self::Previous => "prev",
			Self::Next => "next",
			Self::Last => "last",
		}
	}

	/// The page this button goes to from `current` when there are `total` pages.
	pub fn target_page(&self, current: usize, total: usize) -> usize {
		let total = total.max(1);
		match self {
			Self::First => 1,
			Self::Previous => current.saturating_sub(1).clamp(1, total),
			Self::Next => current.saturating_add(1).min(total),
			Self::Last => total,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn page_counts_round_up() {
		assert_eq!(page_count(0, 10), 0);
		assert_eq!(page_count(1, 10), 1);
		assert_eq!(page_count(10, 10), 1);
		assert_eq!(page_count(11, 10), 2);
		assert_eq!(page_count(41, 20), 3);
	}

	#[test]
	fn slices_pages() {
		let items: Vec<u32> = (1..=25).collect();
		assert_eq!(page_slice(&items, 1, 10), &items[0..10]);
		assert_eq!(page_slice(&items, 3, 10), &[21, 22, 23, 24, 25]);
		assert!(page_slice(&items, 4, 10).is_empty());
	}

	#[test]
	fn page_option_defaults_to_first() {
		assert_eq!(requested_page(None), Some(1));
		assert_eq!(requested_page(Some(4)), Some(4));
		assert_eq!(requested_page(Some(0)), None);
		assert_eq!(requested_page(Some(-2)), None);
	}

	#[test]
	fn cursor_movement() {
		assert_eq!(PageAction::First.target_page(3, 5), 1);
		assert_eq!(PageAction::Previous.target_page(3, 5), 2);
		assert_eq!(PageAction::Previous.target_page(1, 5), 1);
		assert_eq!(PageAction::Next.target_page(3, 5), 4);
		assert_eq!(PageAction::Next.target_page(5, 5), 5);
		assert_eq!(PageAction::Last.target_page(2, 5), 5);
		// Emojis may have been deleted since the buttons were shown.
		assert_eq!(PageAction::Next.target_page(5, 3), 3);
		assert_eq!(PageAction::Previous.target_page(5, 3), 3);
	}

	#[test]
	fn custom_id_parts() {
		for action in [PageAction::First, PageAction::Previous, PageAction::Next, PageAction::Last] {
			assert_eq!(PageAction::from_custom_id_part(action.custom_id_part()), Some(action));
		}
		assert_eq!(PageAction::from_custom_id_part("skip"), None);
	}
}
