// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use twilight_http::api_error::ApiError;
use twilight_http::error::{Error, ErrorType};

pub const MAXIMUM_EMOJIS_REACHED: u64 = 30008;
pub const MISSING_PERMISSIONS: u64 = 50013;

/// Gets the JSON error code Discord responded with, if the request got that far.
pub fn api_error_code(error: &Error) -> Option<u64> {
	match error.kind() {
		ErrorType::Response {
			error: ApiError::General(general_error),
			..
		} => Some(general_error.code),
		_ => None,
	}
}

pub fn is_missing_permissions(error: &Error) -> bool {
	api_error_code(error) == Some(MISSING_PERMISSIONS)
}
