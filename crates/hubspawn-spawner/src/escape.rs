// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Escaping of platform usernames into cluster-safe object names.
//!
//! The escaped form doubles as the durable identity of a user's pod, so the
//! mapping must never change between releases. Distinct usernames may escape
//! to the same string (`alice.smith` and `alice_smith` both become
//! `alice_smith`).

/// Character substituted for anything outside the pod-name alphabet.
pub const POD_NAME_ESCAPE_CHAR: char = '_';

/// Whether `c` may appear verbatim in the user part of a pod name.
pub fn is_pod_name_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '-'
}

/// Replace every character of `raw` rejected by `allowed` with `escape_char`.
///
/// Total and deterministic: one output character per input character.
pub fn escape(raw: &str, allowed: impl Fn(char) -> bool, escape_char: char) -> String {
	raw
		.chars()
		.map(|c| if allowed(c) { c } else { escape_char })
		.collect()
}

/// Escape a username with the pod-name alphabet.
pub fn escape_username(username: &str) -> String {
	escape(username, is_pod_name_char, POD_NAME_ESCAPE_CHAR)
}

/// Pod name for a user: `<prefix>-<escaped username>`.
pub fn pod_name(prefix: &str, username: &str) -> String {
	format!("{prefix}-{}", escape_username(username))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dots_are_escaped() {
		assert_eq!(escape_username("alice.smith"), "alice_smith");
		assert_eq!(pod_name("jupyterhub", "alice.smith"), "jupyterhub-alice_smith");
	}

	#[test]
	fn safe_names_pass_through() {
		assert_eq!(escape_username("bob-42"), "bob-42");
		assert_eq!(escape_username("Carol"), "Carol");
	}

	#[test]
	fn empty_input_escapes_to_empty() {
		assert_eq!(escape_username(""), "");
		assert_eq!(pod_name("jupyterhub", ""), "jupyterhub-");
	}

	#[test]
	fn non_ascii_becomes_one_escape_char_each() {
		assert_eq!(escape_username("zoë@uni"), "zo__uni");
		assert_eq!(escape_username("用户"), "__");
	}

	#[test]
	fn collisions_are_possible() {
		assert_eq!(escape_username("alice.smith"), escape_username("alice@smith"));
		assert_eq!(escape_username("alice.smith"), escape_username("alice_smith"));
	}

	#[test]
	fn custom_alphabet_and_escape_char() {
		let lower = |c: char| c.is_ascii_lowercase();
		assert_eq!(escape("Ab-c", lower, 'x'), "xbxc");
	}
}
