//! Presence operations: leave, heartbeat, here-now, where-now, and
//! channel-local state (grounded in `pubnub_coreapi.c`'s `pubnub_leave`,
//! `pbauto_heartbeat.c`'s heartbeat-thump URL, and the presence API
//! surface described only by contract in §1).

use crate::config::Config;
use crate::error::{Error, Result};
use crate::proto::Method;
use crate::url_encode::{append_param, encode_segment};

fn join(items: &[String]) -> String {
    items.join(",")
}

/// `pubnub_leave`: tells the server this context is no longer present on
/// the given channels/groups. Edits the caller's list first (comma-list
/// editing is §4.5's `update_channels_and_ch_groups` semantics, applied
/// by the dispatch layer before this is called).
pub fn format_leave(config: &Config, channels: &[String], groups: &[String]) -> Result<(Method, String)> {
    if channels.is_empty() && groups.is_empty() {
        return Err(Error::Format("leave requires at least one channel or group"));
    }
    let mut path = format!(
        "/v2/presence/sub-key/{sub_key}/channel/{channels}/leave?",
        sub_key = encode_segment(&config.keys.subscribe_key),
        channels = encode_segment(&join(channels)),
    );
    if !groups.is_empty() {
        append_param(&mut path, "channel-group", Some(&join(groups)));
    }
    append_param(&mut path, "uuid", Some(&config.user_id));
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }
    Ok((Method::Get, path))
}

/// An explicit heartbeat transaction (as opposed to an auto-heartbeat
/// thump, which uses the same URL shape via the same formatter).
pub fn format_heartbeat(config: &Config, channels: &[String], groups: &[String]) -> Result<(Method, String)> {
    if channels.is_empty() && groups.is_empty() {
        return Err(Error::Format("heartbeat requires at least one channel or group"));
    }
    let mut path = format!(
        "/v2/presence/sub-key/{sub_key}/channel/{channels}/heartbeat?",
        sub_key = encode_segment(&config.keys.subscribe_key),
        channels = encode_segment(&join(channels)),
    );
    if !groups.is_empty() {
        append_param(&mut path, "channel-group", Some(&join(groups)));
    }
    append_param(&mut path, "uuid", Some(&config.user_id));
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }
    Ok((Method::Get, path))
}

pub fn format_here_now(config: &Config, channel: &str) -> Result<(Method, String)> {
    if channel.is_empty() {
        return Err(Error::Format("here-now requires a channel"));
    }
    let mut path = format!(
        "/v2/presence/sub-key/{sub_key}/channel/{ch}?",
        sub_key = encode_segment(&config.keys.subscribe_key),
        ch = encode_segment(channel),
    );
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }
    Ok((Method::Get, path))
}

pub fn format_global_here_now(config: &Config) -> Result<(Method, String)> {
    let mut path = format!(
        "/v2/presence/sub-key/{sub_key}/channel/*?",
        sub_key = encode_segment(&config.keys.subscribe_key),
    );
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }
    Ok((Method::Get, path))
}

pub fn format_where_now(config: &Config, user_id: &str) -> Result<(Method, String)> {
    let who = if user_id.is_empty() { &config.user_id } else { user_id };
    let mut path = format!(
        "/v2/presence/sub-key/{sub_key}/uuid/{uuid}?",
        sub_key = encode_segment(&config.keys.subscribe_key),
        uuid = encode_segment(who),
    );
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }
    Ok((Method::Get, path))
}

pub fn format_set_state(config: &Config, channel: &str, state_json: &str) -> Result<(Method, String)> {
    if channel.is_empty() {
        return Err(Error::Format("set-state requires a channel"));
    }
    let mut path = format!(
        "/v2/presence/sub-key/{sub_key}/channel/{ch}/uuid/{uuid}/data?",
        sub_key = encode_segment(&config.keys.subscribe_key),
        ch = encode_segment(channel),
        uuid = encode_segment(&config.user_id),
    );
    append_param(&mut path, "state", Some(state_json));
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }
    Ok((Method::Get, path))
}

pub fn format_state_get(config: &Config, channel: &str, user_id: &str) -> Result<(Method, String)> {
    if channel.is_empty() {
        return Err(Error::Format("state-get requires a channel"));
    }
    let who = if user_id.is_empty() { &config.user_id } else { user_id };
    let mut path = format!(
        "/v2/presence/sub-key/{sub_key}/channel/{ch}/uuid/{uuid}?",
        sub_key = encode_segment(&config.keys.subscribe_key),
        ch = encode_segment(channel),
        uuid = encode_segment(who),
    );
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }
    Ok((Method::Get, path))
}

/// Apply `update_channels_and_ch_groups`'s add/remove-from-comma-list
/// semantics (§4.5): `add` and `remove` are each comma-separated lists;
/// `remove` wins when an item appears in both.
pub fn edit_list(existing: &[String], add: &str, remove: &str) -> Vec<String> {
    let remove_set: std::collections::HashSet<&str> = remove.split(',').filter(|s| !s.is_empty()).collect();
    let mut out: Vec<String> = existing.iter().filter(|c| !remove_set.contains(c.as_str())).cloned().collect();
    for item in add.split(',').filter(|s| !s.is_empty()) {
        if !out.iter().any(|c| c == item) {
            out.push(item.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_list_adds_and_removes() {
        let existing = vec!["a".to_string(), "b".to_string()];
        let out = edit_list(&existing, "c", "a");
        assert_eq!(out, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn edit_list_remove_wins_over_add_of_same_item() {
        let existing = vec!["a".to_string()];
        let out = edit_list(&existing, "a", "a");
        assert!(out.is_empty());
    }

    #[test]
    fn rejects_leave_with_nothing_to_leave() {
        let config = Config::new("origin");
        assert!(format_leave(&config, &[], &[]).is_err());
    }
}
