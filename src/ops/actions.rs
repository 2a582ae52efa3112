//! Message-action operations (add/remove/history), grounded in
//! `pubnub_actions_api.c`. Formatting only, same boundary as the rest of
//! `ops` (§1).

use crate::config::Config;
use crate::error::{Error, Result};
use crate::proto::Method;
use crate::url_encode::encode_segment;

pub fn format_add(
    config: &Config,
    channel: &str,
    message_timetoken: &str,
    action_json: &str,
) -> Result<(Method, String, Option<String>)> {
    if channel.is_empty() || message_timetoken.is_empty() {
        return Err(Error::Format("add-message-action requires a channel and message timetoken"));
    }
    let path = format!(
        "/v1/message-actions/{sub_key}/channel/{ch}/message/{tt}",
        sub_key = encode_segment(&config.keys.subscribe_key),
        ch = encode_segment(channel),
        tt = encode_segment(message_timetoken),
    );
    Ok((Method::Post, path, Some(action_json.to_string())))
}

pub fn format_remove(
    config: &Config,
    channel: &str,
    message_timetoken: &str,
    action_timetoken: &str,
) -> Result<(Method, String)> {
    if channel.is_empty() || message_timetoken.is_empty() || action_timetoken.is_empty() {
        return Err(Error::Format("remove-message-action requires channel, message and action timetokens"));
    }
    let path = format!(
        "/v1/message-actions/{sub_key}/channel/{ch}/message/{tt}/action/{at}",
        sub_key = encode_segment(&config.keys.subscribe_key),
        ch = encode_segment(channel),
        tt = encode_segment(message_timetoken),
        at = encode_segment(action_timetoken),
    );
    Ok((Method::Delete, path))
}

pub fn format_history(config: &Config, channel: &str) -> Result<(Method, String)> {
    if channel.is_empty() {
        return Err(Error::Format("message-action history requires a channel"));
    }
    let path = format!(
        "/v1/message-actions/{sub_key}/channel/{ch}",
        sub_key = encode_segment(&config.keys.subscribe_key),
        ch = encode_segment(channel),
    );
    Ok((Method::Get, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_timetoken() {
        let config = Config::new("origin");
        assert!(format_add(&config, "ch", "", "{}").is_err());
    }
}
