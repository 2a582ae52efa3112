//! Storage/history retrieval, including the advanced-history (v3, multi
//! channel) shape from `pubnub_advanced_history.h`.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::proto::Method;
use crate::url_encode::{append_param, encode_segment};

#[derive(Debug, Clone, Default)]
pub struct HistoryOptions {
    pub count: Option<u32>,
    pub reverse: Option<bool>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub include_token: bool,
}

pub fn format_history(config: &Config, channel: &str, opts: &HistoryOptions) -> Result<(Method, String)> {
    if channel.is_empty() {
        return Err(Error::Format("history requires a channel"));
    }
    let mut path = format!(
        "/v2/history/sub-key/{sub_key}/channel/{ch}?",
        sub_key = encode_segment(&config.keys.subscribe_key),
        ch = encode_segment(channel),
    );
    if let Some(count) = opts.count {
        append_param(&mut path, "count", Some(&count.to_string()));
    }
    if let Some(reverse) = opts.reverse {
        append_param(&mut path, "reverse", Some(if reverse { "true" } else { "false" }));
    }
    if let Some(start) = &opts.start {
        append_param(&mut path, "start", Some(start));
    }
    if let Some(end) = &opts.end {
        append_param(&mut path, "end", Some(end));
    }
    if opts.include_token {
        append_param(&mut path, "include_token", Some("true"));
    }
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }
    Ok((Method::Get, path))
}

/// History-v3: multiple channels in one request, distinct path shape from
/// the per-channel v2 endpoint.
pub fn format_history_v2(config: &Config, channels: &[String], opts: &HistoryOptions) -> Result<(Method, String)> {
    if channels.is_empty() {
        return Err(Error::Format("history requires at least one channel"));
    }
    let mut path = format!(
        "/v3/history/sub-key/{sub_key}/channel/{channels}?",
        sub_key = encode_segment(&config.keys.subscribe_key),
        channels = encode_segment(&channels.join(",")),
    );
    if let Some(count) = opts.count {
        append_param(&mut path, "max", Some(&count.to_string()));
    }
    if let Some(start) = &opts.start {
        append_param(&mut path, "start", Some(start));
    }
    if let Some(end) = &opts.end {
        append_param(&mut path, "end", Some(end));
    }
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }
    Ok((Method::Get, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_history_with_no_channel() {
        let config = Config::new("origin");
        assert!(format_history(&config, "", &HistoryOptions::default()).is_err());
        assert!(format_history_v2(&config, &[], &HistoryOptions::default()).is_err());
    }

    #[test]
    fn history_includes_count_param() {
        let config = Config::new("origin");
        let opts = HistoryOptions {
            count: Some(10),
            ..Default::default()
        };
        let (_, path) = format_history(&config, "ch", &opts).unwrap();
        assert!(path.contains("count=10"));
    }
}
