//! Publish and signal URL formatting (grounded in `pubnub_publish`/
//! `pubnub_publish_ex`/`pubnub_signal` of `pubnub_coreapi.c`).

use crate::config::Config;
use crate::error::{Error, Result};
use crate::proto::Method;
use crate::url_encode::{append_param, encode_segment};

#[derive(Debug, Clone, Copy, Default)]
pub struct PublishOptions {
    pub store: Option<bool>,
    pub replicate: Option<bool>,
    pub ttl: Option<u32>,
    /// When true the message is sent as the smaller request-body form
    /// (`POST`) rather than URL-embedded (`GET`) — mirrors the original's
    /// `pubnub_publish_ex` method flag.
    pub use_post: bool,
}

/// Format a publish request. `message` must already be a JSON-encoded
/// value (the caller, not this engine, owns message serialization — §1).
pub fn format(
    config: &Config,
    channel: &str,
    message: &str,
    opts: PublishOptions,
) -> Result<(Method, String, Option<String>)> {
    if channel.is_empty() {
        return Err(Error::Format("publish requires a non-empty channel"));
    }

    let mut path = format!(
        "/publish/{pub_key}/{sub_key}/0/{ch}/0",
        pub_key = encode_segment(&config.keys.publish_key),
        sub_key = encode_segment(&config.keys.subscribe_key),
        ch = encode_segment(channel),
    );

    if opts.use_post {
        path.push_str("?");
    } else {
        path.push('/');
        path.push_str(&encode_segment(message));
        path.push('?');
    }

    if let Some(store) = opts.store {
        append_param(&mut path, "store", Some(if store { "1" } else { "0" }));
    }
    if let Some(replicate) = opts.replicate {
        append_param(&mut path, "norep", Some(if replicate { "false" } else { "true" }));
    }
    if let Some(ttl) = opts.ttl {
        append_param(&mut path, "ttl", Some(&ttl.to_string()));
    }
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }

    let method = if opts.use_post { Method::Post } else { Method::Get };
    let body = if opts.use_post { Some(message.to_string()) } else { None };
    Ok((method, path, body))
}

/// A publish response is a JSON array whose first element is `1` on
/// success, `0` on failure, e.g. `[1,"Sent","1521...`"]` or
/// `[0,"Invalid Channel","0"]` (§7, `PublishFailed`).
pub fn parse_publish_ack(body: &str) -> Result<bool> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|_| Error::Format("publish response was not a JSON array"))?;
    let code = value
        .get(0)
        .and_then(|v| v.as_i64())
        .ok_or(Error::Format("publish response missing status code"))?;
    Ok(code == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_channel() {
        let config = Config::new("origin");
        assert!(format(&config, "", "\"hi\"", PublishOptions::default()).is_err());
    }

    #[test]
    fn parses_success_and_failure_acks() {
        assert!(parse_publish_ack(r#"[1,"Sent","15210000000000000"]"#).unwrap());
        assert!(!parse_publish_ack(r#"[0,"Invalid Channel","0"]"#).unwrap());
    }
}
