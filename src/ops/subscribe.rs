//! Subscribe (v1) and subscribe-v2 URL formatting, grounded in
//! `pubnub_coreapi.c`'s `pubnub_subscribe` and
//! `pubnub_subscribe_v2.c`'s `subscribe_v2_prep`.

use crate::config::Config;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::proto::Method;
use crate::url_encode::{append_param, encode_segment};

fn join_or_comma(items: &[String]) -> String {
    if items.is_empty() {
        ",".to_string()
    } else {
        items.join(",")
    }
}

/// Format a v1 subscribe long-poll request.
pub fn format_v1(
    config: &Config,
    channels: &[String],
    groups: &[String],
    cursor: &Cursor,
) -> Result<(Method, String)> {
    if channels.is_empty() && groups.is_empty() {
        return Err(Error::Format("subscribe requires at least one channel or group"));
    }

    let mut path = format!(
        "/subscribe/{sub_key}/{channels}/0/{tt}?",
        sub_key = encode_segment(&config.keys.subscribe_key),
        channels = encode_segment(&join_or_comma(channels)),
        tt = cursor.timetoken,
    );

    if !groups.is_empty() {
        append_param(&mut path, "channel-group", Some(&join_or_comma(groups)));
    }
    append_param(&mut path, "uuid", Some(&config.user_id));
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }

    Ok((Method::Get, path))
}

/// Format a subscribe-v2 long-poll request (adds the region cursor
/// component and the `tt`/`tr` query parameters the v2 envelope needs).
pub fn format_v2(
    config: &Config,
    channels: &[String],
    groups: &[String],
    cursor: &Cursor,
) -> Result<(Method, String)> {
    if channels.is_empty() && groups.is_empty() {
        return Err(Error::Format("subscribe requires at least one channel or group"));
    }

    let mut path = format!(
        "/v2/subscribe/{sub_key}/{channels}/0?tt={tt}&tr={tr}",
        sub_key = encode_segment(&config.keys.subscribe_key),
        channels = encode_segment(&join_or_comma(channels)),
        tt = cursor.timetoken,
        tr = cursor.region,
    );

    if !groups.is_empty() {
        append_param(&mut path, "channel-group", Some(&join_or_comma(groups)));
    }
    append_param(&mut path, "uuid", Some(&config.user_id));
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }

    Ok((Method::Get, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_subscribe_with_no_channel_or_group() {
        let config = Config::new("origin");
        let cursor = Cursor::default();
        assert!(format_v1(&config, &[], &[], &cursor).is_err());
        assert!(format_v2(&config, &[], &[], &cursor).is_err());
    }

    #[test]
    fn v2_url_carries_timetoken_and_region() {
        let config = Config::new("origin");
        let cursor = Cursor {
            timetoken: "15210000000000000".into(),
            region: 4,
        };
        let (method, path) = format_v2(&config, &["ch".into()], &[], &cursor).unwrap();
        assert_eq!(method, Method::Get);
        assert!(path.contains("tt=15210000000000000"));
        assert!(path.contains("tr=4"));
    }
}
