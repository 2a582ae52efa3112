//! Channel-group membership management: add/remove/list/remove-group.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::proto::Method;
use crate::url_encode::{append_param, encode_segment};

pub fn format_add_channels(config: &Config, group: &str, channels: &[String]) -> Result<(Method, String)> {
    if group.is_empty() || channels.is_empty() {
        return Err(Error::Format("add-to-group requires a group and at least one channel"));
    }
    let mut path = format!(
        "/v1/channel-registration/sub-key/{sub_key}/channel-group/{group}?",
        sub_key = encode_segment(&config.keys.subscribe_key),
        group = encode_segment(group),
    );
    append_param(&mut path, "add", Some(&channels.join(",")));
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }
    Ok((Method::Get, path))
}

pub fn format_remove_channels(config: &Config, group: &str, channels: &[String]) -> Result<(Method, String)> {
    if group.is_empty() || channels.is_empty() {
        return Err(Error::Format("remove-from-group requires a group and at least one channel"));
    }
    let mut path = format!(
        "/v1/channel-registration/sub-key/{sub_key}/channel-group/{group}?",
        sub_key = encode_segment(&config.keys.subscribe_key),
        group = encode_segment(group),
    );
    append_param(&mut path, "remove", Some(&channels.join(",")));
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }
    Ok((Method::Get, path))
}

pub fn format_list_channels(config: &Config, group: &str) -> Result<(Method, String)> {
    if group.is_empty() {
        return Err(Error::Format("list-channel-group requires a group"));
    }
    let mut path = format!(
        "/v1/channel-registration/sub-key/{sub_key}/channel-group/{group}?",
        sub_key = encode_segment(&config.keys.subscribe_key),
        group = encode_segment(group),
    );
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }
    Ok((Method::Get, path))
}

pub fn format_remove_group(config: &Config, group: &str) -> Result<(Method, String)> {
    if group.is_empty() {
        return Err(Error::Format("remove-channel-group requires a group"));
    }
    let mut path = format!(
        "/v1/channel-registration/sub-key/{sub_key}/channel-group/{group}/remove?",
        sub_key = encode_segment(&config.keys.subscribe_key),
        group = encode_segment(group),
    );
    if let Some(auth) = &config.auth_key {
        append_param(&mut path, "auth", Some(auth));
    }
    Ok((Method::Get, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_group_or_channels() {
        let config = Config::new("origin");
        assert!(format_add_channels(&config, "", &["a".into()]).is_err());
        assert!(format_add_channels(&config, "g", &[]).is_err());
    }
}
