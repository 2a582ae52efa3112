//! App-context object CRUD (user/channel/membership metadata). Formatting
//! only, per §1 — object schema validation is an API-wrapper concern.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::proto::Method;
use crate::url_encode::encode_segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    User,
    Channel,
    Membership,
}

impl ObjectKind {
    fn segment(self) -> &'static str {
        match self {
            ObjectKind::User => "uuids",
            ObjectKind::Channel => "channels",
            ObjectKind::Membership => "memberships",
        }
    }
}

pub fn format_get(config: &Config, kind: ObjectKind, id: &str) -> Result<(Method, String)> {
    if id.is_empty() {
        return Err(Error::Format("object get requires an id"));
    }
    let path = format!(
        "/v2/objects/{sub_key}/{kind}/{id}",
        sub_key = encode_segment(&config.keys.subscribe_key),
        kind = kind.segment(),
        id = encode_segment(id),
    );
    Ok((Method::Get, path))
}

pub fn format_set(config: &Config, kind: ObjectKind, id: &str, body_json: &str) -> Result<(Method, String, Option<String>)> {
    if id.is_empty() || body_json.is_empty() {
        return Err(Error::Format("object set requires an id and a body"));
    }
    let path = format!(
        "/v2/objects/{sub_key}/{kind}/{id}",
        sub_key = encode_segment(&config.keys.subscribe_key),
        kind = kind.segment(),
        id = encode_segment(id),
    );
    Ok((Method::Patch, path, Some(body_json.to_string())))
}

pub fn format_remove(config: &Config, kind: ObjectKind, id: &str) -> Result<(Method, String)> {
    if id.is_empty() {
        return Err(Error::Format("object remove requires an id"));
    }
    let path = format!(
        "/v2/objects/{sub_key}/{kind}/{id}",
        sub_key = encode_segment(&config.keys.subscribe_key),
        kind = kind.segment(),
        id = encode_segment(id),
    );
    Ok((Method::Delete, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_id() {
        let config = Config::new("origin");
        assert!(format_get(&config, ObjectKind::User, "").is_err());
    }
}
