//! Access-manager token grant/revoke, grounded in
//! `pubnub_grant_token_api.c`. The permission-spec JSON body is built by
//! the caller (§1: token envelope formats are an API-wrapper concern);
//! this module only places it on the wire.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::proto::Method;
use crate::url_encode::encode_segment;

pub fn format_grant_token(config: &Config, permission_spec_json: &str) -> Result<(Method, String, Option<String>)> {
    if permission_spec_json.is_empty() {
        return Err(Error::Format("grant-token requires a permission spec body"));
    }
    let path = format!(
        "/v3/pam/{sub_key}/grant",
        sub_key = encode_segment(&config.keys.subscribe_key),
    );
    Ok((Method::Post, path, Some(permission_spec_json.to_string())))
}

pub fn format_revoke_token(config: &Config, token: &str) -> Result<(Method, String)> {
    if token.is_empty() {
        return Err(Error::Format("revoke-token requires a token"));
    }
    let path = format!(
        "/v3/pam/{sub_key}/revoke/{token}",
        sub_key = encode_segment(&config.keys.subscribe_key),
        token = encode_segment(token),
    );
    Ok((Method::Delete, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_grant_body() {
        let config = Config::new("origin");
        assert!(format_grant_token(&config, "").is_err());
    }
}
