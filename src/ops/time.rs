//! Server time transaction, grounded in `pubnub_time` in
//! `pubnub_coreapi.c`.

use crate::config::Config;
use crate::error::Result;
use crate::proto::Method;

pub fn format_time(_config: &Config) -> Result<(Method, String)> {
    Ok((Method::Get, "/time/0".to_string()))
}

/// A time response is a one-element JSON array: `[15210000000000000]`.
pub fn parse_timetoken(body: &str) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|_| crate::error::Error::Format("time response was not a JSON array"))?;
    value
        .get(0)
        .map(|v| v.to_string().trim_matches('"').to_string())
        .ok_or(crate::error::Error::Format("time response was empty"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timetoken() {
        assert_eq!(parse_timetoken("[15210000000000000]").unwrap(), "15210000000000000");
    }
}
