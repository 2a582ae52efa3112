//! Request encoding: turns a method, path, and optional JSON body into the
//! bytes written to the socket.

use crate::config::Config;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// Render the full request line + header block + body into a single
/// buffer, ready to write to the socket in one call (§4.1, `HTTP_WRITE`).
pub fn encode_request(config: &Config, method: Method, path_and_query: &str, body: Option<&str>) -> Result<Vec<u8>> {
    let mut out = String::with_capacity(path_and_query.len() + 256 + body.map_or(0, str::len));

    out.push_str(method.as_str());
    out.push(' ');
    out.push_str(path_and_query);
    out.push_str(" HTTP/1.1\r\n");

    out.push_str("Host: ");
    out.push_str(&config.origin);
    out.push_str("\r\n");

    out.push_str("User-Agent: meshline/0.1\r\n");
    out.push_str("Accept: */*\r\n");
    out.push_str("Date: ");
    out.push_str(&httpdate::fmt_http_date(std::time::SystemTime::now()));
    out.push_str("\r\n");

    if config.keep_alive {
        out.push_str("Connection: Keep-Alive\r\n");
    } else {
        out.push_str("Connection: close\r\n");
    }

    if let Some(body) = body {
        out.push_str("Content-Type: application/json\r\n");
        out.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }

    out.push_str("\r\n");

    if let Some(body) = body {
        out.push_str(body);
    }

    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_get_request_without_body() {
        let config = Config::new("ps.example.com");
        let bytes = encode_request(&config, Method::Get, "/v2/subscribe/sub-key/ch/0", None).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("GET /v2/subscribe/sub-key/ch/0 HTTP/1.1\r\n"));
        assert!(text.contains("Host: ps.example.com\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn encodes_post_request_with_content_length() {
        let config = Config::new("ps.example.com");
        let bytes = encode_request(&config, Method::Post, "/publish", Some("{\"a\":1}")).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Content-Length: 7\r\n"));
        assert!(text.ends_with("{\"a\":1}"));
    }
}
