//! Subscribe cursor and destructive message iteration (§4.6).
//!
//! A [`Cursor`] is the timetoken/region pair that tells the server where a
//! context's next long-poll subscribe should resume from. It lives on the
//! context, not on any one transaction, and is replaced — never merged —
//! each time a subscribe completes successfully (§3 invariant 5).

use serde::Deserialize;

use crate::error::{Error, Result};

/// The opaque progress marker for a context's subscribe stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub timetoken: String,
    pub region: i64,
}

impl Default for Cursor {
    /// The very first subscribe on a context starts from timetoken `"0"`
    /// (§3 invariant 5).
    fn default() -> Self {
        Cursor {
            timetoken: "0".to_string(),
            region: 0,
        }
    }
}

impl Cursor {
    pub fn is_initial(&self) -> bool {
        self.timetoken == "0"
    }
}

/// One message out of a subscribe-v2 long-poll response, borrowed from the
/// context's reply buffer for the lifetime of a single `get_v2()` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageV2 {
    pub payload: String,
    pub channel: String,
    pub publish_timetoken: String,
    pub match_or_group: Option<String>,
    pub metadata: Option<String>,
}

impl MessageV2 {
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty() && self.payload.is_empty()
    }
}

#[derive(Deserialize)]
struct EnvelopeTimetoken {
    t: String,
    r: i64,
}

#[derive(Deserialize)]
struct Envelope {
    t: EnvelopeTimetoken,
    m: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct WireMessagePublishToken {
    t: String,
}

#[derive(Deserialize)]
struct WireMessage {
    d: serde_json::Value,
    c: String,
    p: WireMessagePublishToken,
    #[serde(default)]
    b: Option<String>,
    #[serde(default)]
    u: Option<serde_json::Value>,
}

/// The subscribe-v2 message queue parsed out of one long-poll response:
/// the new cursor, plus the raw message objects still to be handed out one
/// at a time by [`MessageQueueV2::next`].
pub struct MessageQueueV2 {
    pub cursor: Cursor,
    messages: std::vec::IntoIter<serde_json::Value>,
}

impl MessageQueueV2 {
    /// Parse a subscribe-v2 response body (§4.6): a JSON object with a `t`
    /// field (`{t, r}`) and an `m` array of message objects.
    pub fn parse(body: &str) -> Result<MessageQueueV2> {
        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|_| Error::Format("subscribe-v2 response missing t/m fields"))?;
        Ok(MessageQueueV2 {
            cursor: Cursor {
                timetoken: envelope.t.t,
                region: envelope.t.r,
            },
            messages: envelope.m.into_iter(),
        })
    }

    /// Consume the next message, if any. Destructive: once returned, a
    /// message cannot be re-read (§4.6).
    pub fn next(&mut self) -> Option<MessageV2> {
        let value = self.messages.next()?;
        let wire: WireMessage = match serde_json::from_value(value) {
            Ok(w) => w,
            Err(_) => return Some(MessageV2::default()),
        };
        Some(MessageV2 {
            payload: wire.d.to_string(),
            channel: wire.c,
            publish_timetoken: wire.p.t,
            match_or_group: wire.b,
            metadata: wire.u.map(|v| v.to_string()),
        })
    }

    pub fn remaining(&self) -> usize {
        self.messages.len()
    }
}

/// The v1 (non-v2) subscribe message queue: a bare JSON array of payloads,
/// optionally paired with a parallel array of per-message channel names
/// when the subscribe spanned more than one channel (§4.6).
pub struct MessageQueueV1 {
    messages: std::vec::IntoIter<serde_json::Value>,
    channels: Option<std::vec::IntoIter<String>>,
    pub cursor: Cursor,
}

impl MessageQueueV1 {
    /// Parse a v1 subscribe response: `[[messages...], timetoken, "chan1,chan2"?]`.
    pub fn parse(body: &str) -> Result<MessageQueueV1> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|_| Error::Format("subscribe response was not a JSON array"))?;
        let arr = value
            .as_array()
            .ok_or(Error::Format("subscribe response was not a JSON array"))?;
        if arr.len() < 2 {
            return Err(Error::Format("subscribe response missing messages/timetoken"));
        }
        let messages = arr[0]
            .as_array()
            .cloned()
            .ok_or(Error::Format("subscribe response messages were not an array"))?;
        let timetoken = arr[1]
            .as_str()
            .map(str::to_string)
            .or_else(|| arr[1].as_i64().map(|n| n.to_string()))
            .ok_or(Error::Format("subscribe response timetoken was not a string"))?;
        let channels = arr
            .get(2)
            .and_then(|v| v.as_str())
            .map(|s| s.split(',').map(str::to_string).collect::<Vec<_>>().into_iter());

        Ok(MessageQueueV1 {
            messages: messages.into_iter(),
            channels,
            cursor: Cursor { timetoken, region: 0 },
        })
    }

    /// Returns a pointer to the next element and advances the internal
    /// offset, or `None` once exhausted.
    pub fn get(&mut self) -> Option<String> {
        self.messages.next().map(|v| v.to_string())
    }

    /// The per-message channel, when the subscribe was over more than one
    /// channel; empty otherwise (§4.6).
    pub fn get_channel(&mut self) -> Option<String> {
        self.channels.as_mut().and_then(|c| c.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subscribe_v2_envelope_and_cursor() {
        let body = r#"{"t":{"t":"15210000000000000","r":4},"m":[
            {"d":"hello","c":"ch","p":{"t":"15210000000000001"},"b":"ch","u":null}
        ]}"#;
        let mut q = MessageQueueV2::parse(body).unwrap();
        assert_eq!(q.cursor.timetoken, "15210000000000000");
        assert_eq!(q.cursor.region, 4);
        let m = q.next().unwrap();
        assert_eq!(m.channel, "ch");
        assert_eq!(m.payload, "\"hello\"");
        assert_eq!(m.publish_timetoken, "15210000000000001");
        assert!(q.next().is_none());
    }

    #[test]
    fn get_v2_is_destructive() {
        let body = r#"{"t":{"t":"1","r":0},"m":[{"d":1,"c":"a","p":{"t":"1"}},{"d":2,"c":"b","p":{"t":"2"}}]}"#;
        let mut q = MessageQueueV2::parse(body).unwrap();
        assert_eq!(q.remaining(), 2);
        let first = q.next().unwrap();
        assert_eq!(first.channel, "a");
        assert_eq!(q.remaining(), 1);
        let second = q.next().unwrap();
        assert_eq!(second.channel, "b");
        assert!(q.next().is_none());
    }

    #[test]
    fn rejects_malformed_envelope() {
        assert!(MessageQueueV2::parse("{}").is_err());
        assert!(MessageQueueV2::parse("not json").is_err());
    }

    #[test]
    fn v1_parses_messages_and_per_message_channel() {
        let body = r#"[["Test 1","Test 1 - 2"],"15210000000000000","ch,two"]"#;
        let mut q = MessageQueueV1::parse(body).unwrap();
        assert_eq!(q.cursor.timetoken, "15210000000000000");
        assert_eq!(q.get().unwrap(), "\"Test 1\"");
        assert_eq!(q.get_channel().unwrap(), "ch");
        assert_eq!(q.get().unwrap(), "\"Test 1 - 2\"");
        assert_eq!(q.get_channel().unwrap(), "two");
        assert!(q.get().is_none());
    }

    #[test]
    fn v1_parse_basic_shape() {
        let body = r#"[["Test 1","Test 1 - 2"],"15210000000000000"]"#;
        let mut q = MessageQueueV1::parse(body).unwrap();
        assert_eq!(q.cursor.timetoken, "15210000000000000");
        assert_eq!(q.get().unwrap(), "\"Test 1\"");
        assert_eq!(q.get().unwrap(), "\"Test 1 - 2\"");
        assert!(q.get().is_none());
    }
}
