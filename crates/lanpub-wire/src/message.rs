//! Protocol messages
//!
//! One enum over the six message kinds so the router's dispatch is
//! exhaustiveness-checked at compile time. Bodies on the wire are flat JSON
//! objects keyed by `requesterAddress` / `channel` / `data`.

use std::net::Ipv4Addr;

use serde_json::{json, Value};

use lanpub_core::{LanpubError, LanpubResult};
use lanpub_subnet::parse_addr;

/// The only method the protocol uses.
pub const METHOD_POST: &str = "POST";

/// A protocol message, inbound or outbound.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// A node announcing itself during a subnet sweep
    Join { requester: Ipv4Addr },
    /// A node leaving the overlay
    Leave { requester: Ipv4Addr },
    /// Liveness probe; doubles as an implicit join from unknown senders
    Healthcheck { requester: Ipv4Addr },
    /// A node asking to be added to a channel's subscriber set
    Subscribe { requester: Ipv4Addr, channel: String },
    /// A node asking to be removed from a channel's subscriber set
    Unsubscribe { requester: Ipv4Addr, channel: String },
    /// A message published to a channel
    Publish {
        requester: Ipv4Addr,
        channel: String,
        data: Value,
    },
}

impl Message {
    /// The endpoint path this message is sent to.
    pub fn path(&self) -> &'static str {
        match self {
            Message::Join { .. } => "/join",
            Message::Leave { .. } => "/leave",
            Message::Healthcheck { .. } => "/healthcheck",
            Message::Subscribe { .. } => "/subscribe",
            Message::Unsubscribe { .. } => "/unsubscribe",
            Message::Publish { .. } => "/publish",
        }
    }

    /// Sender address carried in the body.
    pub fn requester(&self) -> Ipv4Addr {
        match self {
            Message::Join { requester }
            | Message::Leave { requester }
            | Message::Healthcheck { requester }
            | Message::Subscribe { requester, .. }
            | Message::Unsubscribe { requester, .. }
            | Message::Publish { requester, .. } => *requester,
        }
    }

    /// Serialize the outbound JSON body.
    pub fn to_body(&self) -> Value {
        match self {
            Message::Join { requester }
            | Message::Leave { requester }
            | Message::Healthcheck { requester } => json!({
                "requesterAddress": requester.to_string(),
            }),
            Message::Subscribe { requester, channel }
            | Message::Unsubscribe { requester, channel } => json!({
                "requesterAddress": requester.to_string(),
                "channel": channel,
            }),
            Message::Publish {
                requester,
                channel,
                data,
            } => json!({
                "requesterAddress": requester.to_string(),
                "channel": channel,
                "data": data,
            }),
        }
    }

    /// Parse an inbound request into a message.
    ///
    /// Dispatch keys on (method, first path segment). Validation happens
    /// here, before any handler runs: a missing or mistyped field fails with
    /// the full expected-field list, an unknown endpoint fails with
    /// `UnknownEndpoint`. No state is touched on the failure path.
    pub fn parse(method: &str, path: &str, body: Option<&Value>) -> LanpubResult<Message> {
        let segment = path.split('/').nth(1).unwrap_or("");
        if method != METHOD_POST {
            return Err(LanpubError::UnknownEndpoint {
                method: method.to_string(),
                path: path.to_string(),
            });
        }

        match segment {
            "join" => Ok(Message::Join {
                requester: required_addr(body, FIELDS_REQUESTER)?,
            }),
            "leave" => Ok(Message::Leave {
                requester: required_addr(body, FIELDS_REQUESTER)?,
            }),
            "healthcheck" => Ok(Message::Healthcheck {
                requester: required_addr(body, FIELDS_REQUESTER)?,
            }),
            "subscribe" => Ok(Message::Subscribe {
                requester: required_addr(body, FIELDS_CHANNEL)?,
                channel: required_string(body, "channel", FIELDS_CHANNEL)?,
            }),
            "unsubscribe" => Ok(Message::Unsubscribe {
                requester: required_addr(body, FIELDS_CHANNEL)?,
                channel: required_string(body, "channel", FIELDS_CHANNEL)?,
            }),
            "publish" => Ok(Message::Publish {
                requester: required_addr(body, FIELDS_PUBLISH)?,
                channel: required_string(body, "channel", FIELDS_PUBLISH)?,
                data: required_field(body, "data", FIELDS_PUBLISH)?.clone(),
            }),
            _ => Err(LanpubError::UnknownEndpoint {
                method: method.to_string(),
                path: path.to_string(),
            }),
        }
    }
}

const FIELDS_REQUESTER: &str = "requesterAddress";
const FIELDS_CHANNEL: &str = "requesterAddress, channel";
const FIELDS_PUBLISH: &str = "requesterAddress, channel, data";

fn required_field<'a>(
    body: Option<&'a Value>,
    field: &str,
    expected: &str,
) -> LanpubResult<&'a Value> {
    body.and_then(|b| b.get(field))
        .filter(|v| !v.is_null())
        .ok_or_else(|| LanpubError::MissingFields {
            expected: expected.to_string(),
        })
}

fn required_string(body: Option<&Value>, field: &str, expected: &str) -> LanpubResult<String> {
    let value = required_field(body, field, expected)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LanpubError::MalformedBody(format!("{field} must be a string")))
}

fn required_addr(body: Option<&Value>, expected: &str) -> LanpubResult<Ipv4Addr> {
    let raw = required_string(body, "requesterAddress", expected)?;
    parse_addr(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join() {
        let body = json!({"requesterAddress": "192.168.1.5"});
        let msg = Message::parse("POST", "/join", Some(&body)).unwrap();
        assert_eq!(
            msg,
            Message::Join {
                requester: "192.168.1.5".parse().unwrap()
            }
        );
    }

    #[test]
    fn test_parse_missing_requester() {
        let err = Message::parse("POST", "/join", None).unwrap_err();
        assert!(matches!(err, LanpubError::MissingFields { .. }));
        assert!(err.to_string().contains("requesterAddress"));
    }

    #[test]
    fn test_parse_subscribe_missing_channel_lists_all_fields() {
        let body = json!({"requesterAddress": "10.0.0.2"});
        let err = Message::parse("POST", "/subscribe", Some(&body)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing fields from body, expected [requesterAddress, channel]"
        );
    }

    #[test]
    fn test_parse_publish() {
        let body = json!({
            "requesterAddress": "10.0.0.2",
            "channel": "orders",
            "data": {"table": 7},
        });
        let msg = Message::parse("POST", "/publish", Some(&body)).unwrap();
        let Message::Publish {
            requester,
            channel,
            data,
        } = msg
        else {
            panic!("expected publish");
        };
        assert_eq!(requester, "10.0.0.2".parse::<Ipv4Addr>().unwrap());
        assert_eq!(channel, "orders");
        assert_eq!(data["table"], 7);
    }

    #[test]
    fn test_parse_publish_null_data_rejected() {
        let body = json!({
            "requesterAddress": "10.0.0.2",
            "channel": "orders",
            "data": null,
        });
        let err = Message::parse("POST", "/publish", Some(&body)).unwrap_err();
        assert!(matches!(err, LanpubError::MissingFields { .. }));
    }

    #[test]
    fn test_parse_malformed_requester() {
        let body = json!({"requesterAddress": "not-an-ip"});
        let err = Message::parse("POST", "/join", Some(&body)).unwrap_err();
        assert!(matches!(err, LanpubError::InvalidAddress(_)));
    }

    #[test]
    fn test_unknown_endpoint() {
        let err = Message::parse("POST", "/gossip", None).unwrap_err();
        assert!(matches!(err, LanpubError::UnknownEndpoint { .. }));

        let body = json!({"requesterAddress": "10.0.0.2"});
        let err = Message::parse("GET", "/join", Some(&body)).unwrap_err();
        assert!(matches!(err, LanpubError::UnknownEndpoint { .. }));
    }

    #[test]
    fn test_body_roundtrip() {
        let msg = Message::Subscribe {
            requester: "10.1.2.3".parse().unwrap(),
            channel: "kitchen".to_string(),
        };
        let body = msg.to_body();
        let parsed = Message::parse(METHOD_POST, msg.path(), Some(&body)).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_path_uses_first_segment() {
        let body = json!({"requesterAddress": "10.0.0.9"});
        let msg = Message::parse("POST", "/healthcheck/extra", Some(&body)).unwrap();
        assert!(matches!(msg, Message::Healthcheck { .. }));
    }
}
