//! Typed destinations and their textual prefix form.

use std::fmt;

const QUEUE_PREFIX: &str = "/queue/";
const TOPIC_PREFIX: &str = "/topic/";
const TEMP_QUEUE_PREFIX: &str = "/temp-queue/";
const TEMP_TOPIC_PREFIX: &str = "/temp-topic/";

/// A logical message destination: a queue or topic (durable or temporary)
/// plus its physical name on the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Queue(String),
    Topic(String),
    TempQueue(String),
    TempTopic(String),
}

impl Destination {
    /// The broker-side name without any prefix.
    pub fn physical_name(&self) -> &str {
        match self {
            Destination::Queue(name)
            | Destination::Topic(name)
            | Destination::TempQueue(name)
            | Destination::TempTopic(name) => name,
        }
    }

    /// Render the wire form, e.g. `/queue/orders`.
    pub fn to_wire(&self) -> String {
        let prefix = match self {
            Destination::Queue(_) => QUEUE_PREFIX,
            Destination::Topic(_) => TOPIC_PREFIX,
            Destination::TempQueue(_) => TEMP_QUEUE_PREFIX,
            Destination::TempTopic(_) => TEMP_TOPIC_PREFIX,
        };
        format!("{}{}", prefix, self.physical_name())
    }

    /// Parse the wire form back into a typed destination.
    ///
    /// The longest matching prefix wins; text with no recognized prefix is a
    /// queue whose physical name is the whole input. Empty input is `None`.
    pub fn from_wire(text: &str) -> Option<Destination> {
        if text.is_empty() {
            return None;
        }
        let dest = if let Some(name) = text.strip_prefix(TEMP_QUEUE_PREFIX) {
            Destination::TempQueue(name.to_string())
        } else if let Some(name) = text.strip_prefix(TEMP_TOPIC_PREFIX) {
            Destination::TempTopic(name.to_string())
        } else if let Some(name) = text.strip_prefix(QUEUE_PREFIX) {
            Destination::Queue(name.to_string())
        } else if let Some(name) = text.strip_prefix(TOPIC_PREFIX) {
            Destination::Topic(name.to_string())
        } else {
            Destination::Queue(text.to_string())
        };
        Some(dest)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_for_each_kind() {
        assert_eq!(Destination::Queue("a".into()).to_wire(), "/queue/a");
        assert_eq!(Destination::Topic("a".into()).to_wire(), "/topic/a");
        assert_eq!(
            Destination::TempQueue("a".into()).to_wire(),
            "/temp-queue/a"
        );
        assert_eq!(
            Destination::TempTopic("a".into()).to_wire(),
            "/temp-topic/a"
        );
    }

    #[test]
    fn parse_picks_longest_prefix() {
        // "/temp-queue/x" must not parse as a queue named "temp-queue/x"
        assert_eq!(
            Destination::from_wire("/temp-queue/x"),
            Some(Destination::TempQueue("x".into()))
        );
        assert_eq!(
            Destination::from_wire("/temp-topic/x"),
            Some(Destination::TempTopic("x".into()))
        );
    }

    #[test]
    fn parse_unprefixed_defaults_to_queue() {
        assert_eq!(
            Destination::from_wire("orders"),
            Some(Destination::Queue("orders".into()))
        );
    }

    #[test]
    fn parse_empty_is_none() {
        assert_eq!(Destination::from_wire(""), None);
    }

    #[test]
    fn roundtrip() {
        let dest = Destination::Topic("market.ticks".into());
        assert_eq!(Destination::from_wire(&dest.to_wire()), Some(dest));
    }
}
