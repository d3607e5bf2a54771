//! Property-based tests for connection descriptor parsing.

use proptest::prelude::*;

use webterm_core::{ConnectionDescriptor, DescriptorError, DEFAULT_PORT};

/// A colon-free segment, possibly empty.
fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._@!#$%^&*()-]{0,24}"
}

proptest! {
    /// Exactly two colons always yield the three segments verbatim.
    #[test]
    fn three_segments_parse_verbatim(host in segment(), user in segment(), secret in segment()) {
        let raw = format!("{host}:{user}:{secret}");
        let desc = ConnectionDescriptor::parse(&raw).unwrap();

        prop_assert_eq!(desc.host, host);
        prop_assert_eq!(desc.username, user);
        prop_assert_eq!(desc.secret.expose(), secret.as_str());
        prop_assert_eq!(desc.port, DEFAULT_PORT);
    }

    /// Any colon-free text in the three slots, empty included, parses verbatim.
    #[test]
    fn arbitrary_segments_parse_verbatim(host in "[^:]*", user in "[^:]*", secret in "[^:]*") {
        let desc = ConnectionDescriptor::parse(&format!("{host}:{user}:{secret}")).unwrap();

        prop_assert_eq!(desc.host, host);
        prop_assert_eq!(desc.username, user);
        prop_assert_eq!(desc.secret.expose(), secret.as_str());
    }

    /// Fewer than two colons is always a parse failure.
    #[test]
    fn fewer_than_two_colons_fail(raw in "[^:]{0,32}(:[^:]{0,32})?") {
        let result = ConnectionDescriptor::parse(&raw);
        prop_assert!(matches!(result, Err(DescriptorError::SegmentCount(n)) if n < 3));
    }

    /// Parsing never panics on arbitrary input.
    #[test]
    fn parse_never_panics(raw in ".*") {
        let _ = ConnectionDescriptor::parse(&raw);
    }
}
