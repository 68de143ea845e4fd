//! Job description codec.
//!
//! A reminder job carries the (user, lesson) pair it was created for as a
//! small JSON object, `{"user":1,"lesson":2}`. The scheduler compares jobs by
//! the decoded pair, never by the raw text.

use serde::Deserialize;
use serde_json::Value;

use crate::reminders::ReminderError;

/// The (user, lesson) pair a reminder job belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReminderKey {
    pub user_id: i32,
    pub lesson_id: i32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Descriptor {
    user: i32,
    lesson: i32,
}

impl ReminderKey {
    pub fn new(user_id: i32, lesson_id: i32) -> Self {
        Self { user_id, lesson_id }
    }

    pub fn encode(&self) -> String {
        encode(self.user_id, self.lesson_id)
    }
}

/// Canonical description for a (user, lesson) pair.
///
/// The Postgres store relies on equal pairs producing byte-identical text.
pub fn encode(user_id: i32, lesson_id: i32) -> String {
    format!(r#"{{"user":{},"lesson":{}}}"#, user_id, lesson_id)
}

/// Parses a description back into its pair.
///
/// Accepts any JSON object with exactly the integer keys `user` and `lesson`,
/// in any order and with any whitespace.
pub fn decode(payload: &str) -> Result<ReminderKey, ReminderError> {
    let malformed = |reason: String| ReminderError::MalformedPayload {
        payload: payload.to_string(),
        reason,
    };

    let value: Value = serde_json::from_str(payload).map_err(|e| malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(malformed("expected a JSON object".to_string()));
    }

    let descriptor: Descriptor =
        serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
    Ok(ReminderKey::new(descriptor.user, descriptor.lesson))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(user in any::<i32>(), lesson in any::<i32>()) {
            prop_assert_eq!(decode(&encode(user, lesson)).unwrap(), ReminderKey::new(user, lesson));
        }
    }

    #[test]
    fn test_encode_is_canonical() {
        assert_eq!(encode(1, 2), r#"{"user":1,"lesson":2}"#);
        assert_eq!(ReminderKey::new(1, 2).encode(), encode(1, 2));
    }

    #[test]
    fn test_decode_ignores_key_order_and_whitespace() {
        assert_eq!(
            decode(r#"{ "lesson": 9, "user": 4 }"#).unwrap(),
            ReminderKey::new(4, 9)
        );
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for payload in [
            "",
            "not json",
            "[1, 2]",
            r#"{"user": 1}"#,
            r#"{"user": "1", "lesson": 2}"#,
            r#"{"user": 1.5, "lesson": 2}"#,
            r#"{"user": 1, "lesson": 2, "extra": true}"#,
            r#"{"user": 99999999999, "lesson": 2}"#,
        ] {
            match decode(payload) {
                Err(ReminderError::MalformedPayload { payload: p, .. }) => assert_eq!(p, payload),
                other => panic!("{payload:?} should be malformed, got {other:?}"),
            }
        }
    }
}
