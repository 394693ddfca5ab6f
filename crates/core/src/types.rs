/// Remote user identifiers are the `sub` claim issued by the identity provider.
pub type UserId = i64;

/// Identifier of a locally stored entity (UUID v7 rendered as a string).
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
