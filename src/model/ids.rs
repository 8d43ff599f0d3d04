//! Opaque, globally-unique, time-ordered identifiers.
//!
//! Each id wraps a UUIDv7 (RFC 9562): monotonic by creation time and
//! collision-free in practice, so a project's employees and tasks sort in
//! creation order even if re-inserted into a `HashMap`.

use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a fresh, time-ordered id.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps an existing UUID (used by tests and by collaborators
            /// that already hold an id, e.g. a deserializer).
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(EmployeeId, "Opaque identifier for an [`Employee`](super::Employee).");
uuid_id!(TaskId, "Opaque identifier for a [`Task`](super::Task).");
uuid_id!(ProjectId, "Opaque identifier for a [`Project`](super::Project).");
