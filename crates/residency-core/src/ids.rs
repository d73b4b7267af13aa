//! Stable, back-reference-friendly identifiers for the data model.
//!
//! Entities relate to each other by identifier, never by ownership, so
//! that assignments, blocks, and people can be stored in flat
//! identifier-keyed tables without reference cycles (see Design Notes,
//! "Back-references instead of cycles").

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! id_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh, random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID (e.g. one loaded from a bundle).
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
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

id_type!(PersonId, "Identifier for a Person (faculty or resident).");
id_type!(BlockId, "Identifier for a half-day assignable Block.");
id_type!(
    RotationTemplateId,
    "Identifier for a RotationTemplate (typed activity slot)."
);
id_type!(AssignmentId, "Identifier for an Assignment.");
id_type!(AbsenceId, "Identifier for an Absence interval.");
id_type!(RunId, "Identifier for a ScheduleRun attempt.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(PersonId::new(), PersonId::new());
    }

    #[test]
    fn id_roundtrips_through_uuid() {
        let id = PersonId::new();
        let restored = PersonId::from_uuid(id.as_uuid());
        assert_eq!(id, restored);
    }
}
