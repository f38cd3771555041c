//! Domain model for employees, organization reference data and assignment
//! history.
//!
//! # Responsibility
//! - Define canonical records used by repositories and services.
//! - Keep validation rules next to the shapes they protect.
//!
//! # Invariants
//! - Persisted entities are identified by integer newtypes (`EmployeeId`,
//!   `JobId`, ...). Unsaved entities use `New*` drafts without identifiers.
//! - Children reference parents by identifier only; there are no
//!   back-reference collections.

/// Declares an integer identifier newtype for one entity kind.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Returns the raw storage key.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

pub mod employee;
pub mod job_history;
pub mod org;
pub mod validation;
