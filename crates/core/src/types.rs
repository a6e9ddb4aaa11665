//! Identifier types
//!
//! Every entity in the system is addressed by an opaque identifier. UUID-based
//! ids are generated with v4 and are unique per process and across processes.
//! String-based ids ([`WorkerId`], [`LimitGroup`]) are caller-chosen names.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declare a UUID-backed identifier newtype.
///
/// Generated ids implement `Display`, `Default` (fresh random id), serde, and
/// the usual comparison traits. The inner UUID is reachable via `as_uuid` for
/// callers that need to persist or log the raw value.
macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier (UUID v4).
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a run (one execution attempt of a unit of work).
    ///
    /// RunIds appear in the store, in work-queue claims, and in every
    /// transition log line.
    RunId
}

uuid_id! {
    /// Identifier for a flow definition a run was created from.
    FlowId
}

uuid_id! {
    /// Identifier for a task definition a run was created from.
    TaskId
}

uuid_id! {
    /// Identifier for a deployment (a registered, schedulable flow).
    DeploymentId
}

uuid_id! {
    /// Identifier for a work queue.
    QueueId
}

/// Identifier for a worker process.
///
/// Workers name themselves when polling; the name is an opaque string chosen
/// by the worker (typically hostname + pid). Liveness leases are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(String);

impl WorkerId {
    /// Create a worker id from a caller-chosen name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The worker name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WorkerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Name of a concurrency-limit group.
///
/// Runs declare membership in zero or more limit groups; the store keeps one
/// active-count per group and refuses entry into `Running` once the group's
/// configured limit is reached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LimitGroup(String);

impl LimitGroup {
    /// Create a limit group name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The group name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LimitGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LimitGroup {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
