//! Built-in orchestration rules
//!
//! The standard policy set: concurrency-limit admission and release, and
//! heartbeat-based crash detection. Hosts add their own rules alongside
//! these through the engine builder.

mod concurrency;
mod crash;

pub use concurrency::{ConcurrencyLimitRule, LimitProbe, ReleaseConcurrencySlots};
pub use crash::CrashDetectionRule;

/// Priority bands for the built-in rules. Rewrites run before admission
/// checks so a redirected proposal is admitted (or delayed) as what it
/// actually became.
pub(crate) mod priority {
    pub const CRASH_DETECTION: u32 = 10;
    pub const CONCURRENCY_ACQUIRE: u32 = 20;
    pub const CONCURRENCY_RELEASE: u32 = 30;
}
