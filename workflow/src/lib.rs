//! Student-affairs workflow core: multi-stage permit approval, geofenced
//! self-attendance, and threshold-based auto-referral.
//!
//! The workflows own all state transitions over the `db` entities; the
//! surrounding application (forms, dashboards, notification delivery,
//! directory lookups, device geolocation) is reached only through the seam
//! traits in [`notify`], [`directory`] and [`geolocate`].

pub mod actor;
pub mod attendance;
pub mod directory;
pub mod display;
pub mod error;
pub mod events;
pub mod geofence;
pub mod geolocate;
pub mod notify;
pub mod permit;
pub mod referral;
pub mod routing;

pub use actor::ActingUser;
pub use attendance::{AttendanceWorkflow, CheckInSchedule, CheckOutPolicy};
pub use error::WorkflowError;
pub use events::StudentEvent;
pub use permit::{ApprovalDecision, ApprovalOutcome, CreatePermit, PermitWorkflow};
pub use referral::{ReferralEngine, ReferralRule, ReferralRuleSet};
