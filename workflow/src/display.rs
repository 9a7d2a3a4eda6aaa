//! Single status-to-badge mapping shared by every view.
//!
//! The source application re-derived labels and colors from raw status
//! strings in each component; here every status enum maps to one
//! [`StatusBadge`] and the notification texts reuse the same labels.

use db::models::counseling_referral::ReferralStatus;
use db::models::permit_approval::ApprovalStatus;
use db::models::self_attendance::AttendanceStatus;
use db::models::student_permit::{PermitStatus, UrgencyLevel};
use db::models::student_violation::ViolationStatus;

/// Visual weight of a badge; views map tones to their own palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: Tone,
}

pub trait Badged {
    fn badge(&self) -> StatusBadge;
}

impl Badged for PermitStatus {
    fn badge(&self) -> StatusBadge {
        match self {
            PermitStatus::Pending => StatusBadge { label: "Menunggu", tone: Tone::Info },
            PermitStatus::Approved => StatusBadge { label: "Disetujui", tone: Tone::Success },
            PermitStatus::Rejected => StatusBadge { label: "Ditolak", tone: Tone::Danger },
        }
    }
}

impl Badged for ApprovalStatus {
    fn badge(&self) -> StatusBadge {
        match self {
            ApprovalStatus::Pending => StatusBadge { label: "Menunggu", tone: Tone::Info },
            ApprovalStatus::Approved => StatusBadge { label: "Disetujui", tone: Tone::Success },
            ApprovalStatus::Rejected => StatusBadge { label: "Ditolak", tone: Tone::Danger },
            ApprovalStatus::Skipped => StatusBadge { label: "Dilewati", tone: Tone::Neutral },
        }
    }
}

impl Badged for AttendanceStatus {
    fn badge(&self) -> StatusBadge {
        match self {
            AttendanceStatus::Present => StatusBadge { label: "Hadir", tone: Tone::Success },
            AttendanceStatus::Absent => StatusBadge { label: "Tidak Hadir", tone: Tone::Danger },
            AttendanceStatus::Late => StatusBadge { label: "Terlambat", tone: Tone::Warning },
        }
    }
}

impl Badged for ViolationStatus {
    fn badge(&self) -> StatusBadge {
        match self {
            ViolationStatus::Active => StatusBadge { label: "Aktif", tone: Tone::Danger },
            ViolationStatus::Resolved => StatusBadge { label: "Selesai", tone: Tone::Neutral },
        }
    }
}

impl Badged for ReferralStatus {
    fn badge(&self) -> StatusBadge {
        match self {
            ReferralStatus::Pending => StatusBadge { label: "Menunggu", tone: Tone::Info },
            ReferralStatus::InProgress => StatusBadge { label: "Berjalan", tone: Tone::Warning },
            ReferralStatus::Completed => StatusBadge { label: "Selesai", tone: Tone::Success },
            ReferralStatus::Cancelled => StatusBadge { label: "Dibatalkan", tone: Tone::Neutral },
        }
    }
}

impl Badged for UrgencyLevel {
    fn badge(&self) -> StatusBadge {
        match self {
            UrgencyLevel::Low => StatusBadge { label: "Rendah", tone: Tone::Neutral },
            UrgencyLevel::Normal => StatusBadge { label: "Normal", tone: Tone::Info },
            UrgencyLevel::High => StatusBadge { label: "Tinggi", tone: Tone::Warning },
            UrgencyLevel::Urgent => StatusBadge { label: "Mendesak", tone: Tone::Danger },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_permit_states_use_terminal_tones() {
        assert_eq!(PermitStatus::Approved.badge().tone, Tone::Success);
        assert_eq!(PermitStatus::Rejected.badge().tone, Tone::Danger);
        assert_eq!(PermitStatus::Pending.badge().tone, Tone::Info);
    }
}
