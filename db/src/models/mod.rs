pub mod attendance_location;
pub mod counseling_referral;
pub mod permit_approval;
pub mod self_attendance;
pub mod student_permit;
pub mod student_violation;
pub mod violation_type;

pub use attendance_location::Entity as AttendanceLocation;
pub use counseling_referral::Entity as CounselingReferral;
pub use permit_approval::Entity as PermitApproval;
pub use self_attendance::Entity as SelfAttendance;
pub use student_permit::Entity as StudentPermit;
pub use student_violation::Entity as StudentViolation;
pub use violation_type::Entity as ViolationType;
