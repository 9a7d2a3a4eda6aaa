pub mod m202602090001_create_violation_types;
pub mod m202602090002_create_student_violations;
pub mod m202602090003_create_attendance;
pub mod m202602090004_create_permits;
pub mod m202602090005_create_referrals;
