pub mod attendance_location;
pub mod violation_type;
