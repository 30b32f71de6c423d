pub mod assignment;
pub mod classroom;
pub mod classroom_student;
pub mod submission;
