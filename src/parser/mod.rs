pub mod exams;
pub mod form;
pub mod grades;
pub mod portal;
pub mod projects;
pub mod schedule;
pub mod table;
pub mod text;
pub mod timetable;
