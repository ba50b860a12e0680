pub mod filing;
pub mod parsing;
pub mod schedule;
