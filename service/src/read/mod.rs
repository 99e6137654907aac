//! Read entities definitions.

pub mod announcement;
pub mod comment;
pub mod company;
pub mod real_estate;
pub mod report;
pub mod user;
