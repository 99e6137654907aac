//! Domain definitions.

pub mod announcement;
pub mod comment;
pub mod company;
pub mod real_estate;
pub mod report;
pub mod user;

pub use self::{
    announcement::Announcement, comment::Comment, company::Company,
    real_estate::RealEstate, report::Report, user::User,
};
