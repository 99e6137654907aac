//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_announcement;
pub mod create_comment;
pub mod create_company;
pub mod create_real_estate;
pub mod create_report;
pub mod create_user;
pub mod create_user_session;
pub mod delete_announcement;
pub mod delete_comment;
pub mod delete_company;
pub mod delete_real_estate;
pub mod delete_report;
pub mod extend_announcement_expiration;
pub mod request_company_membership;
pub mod resolve_company_membership;
pub mod update_announcement;
pub mod update_comment;
pub mod update_company;
pub mod update_real_estate;
pub mod update_report;
pub mod verify_announcement;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_announcement::CreateAnnouncement, create_comment::CreateComment,
    create_company::CreateCompany, create_real_estate::CreateRealEstate,
    create_report::CreateReport, create_user::CreateUser,
    create_user_session::CreateUserSession,
    delete_announcement::DeleteAnnouncement, delete_comment::DeleteComment,
    delete_company::DeleteCompany, delete_real_estate::DeleteRealEstate,
    delete_report::DeleteReport,
    extend_announcement_expiration::ExtendAnnouncementExpiration,
    request_company_membership::RequestCompanyMembership,
    resolve_company_membership::ResolveCompanyMembership,
    update_announcement::UpdateAnnouncement, update_comment::UpdateComment,
    update_company::UpdateCompany, update_real_estate::UpdateRealEstate,
    update_report::UpdateReport, verify_announcement::VerifyAnnouncement,
};
