//! Role-based access control consulted before every [`Operation`].

use derive_more::{Display, Error};

use crate::domain::user::{self, Role};
#[cfg(doc)]
use crate::domain::User;

/// Caller performing an [`Operation`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Caller {
    /// Anonymous caller without any authenticated identity.
    Guest,

    /// Authenticated [`User`].
    User {
        /// ID of the authenticated [`User`].
        id: user::Id,

        /// [`Role`] the [`User`] is authenticated with.
        role: Role,
    },
}

impl Caller {
    /// Returns ID of the authenticated [`User`], if any.
    #[must_use]
    pub const fn id(&self) -> Option<user::Id> {
        match self {
            Self::Guest => None,
            Self::User { id, .. } => Some(*id),
        }
    }

    /// Returns [`Role`] of the authenticated [`User`], if any.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::Guest => None,
            Self::User { role, .. } => Some(*role),
        }
    }

    /// Checks whether this [`Caller`] is an authenticated administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// Authorizes this [`Caller`] to perform the provided [`Operation`].
    ///
    /// # Errors
    ///
    /// With [`Denial`] if the [`Operation`] is not allowed.
    pub fn authorize(self, op: Operation) -> Result<(), Denial> {
        match decide(self, op) {
            Decision::Allow => Ok(()),
            Decision::Forbid => Err(Denial::Forbidden),
            Decision::RequireIdentity => Err(Denial::Unauthenticated),
        }
    }

    /// Authorizes this [`Caller`] to perform the provided [`Operation`],
    /// returning the identity it's performed with.
    ///
    /// # Errors
    ///
    /// With [`Denial`] if the [`Operation`] is not allowed, or this
    /// [`Caller`] is a [`Caller::Guest`].
    pub fn authorize_user(
        self,
        op: Operation,
    ) -> Result<(user::Id, Role), Denial> {
        self.authorize(op)?;
        match self {
            Self::Guest => Err(Denial::Unauthenticated),
            Self::User { id, role } => Ok((id, role)),
        }
    }
}

/// Operation subject to access control.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    /// Publishing a new announcement.
    CreateAnnouncement,

    /// Fully updating an announcement.
    UpdateAnnouncement,

    /// Removing an announcement.
    DeleteAnnouncement,

    /// Extending expiration date of an announcement.
    ExtendAnnouncementExpiration,

    /// Verifying an announcement.
    VerifyAnnouncement,

    /// Uploading an image of an announcement.
    UploadAnnouncementImage,

    /// Listing all the announcements.
    ListAnnouncements,

    /// Listing announcements by their deletion mark.
    ListAnnouncementsByDeleted {
        /// Requested deletion mark.
        deleted: bool,
    },

    /// Listing announcements of a company.
    ListCompanyAnnouncements,

    /// Listing the cheapest announcements of a company.
    ListTopCompanyAnnouncements,

    /// Listing announcements of an author.
    ListAuthorAnnouncements,

    /// Viewing a single announcement.
    ViewAnnouncement,

    /// Creating a new real estate.
    CreateRealEstate,

    /// Fully updating a real estate.
    UpdateRealEstate,

    /// Removing a real estate.
    DeleteRealEstate,

    /// Looking for real estates similar to the provided one.
    FindSimilarRealEstates,

    /// Listing all the real estates.
    ListRealEstates,

    /// Listing real estates by their deletion mark.
    ListRealEstatesByDeleted {
        /// Requested deletion mark.
        deleted: bool,
    },

    /// Viewing a single real estate.
    ViewRealEstate,

    /// Creating a new company.
    CreateCompany,

    /// Updating a company.
    UpdateCompany,

    /// Removing a company.
    DeleteCompany,

    /// Listing all the companies.
    ListCompanies,

    /// Searching companies.
    SearchCompanies,

    /// Viewing a single company.
    ViewCompany,

    /// Requesting membership in a company.
    RequestMembership,

    /// Listing membership requests to the own company.
    ListMembershipRequests,

    /// Resolving a membership request to the own company.
    ResolveMembership,

    /// Leaving a new comment.
    CreateComment,

    /// Updating a comment.
    UpdateComment,

    /// Removing a comment.
    DeleteComment,

    /// Listing all the comments.
    ListComments,

    /// Listing comments of an announcement.
    ListAnnouncementComments,

    /// Viewing a single comment.
    ViewComment,

    /// Filing a new report.
    CreateReport,

    /// Updating a report.
    UpdateReport,

    /// Removing a report.
    DeleteReport,

    /// Listing all the reports.
    ListReports,

    /// Listing reports by their status.
    ListReportsByStatus,

    /// Listing reports filed with an email.
    ListReportsByEmail,

    /// Viewing a single report.
    ViewReport,

    /// Registering a new user.
    RegisterUser {
        /// [`Role`] of the user being registered.
        role: Role,
    },

    /// Listing all the users.
    ListUsers,

    /// Viewing a single user.
    ViewUser,
}

/// Decision about performing an [`Operation`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// [`Operation`] is allowed.
    Allow,

    /// [`Operation`] is not allowed for the [`Caller`]'s [`Role`].
    Forbid,

    /// [`Operation`] requires an authenticated [`Caller`].
    RequireIdentity,
}

/// Denial of performing an [`Operation`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum Denial {
    /// [`Caller`] must be authenticated.
    #[display("Authentication required")]
    Unauthenticated,

    /// [`Caller`]'s [`Role`] is not allowed to perform the [`Operation`].
    #[display("Access denied")]
    Forbidden,
}

/// [`Role`]s an [`Operation`] is allowed for.
#[derive(Clone, Copy, Debug)]
enum Access {
    /// Anyone, including [`Caller::Guest`]s.
    Anyone,

    /// Only authenticated [`Caller`]s with the listed [`Role`]s.
    Roles(&'static [Role]),
}

impl Operation {
    /// Returns [`Access`] required by this [`Operation`].
    const fn access(self) -> Access {
        use Access::{Anyone, Roles};
        use Role::{Admin, Advertiser, Verifier};

        const ADVERTISER: &[Role] = &[Advertiser];
        const VERIFIER: &[Role] = &[Verifier];
        const ADMIN: &[Role] = &[Admin];
        const ADVERTISER_OR_ADMIN: &[Role] = &[Advertiser, Admin];
        const AUTHENTICATED: &[Role] = &[Advertiser, Verifier, Admin];

        match self {
            Self::CreateAnnouncement
            | Self::UpdateAnnouncement
            | Self::DeleteAnnouncement
            | Self::ExtendAnnouncementExpiration
            | Self::UploadAnnouncementImage
            | Self::CreateRealEstate
            | Self::UpdateRealEstate
            | Self::FindSimilarRealEstates
            | Self::RequestMembership
            | Self::ListMembershipRequests
            | Self::ResolveMembership => Roles(ADVERTISER),

            Self::VerifyAnnouncement => Roles(VERIFIER),

            Self::ListAnnouncements
            | Self::ListAnnouncementsByDeleted { deleted: true }
            | Self::ListRealEstates
            | Self::ListRealEstatesByDeleted { deleted: true }
            | Self::CreateCompany
            | Self::DeleteCompany
            | Self::ListComments
            | Self::UpdateReport
            | Self::DeleteReport
            | Self::ListReports
            | Self::ListReportsByStatus
            | Self::ViewReport
            | Self::ListUsers => Roles(ADMIN),

            Self::DeleteRealEstate
            | Self::ListRealEstatesByDeleted { deleted: false }
            | Self::UpdateCompany => Roles(ADVERTISER_OR_ADMIN),

            Self::CreateComment
            | Self::UpdateComment
            | Self::DeleteComment
            | Self::CreateReport
            | Self::ListReportsByEmail => Roles(AUTHENTICATED),

            Self::RegisterUser { role } => match role {
                Advertiser => Anyone,
                Verifier | Admin => Roles(ADMIN),
            },

            Self::ListAnnouncementsByDeleted { deleted: false }
            | Self::ListCompanyAnnouncements
            | Self::ListTopCompanyAnnouncements
            | Self::ListAuthorAnnouncements
            | Self::ViewAnnouncement
            | Self::ViewRealEstate
            | Self::ListCompanies
            | Self::SearchCompanies
            | Self::ViewCompany
            | Self::ListAnnouncementComments
            | Self::ViewComment
            | Self::ViewUser => Anyone,
        }
    }
}

/// Decides whether the provided [`Caller`] may perform the [`Operation`].
#[must_use]
pub fn decide(caller: Caller, op: Operation) -> Decision {
    match (op.access(), caller) {
        (Access::Anyone, _) => Decision::Allow,
        (Access::Roles(_), Caller::Guest) => Decision::RequireIdentity,
        (Access::Roles(roles), Caller::User { role, .. }) => {
            if roles.contains(&role) {
                Decision::Allow
            } else {
                Decision::Forbid
            }
        }
    }
}
