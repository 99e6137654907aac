//! [`Query`] for listing membership requests to a [`Company`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Company;
use crate::{
    access::{self, Caller, Operation},
    domain::{user, User},
    infra::{database, Database},
    read, Service,
};

use super::Query;

/// [`Query`] for listing [`User`]s of the [`Company`] the [`Caller`] is an
/// accepted member of, having the provided [`user::Membership`] status.
#[derive(Clone, Copy, Debug)]
pub struct MembershipRequests {
    /// [`Caller`] listing the requests.
    pub caller: Caller,

    /// [`user::Membership`] status of the listed [`User`]s.
    pub status: user::Membership,

    /// Pagination arguments.
    pub arguments: read::user::list::Arguments,
}

impl<Db> Query<MembershipRequests> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::user::list::Page, read::user::list::Selector>>,
            Ok = read::user::list::Page,
            Err = Traced<database::Error>,
        >,
{
    type Ok = read::user::list::Page;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: MembershipRequests,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MembershipRequests {
            caller,
            status,
            arguments,
        } = query;

        let (caller_id, _) = caller
            .authorize_user(Operation::ListMembershipRequests)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let company_id = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(caller_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(caller_id))
            .map_err(tracerr::wrap!())?
            .accepted_company()
            .ok_or(E::NotMemberOfCompany)
            .map_err(tracerr::wrap!())?;

        self.database()
            .execute(Select(By::new(read::user::list::Selector {
                arguments,
                filter: read::user::list::Filter {
                    company_id: Some(company_id),
                    membership: Some(status),
                },
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`MembershipRequests`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to list membership requests.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Caller`] is not an accepted member of any [`Company`].
    #[display("`User` is not a member of any `Company`")]
    NotMemberOfCompany,

    /// [`User`] performing the [`Query`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        access::{Caller, Denial},
        domain::{company, user},
        fixture, read, Query as _,
    };

    use super::{ExecutionError, MembershipRequests};

    #[tokio::test]
    async fn lists_pending_users_of_own_company() {
        let svc = fixture::service();
        let company_id = company::Id::new();
        let member = fixture::member(company_id, user::Membership::Accepted);
        let pending = fixture::member(company_id, user::Membership::Pending);
        let foreign =
            fixture::member(company::Id::new(), user::Membership::Pending);
        for u in [&member, &pending, &foreign] {
            fixture::store(&svc, u.clone()).await;
        }

        let page = svc
            .execute(MembershipRequests {
                caller: fixture::caller(&member),
                status: user::Membership::Pending,
                arguments: read::user::list::Arguments::default(),
            })
            .await
            .unwrap();

        assert_eq!(page.items, vec![pending]);
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn requires_accepted_membership() {
        let svc = fixture::service();
        let pending =
            fixture::member(company::Id::new(), user::Membership::Pending);
        fixture::store(&svc, pending.clone()).await;

        let err = svc
            .execute(MembershipRequests {
                caller: fixture::caller(&pending),
                status: user::Membership::Pending,
                arguments: read::user::list::Arguments::default(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotMemberOfCompany));
    }

    #[tokio::test]
    async fn guest_is_unauthenticated() {
        let svc = fixture::service();

        let err = svc
            .execute(MembershipRequests {
                caller: Caller::Guest,
                status: user::Membership::Pending,
                arguments: read::user::list::Arguments::default(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Access(Denial::Unauthenticated),
        ));
    }
}
