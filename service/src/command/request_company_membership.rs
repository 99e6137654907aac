//! [`Command`] for requesting a membership in a [`Company`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    access::{self, Caller, Operation},
    domain::{company, user, Company, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for requesting a membership in a [`Company`].
///
/// An accepted member of another [`Company`] must explicitly confirm leaving
/// it. Requesting a membership in the [`Company`] the [`User`] is already
/// accepted into changes nothing.
#[derive(Clone, Copy, Debug)]
pub struct RequestCompanyMembership {
    /// [`Caller`] requesting the membership.
    pub caller: Caller,

    /// ID of the [`Company`] to request the membership in.
    pub company_id: company::Id,

    /// Indicator whether the current accepted membership may be left.
    pub confirmed: bool,
}

impl<Db> Command<RequestCompanyMembership> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Company>, company::Id>>,
            Ok = Option<Company>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RequestCompanyMembership,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RequestCompanyMembership {
            caller,
            company_id,
            confirmed,
        } = cmd;

        let (user_id, _) = caller
            .authorize_user(Operation::RequestMembership)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        _ = tx
            .execute(Select(By::<Option<Company>, _>::new(company_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CompanyNotExists(company_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        match user.accepted_company() {
            Some(current) if current == company_id => return Ok(user),
            Some(current) if !confirmed => {
                return Err(tracerr::new!(E::AlreadyMember(current)));
            }
            Some(_) | None => {}
        }

        user.company_id = Some(company_id);
        user.membership = user::Membership::Pending;
        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tracing::info!(
            user.id = %user.id,
            company.id = %company_id,
            "membership requested",
        );

        Ok(user)
    }
}

/// Error of [`RequestCompanyMembership`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to request memberships.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`User`] is an accepted member of another [`Company`] and hasn't
    /// confirmed leaving it.
    #[display("`User` is already a member of `Company(id: {_0})`")]
    #[from(ignore)]
    AlreadyMember(#[error(not(source))] company::Id),

    /// [`Company`] doesn't exist.
    #[display("`Company(id: {_0})` does not exist")]
    #[from(ignore)]
    CompanyNotExists(#[error(not(source))] company::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{company, user},
        fixture, Command as _,
    };

    use super::{ExecutionError, RequestCompanyMembership};

    #[tokio::test]
    async fn marks_request_as_pending() {
        let svc = fixture::service();
        let c = fixture::company();
        let u = fixture::user(user::Role::Advertiser);
        fixture::store(&svc, c.clone()).await;
        fixture::store(&svc, u.clone()).await;

        let out = svc
            .execute(RequestCompanyMembership {
                caller: fixture::caller(&u),
                company_id: c.id,
                confirmed: false,
            })
            .await
            .unwrap();

        assert_eq!(out.company_id, Some(c.id));
        assert_eq!(out.membership, user::Membership::Pending);
        assert_eq!(svc.database().snapshot().await.users.get(&u.id), Some(&out));
    }

    #[tokio::test]
    async fn requires_confirmation_to_leave_company() {
        let svc = fixture::service();
        let (current, next) = (fixture::company(), fixture::company());
        let u = fixture::member(current.id, user::Membership::Accepted);
        fixture::store(&svc, current.clone()).await;
        fixture::store(&svc, next.clone()).await;
        fixture::store(&svc, u.clone()).await;

        let req = |confirmed| RequestCompanyMembership {
            caller: fixture::caller(&u),
            company_id: next.id,
            confirmed,
        };

        let err = svc.execute(req(false)).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AlreadyMember(id) if *id == current.id,
        ));

        let out = svc.execute(req(true)).await.unwrap();
        assert_eq!(out.pending_company(), Some(next.id));
    }

    #[tokio::test]
    async fn keeps_accepted_membership_in_same_company() {
        let svc = fixture::service();
        let c = fixture::company();
        let u = fixture::member(c.id, user::Membership::Accepted);
        fixture::store(&svc, c.clone()).await;
        fixture::store(&svc, u.clone()).await;

        let out = svc
            .execute(RequestCompanyMembership {
                caller: fixture::caller(&u),
                company_id: c.id,
                confirmed: false,
            })
            .await
            .unwrap();

        assert_eq!(out, u);
    }

    #[tokio::test]
    async fn fails_on_unknown_company() {
        let svc = fixture::service();
        let u = fixture::user(user::Role::Advertiser);
        fixture::store(&svc, u.clone()).await;

        let err = svc
            .execute(RequestCompanyMembership {
                caller: fixture::caller(&u),
                company_id: company::Id::new(),
                confirmed: true,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::CompanyNotExists(_)));
    }
}
