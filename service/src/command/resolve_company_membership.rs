//! [`Command`] for resolving a requested [`Company`] membership.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Company;
use crate::{
    access::{self, Caller, Operation},
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for accepting or rejecting a pending membership request of a
/// [`User`].
///
/// Only an accepted member of the requested [`Company`] may resolve it.
#[derive(Clone, Copy, Debug)]
pub struct ResolveCompanyMembership {
    /// [`Caller`] resolving the request.
    pub caller: Caller,

    /// ID of the [`User`] requested the membership.
    pub user_id: user::Id,

    /// Indicator whether the request is accepted or rejected.
    pub accepted: bool,
}

impl<Db> Command<ResolveCompanyMembership> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
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
        cmd: ResolveCompanyMembership,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ResolveCompanyMembership {
            caller,
            user_id,
            accepted,
        } = cmd;

        let (resolver_id, _) = caller
            .authorize_user(Operation::ResolveMembership)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        let company_id = tx
            .execute(Select(By::<Option<User>, _>::new(resolver_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .and_then(|r| r.accepted_company())
            .ok_or(E::NoPermission(user_id))
            .map_err(tracerr::wrap!())?;

        match user.pending_company() {
            Some(requested) if requested == company_id => {}
            Some(_) => return Err(tracerr::new!(E::NoPermission(user_id))),
            None => return Err(tracerr::new!(E::NotRequested(user_id))),
        }

        user.membership = if accepted {
            user::Membership::Accepted
        } else {
            user::Membership::Rejected
        };
        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tracing::info!(
            user.id = %user.id,
            company.id = %company_id,
            membership = %user.membership,
            "membership resolved",
        );

        Ok(user)
    }
}

/// Error of [`ResolveCompanyMembership`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to resolve memberships.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Caller`] is not an accepted member of the [`Company`] the
    /// [`User`] requested the membership in.
    #[display("No permission to resolve membership of `User(id: {_0})`")]
    #[from(ignore)]
    NoPermission(#[error(not(source))] user::Id),

    /// [`User`] has no pending membership request.
    #[display("`User(id: {_0})` did not request membership")]
    #[from(ignore)]
    NotRequested(#[error(not(source))] user::Id),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{user, User},
        fixture, Command as _,
    };

    use super::{ExecutionError, ResolveCompanyMembership};

    async fn resolve(
        svc: &fixture::TestService,
        resolver: &User,
        target: &User,
        accepted: bool,
    ) -> Result<User, ExecutionError> {
        svc.execute(ResolveCompanyMembership {
            caller: fixture::caller(resolver),
            user_id: target.id,
            accepted,
        })
        .await
        .map_err(tracerr::Traced::into_inner)
    }

    #[tokio::test]
    async fn accepts_and_rejects_pending_requests() {
        let svc = fixture::service();
        let c = fixture::company();
        let resolver = fixture::member(c.id, user::Membership::Accepted);
        let first = fixture::member(c.id, user::Membership::Pending);
        let second = fixture::member(c.id, user::Membership::Pending);
        for u in [&resolver, &first, &second] {
            fixture::store(&svc, u.clone()).await;
        }

        let out = resolve(&svc, &resolver, &first, true).await.unwrap();
        assert_eq!(out.accepted_company(), Some(c.id));

        let out = resolve(&svc, &resolver, &second, false).await.unwrap();
        assert_eq!(out.membership, user::Membership::Rejected);
        assert_eq!(out.company_id, Some(c.id));
    }

    #[tokio::test]
    async fn denies_resolver_outside_company() {
        let svc = fixture::service();
        let (c, other) = (fixture::company(), fixture::company());
        let resolver = fixture::member(other.id, user::Membership::Accepted);
        let pending = fixture::member(c.id, user::Membership::Pending);
        let outsider = fixture::user(user::Role::Advertiser);
        for u in [&resolver, &pending, &outsider] {
            fixture::store(&svc, u.clone()).await;
        }

        let err = resolve(&svc, &resolver, &pending, true).await.unwrap_err();
        assert!(matches!(err, ExecutionError::NoPermission(_)));

        let err = resolve(&svc, &outsider, &pending, true).await.unwrap_err();
        assert!(matches!(err, ExecutionError::NoPermission(_)));
    }

    #[tokio::test]
    async fn fails_when_nothing_requested() {
        let svc = fixture::service();
        let c = fixture::company();
        let resolver = fixture::member(c.id, user::Membership::Accepted);
        let member = fixture::member(c.id, user::Membership::Accepted);
        let idle = fixture::user(user::Role::Advertiser);
        for u in [&resolver, &member, &idle] {
            fixture::store(&svc, u.clone()).await;
        }

        for target in [&member, &idle] {
            let err = resolve(&svc, &resolver, target, true).await.unwrap_err();
            assert!(matches!(err, ExecutionError::NotRequested(_)));
        }
    }

    #[tokio::test]
    async fn fails_for_unknown_user() {
        let svc = fixture::service();
        let c = fixture::company();
        let resolver = fixture::member(c.id, user::Membership::Accepted);
        let ghost = fixture::member(c.id, user::Membership::Pending);
        fixture::store(&svc, resolver.clone()).await;

        let err = resolve(&svc, &resolver, &ghost, true).await.unwrap_err();

        assert!(matches!(
            err,
            ExecutionError::UserNotExists(id) if id == ghost.id,
        ));
    }
}
