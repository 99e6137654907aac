//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Password, Role, Username};
use crate::{
    access::{self, Caller, Operation},
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Caller`] registering the [`User`].
    pub caller: Caller,

    /// [`Username`] of a new [`User`].
    pub username: user::Username,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Username>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            caller,
            username,
            email,
            password,
            role,
        } = cmd;

        caller
            .authorize(Operation::RegisterUser { role })
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let u = self
            .database()
            .execute(Select(By::new(&username)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::UsernameOccupied(username)));
        }

        let user = User {
            id: user::Id::new(),
            username,
            email,
            password_hash: user::PasswordHash::new(password.expose_secret()),
            role,
            company_id: None,
            membership: user::Membership::NotRequested,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(user.id = %user.id, user.role = %user.role, "registered");

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to register a [`User`] of the [`Role`].
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Username`] is already occupied.
    #[display("`{_0}` username is occupied")]
    #[from(ignore)]
    UsernameOccupied(#[error(not(source))] user::Username),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        access::{Caller, Denial},
        domain::user,
        fixture, Command as _,
    };

    use super::{CreateUser, ExecutionError};

    fn cmd(caller: Caller, username: &str, role: user::Role) -> CreateUser {
        CreateUser {
            caller,
            username: user::Username::new(username).unwrap(),
            email: user::Email::new(format!("{username}@example.com"))
                .unwrap(),
            password: SecretBox::new(Box::new("secret".into())),
            role,
        }
    }

    #[tokio::test]
    async fn guest_registers_advertiser() {
        let svc = fixture::service();

        let user = svc
            .execute(cmd(Caller::Guest, "advertiser", user::Role::Advertiser))
            .await
            .unwrap();

        assert_eq!(user.role, user::Role::Advertiser);
        assert_eq!(user.membership, user::Membership::NotRequested);
        assert_eq!(user.company_id, None);
    }

    #[tokio::test]
    async fn only_admin_registers_verifier() {
        let svc = fixture::service();
        let admin = fixture::user(user::Role::Admin);
        let advertiser = fixture::user(user::Role::Advertiser);

        let err = svc
            .execute(cmd(Caller::Guest, "verifier", user::Role::Verifier))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Access(Denial::Unauthenticated),
        ));

        let err = svc
            .execute(cmd(
                fixture::caller(&advertiser),
                "verifier",
                user::Role::Verifier,
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Access(Denial::Forbidden),
        ));

        let user = svc
            .execute(cmd(
                fixture::caller(&admin),
                "verifier",
                user::Role::Verifier,
            ))
            .await
            .unwrap();
        assert_eq!(user.role, user::Role::Verifier);
    }

    #[tokio::test]
    async fn rejects_occupied_username() {
        let svc = fixture::service();
        drop(
            svc.execute(cmd(Caller::Guest, "taken", user::Role::Advertiser))
                .await
                .unwrap(),
        );

        let err = svc
            .execute(cmd(Caller::Guest, "taken", user::Role::Advertiser))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UsernameOccupied(_)));
    }
}
