//! [`Command`] for creating a new [`Announcement`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    access::{self, Caller, Operation},
    domain::{announcement, real_estate, user, Announcement, RealEstate},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Announcement`].
#[derive(Clone, Debug)]
pub struct CreateAnnouncement {
    /// [`Caller`] authoring the [`Announcement`].
    pub caller: Caller,

    /// [`announcement::Price`] of the advertised [`RealEstate`].
    pub price: announcement::Price,

    /// [`DateTime`] of announcing, if not now.
    pub announced_at: Option<announcement::AnnouncementDateTime>,

    /// [`Date`] the [`Announcement`] expires at.
    pub expiration_date: Date,

    /// Contact [`user::Phone`] of the [`Announcement`].
    pub phone_number: user::Phone,

    /// [`announcement::Kind`] of the [`Announcement`].
    pub kind: announcement::Kind,

    /// Advertised [`RealEstate`].
    pub real_estate: RealEstateInput,
}

/// [`RealEstate`] advertised by a new [`Announcement`].
#[derive(Clone, Debug)]
pub enum RealEstateInput {
    /// Already existing [`RealEstate`].
    Existing(real_estate::Id),

    /// New [`RealEstate`] to be created along with the [`Announcement`].
    New(Box<RealEstate>),
}

impl<Db> Command<CreateAnnouncement> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<RealEstate>, real_estate::Id>>,
            Ok = Option<RealEstate>,
            Err = Traced<database::Error>,
        > + Database<Insert<RealEstate>, Err = Traced<database::Error>>
        + Database<Insert<Announcement>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = (Announcement, RealEstate);
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateAnnouncement,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateAnnouncement {
            caller,
            price,
            announced_at,
            expiration_date,
            phone_number,
            kind,
            real_estate,
        } = cmd;

        let (author_id, _) = caller
            .authorize_user(Operation::CreateAnnouncement)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let real_estate = match real_estate {
            RealEstateInput::Existing(id) => tx
                .execute(Select(By::<Option<RealEstate>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::RealEstateNotExists(id))
                .map_err(tracerr::wrap!())?,
            RealEstateInput::New(real_estate) => {
                tx.execute(Insert((*real_estate).clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                *real_estate
            }
        };

        let announcement = Announcement {
            id: announcement::Id::new(),
            price,
            announced_at: announced_at
                .unwrap_or_else(|| DateTime::now().coerce()),
            modified_at: None,
            expiration_date,
            phone_number,
            kind,
            verification: announcement::Verification::NotVerified,
            deleted: false,
            real_estate_id: real_estate.id,
            author_id,
        };
        tx.execute(Insert(announcement.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok((announcement, real_estate))
    }
}

/// Error of [`CreateAnnouncement`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to create [`Announcement`]s.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Referenced [`RealEstate`] doesn't exist.
    #[display("`RealEstate(id: {_0})` does not exist")]
    #[from(ignore)]
    RealEstateNotExists(#[error(not(source))] real_estate::Id),
}

#[cfg(test)]
mod spec {
    use common::Date;
    use rust_decimal::Decimal;

    use crate::{
        access::Caller,
        domain::{announcement, real_estate, user},
        fixture, Command as _,
    };

    use super::{CreateAnnouncement, ExecutionError, RealEstateInput};

    fn cmd(caller: Caller, real_estate: RealEstateInput) -> CreateAnnouncement {
        CreateAnnouncement {
            caller,
            price: announcement::Price::new(Decimal::new(99_000, 0)).unwrap(),
            announced_at: None,
            expiration_date: Date::from_calendar(2999, 6, 1).unwrap(),
            phone_number: user::Phone::new("0641112223").unwrap(),
            kind: announcement::Kind::new("rent").unwrap(),
            real_estate,
        }
    }

    #[tokio::test]
    async fn creates_along_with_new_real_estate() {
        let svc = fixture::service();
        let author = fixture::user(user::Role::Advertiser);
        let estate = fixture::real_estate();

        let (a, r) = svc
            .execute(cmd(
                fixture::caller(&author),
                RealEstateInput::New(Box::new(estate.clone())),
            ))
            .await
            .unwrap();

        assert_eq!(r, estate);
        assert_eq!(a.real_estate_id, estate.id);
        assert_eq!(a.author_id, author.id);
        assert_eq!(a.verification, announcement::Verification::NotVerified);
        assert!(!a.deleted);

        let stored = svc.database().snapshot().await;
        assert_eq!(stored.announcements.get(&a.id), Some(&a));
        assert_eq!(stored.real_estates.get(&estate.id), Some(&estate));
    }

    #[tokio::test]
    async fn references_existing_real_estate() {
        let svc = fixture::service();
        let author = fixture::user(user::Role::Advertiser);
        let estate = fixture::real_estate();
        fixture::store(&svc, estate.clone()).await;

        let (a, _) = svc
            .execute(cmd(
                fixture::caller(&author),
                RealEstateInput::Existing(estate.id),
            ))
            .await
            .unwrap();

        assert_eq!(a.real_estate_id, estate.id);
    }

    #[tokio::test]
    async fn rejects_missing_real_estate() {
        let svc = fixture::service();
        let author = fixture::user(user::Role::Advertiser);

        let err = svc
            .execute(cmd(
                fixture::caller(&author),
                RealEstateInput::Existing(real_estate::Id::new()),
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::RealEstateNotExists(_),
        ));
        assert!(svc.database().snapshot().await.announcements.is_empty());
    }
}
