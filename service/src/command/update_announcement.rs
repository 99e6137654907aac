//! [`Command`] for updating an [`Announcement`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
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

/// [`Command`] for fully updating an [`Announcement`].
///
/// Its verification status, author and announcement date are preserved,
/// while the modification date is set to now.
#[derive(Clone, Debug)]
pub struct UpdateAnnouncement {
    /// [`Caller`] updating the [`Announcement`].
    pub caller: Caller,

    /// ID of the [`Announcement`] to update.
    pub id: announcement::Id,

    /// New [`announcement::Price`].
    pub price: announcement::Price,

    /// New expiration [`Date`].
    pub expiration_date: Date,

    /// New contact [`user::Phone`].
    pub phone_number: user::Phone,

    /// New [`announcement::Kind`].
    pub kind: announcement::Kind,

    /// New deletion mark.
    pub deleted: bool,

    /// ID of the advertised [`RealEstate`].
    pub real_estate_id: real_estate::Id,
}

impl<Db> Command<UpdateAnnouncement> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Announcement, announcement::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Announcement>, announcement::Id>>,
            Ok = Option<Announcement>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<RealEstate>, real_estate::Id>>,
            Ok = Option<RealEstate>,
            Err = Traced<database::Error>,
        > + Database<
            Update<Announcement>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = (Announcement, RealEstate);
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateAnnouncement,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateAnnouncement {
            caller,
            id,
            price,
            expiration_date,
            phone_number,
            kind,
            deleted,
            real_estate_id,
        } = cmd;

        caller
            .authorize(Operation::UpdateAnnouncement)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut announcement = tx
            .execute(Select(By::<Option<Announcement>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AnnouncementNotExists(id))
            .map_err(tracerr::wrap!())?;

        let real_estate = tx
            .execute(Select(By::<Option<RealEstate>, _>::new(real_estate_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RealEstateNotExists(real_estate_id))
            .map_err(tracerr::wrap!())?;

        announcement.price = price;
        announcement.expiration_date = expiration_date;
        announcement.phone_number = phone_number;
        announcement.kind = kind;
        announcement.deleted = deleted;
        announcement.real_estate_id = real_estate_id;
        announcement.modified_at = Some(DateTime::now().coerce());
        tx.execute(Update(announcement.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok((announcement, real_estate))
    }
}

/// Error of [`UpdateAnnouncement`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to update [`Announcement`]s.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Announcement`] doesn't exist.
    #[display("`Announcement(id: {_0})` does not exist")]
    #[from(ignore)]
    AnnouncementNotExists(#[error(not(source))] announcement::Id),

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
    use rust_decimal::Decimal;

    use crate::{
        domain::{announcement, user},
        fixture, Command as _,
    };

    use super::{ExecutionError, UpdateAnnouncement};

    #[tokio::test]
    async fn replaces_fields_and_marks_modification() {
        let svc = fixture::service();
        let author = fixture::user(user::Role::Advertiser);
        let estate = fixture::real_estate();
        let mut a = fixture::announcement(author.id, estate.id);
        a.verification = announcement::Verification::Verified;
        fixture::store(&svc, estate.clone()).await;
        fixture::store(&svc, a.clone()).await;

        let (out, r) = svc
            .execute(UpdateAnnouncement {
                caller: fixture::caller(&author),
                id: a.id,
                price: announcement::Price::new(Decimal::new(1, 0)).unwrap(),
                expiration_date: a.expiration_date,
                phone_number: a.phone_number.clone(),
                kind: a.kind.clone(),
                deleted: true,
                real_estate_id: estate.id,
            })
            .await
            .unwrap();

        assert_eq!(r, estate);
        assert!(out.deleted);
        assert!(out.modified_at.is_some());
        assert_eq!(out.announced_at, a.announced_at);
        assert_eq!(out.verification, announcement::Verification::Verified);
        assert_eq!(out.price, announcement::Price::new(Decimal::ONE).unwrap());
    }

    #[tokio::test]
    async fn rejects_missing_announcement() {
        let svc = fixture::service();
        let author = fixture::user(user::Role::Advertiser);
        let a = fixture::announcement(author.id, fixture::real_estate().id);

        let err = svc
            .execute(UpdateAnnouncement {
                caller: fixture::caller(&author),
                id: a.id,
                price: a.price,
                expiration_date: a.expiration_date,
                phone_number: a.phone_number,
                kind: a.kind,
                deleted: false,
                real_estate_id: a.real_estate_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::AnnouncementNotExists(_),
        ));
    }
}
