//! In-memory [`Database`] implementation.
//!
//! Transactions are serialized: a [`Tx`] holds the whole [`Tables`] locked
//! until it's committed or dropped, and works upon a staged copy of them.

mod impls;

use std::{collections::HashMap, future::Future, sync::Arc};

use common::operations::{Commit, Transact};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

#[cfg(doc)]
use crate::infra::Database;
use crate::{
    domain::{
        announcement, comment, company, real_estate, report, user,
        Announcement, Comment, Company, RealEstate, Report, User,
    },
    infra::database,
};

/// Rows of all the entities stored in a [`Memory`] [`Database`].
#[derive(Clone, Debug, Default)]
pub struct Tables {
    /// Stored [`Announcement`]s.
    pub announcements: HashMap<announcement::Id, Announcement>,

    /// Stored [`Comment`]s.
    pub comments: HashMap<comment::Id, Comment>,

    /// Stored [`Company`]s.
    pub companies: HashMap<company::Id, Company>,

    /// Stored [`RealEstate`]s.
    pub real_estates: HashMap<real_estate::Id, RealEstate>,

    /// Stored [`Report`]s.
    pub reports: HashMap<report::Id, Report>,

    /// Stored [`User`]s.
    pub users: HashMap<user::Id, User>,
}

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] [`Database`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the currently committed [`Tables`].
    pub async fn snapshot(&self) -> Tables {
        self.0 .0.lock().await.clone()
    }
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct NonTx(Arc<Mutex<Tables>>);

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx(Arc<Mutex<TxState>>);

/// State of a [`Tx`].
#[derive(Debug)]
struct TxState {
    /// Lock over the committed [`Tables`], released on commit.
    guard: Option<OwnedMutexGuard<Tables>>,

    /// [`Tables`] modified by this [`Tx`].
    staged: Tables,
}

/// Access to the [`Tables`] of a [`Memory`] client.
pub trait Storage {
    /// Performs the provided operation upon the [`Tables`].
    fn with<R>(
        &self,
        op: impl FnOnce(&mut Tables) -> R,
    ) -> impl Future<Output = R>;
}

impl Storage for NonTx {
    async fn with<R>(&self, op: impl FnOnce(&mut Tables) -> R) -> R {
        op(&mut *self.0.lock().await)
    }
}

impl Storage for Tx {
    async fn with<R>(&self, op: impl FnOnce(&mut Tables) -> R) -> R {
        op(&mut self.0.lock().await.staged)
    }
}

impl database::Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let guard = Arc::clone(&self.0 .0).lock_owned().await;
        let staged = guard.clone();
        Ok(Memory(Tx(Arc::new(Mutex::new(TxState {
            guard: Some(guard),
            staged,
        })))))
    }
}

impl database::Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl database::Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0 .0.lock().await;
        let staged = state.staged.clone();
        if let Some(mut committed) = state.guard.take() {
            *committed = staged;
        }
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{Commit, Transact};

    use crate::{
        domain::{company, user, Company},
        infra::Database as _,
    };

    use super::{Memory, Storage as _};

    fn company() -> Company {
        Company {
            id: company::Id::new(),
            name: company::Name::new("Acme").unwrap(),
            address: company::Address::new("Main st. 1").unwrap(),
            phone_number: user::Phone::new("0651234567").unwrap(),
        }
    }

    #[tokio::test]
    async fn commit_persists_changes() {
        let db = Memory::new();
        let c = company();

        let tx = db.execute(Transact).await.unwrap();
        drop(tx.0.with(|t| t.companies.insert(c.id, c.clone())).await);
        tx.execute(Commit).await.unwrap();

        assert_eq!(db.snapshot().await.companies.get(&c.id), Some(&c));
    }

    #[tokio::test]
    async fn dropped_tx_rolls_back() {
        let db = Memory::new();
        let c = company();

        let tx = db.execute(Transact).await.unwrap();
        drop(tx.0.with(|t| t.companies.insert(c.id, c.clone())).await);
        drop(tx);

        assert!(db.snapshot().await.companies.is_empty());
    }
}
