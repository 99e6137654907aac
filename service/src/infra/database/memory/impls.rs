//! [`Database`] implementations for [`Memory`].

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    pagination::Page,
};
use tracerr::Traced;

use crate::{
    domain::{
        announcement, comment, company, real_estate, report, user,
        Announcement, Comment, Company, RealEstate, Report, User,
    },
    infra::{database, Database},
    read,
};

use super::{Memory, Storage, Tables};

/// Implements row-level operations of an entity stored in the provided
/// [`Tables`] field.
macro_rules! impl_rows {
    ($entity:ty, $id:ty, $table:ident) => {
        impl<C, IDs> Database<Select<By<HashMap<$id, $entity>, IDs>>>
            for Memory<C>
        where
            C: Storage,
            IDs: AsRef<[$id]>,
        {
            type Ok = HashMap<$id, $entity>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<HashMap<$id, $entity>, IDs>>,
            ) -> Result<Self::Ok, Self::Err> {
                let ids = by.into_inner();
                Ok(self
                    .0
                    .with(|t| {
                        ids.as_ref()
                            .iter()
                            .filter_map(|id| {
                                t.$table.get(id).map(|e| (*id, e.clone()))
                            })
                            .collect()
                    })
                    .await)
            }
        }

        impl<C: Storage> Database<Select<By<Option<$entity>, $id>>>
            for Memory<C>
        {
            type Ok = Option<$entity>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<Option<$entity>, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                let id = by.into_inner();
                Ok(self.0.with(|t| t.$table.get(&id).cloned()).await)
            }
        }

        impl<C: Storage> Database<Insert<$entity>> for Memory<C> {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Insert(row): Insert<$entity>,
            ) -> Result<Self::Ok, Self::Err> {
                self.execute(Update(row)).await
            }
        }

        impl<C: Storage> Database<Update<$entity>> for Memory<C> {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Update(row): Update<$entity>,
            ) -> Result<Self::Ok, Self::Err> {
                drop(self.0.with(|t| t.$table.insert(row.id, row)).await);
                Ok(())
            }
        }

        impl<C: Storage> Database<Delete<By<$entity, $id>>> for Memory<C> {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Delete(by): Delete<By<$entity, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                let id = by.into_inner();
                drop(self.0.with(|t| t.$table.remove(&id)).await);
                Ok(())
            }
        }

        impl<C: Storage> Database<Lock<By<$entity, $id>>> for Memory<C> {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                _: Lock<By<$entity, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                // `Tx` already holds all the `Tables` exclusively.
                Ok(())
            }
        }
    };
}

impl_rows!(Announcement, announcement::Id, announcements);
impl_rows!(Comment, comment::Id, comments);
impl_rows!(Company, company::Id, companies);
impl_rows!(RealEstate, real_estate::Id, real_estates);
impl_rows!(Report, report::Id, reports);
impl_rows!(User, user::Id, users);

/// Checks whether the [`User`] authored an [`Announcement`] matches the
/// provided criteria.
fn author_matches(
    t: &Tables,
    a: &Announcement,
    email: Option<&user::Email>,
    company_id: Option<company::Id>,
) -> bool {
    if email.is_none() && company_id.is_none() {
        return true;
    }
    t.users.get(&a.author_id).is_some_and(|u| {
        email.map_or(true, |e| &u.email == e)
            && company_id.map_or(true, |c| u.accepted_company() == Some(c))
    })
}

impl<C: Storage>
    Database<
        Select<
            By<read::announcement::list::Page, read::announcement::list::Selector>,
        >,
    > for Memory<C>
{
    type Ok = read::announcement::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                read::announcement::list::Page,
                read::announcement::list::Selector,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::announcement::list::Selector { arguments, filter } =
            by.into_inner();
        let read::announcement::list::Filter {
            deleted,
            verification,
            author_email,
            company_id,
        } = filter;

        let mut items = self
            .0
            .with(|t| {
                t.announcements
                    .values()
                    .filter(|a| deleted.map_or(true, |d| a.deleted == d))
                    .filter(|a| {
                        verification.map_or(true, |v| a.verification == v)
                    })
                    .filter(|a| {
                        author_matches(t, a, author_email.as_ref(), company_id)
                    })
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        items.sort_by_key(|a| (a.announced_at, a.id));

        Ok(Page::slice(arguments, items))
    }
}

impl<C: Storage>
    Database<Select<By<Vec<Announcement>, read::announcement::Top>>>
    for Memory<C>
{
    type Ok = Vec<Announcement>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Announcement>, read::announcement::Top>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::announcement::Top { company_id, limit } = by.into_inner();

        let mut items = self
            .0
            .with(|t| {
                t.announcements
                    .values()
                    .filter(|a| author_matches(t, a, None, Some(company_id)))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        items.sort_by_key(|a| (a.price, a.announced_at, a.id));
        items.truncate(limit);

        Ok(items)
    }
}

impl<C: Storage>
    Database<
        Select<
            By<read::real_estate::list::Page, read::real_estate::list::Selector>,
        >,
    > for Memory<C>
{
    type Ok = read::real_estate::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                read::real_estate::list::Page,
                read::real_estate::list::Selector,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::real_estate::list::Selector {
            arguments,
            filter: read::real_estate::list::Filter { deleted },
        } = by.into_inner();

        let mut items = self
            .0
            .with(|t| {
                t.real_estates
                    .values()
                    .filter(|r| deleted.map_or(true, |d| r.deleted == d))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        items.sort_by(|a, b| {
            (a.name.as_ref(), a.id).cmp(&(b.name.as_ref(), b.id))
        });

        Ok(Page::slice(arguments, items))
    }
}

impl<C: Storage>
    Database<Select<By<Vec<RealEstate>, read::real_estate::Similar>>>
    for Memory<C>
{
    type Ok = Vec<RealEstate>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<RealEstate>, read::real_estate::Similar>>,
    ) -> Result<Self::Ok, Self::Err> {
        let similar = by.into_inner();

        let mut items = self
            .0
            .with(|t| {
                t.real_estates
                    .values()
                    .filter(|r| similar.matches(r))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        items.sort_by_key(|r| r.id);

        Ok(items)
    }
}

impl<C: Storage>
    Database<Select<By<read::real_estate::IsUsed, real_estate::Id>>>
    for Memory<C>
{
    type Ok = read::real_estate::IsUsed;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::real_estate::IsUsed, real_estate::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(read::real_estate::IsUsed(
            self.0
                .with(|t| {
                    t.announcements.values().any(|a| a.real_estate_id == id)
                })
                .await,
        ))
    }
}

impl<C: Storage>
    Database<
        Select<By<read::company::list::Page, read::company::list::Selector>>,
    > for Memory<C>
{
    type Ok = read::company::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::company::list::Page, read::company::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::company::list::Selector { arguments, filter } =
            by.into_inner();

        let mut items = self
            .0
            .with(|t| {
                t.companies
                    .values()
                    .filter(|c| filter.matches(c))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        items.sort_by(|a, b| {
            (a.name.as_ref(), a.id).cmp(&(b.name.as_ref(), b.id))
        });

        Ok(Page::slice(arguments, items))
    }
}

impl<C: Storage>
    Database<Select<By<read::company::HasMembers, company::Id>>>
    for Memory<C>
{
    type Ok = read::company::HasMembers;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::company::HasMembers, company::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(read::company::HasMembers(
            self.0
                .with(|t| t.users.values().any(|u| u.company_id == Some(id)))
                .await,
        ))
    }
}

impl<'l, C: Storage> Database<Select<By<Option<User>, &'l user::Username>>>
    for Memory<C>
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();
        Ok(self
            .0
            .with(|t| {
                t.users.values().find(|u| &u.username == username).cloned()
            })
            .await)
    }
}

impl<C: Storage>
    Database<Select<By<read::user::list::Page, read::user::list::Selector>>>
    for Memory<C>
{
    type Ok = read::user::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::user::list::Page, read::user::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::user::list::Selector {
            arguments,
            filter:
                read::user::list::Filter {
                    company_id,
                    membership,
                },
        } = by.into_inner();

        let mut items = self
            .0
            .with(|t| {
                t.users
                    .values()
                    .filter(|u| {
                        company_id.map_or(true, |c| u.company_id == Some(c))
                    })
                    .filter(|u| membership.map_or(true, |m| u.membership == m))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        items.sort_by_key(|u| (u.created_at, u.id));

        Ok(Page::slice(arguments, items))
    }
}

impl<C: Storage>
    Database<
        Select<By<read::comment::list::Page, read::comment::list::Selector>>,
    > for Memory<C>
{
    type Ok = read::comment::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::comment::list::Page, read::comment::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::comment::list::Selector {
            arguments,
            filter: read::comment::list::Filter { announcement_id },
        } = by.into_inner();

        let mut items = self
            .0
            .with(|t| {
                t.comments
                    .values()
                    .filter(|c| {
                        announcement_id.map_or(true, |a| c.announcement_id == a)
                    })
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        items.sort_by_key(|c| (c.date, c.id));

        Ok(Page::slice(arguments, items))
    }
}

impl<C: Storage> Database<Delete<By<Comment, announcement::Id>>>
    for Memory<C>
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Comment, announcement::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .with(|t| t.comments.retain(|_, c| c.announcement_id != id))
            .await;
        Ok(())
    }
}

impl<C: Storage>
    Database<
        Select<By<read::report::list::Page, read::report::list::Selector>>,
    > for Memory<C>
{
    type Ok = read::report::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::report::list::Page, read::report::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::report::list::Selector {
            arguments,
            filter: read::report::list::Filter { status, email },
        } = by.into_inner();

        let mut items = self
            .0
            .with(|t| {
                t.reports
                    .values()
                    .filter(|r| status.map_or(true, |s| r.status == s))
                    .filter(|r| email.as_ref().map_or(true, |e| &r.email == e))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        items.sort_by_key(|r| r.id);

        Ok(Page::slice(arguments, items))
    }
}

impl<C: Storage> Database<Delete<By<Report, announcement::Id>>>
    for Memory<C>
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Report, announcement::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .with(|t| t.reports.retain(|_, r| r.announcement_id != id))
            .await;
        Ok(())
    }
}
