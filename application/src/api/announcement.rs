//! [`Announcement`]-related definitions.

use std::collections::HashMap;

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Multipart, Path, Query,
    },
    routing::{get, post, put},
    Extension, Json, Router,
};
use common::{pagination, Date, DateTime};
use itertools::Itertools as _;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service::{
    access::Operation,
    command::{self, create_announcement::RealEstateInput, Command as _},
    domain::{self, announcement, company, real_estate, user},
    query,
    read,
};

use crate::{
    api::{
        self, company::CompanyRef, field, real_estate::RealEstate, Created,
        Pagination,
    },
    define_error, AsError, Context, Error, Service, Uploads,
};

/// Builds the [`Router`] of [`Announcement`] endpoints.
pub(crate) fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create).put(update))
        .route("/upload", post(upload))
        .route("/deleted/:status", get(by_deleted))
        .route("/company/:company_id", get(by_company))
        .route("/company/:company_id/top", get(top_of_company))
        .route("/author/:email", get(by_author))
        .route("/:id", get(by_id).put(patch).delete(delete))
        .route("/:id/verify", put(verify))
}

/// An announcement advertising a [`RealEstate`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    /// Unique identifier of this [`Announcement`].
    pub id: announcement::Id,

    /// Asked price.
    pub price: Decimal,

    /// [`DateTime`] when this [`Announcement`] was announced.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub date_announced: DateTime,

    /// [`DateTime`] when this [`Announcement`] was last modified, if ever.
    #[serde(with = "common::datetime::serde::rfc3339::option")]
    pub date_modified: Option<DateTime>,

    /// [`Date`] this [`Announcement`] expires on, in ISO format.
    pub expiration_date: String,

    /// Contact phone number.
    pub phone_number: String,

    /// Kind of this [`Announcement`].
    #[serde(rename = "type")]
    pub kind: String,

    /// Verification status of this [`Announcement`].
    pub verified: String,

    /// Whether this [`Announcement`] is marked as deleted.
    pub deleted: bool,

    /// Advertised [`RealEstate`].
    pub real_estate: RealEstate,

    /// [`Author`] of this [`Announcement`].
    pub author: Author,
}

/// Summary of an [`Announcement`] author.
#[derive(Clone, Debug, Serialize)]
pub struct Author {
    /// ID of the author.
    pub id: user::Id,

    /// Username of the author.
    pub username: String,

    /// Company the author is an accepted member of, if any.
    pub company: Option<CompanyRef>,
}

/// Expands the provided [`domain::Announcement`]s with their [`RealEstate`]s
/// and [`Author`]s.
async fn expand(
    service: &Service,
    announcements: Vec<domain::Announcement>,
) -> Result<Vec<Announcement>, Error> {
    if announcements.is_empty() {
        return Ok(Vec::new());
    }

    let real_estates = service
        .execute(query::real_estate::ByIds::by(
            announcements.iter().map(|a| a.real_estate_id).unique().collect(),
        ))
        .await
        .map_err(AsError::into_error)?;
    let authors = service
        .execute(query::user::ByIds::by(
            announcements.iter().map(|a| a.author_id).unique().collect(),
        ))
        .await
        .map_err(AsError::into_error)?;
    let companies = api::company::refs(
        service,
        authors.values().filter_map(domain::User::accepted_company),
    )
    .await?;

    announcements
        .into_iter()
        .map(|a| {
            let real_estate = real_estates
                .get(&a.real_estate_id)
                .cloned()
                .ok_or_else(|| {
                    Error::internal(&format!(
                        "`RealEstate(id: {})` is missing",
                        a.real_estate_id,
                    ))
                })?;
            let author = authors.get(&a.author_id).ok_or_else(|| {
                Error::internal(&format!(
                    "`User(id: {})` is missing",
                    a.author_id,
                ))
            })?;
            Ok(assemble(a, real_estate, author, &companies))
        })
        .collect()
}

/// Assembles an [`Announcement`] out of its loaded parts.
fn assemble(
    a: domain::Announcement,
    real_estate: domain::RealEstate,
    author: &domain::User,
    companies: &HashMap<company::Id, CompanyRef>,
) -> Announcement {
    Announcement {
        id: a.id,
        price: a.price.into(),
        date_announced: a.announced_at.coerce(),
        date_modified: a.modified_at.map(|d| d.coerce()),
        expiration_date: a.expiration_date.to_string(),
        phone_number: a.phone_number.to_string(),
        kind: a.kind.into_inner(),
        verified: a.verification.to_string(),
        deleted: a.deleted,
        real_estate: real_estate.into(),
        author: Author {
            id: author.id,
            username: author.username.to_string(),
            company: author
                .accepted_company()
                .and_then(|id| companies.get(&id).cloned()),
        },
    }
}

/// Expands a single [`domain::Announcement`].
async fn one(
    service: &Service,
    announcement: domain::Announcement,
) -> Result<Announcement, Error> {
    expand(service, vec![announcement])
        .await?
        .pop()
        .ok_or_else(|| Error::internal(&"`Announcement` is lost on expansion"))
}

/// Expands a page of [`domain::Announcement`]s.
async fn page(
    service: &Service,
    page: read::announcement::list::Page,
) -> Result<api::Page<Announcement>, Error> {
    let pagination::Page {
        items,
        arguments,
        total,
    } = page;
    let items = expand(service, items).await?;
    Ok(api::Page::from(pagination::Page {
        items,
        arguments,
        total,
    }))
}

/// [`Announcement`] details in a request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// ID of the updated [`Announcement`].
    pub id: Option<announcement::Id>,

    /// Asked price.
    pub price: Decimal,

    /// [`DateTime`] of announcing, now if omitted.
    #[serde(default, with = "common::datetime::serde::rfc3339::option")]
    pub date_announced: Option<DateTime>,

    /// Expiration [`Date`] in ISO format.
    pub expiration_date: String,

    /// Contact phone number.
    pub phone_number: String,

    /// Kind of the [`Announcement`].
    #[serde(rename = "type")]
    pub kind: String,

    /// Whether the [`Announcement`] is marked as deleted.
    #[serde(default)]
    pub deleted: bool,

    /// Advertised [`RealEstate`].
    pub real_estate: RealEstateRef,
}

/// [`RealEstate`] advertised by an [`Input`].
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RealEstateRef {
    /// Already existing [`RealEstate`].
    Existing {
        /// ID of the [`RealEstate`].
        id: real_estate::Id,
    },

    /// [`RealEstate`] to be created along.
    New(api::real_estate::Input),
}

/// Validated common fields of an [`Input`].
struct Fields {
    price: announcement::Price,
    expiration_date: Date,
    phone_number: user::Phone,
    kind: announcement::Kind,
}

impl Input {
    fn fields(&self) -> Result<Fields, Error> {
        Ok(Fields {
            price: field("price", announcement::Price::new(self.price))?,
            expiration_date: field(
                "expirationDate",
                Date::parse_iso(&self.expiration_date).ok(),
            )?,
            phone_number: field(
                "phoneNumber",
                user::Phone::new(self.phone_number.clone()),
            )?,
            kind: field("type", announcement::Kind::new(self.kind.clone()))?,
        })
    }
}

/// Partial update of an [`Announcement`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AnnouncementPatch {
    /// New expiration date in `dd/MM/yyyy` format.
    ExpirationDate(String),
}

impl AnnouncementPatch {
    /// Parses an [`AnnouncementPatch`] out of the provided JSON object.
    ///
    /// # Errors
    ///
    /// If the object has no `expirationDate` string attribute.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        match value.get("expirationDate") {
            Some(Value::String(date)) => Ok(Self::ExpirationDate(date.clone())),
            Some(_) => Err(PatchError::InvalidDateFormat.into()),
            None => Err(PatchError::MissingExpirationDate.into()),
        }
    }

    /// Returns the new expiration [`Date`] of this [`AnnouncementPatch`].
    ///
    /// # Errors
    ///
    /// If the date is not in `dd/MM/yyyy` format.
    pub fn expiration_date(&self) -> Result<Date, Error> {
        match self {
            Self::ExpirationDate(date) => Date::parse_dmy(date)
                .map_err(|_| PatchError::InvalidDateFormat.into()),
        }
    }
}

#[tracing::instrument(skip_all)]
async fn create(
    ctx: Context,
    input: Result<Json<Input>, JsonRejection>,
) -> Result<Created<Announcement>, Error> {
    ctx.authorize(Operation::CreateAnnouncement)?;
    let Json(input) = input.map_err(AsError::into_error)?;
    let Fields {
        price,
        expiration_date,
        phone_number,
        kind,
    } = input.fields()?;
    let real_estate = match input.real_estate {
        RealEstateRef::Existing { id } => RealEstateInput::Existing(id),
        RealEstateRef::New(details) => RealEstateInput::New(Box::new(
            details.parse()?.into_real_estate(real_estate::Id::new()),
        )),
    };

    let (announcement, _) = ctx
        .service()
        .execute(command::CreateAnnouncement {
            caller: ctx.caller(),
            price,
            announced_at: input.date_announced.map(DateTime::coerce),
            expiration_date,
            phone_number,
            kind,
            real_estate,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Created {
        location: format!("/api/announcements/{}", announcement.id),
        body: one(ctx.service(), announcement).await?,
    })
}

#[tracing::instrument(skip_all)]
async fn update(
    ctx: Context,
    input: Result<Json<Input>, JsonRejection>,
) -> Result<Json<Announcement>, Error> {
    ctx.authorize(Operation::UpdateAnnouncement)?;
    let Json(input) = input.map_err(AsError::into_error)?;
    let id = field("id", input.id)?;
    let Fields {
        price,
        expiration_date,
        phone_number,
        kind,
    } = input.fields()?;
    let real_estate_id = match input.real_estate {
        RealEstateRef::Existing { id } => id,
        RealEstateRef::New(_) => {
            return Err(Error::invalid_field(
                "realEstate",
                &"Real estate must be referenced by its id",
            ));
        }
    };

    let (announcement, _) = ctx
        .service()
        .execute(command::UpdateAnnouncement {
            caller: ctx.caller(),
            id,
            price,
            expiration_date,
            phone_number,
            kind,
            deleted: input.deleted,
            real_estate_id,
        })
        .await
        .map_err(AsError::into_error)?;

    one(ctx.service(), announcement).await.map(Json)
}

#[tracing::instrument(skip_all)]
async fn patch(
    ctx: Context,
    id: Result<Path<announcement::Id>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Announcement>, Error> {
    ctx.authorize(Operation::ExtendAnnouncementExpiration)?;
    let Path(id) = id.map_err(AsError::into_error)?;
    let Json(body) = body.map_err(AsError::into_error)?;
    let expiration_date =
        AnnouncementPatch::from_json(&body)?.expiration_date()?;

    let announcement = ctx
        .service()
        .execute(command::ExtendAnnouncementExpiration {
            caller: ctx.caller(),
            announcement_id: id,
            expiration_date,
        })
        .await
        .map_err(AsError::into_error)?;

    one(ctx.service(), announcement).await.map(Json)
}

#[tracing::instrument(skip_all)]
async fn verify(
    ctx: Context,
    id: Result<Path<announcement::Id>, PathRejection>,
) -> Result<Json<Announcement>, Error> {
    ctx.authorize(Operation::VerifyAnnouncement)?;
    let Path(id) = id.map_err(AsError::into_error)?;

    let announcement = ctx
        .service()
        .execute(command::VerifyAnnouncement {
            caller: ctx.caller(),
            announcement_id: id,
        })
        .await
        .map_err(AsError::into_error)?;

    one(ctx.service(), announcement).await.map(Json)
}

#[tracing::instrument(skip_all)]
async fn delete(
    ctx: Context,
    id: Result<Path<announcement::Id>, PathRejection>,
) -> Result<Json<Announcement>, Error> {
    ctx.authorize(Operation::DeleteAnnouncement)?;
    let Path(id) = id.map_err(AsError::into_error)?;

    let announcement = ctx
        .service()
        .execute(command::DeleteAnnouncement {
            caller: ctx.caller(),
            id,
        })
        .await
        .map_err(AsError::into_error)?;

    one(ctx.service(), announcement).await.map(Json)
}

#[tracing::instrument(skip_all)]
async fn upload(
    ctx: Context,
    Extension(uploads): Extension<Uploads>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<String>, Error> {
    ctx.authorize(Operation::UploadAnnouncementImage)?;
    let mut multipart = multipart.map_err(AsError::into_error)?;

    while let Some(part) =
        multipart.next_field().await.map_err(AsError::into_error)?
    {
        if part.name() != Some("file") {
            continue;
        }
        let original_name = part.file_name().map(ToOwned::to_owned);
        let content = part.bytes().await.map_err(AsError::into_error)?;

        return uploads
            .store_announcement_image(original_name.as_deref(), &content)
            .await
            .map_err(AsError::into_error)
            .map(Json);
    }

    Err(UploadError::MissingFile.into())
}

#[tracing::instrument(skip_all)]
async fn by_id(
    ctx: Context,
    id: Result<Path<announcement::Id>, PathRejection>,
) -> Result<Json<Announcement>, Error> {
    ctx.authorize(Operation::ViewAnnouncement)?;
    let Path(id) = id.map_err(AsError::into_error)?;

    let announcement = ctx
        .service()
        .execute(query::announcement::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(AnnouncementError::NotFound))?;

    one(ctx.service(), announcement).await.map(Json)
}

#[tracing::instrument(skip_all)]
async fn list(
    ctx: Context,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<api::Page<Announcement>>, Error> {
    ctx.authorize(Operation::ListAnnouncements)?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;

    select(&ctx, pagination, read::announcement::list::Filter::default())
        .await
}

#[tracing::instrument(skip_all)]
async fn by_deleted(
    ctx: Context,
    deleted: Result<Path<bool>, PathRejection>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<api::Page<Announcement>>, Error> {
    let Path(deleted) = deleted.map_err(AsError::into_error)?;
    ctx.authorize(Operation::ListAnnouncementsByDeleted { deleted })?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;

    select(
        &ctx,
        pagination,
        read::announcement::list::Filter {
            deleted: Some(deleted),
            ..read::announcement::list::Filter::default()
        },
    )
    .await
}

#[tracing::instrument(skip_all)]
async fn by_company(
    ctx: Context,
    company_id: Result<Path<company::Id>, PathRejection>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<api::Page<Announcement>>, Error> {
    ctx.authorize(Operation::ListCompanyAnnouncements)?;
    let Path(company_id) = company_id.map_err(AsError::into_error)?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;

    select(
        &ctx,
        pagination,
        read::announcement::list::Filter {
            deleted: Some(false),
            company_id: Some(company_id),
            ..read::announcement::list::Filter::default()
        },
    )
    .await
}

#[tracing::instrument(skip_all)]
async fn top_of_company(
    ctx: Context,
    company_id: Result<Path<company::Id>, PathRejection>,
) -> Result<Json<Vec<Announcement>>, Error> {
    ctx.authorize(Operation::ListTopCompanyAnnouncements)?;
    let Path(company_id) = company_id.map_err(AsError::into_error)?;

    let announcements = ctx
        .service()
        .execute(query::announcement::Top::by(read::announcement::Top::of(
            company_id,
        )))
        .await
        .map_err(AsError::into_error)?;

    expand(ctx.service(), announcements).await.map(Json)
}

#[tracing::instrument(skip_all)]
async fn by_author(
    ctx: Context,
    email: Result<Path<String>, PathRejection>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<api::Page<Announcement>>, Error> {
    ctx.authorize(Operation::ListAuthorAnnouncements)?;
    let Path(email) = email.map_err(AsError::into_error)?;
    let email = field("email", user::Email::new(email))?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;

    select(
        &ctx,
        pagination,
        read::announcement::list::Filter {
            deleted: Some(false),
            author_email: Some(email),
            ..read::announcement::list::Filter::default()
        },
    )
    .await
}

/// Selects a page of [`Announcement`]s matching the provided `filter`.
async fn select(
    ctx: &Context,
    pagination: Pagination,
    filter: read::announcement::list::Filter,
) -> Result<Json<api::Page<Announcement>>, Error> {
    let announcements = ctx
        .service()
        .execute(query::announcement::List::by(
            read::announcement::list::Selector {
                arguments: pagination.arguments()?,
                filter,
            },
        ))
        .await
        .map_err(AsError::into_error)?;

    page(ctx.service(), announcements).await.map(Json)
}

define_error! {
    enum AnnouncementError {
        #[code = "NON_EXISTING_ENTITY"]
        #[number = 1]
        #[status = NOT_FOUND]
        #[message = "Announcement not found"]
        NotFound,

        #[code = "NON_EXISTING_ENTITY"]
        #[number = 1]
        #[status = NOT_FOUND]
        #[message = "There is no announcement with specified id"]
        NotExists,

        #[code = "NON_EXISTING_ENTITY"]
        #[number = 1]
        #[status = NOT_FOUND]
        #[message = "There is no real estate with specified id"]
        RealEstateNotExists,

        #[code = "NOT_VERIFIER"]
        #[status = METHOD_NOT_ALLOWED]
        #[message = "You don't have verifier role."]
        NotVerifier,
    }
}

define_error! {
    enum PatchError {
        #[code = "MISSING_EXPIRATION_DATE"]
        #[status = BAD_REQUEST]
        #[message = "Object must contain expirationDate attribute"]
        MissingExpirationDate,

        #[code = "INVALID_DATE_FORMAT"]
        #[status = BAD_REQUEST]
        #[message = "Date must be in format dd/MM/yyyy"]
        InvalidDateFormat,

        #[code = "DATE_NOT_IN_FUTURE"]
        #[status = BAD_REQUEST]
        #[message = "Modified date must be after today"]
        NotInFuture,
    }
}

define_error! {
    enum UploadError {
        #[code = "MISSING_FILE"]
        #[status = BAD_REQUEST]
        #[message = "Request must contain a file part"]
        MissingFile,
    }
}

impl AsError for command::create_announcement::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
            Self::RealEstateNotExists(_) => {
                Some(AnnouncementError::RealEstateNotExists.into())
            }
        }
    }
}

impl AsError for command::update_announcement::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::AnnouncementNotExists(_) => {
                Some(AnnouncementError::NotFound.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::RealEstateNotExists(_) => {
                Some(AnnouncementError::RealEstateNotExists.into())
            }
        }
    }
}

impl AsError for command::delete_announcement::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::AnnouncementNotExists(_) => {
                Some(AnnouncementError::NotFound.into())
            }
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::extend_announcement_expiration::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::AnnouncementNotExists(_) => {
                Some(AnnouncementError::NotFound.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::NotInFuture(_) => Some(PatchError::NotInFuture.into()),
        }
    }
}

impl AsError for command::verify_announcement::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::AnnouncementNotExists(_) => {
                Some(AnnouncementError::NotExists.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::NotVerifier(_) => Some(AnnouncementError::NotVerifier.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use axum::{body::Body, Router};
    use serde_json::{json, Value};
    use service::{
        domain::{company, user},
        infra::Database as _,
    };
    use tower::ServiceExt as _;

    use crate::{api::spec, ERROR_CODE_HEADER};

    use super::AnnouncementPatch;

    fn announcement(price: u32) -> Value {
        json!({
            "price": price,
            "expirationDate": "2999-01-01",
            "phoneNumber": "+381641234567",
            "type": "sale",
            "realEstate": {
                "name": "Cozy flat",
                "type": "flat",
                "area": 40,
                "heatingType": "central",
                "deleted": false,
            },
        })
    }

    async fn publish(app: &Router, token: &str, price: u32) -> Value {
        let (status, _, body) = spec::send(
            app.clone(),
            http::Method::POST,
            "/api/announcements",
            Some(token),
            Some(announcement(price)),
        )
        .await;
        assert_eq!(status, http::StatusCode::CREATED, "body: {body}");
        body
    }

    #[test]
    fn parses_patch() {
        let patch = json!({"expirationDate": "4/12/2999"});
        assert_eq!(
            AnnouncementPatch::from_json(&patch).unwrap(),
            AnnouncementPatch::ExpirationDate("4/12/2999".into()),
        );
        assert_eq!(
            AnnouncementPatch::from_json(&json!({"price": 1}))
                .unwrap_err()
                .message,
            "Object must contain expirationDate attribute",
        );
        assert_eq!(
            AnnouncementPatch::ExpirationDate("2999-12-04".into())
                .expiration_date()
                .unwrap_err()
                .message,
            "Date must be in format dd/MM/yyyy",
        );
    }

    #[tokio::test]
    async fn creates_announcement_with_new_real_estate() {
        let (app, svc) = spec::app();
        let company_id = company::Id::new();
        let (author, token) = spec::login(
            &svc,
            user::Role::Advertiser,
            Some((company_id, user::Membership::Pending)),
        )
        .await;

        let (status, headers, body) = spec::send(
            app.clone(),
            http::Method::POST,
            "/api/announcements",
            Some(&token),
            Some(announcement(100_000)),
        )
        .await;

        assert_eq!(status, http::StatusCode::CREATED);
        assert_eq!(
            headers[http::header::LOCATION],
            format!("/api/announcements/{}", body["id"].as_str().unwrap()),
        );
        assert_eq!(body["verified"], "not-verified");
        assert_eq!(body["expirationDate"], "2999-01-01");
        assert_eq!(body["realEstate"]["name"], "Cozy flat");
        assert_eq!(body["author"]["id"], author.id.to_string());
        assert_eq!(body["author"]["company"], Value::Null);
    }

    #[tokio::test]
    async fn verifies_announcement() {
        let (app, svc) = spec::app();
        let (_, advertiser) =
            spec::login(&svc, user::Role::Advertiser, None).await;
        let (_, verifier) = spec::login(&svc, user::Role::Verifier, None).await;
        let created = publish(&app, &advertiser, 1000).await;
        let uri = format!(
            "/api/announcements/{}/verify",
            created["id"].as_str().unwrap(),
        );

        let (status, _, _) =
            spec::send(app.clone(), http::Method::PUT, &uri, None, None).await;
        assert_eq!(status, http::StatusCode::UNAUTHORIZED);

        let (status, _, _) = spec::send(
            app.clone(),
            http::Method::PUT,
            &uri,
            Some(&advertiser),
            None,
        )
        .await;
        assert_eq!(status, http::StatusCode::FORBIDDEN);

        let (status, _, mut verified) =
            spec::send(app, http::Method::PUT, &uri, Some(&verifier), None)
                .await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(verified["verified"], "verified");
        verified["verified"] = created["verified"].clone();
        assert_eq!(verified, created);
    }

    #[tokio::test]
    async fn demoted_verifier_is_not_allowed_to_verify() {
        let (app, svc) = spec::app();
        let (_, advertiser) =
            spec::login(&svc, user::Role::Advertiser, None).await;
        let (demoted, verifier) =
            spec::login(&svc, user::Role::Verifier, None).await;
        svc.database()
            .execute(common::operations::Update(service::domain::User {
                role: user::Role::Advertiser,
                ..demoted
            }))
            .await
            .unwrap();
        let created = publish(&app, &advertiser, 1000).await;

        let (status, _, body) = spec::send(
            app,
            http::Method::PUT,
            &format!(
                "/api/announcements/{}/verify",
                created["id"].as_str().unwrap(),
            ),
            Some(&verifier),
            None,
        )
        .await;

        assert_eq!(status, http::StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["code"], "NOT_VERIFIER");
        assert_eq!(body["message"], "You don't have verifier role.");
    }

    #[tokio::test]
    async fn verifying_unknown_announcement_is_not_found() {
        let (app, svc) = spec::app();
        let (_, verifier) = spec::login(&svc, user::Role::Verifier, None).await;

        let (status, headers, body) = spec::send(
            app,
            http::Method::PUT,
            &format!("/api/announcements/{}/verify", uuid::Uuid::new_v4()),
            Some(&verifier),
            None,
        )
        .await;

        assert_eq!(status, http::StatusCode::NOT_FOUND);
        assert_eq!(headers[ERROR_CODE_HEADER], "1");
        assert_eq!(
            body["message"],
            "There is no announcement with specified id",
        );
    }

    #[tokio::test]
    async fn extends_expiration_date() {
        let (app, svc) = spec::app();
        let (_, token) = spec::login(&svc, user::Role::Advertiser, None).await;
        let created = publish(&app, &token, 1000).await;
        let uri =
            format!("/api/announcements/{}", created["id"].as_str().unwrap());

        for (payload, message) in [
            (
                json!({"price": 1}),
                "Object must contain expirationDate attribute",
            ),
            (
                json!({"expirationDate": "2999-12-04"}),
                "Date must be in format dd/MM/yyyy",
            ),
            (
                json!({"expirationDate": "4/12/2017"}),
                "Modified date must be after today",
            ),
        ] {
            let (status, _, body) = spec::send(
                app.clone(),
                http::Method::PUT,
                &uri,
                Some(&token),
                Some(payload),
            )
            .await;
            assert_eq!(status, http::StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], message);
        }

        let (status, _, body) = spec::send(
            app,
            http::Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"expirationDate": "4/12/2999"})),
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["expirationDate"], "2999-12-04");
    }

    #[tokio::test]
    async fn full_update_stamps_modification_date() {
        let (app, svc) = spec::app();
        let (_, token) = spec::login(&svc, user::Role::Advertiser, None).await;
        let created = publish(&app, &token, 1000).await;
        assert_eq!(created["dateModified"], Value::Null);
        let mut update = announcement(1500);
        update["id"] = created["id"].clone();
        update["realEstate"] = json!({"id": created["realEstate"]["id"]});

        let (status, _, body) = spec::send(
            app,
            http::Method::PUT,
            "/api/announcements",
            Some(&token),
            Some(update),
        )
        .await;

        assert_eq!(status, http::StatusCode::OK, "body: {body}");
        assert_eq!(body["price"].as_f64(), Some(1500.0));
        assert!(body["dateModified"].is_string());
    }

    #[tokio::test]
    async fn extending_unknown_announcement_is_not_found() {
        let (app, svc) = spec::app();
        let (_, token) = spec::login(&svc, user::Role::Advertiser, None).await;

        let (status, headers, body) = spec::send(
            app,
            http::Method::PUT,
            &format!("/api/announcements/{}", uuid::Uuid::new_v4()),
            Some(&token),
            Some(json!({"expirationDate": "4/12/2999"})),
        )
        .await;

        assert_eq!(status, http::StatusCode::NOT_FOUND);
        assert_eq!(headers[ERROR_CODE_HEADER], "1");
        assert_eq!(body["message"], "Announcement not found");
    }

    #[tokio::test]
    async fn lists_cheapest_of_company() {
        let (app, svc) = spec::app();
        let company_id = company::Id::new();
        let (_, token) = spec::login(
            &svc,
            user::Role::Advertiser,
            Some((company_id, user::Membership::Accepted)),
        )
        .await;
        for price in [500, 100, 400, 200] {
            _ = publish(&app, &token, price).await;
        }

        let (status, _, body) = spec::send(
            app,
            http::Method::GET,
            &format!("/api/announcements/company/{company_id}/top"),
            None,
            None,
        )
        .await;

        assert_eq!(status, http::StatusCode::OK);
        let prices = body
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["price"].as_f64().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(prices, [100.0, 200.0, 400.0]);
    }

    #[tokio::test]
    async fn uploads_image() {
        let dir = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
        let (app, svc) = spec::app_storing_into(&dir);
        let (_, token) = spec::login(&svc, user::Role::Advertiser, None).await;
        let multipart = |part: &str| {
            http::Request::builder()
                .method(http::Method::POST)
                .uri("/api/announcements/upload")
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
                .header(
                    http::header::CONTENT_TYPE,
                    "multipart/form-data; boundary=XBOUNDARY",
                )
                .body(Body::from(format!(
                    "--XBOUNDARY\r\n\
                     Content-Disposition: form-data; name=\"{part}\"; \
                     filename=\"flat.png\"\r\n\
                     Content-Type: image/png\r\n\r\n\
                     image\r\n\
                     --XBOUNDARY--\r\n",
                )))
                .unwrap()
        };

        let resp = app.clone().oneshot(multipart("file")).await.unwrap();
        assert_eq!(resp.status(), http::StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let name: String = serde_json::from_slice(&body).unwrap();
        assert!(name.ends_with(".png"));
        let stored = tokio::fs::read(dir.join("announcements").join(&name))
            .await
            .unwrap();
        assert_eq!(stored, b"image");

        let resp = app.oneshot(multipart("other")).await.unwrap();
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);

        tokio::fs::remove_dir_all(dir).await.unwrap();
    }
}
