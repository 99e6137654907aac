//! [`Company`]-related definitions.

use std::collections::HashMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    routing::{get, put},
    Json, Router,
};
use itertools::Itertools as _;
use serde::{Deserialize, Serialize};
use service::{
    access::Operation,
    command::{self, Command as _},
    domain::{self, company, user},
    query::{self, MembershipRequests},
    read,
};

use crate::{
    api::{self, field, Created, Pagination},
    define_error, AsError, Context, Error, Service,
};

/// Builds the [`Router`] of [`Company`] endpoints.
pub(crate) fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create).put(update))
        .route("/search", get(search))
        .route("/users-requests", get(membership_requests))
        .route("/resolve-request/user/:user_id", put(resolve_membership))
        .route("/:id", get(by_id).delete(delete))
        .route("/:company_id/user-request", put(request_membership))
        .route("/:company_id/user-request/", put(request_membership))
}

/// A real estate agency.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Unique identifier of this [`Company`].
    pub id: company::Id,

    /// Name of this [`Company`].
    pub name: String,

    /// Address of this [`Company`].
    pub address: String,

    /// Contact phone number of this [`Company`].
    pub phone_number: String,
}

impl From<domain::Company> for Company {
    fn from(company: domain::Company) -> Self {
        Self {
            id: company.id,
            name: company.name.into_inner(),
            address: company.address.into_inner(),
            phone_number: company.phone_number.to_string(),
        }
    }
}

/// Short reference to a [`Company`] embedded into other resources.
#[derive(Clone, Debug, Serialize)]
pub struct CompanyRef {
    /// Unique identifier of the [`Company`].
    pub id: company::Id,

    /// Name of the [`Company`].
    pub name: String,
}

/// Loads [`CompanyRef`]s of the [`Company`]s with the provided IDs.
///
/// # Errors
///
/// If the [`Company`]s cannot be loaded.
pub(crate) async fn refs(
    service: &Service,
    ids: impl IntoIterator<Item = company::Id>,
) -> Result<HashMap<company::Id, CompanyRef>, Error> {
    let ids = ids.into_iter().unique().collect::<Vec<_>>();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(service
        .execute(query::company::ByIds::by(ids))
        .await
        .map_err(AsError::into_error)?
        .into_iter()
        .map(|(id, c)| {
            (
                id,
                CompanyRef {
                    id,
                    name: c.name.into_inner(),
                },
            )
        })
        .collect())
}

/// [`Company`] details in a request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// ID of the updated [`Company`].
    pub id: Option<company::Id>,

    /// Name of the [`Company`].
    pub name: String,

    /// Address of the [`Company`].
    pub address: String,

    /// Contact phone number of the [`Company`].
    pub phone_number: String,
}

impl Input {
    /// Validates this [`Input`].
    fn parse(
        self,
    ) -> Result<(company::Name, company::Address, user::Phone), Error> {
        Ok((
            field("name", company::Name::new(self.name))?,
            field("address", company::Address::new(self.address))?,
            field("phoneNumber", user::Phone::new(self.phone_number))?,
        ))
    }
}

/// Search criteria of [`Company`]s.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Search {
    /// Part of the [`Company`] name.
    pub name: Option<String>,

    /// Part of the [`Company`] address.
    pub address: Option<String>,

    /// Part of the [`Company`] phone number.
    pub phone_number: Option<String>,
}

/// Query parameters of a membership request.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct Confirmation {
    /// Whether an accepted membership in another [`Company`] may be
    /// abandoned.
    #[serde(default)]
    pub confirmed: bool,
}

/// Query parameters of a membership resolution.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Resolution {
    /// Whether the membership is accepted.
    pub accepted: bool,
}

/// Query parameters of a membership requests listing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RequestsFilter {
    /// Membership status of the listed users.
    pub status: Option<String>,
}

#[tracing::instrument(skip_all)]
async fn create(
    ctx: Context,
    input: Result<Json<Input>, JsonRejection>,
) -> Result<Created<Company>, Error> {
    ctx.authorize(Operation::CreateCompany)?;
    let Json(input) = input.map_err(AsError::into_error)?;
    let (name, address, phone_number) = input.parse()?;

    let company = ctx
        .service()
        .execute(command::CreateCompany {
            caller: ctx.caller(),
            name,
            address,
            phone_number,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Created {
        location: format!("/api/companies/{}", company.id),
        body: company.into(),
    })
}

#[tracing::instrument(skip_all)]
async fn update(
    ctx: Context,
    input: Result<Json<Input>, JsonRejection>,
) -> Result<Json<Company>, Error> {
    ctx.authorize(Operation::UpdateCompany)?;
    let Json(input) = input.map_err(AsError::into_error)?;
    let id = field("id", input.id)?;
    let (name, address, phone_number) = input.parse()?;

    ctx.service()
        .execute(command::UpdateCompany {
            caller: ctx.caller(),
            id,
            name,
            address,
            phone_number,
        })
        .await
        .map_err(AsError::into_error)
        .map(|c| Json(c.into()))
}

#[tracing::instrument(skip_all)]
async fn list(
    ctx: Context,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<api::Page<Company>>, Error> {
    ctx.authorize(Operation::ListCompanies)?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;

    ctx.service()
        .execute(query::company::List::by(read::company::list::Selector {
            arguments: pagination.arguments()?,
            filter: read::company::list::Filter::default(),
        }))
        .await
        .map_err(AsError::into_error)
        .map(|p| Json(api::Page::from(p.map(Company::from))))
}

#[tracing::instrument(skip_all)]
async fn search(
    ctx: Context,
    pagination: Result<Query<Pagination>, QueryRejection>,
    search: Result<Query<Search>, QueryRejection>,
) -> Result<Json<api::Page<Company>>, Error> {
    ctx.authorize(Operation::SearchCompanies)?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;
    let Query(Search {
        name,
        address,
        phone_number,
    }) = search.map_err(AsError::into_error)?;

    ctx.service()
        .execute(query::company::List::by(read::company::list::Selector {
            arguments: pagination.arguments()?,
            filter: read::company::list::Filter {
                name,
                address,
                phone_number,
            },
        }))
        .await
        .map_err(AsError::into_error)
        .map(|p| Json(api::Page::from(p.map(Company::from))))
}

#[tracing::instrument(skip_all)]
async fn by_id(
    ctx: Context,
    id: Result<Path<company::Id>, PathRejection>,
) -> Result<Json<Company>, Error> {
    ctx.authorize(Operation::ViewCompany)?;
    let Path(id) = id.map_err(AsError::into_error)?;

    ctx.service()
        .execute(query::company::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| CompanyError::NotExists.into())
        .map(|c| Json(c.into()))
}

#[tracing::instrument(skip_all)]
async fn delete(
    ctx: Context,
    id: Result<Path<company::Id>, PathRejection>,
) -> Result<Json<Company>, Error> {
    ctx.authorize(Operation::DeleteCompany)?;
    let Path(id) = id.map_err(AsError::into_error)?;

    ctx.service()
        .execute(command::DeleteCompany {
            caller: ctx.caller(),
            id,
        })
        .await
        .map_err(AsError::into_error)
        .map(|c| Json(c.into()))
}

#[tracing::instrument(skip_all)]
async fn request_membership(
    ctx: Context,
    company_id: Result<Path<company::Id>, PathRejection>,
    confirmation: Result<Query<Confirmation>, QueryRejection>,
) -> Result<Json<api::user::User>, Error> {
    ctx.authorize(Operation::RequestMembership)?;
    let Path(company_id) = company_id.map_err(AsError::into_error)?;
    let Query(Confirmation { confirmed }) =
        confirmation.map_err(AsError::into_error)?;

    let user = ctx
        .service()
        .execute(command::RequestCompanyMembership {
            caller: ctx.caller(),
            company_id,
            confirmed,
        })
        .await
        .map_err(AsError::into_error)?;

    api::user::one(ctx.service(), user).await.map(Json)
}

#[tracing::instrument(skip_all)]
async fn membership_requests(
    ctx: Context,
    pagination: Result<Query<Pagination>, QueryRejection>,
    filter: Result<Query<RequestsFilter>, QueryRejection>,
) -> Result<Json<api::Page<api::user::User>>, Error> {
    ctx.authorize(Operation::ListMembershipRequests)?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;
    let Query(RequestsFilter { status }) =
        filter.map_err(AsError::into_error)?;
    let status = match status {
        Some(s) => field("status", s.parse::<user::Membership>().ok())?,
        None => user::Membership::Pending,
    };

    let page = ctx
        .service()
        .execute(MembershipRequests {
            caller: ctx.caller(),
            status,
            arguments: pagination.arguments()?,
        })
        .await
        .map_err(AsError::into_error)?;

    api::user::page(ctx.service(), page).await.map(Json)
}

#[tracing::instrument(skip_all)]
async fn resolve_membership(
    ctx: Context,
    user_id: Result<Path<user::Id>, PathRejection>,
    resolution: Result<Query<Resolution>, QueryRejection>,
) -> Result<Json<api::user::User>, Error> {
    ctx.authorize(Operation::ResolveMembership)?;
    let Path(user_id) = user_id.map_err(AsError::into_error)?;
    let Query(Resolution { accepted }) =
        resolution.map_err(AsError::into_error)?;

    let user = ctx
        .service()
        .execute(command::ResolveCompanyMembership {
            caller: ctx.caller(),
            user_id,
            accepted,
        })
        .await
        .map_err(AsError::into_error)?;

    api::user::one(ctx.service(), user).await.map(Json)
}

define_error! {
    enum CompanyError {
        #[code = "NON_EXISTING_ENTITY"]
        #[number = 1]
        #[status = NOT_FOUND]
        #[message = "There is no company with specified id"]
        NotExists,

        #[code = "NON_EXISTING_ENTITY"]
        #[number = 1]
        #[status = NOT_FOUND]
        #[message = "There is no user with specified id"]
        UserNotExists,

        #[code = "COMPANY_HAS_MEMBERS"]
        #[status = CONFLICT]
        #[message = "Company still has members"]
        HasMembers,
    }
}

define_error! {
    enum MembershipError {
        #[code = "ALREADY_REQUESTED_MEMBERSHIP"]
        #[number = 2]
        #[status = CONFLICT]
        #[message = "User is already a member of another company"]
        AlreadyMember,

        #[code = "NOT_MEMBER_OF_COMPANY"]
        #[number = 3]
        #[status = BAD_REQUEST]
        #[message = "User is not a member of the company"]
        NotMember,

        #[code = "NO_PERMISSION_TO_RESOLVE_MEMBERSHIP"]
        #[number = 4]
        #[status = BAD_REQUEST]
        #[message = "User has no permission to resolve the membership"]
        NoPermission,

        #[code = "USER_DID_NOT_REQUEST_MEMBERSHIP"]
        #[number = 5]
        #[status = NOT_ACCEPTABLE]
        #[message = "User did not request membership"]
        NotRequested,
    }
}

impl AsError for command::create_company::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_company::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::CompanyNotExists(_) => Some(CompanyError::NotExists.into()),
            Self::Db(e) => e.try_as_error(),
            Self::NotMemberOfCompany(_) => {
                Some(MembershipError::NotMember.into())
            }
        }
    }
}

impl AsError for command::delete_company::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::CompanyHasMembers(_) => Some(CompanyError::HasMembers.into()),
            Self::CompanyNotExists(_) => Some(CompanyError::NotExists.into()),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::request_company_membership::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::AlreadyMember(_) => {
                Some(MembershipError::AlreadyMember.into())
            }
            Self::CompanyNotExists(_) => Some(CompanyError::NotExists.into()),
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(CompanyError::UserNotExists.into()),
        }
    }
}

impl AsError for command::resolve_company_membership::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
            Self::NoPermission(_) => Some(MembershipError::NoPermission.into()),
            Self::NotRequested(_) => Some(MembershipError::NotRequested.into()),
            Self::UserNotExists(_) => Some(CompanyError::UserNotExists.into()),
        }
    }
}

impl AsError for service::query::membership_requests::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
            Self::NotMemberOfCompany => Some(MembershipError::NotMember.into()),
            Self::UserNotExists(_) => Some(CompanyError::UserNotExists.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use serde_json::json;
    use service::{
        domain::{company, user},
        infra::Database as _,
    };

    use crate::{api::spec, ERROR_CODE_HEADER};

    async fn store_company(svc: &crate::Service) -> company::Id {
        let id = company::Id::new();
        svc.database()
            .execute(common::operations::Insert(service::domain::Company {
                id,
                name: company::Name::new("Sunny Homes").unwrap(),
                address: company::Address::new("Bulevar 12").unwrap(),
                phone_number: user::Phone::new("021 555 333").unwrap(),
            }))
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn creates_company_as_admin() {
        let (app, svc) = spec::app();
        let (_, token) = spec::login(&svc, user::Role::Admin, None).await;

        let (status, headers, body) = spec::send(
            app,
            http::Method::POST,
            "/api/companies",
            Some(&token),
            Some(json!({
                "name": "Sunny Homes",
                "address": "Bulevar 12",
                "phoneNumber": "021 555 333",
            })),
        )
        .await;

        assert_eq!(status, http::StatusCode::CREATED);
        assert_eq!(
            headers[http::header::LOCATION],
            format!("/api/companies/{}", body["id"].as_str().unwrap()),
        );
        assert_eq!(body["phoneNumber"], "021 555 333");
    }

    #[tokio::test]
    async fn rejects_invalid_phone_number() {
        let (app, svc) = spec::app();
        let (_, token) = spec::login(&svc, user::Role::Admin, None).await;

        let (status, _, body) = spec::send(
            app,
            http::Method::POST,
            "/api/companies",
            Some(&token),
            Some(json!({
                "name": "Sunny Homes",
                "address": "Bulevar 12",
                "phoneNumber": "phone",
            })),
        )
        .await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "phoneNumber");
    }

    #[tokio::test]
    async fn guest_cannot_create_company() {
        let (app, _) = spec::app();

        let (status, _, _) = spec::send(
            app,
            http::Method::POST,
            "/api/companies",
            None,
            Some(json!({})),
        )
        .await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accepted_member_needs_confirmation_to_move() {
        let (app, svc) = spec::app();
        let current = store_company(&svc).await;
        let other = store_company(&svc).await;
        let (_, token) = spec::login(
            &svc,
            user::Role::Advertiser,
            Some((current, user::Membership::Accepted)),
        )
        .await;

        let (status, headers, body) = spec::send(
            app.clone(),
            http::Method::PUT,
            &format!("/api/companies/{other}/user-request/"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, http::StatusCode::CONFLICT);
        assert_eq!(headers[ERROR_CODE_HEADER], "2");
        assert_eq!(body["code"], "ALREADY_REQUESTED_MEMBERSHIP");

        let (status, _, body) = spec::send(
            app,
            http::Method::PUT,
            &format!("/api/companies/{other}/user-request/?confirmed=true"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["companyVerified"], "pending");
        assert_eq!(body["company"]["id"], other.to_string());
    }

    #[tokio::test]
    async fn resolving_not_pending_user_is_not_acceptable() {
        let (app, svc) = spec::app();
        let company_id = store_company(&svc).await;
        let (_, token) = spec::login(
            &svc,
            user::Role::Advertiser,
            Some((company_id, user::Membership::Accepted)),
        )
        .await;
        let (target, _) = spec::login(
            &svc,
            user::Role::Advertiser,
            Some((company_id, user::Membership::Accepted)),
        )
        .await;

        let (status, headers, body) = spec::send(
            app,
            http::Method::PUT,
            &format!(
                "/api/companies/resolve-request/user/{}?accepted=true",
                target.id,
            ),
            Some(&token),
            None,
        )
        .await;

        assert_eq!(status, http::StatusCode::NOT_ACCEPTABLE);
        assert_eq!(headers[ERROR_CODE_HEADER], "5");
        assert_eq!(body["code"], "USER_DID_NOT_REQUEST_MEMBERSHIP");
    }

    #[tokio::test]
    async fn resolving_unknown_user_is_not_found() {
        let (app, svc) = spec::app();
        let company_id = store_company(&svc).await;
        let (_, token) = spec::login(
            &svc,
            user::Role::Advertiser,
            Some((company_id, user::Membership::Accepted)),
        )
        .await;

        let (status, headers, body) = spec::send(
            app,
            http::Method::PUT,
            &format!(
                "/api/companies/resolve-request/user/{}?accepted=true",
                user::Id::new(),
            ),
            Some(&token),
            None,
        )
        .await;

        assert_eq!(status, http::StatusCode::NOT_FOUND);
        assert_eq!(headers[ERROR_CODE_HEADER], "1");
        assert_eq!(body["code"], "NON_EXISTING_ENTITY");
    }

    #[tokio::test]
    async fn member_of_other_company_cannot_resolve() {
        let (app, svc) = spec::app();
        let requested = store_company(&svc).await;
        let other = store_company(&svc).await;
        let (_, token) = spec::login(
            &svc,
            user::Role::Advertiser,
            Some((other, user::Membership::Accepted)),
        )
        .await;
        let (target, _) = spec::login(
            &svc,
            user::Role::Advertiser,
            Some((requested, user::Membership::Pending)),
        )
        .await;

        let (status, headers, body) = spec::send(
            app,
            http::Method::PUT,
            &format!(
                "/api/companies/resolve-request/user/{}?accepted=true",
                target.id,
            ),
            Some(&token),
            None,
        )
        .await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(headers[ERROR_CODE_HEADER], "4");
        assert_eq!(body["code"], "NO_PERMISSION_TO_RESOLVE_MEMBERSHIP");
    }

    #[tokio::test]
    async fn non_member_cannot_list_requests() {
        let (app, svc) = spec::app();
        let company_id = store_company(&svc).await;
        let (_, token) = spec::login(
            &svc,
            user::Role::Advertiser,
            Some((company_id, user::Membership::Pending)),
        )
        .await;

        let (status, headers, body) = spec::send(
            app,
            http::Method::GET,
            "/api/companies/users-requests",
            Some(&token),
            None,
        )
        .await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(headers[ERROR_CODE_HEADER], "3");
        assert_eq!(body["code"], "NOT_MEMBER_OF_COMPANY");
    }

    #[tokio::test]
    async fn rejects_company_without_name() {
        let (app, svc) = spec::app();
        let (_, token) = spec::login(&svc, user::Role::Admin, None).await;

        let (status, _, body) = spec::send(
            app,
            http::Method::POST,
            "/api/companies",
            Some(&token),
            Some(json!({
                "address": "Bulevar 12",
                "phoneNumber": "021 555 333",
            })),
        )
        .await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MISSING_FIELD");
        assert_eq!(body["field"], "name");
    }

    #[tokio::test]
    async fn lists_pending_requests_of_own_company() {
        let (app, svc) = spec::app();
        let company_id = store_company(&svc).await;
        let (_, token) = spec::login(
            &svc,
            user::Role::Advertiser,
            Some((company_id, user::Membership::Accepted)),
        )
        .await;
        let (pending, _) = spec::login(
            &svc,
            user::Role::Advertiser,
            Some((company_id, user::Membership::Pending)),
        )
        .await;

        let (status, _, body) = spec::send(
            app,
            http::Method::GET,
            "/api/companies/users-requests?status=pending",
            Some(&token),
            None,
        )
        .await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["totalElements"], 1);
        assert_eq!(body["content"][0]["id"], pending.id.to_string());
        assert_eq!(body["content"][0]["company"]["name"], "Sunny Homes");
    }

    #[tokio::test]
    async fn searches_companies_case_insensitively() {
        let (app, svc) = spec::app();
        _ = store_company(&svc).await;

        let (status, _, body) = spec::send(
            app,
            http::Method::GET,
            "/api/companies/search?name=sunny&phoneNumber=555",
            None,
            None,
        )
        .await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["totalElements"], 1);
        assert_eq!(body["content"][0]["name"], "Sunny Homes");
    }
}
