//! HTTP Handlers

use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::IntoResponse;
use kernel::actor::CurrentUser;
use kernel::id::{AgentId, PropertyId};
use kernel::page::{Page, PageRequest};
use platform::client::{client_ip, client_key};
use platform::rate_limit::SlidingWindowLimiter;

use crate::application::{
    AgentUseCase, BuilderUseCase, EnquiryUseCase, ListingsConfig, ProjectUseCase, PropertyUseCase,
};
use crate::domain::repository::ListingsStore;
use crate::error::ListingsResult;
use crate::presentation::dto::{
    AgentListQuery, AgentRequest, AgentResponse, BuilderDetailResponse, BuilderListQuery,
    BuilderRequest, BuilderResponse, CreateProjectRequest, CreatePropertyRequest, EnquiryReceipt,
    EnquiryRequest, EnquiryResponse, ListingDetailsRequest, ProjectDetailResponse,
    ProjectListQuery, ProjectResponse, PropertyResponse, PropertySearchQuery, StatusRequest,
    VerifyRequest,
};

/// Shared state for listings handlers
pub struct ListingsAppState<R> {
    pub repo: Arc<R>,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub config: Arc<ListingsConfig>,
}

impl<R> Clone for ListingsAppState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            limiter: self.limiter.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R: ListingsStore> ListingsAppState<R> {
    fn builders(&self) -> BuilderUseCase<R> {
        BuilderUseCase::new(self.repo.clone(), self.config.clone())
    }

    fn projects(&self) -> ProjectUseCase<R, R> {
        ProjectUseCase::new(self.repo.clone(), self.repo.clone(), self.config.clone())
    }

    fn properties(&self) -> PropertyUseCase<R, R, R> {
        PropertyUseCase::new(self.repo.clone(), self.repo.clone(), self.repo.clone())
    }

    fn agents(&self) -> AgentUseCase<R> {
        AgentUseCase::new(self.repo.clone())
    }

    fn enquiries(&self) -> EnquiryUseCase<R, R> {
        EnquiryUseCase::new(
            self.repo.clone(),
            self.repo.clone(),
            self.limiter.clone(),
            self.config.clone(),
        )
    }
}

/// Rate-limit key for the caller's address
pub struct ClientKey(pub String);

impl<S> FromRequestParts<S> for ClientKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(client_key(client_ip(&parts.extensions))))
    }
}

// ============================================================================
// Builders
// ============================================================================

/// GET /api/builders
pub async fn list_builders<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    Query(query): Query<BuilderListQuery>,
) -> ListingsResult<Json<Page<BuilderResponse>>> {
    let (filter, page) = query.into_parts();
    let builders = state.builders().list(&filter, page).await?;
    Ok(Json(builders.map(Into::into)))
}

/// POST /api/builders
pub async fn create_builder<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    user: CurrentUser,
    Json(req): Json<BuilderRequest>,
) -> ListingsResult<impl IntoResponse> {
    let builder = state.builders().create(&user, req.into()).await?;
    Ok((StatusCode::CREATED, Json(BuilderResponse::from(builder))))
}

/// GET /api/builders/{slug}
pub async fn get_builder<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    Path(slug): Path<String>,
) -> ListingsResult<Json<BuilderDetailResponse>> {
    let detail = state.builders().get(&slug).await?;
    Ok(Json(detail.into()))
}

/// PUT /api/builders/{slug}
pub async fn update_builder<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    user: CurrentUser,
    Path(slug): Path<String>,
    Json(req): Json<BuilderRequest>,
) -> ListingsResult<Json<BuilderResponse>> {
    let builder = state.builders().update(&user, &slug, req.into()).await?;
    Ok(Json(builder.into()))
}

/// POST /api/builders/{slug}/verify
pub async fn verify_builder<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    user: CurrentUser,
    Path(slug): Path<String>,
    Json(req): Json<VerifyRequest>,
) -> ListingsResult<Json<BuilderResponse>> {
    let builder = state.builders().set_verified(&user, &slug, req.verified).await?;
    Ok(Json(builder.into()))
}

// ============================================================================
// Projects
// ============================================================================

/// GET /api/projects
pub async fn list_projects<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    Query(query): Query<ProjectListQuery>,
) -> ListingsResult<Json<Page<ProjectResponse>>> {
    let (query, page) = query.into_parts();
    let projects = state.projects().list(query, page).await?;
    Ok(Json(projects.map(Into::into)))
}

/// POST /api/projects
pub async fn create_project<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    user: CurrentUser,
    Json(req): Json<CreateProjectRequest>,
) -> ListingsResult<impl IntoResponse> {
    let project = state.projects().create(&user, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

/// GET /api/projects/{slug}
pub async fn get_project<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    Path(slug): Path<String>,
) -> ListingsResult<Json<ProjectDetailResponse>> {
    let detail = state.projects().get(&slug).await?;
    Ok(Json(detail.into()))
}

// ============================================================================
// Properties
// ============================================================================

/// GET /api/properties
pub async fn search_properties<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    viewer: Option<CurrentUser>,
    Query(query): Query<PropertySearchQuery>,
) -> ListingsResult<Json<Page<PropertyResponse>>> {
    let (input, page) = query.into_parts();
    let viewer = viewer.map(|v| v.user_id);
    let results = state.properties().search(input, page).await?;
    Ok(Json(results.map(|p| PropertyResponse::new(p, viewer))))
}

/// POST /api/properties
pub async fn create_property<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    user: CurrentUser,
    Json(req): Json<CreatePropertyRequest>,
) -> ListingsResult<impl IntoResponse> {
    let property = state.properties().create(&user, req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(PropertyResponse::new(property, Some(user.user_id))),
    ))
}

/// GET /api/properties/{id}
pub async fn get_property<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    viewer: Option<CurrentUser>,
    Path(id): Path<PropertyId>,
) -> ListingsResult<Json<PropertyResponse>> {
    let property = state.properties().get(viewer.as_ref(), id).await?;
    Ok(Json(PropertyResponse::new(property, viewer.map(|v| v.user_id))))
}

/// PUT /api/properties/{id}
pub async fn update_property<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    user: CurrentUser,
    Path(id): Path<PropertyId>,
    Json(req): Json<ListingDetailsRequest>,
) -> ListingsResult<Json<PropertyResponse>> {
    let property = state.properties().update(&user, id, req.into()).await?;
    Ok(Json(PropertyResponse::new(property, Some(user.user_id))))
}

/// PUT /api/properties/{id}/status
pub async fn set_property_status<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    user: CurrentUser,
    Path(id): Path<PropertyId>,
    Json(req): Json<StatusRequest>,
) -> ListingsResult<Json<PropertyResponse>> {
    let property = state.properties().set_status(&user, id, req.status).await?;
    Ok(Json(PropertyResponse::new(property, Some(user.user_id))))
}

/// DELETE /api/properties/{id}
pub async fn delete_property<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    user: CurrentUser,
    Path(id): Path<PropertyId>,
) -> ListingsResult<StatusCode> {
    state.properties().delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/properties/{id}/enquiries
pub async fn submit_enquiry<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    sender: Option<CurrentUser>,
    ClientKey(client): ClientKey,
    Path(id): Path<PropertyId>,
    Json(req): Json<EnquiryRequest>,
) -> ListingsResult<impl IntoResponse> {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let enquiry = state
        .enquiries()
        .submit(sender.as_ref(), &client, id, req.into(), now_ms)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(EnquiryReceipt {
            id: enquiry.id,
            created_at: enquiry.created_at,
        }),
    ))
}

/// GET /api/properties/{id}/enquiries
pub async fn list_enquiries<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    user: CurrentUser,
    Path(id): Path<PropertyId>,
    Query(page): Query<PageRequest>,
) -> ListingsResult<Json<Page<EnquiryResponse>>> {
    let enquiries = state.enquiries().list_for_property(&user, id, page).await?;
    Ok(Json(enquiries.map(Into::into)))
}

// ============================================================================
// Agents
// ============================================================================

/// GET /api/agents
pub async fn list_agents<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    Query(query): Query<AgentListQuery>,
) -> ListingsResult<Json<Page<AgentResponse>>> {
    let (filter, page) = query.into_parts();
    let agents = state.agents().list(&filter, page).await?;
    Ok(Json(agents.map(Into::into)))
}

/// GET /api/agents/me
pub async fn my_agent_profile<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    user: CurrentUser,
) -> ListingsResult<Json<AgentResponse>> {
    let agent = state.agents().mine(&user).await?;
    Ok(Json(agent.into()))
}

/// PUT /api/agents/me
pub async fn upsert_agent_profile<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    user: CurrentUser,
    Json(req): Json<AgentRequest>,
) -> ListingsResult<impl IntoResponse> {
    let (agent, created) = state.agents().upsert_own(&user, req.into()).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(AgentResponse::from(agent))))
}

/// GET /api/agents/{id}
pub async fn get_agent<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    Path(id): Path<AgentId>,
) -> ListingsResult<Json<AgentResponse>> {
    let agent = state.agents().get(id).await?;
    Ok(Json(agent.into()))
}

/// POST /api/agents/{id}/verify
pub async fn verify_agent<R: ListingsStore>(
    State(state): State<ListingsAppState<R>>,
    user: CurrentUser,
    Path(id): Path<AgentId>,
    Json(req): Json<VerifyRequest>,
) -> ListingsResult<Json<AgentResponse>> {
    let agent = state.agents().set_verified(&user, id, req.verified).await?;
    Ok(Json(agent.into()))
}
