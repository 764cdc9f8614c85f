use axum::{
	Json, Router,
	extract::{FromRequestParts, Path, Query, State},
	http::{HeaderMap, StatusCode, header, request::Parts},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use orgdex_domain::{Caller, Entity, EntityType, Role, Visibility};
use orgdex_service::{
	CacheStatus, CreateEntityRequest, DeleteResponse, DirectoryFilters, EntityPatch, Error,
	ListRequest, ListResponse, SearchRequest, SearchResponse, SortRequest,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/entities", get(list_entities).post(create_entity))
		.route("/v1/entities/batch", post(batch_entities))
		.route(
			"/v1/entities/{id}",
			get(get_entity).patch(update_entity).delete(delete_entity),
		)
		.route("/v1/owners/{user_id}/entities", get(owned_entities))
		.route("/v1/search", post(search))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/admin/cache", get(cache_status))
		.route("/v1/admin/cache/invalidate", post(invalidate_cache))
		.route("/v1/admin/phase/live", post(enter_live))
		.with_state(state)
}

/// Caller identity forwarded by the gateway. `None` when the user header is absent.
pub struct Identity(pub Option<Caller>);
impl FromRequestParts<AppState> for Identity {
	type Rejection = ApiError;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let security = &state.service.cfg.security;
		let Some(user_id) = header_value(&parts.headers, &security.user_header) else {
			return Ok(Self(None));
		};
		let role = match header_value(&parts.headers, &security.role_header) {
			Some(raw) => raw.parse::<Role>().map_err(|err| {
				json_error(StatusCode::UNAUTHORIZED, "auth_required", err.to_string(), None)
			})?,
			None => Role::Visitor,
		};

		Ok(Self(Some(Caller::new(user_id, role))))
	}
}

/// Flat query string for `GET /v1/entities`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
	pub limit: Option<u32>,
	pub start_after: Option<Uuid>,
	#[serde(rename = "type")]
	pub entity_type: Option<EntityType>,
	pub min_employees: Option<i64>,
	pub max_employees: Option<i64>,
	pub founded_from: Option<i64>,
	pub founded_to: Option<i64>,
	pub has_certifications: Option<bool>,
	pub has_partnerships: Option<bool>,
	pub is_confidential: Option<bool>,
	pub membership_tier: Option<Visibility>,
	pub sort_field: Option<String>,
	pub sort_direction: Option<String>,
	pub include_total: bool,
}
impl From<ListParams> for ListRequest {
	fn from(params: ListParams) -> Self {
		let filters = DirectoryFilters {
			entity_type: params.entity_type,
			min_employees: params.min_employees,
			max_employees: params.max_employees,
			founded_from: params.founded_from,
			founded_to: params.founded_to,
			has_certifications: params.has_certifications,
			has_partnerships: params.has_partnerships,
			is_confidential: params.is_confidential,
			membership_tier: params.membership_tier,
		};
		let sort = params
			.sort_field
			.map(|field| SortRequest { field, direction: params.sort_direction });

		Self {
			limit: params.limit,
			start_after: params.start_after,
			filters,
			sort,
			include_total: params.include_total,
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
	pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct EntitiesResponse {
	pub entities: Vec<Entity>,
}

#[derive(Debug, Serialize)]
pub struct PhaseResponse {
	pub switched: bool,
	pub cache: CacheStatus,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_entities(
	State(state): State<AppState>,
	Identity(caller): Identity,
	Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
	let response = state.service.list_for_role(caller.as_ref(), params.into()).await?;

	Ok(Json(response))
}

async fn get_entity(
	State(state): State<AppState>,
	Identity(caller): Identity,
	Path(id): Path<Uuid>,
) -> Result<Json<Entity>, ApiError> {
	let entity = state.service.get_by_id(caller.as_ref(), id).await?;

	Ok(Json(entity))
}

async fn batch_entities(
	State(state): State<AppState>,
	Identity(caller): Identity,
	Json(payload): Json<BatchRequest>,
) -> Result<Json<EntitiesResponse>, ApiError> {
	let entities = state.service.get_by_ids(caller.as_ref(), &payload.ids).await?;

	Ok(Json(EntitiesResponse { entities }))
}

async fn owned_entities(
	State(state): State<AppState>,
	Identity(caller): Identity,
	Path(user_id): Path<String>,
) -> Result<Json<EntitiesResponse>, ApiError> {
	let entities = state.service.get_owned_by(caller.as_ref(), &user_id).await?;

	Ok(Json(EntitiesResponse { entities }))
}

async fn search(
	State(state): State<AppState>,
	Identity(caller): Identity,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search(caller.as_ref(), payload).await?;

	Ok(Json(response))
}

async fn create_entity(
	State(state): State<AppState>,
	Identity(caller): Identity,
	Json(payload): Json<CreateEntityRequest>,
) -> Result<(StatusCode, Json<Entity>), ApiError> {
	let entity = state.service.create(caller.as_ref(), payload).await?;

	Ok((StatusCode::CREATED, Json(entity)))
}

async fn update_entity(
	State(state): State<AppState>,
	Identity(caller): Identity,
	Path(id): Path<Uuid>,
	Json(payload): Json<EntityPatch>,
) -> Result<Json<Entity>, ApiError> {
	let entity = state.service.update(caller.as_ref(), id, payload).await?;

	Ok(Json(entity))
}

async fn delete_entity(
	State(state): State<AppState>,
	Identity(caller): Identity,
	Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
	let response = state.service.delete(caller.as_ref(), id).await?;

	Ok(Json(response))
}

async fn cache_status(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<CacheStatus>, ApiError> {
	require_admin_token(&state, &headers)?;

	Ok(Json(state.service.cache.status()))
}

async fn invalidate_cache(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<CacheStatus>, ApiError> {
	require_admin_token(&state, &headers)?;

	state.service.cache.invalidate(&Role::ALL, "admin");

	Ok(Json(state.service.cache.status()))
}

async fn enter_live(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<PhaseResponse>, ApiError> {
	require_admin_token(&state, &headers)?;

	let switched = state.service.cache.enter_live();

	Ok(Json(PhaseResponse { switched, cache: state.service.cache.status() }))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
	headers
		.get(name)
		.and_then(|value| value.to_str().ok())
		.map(str::trim)
		.filter(|value| !value.is_empty())
		.map(str::to_string)
}

fn require_admin_token(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
	let Some(expected) = state.service.cfg.security.admin_auth_token.as_deref() else {
		return Ok(());
	};
	let provided = header_value(headers, header::AUTHORIZATION.as_str());

	if provided.as_deref().and_then(|value| value.strip_prefix("Bearer ")) == Some(expected) {
		return Ok(());
	}

	tracing::warn!("Rejected admin request with a missing or invalid token.");

	Err(json_error(
		StatusCode::UNAUTHORIZED,
		"auth_required",
		"A valid admin bearer token is required.",
		None,
	))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		let code = err.code();

		match err {
			Error::Auth { message } => json_error(StatusCode::UNAUTHORIZED, code, message, None),
			Error::Permission { message } | Error::AccessDenied { message } =>
				json_error(StatusCode::FORBIDDEN, code, message, None),
			Error::Validation { message, fields } =>
				json_error(StatusCode::UNPROCESSABLE_ENTITY, code, message, Some(fields)),
			Error::NotFound { message } => json_error(StatusCode::NOT_FOUND, code, message, None),
			// Detail was logged where the failure was wrapped.
			Error::Query { .. } => json_error(
				StatusCode::INTERNAL_SERVER_ERROR,
				code,
				"The request could not be completed.",
				None,
			),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
