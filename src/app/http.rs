//! JSON HTTP front end over [`DirectoryService`].
//!
//! Successful calls answer `{"message": "success", "data": ...}`; failures
//! answer `{"error": "..."}` with 400 for bad input or rejected writes and
//! 500 for failed reads or an unavailable store.

use crate::core::DirectoryService;
use crate::domain::model::{ListMode, NewDepartment, NewEmployee, NewRole, ReassignOutcome};
use crate::domain::ports::DirectoryStore;
use crate::utils::error::DirectoryError;
use crate::utils::validation::validate_required_field;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type AppState<S> = Arc<DirectoryService<S>>;

pub fn router<S: DirectoryStore + 'static>(service: AppState<S>) -> Router {
    Router::new()
        .route("/api/new-department", post(create_department::<S>))
        .route("/api/new-role", post(create_role::<S>))
        .route("/api/new-employee", post(create_employee::<S>))
        .route("/api/departments", get(list_departments::<S>))
        .route("/api/roles", get(list_roles::<S>))
        .route("/api/employees", get(list_employees::<S>))
        .route("/api/department-budgets", get(list_department_budgets::<S>))
        .route("/api/update-employee-role/:id", put(update_employee_role::<S>))
        .route(
            "/api/update-employee-manager/:id",
            put(update_employee_manager::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub message: &'static str,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub message: &'static str,
    pub changes: u64,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct DepartmentRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub title: Option<String>,
    pub salary: Option<f64>,
    pub department_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct EmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role_id: Option<i64>,
    pub manager_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdateRequest {
    pub role_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ManagerUpdateRequest {
    pub manager_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub view: Option<ListMode>,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Write failures: the caller's fault unless the store itself broke.
    fn from_write(err: DirectoryError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }

    fn from_read(err: DirectoryError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!("HTTP {}: {}", self.status.as_u16(), self.message);
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

fn success<T: Serialize>(data: T) -> Response {
    Json(SuccessResponse {
        message: "success",
        data,
    })
    .into_response()
}

fn reassigned(outcome: ReassignOutcome) -> Response {
    match outcome {
        ReassignOutcome::Updated { id, changes } => Json(UpdateResponse {
            message: "success",
            changes,
            id,
        })
        .into_response(),
        ReassignOutcome::NotFound { .. } => Json(MessageResponse {
            message: "Employee not found",
        })
        .into_response(),
    }
}

async fn create_department<S: DirectoryStore + 'static>(
    State(service): State<AppState<S>>,
    payload: Result<Json<DepartmentRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let name = validate_required_field("name", &request.name).map_err(ApiError::from_write)?;

    let department = service
        .add_department(NewDepartment { name: name.clone() })
        .await
        .map_err(ApiError::from_write)?;
    Ok(success(department))
}

async fn create_role<S: DirectoryStore + 'static>(
    State(service): State<AppState<S>>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let role = NewRole {
        title: validate_required_field("title", &request.title)
            .map_err(ApiError::from_write)?
            .clone(),
        salary: *validate_required_field("salary", &request.salary)
            .map_err(ApiError::from_write)?,
        department_id: *validate_required_field("department_id", &request.department_id)
            .map_err(ApiError::from_write)?,
    };

    let role = service.add_role(role).await.map_err(ApiError::from_write)?;
    Ok(success(role))
}

async fn create_employee<S: DirectoryStore + 'static>(
    State(service): State<AppState<S>>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let employee = NewEmployee {
        first_name: validate_required_field("first_name", &request.first_name)
            .map_err(ApiError::from_write)?
            .clone(),
        last_name: validate_required_field("last_name", &request.last_name)
            .map_err(ApiError::from_write)?
            .clone(),
        role_id: *validate_required_field("role_id", &request.role_id)
            .map_err(ApiError::from_write)?,
        manager_id: request.manager_id,
    };

    let employee = service
        .add_employee(employee)
        .await
        .map_err(ApiError::from_write)?;
    Ok(success(employee))
}

async fn list_departments<S: DirectoryStore + 'static>(
    State(service): State<AppState<S>>,
) -> Result<Response, ApiError> {
    let departments = service
        .list_departments()
        .await
        .map_err(ApiError::from_read)?;
    Ok(success(departments))
}

async fn list_roles<S: DirectoryStore + 'static>(
    State(service): State<AppState<S>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let roles = service
        .list_roles_in(query.view.unwrap_or_default())
        .await
        .map_err(ApiError::from_read)?;
    Ok(success(roles))
}

async fn list_employees<S: DirectoryStore + 'static>(
    State(service): State<AppState<S>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let employees = service
        .list_employees_in(query.view.unwrap_or_default())
        .await
        .map_err(ApiError::from_read)?;
    Ok(success(employees))
}

async fn list_department_budgets<S: DirectoryStore + 'static>(
    State(service): State<AppState<S>>,
) -> Result<Response, ApiError> {
    let budgets = service
        .department_budgets()
        .await
        .map_err(ApiError::from_read)?;
    Ok(success(budgets))
}

async fn update_employee_role<S: DirectoryStore + 'static>(
    State(service): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RoleUpdateRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let role_id =
        *validate_required_field("role_id", &request.role_id).map_err(ApiError::from_write)?;

    let outcome = service
        .reassign_employee_role(id, role_id)
        .await
        .map_err(ApiError::from_write)?;
    Ok(reassigned(outcome))
}

async fn update_employee_manager<S: DirectoryStore + 'static>(
    State(service): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ManagerUpdateRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;

    let outcome = service
        .reassign_employee_manager(id, request.manager_id)
        .await
        .map_err(ApiError::from_write)?;
    Ok(reassigned(outcome))
}
