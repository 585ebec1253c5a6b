//! API Handlers
//!
//! One handler per route. Handlers unwrap the request, call the matching
//! [`CleaningService`] operation and wrap the result in its response body.

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use tracing::info;

use super::extract::{JsonBody, PathParams};
use crate::auth::{Authenticator, Claims};
use crate::cleaning::{CleaningService, NewTemplate, TaskSource};
use crate::config::Config;
use crate::db::Gateway;
use crate::error::Result;
use crate::models::{
    AreasResponse, AssignStaffMemberRequest, CreateTaskListRequest, CreateTaskRequest,
    CreateTemplateListRequest, CreateTemplateRequest, HealthResponse, MessageResponse,
    SignatureRequest, StaffMember, StaffMembersResponse, TaskCreatedResponse,
    TaskListCreatedResponse, TaskListResponse, TaskListsResponse, TasksResponse,
    TemplateCreatedResponse, TemplateIdsResponse, TemplateListCreatedResponse,
    TemplateListResponse, TemplateListsResponse, TemplateResponse, TemplatesResponse,
};
use crate::staff::{StaffDirectory, StaticStaffDirectory};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: CleaningService,
    pub auth: Arc<Authenticator>,
}

impl AppState {
    pub fn new(service: CleaningService, auth: Authenticator) -> Self {
        Self {
            service,
            auth: Arc::new(auth),
        }
    }

    /// Builds the staff directory and token verifier from configuration.
    pub async fn from_config(config: &Config, gateway: Gateway) -> Result<Self> {
        let directory: Arc<dyn StaffDirectory> = match &config.staff_directory_path {
            Some(path) => Arc::new(StaticStaffDirectory::from_file(path).await?),
            None => Arc::new(StaticStaffDirectory::default()),
        };
        let auth = Authenticator::from_config(&config.auth)?;
        Ok(Self::new(CleaningService::new(gateway, directory), auth))
    }
}

// == Health ==
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Staff and Areas ==
pub async fn list_staff_members(
    State(state): State<AppState>,
) -> Result<Json<StaffMembersResponse>> {
    let staff_members = state.service.get_staff_members().await?;
    Ok(Json(StaffMembersResponse { staff_members }))
}

pub async fn get_staff_member(
    State(state): State<AppState>,
    PathParams(payroll_number): PathParams<i32>,
) -> Result<Json<StaffMember>> {
    Ok(Json(state.service.get_staff_member(payroll_number).await?))
}

pub async fn list_areas(State(state): State<AppState>) -> Result<Json<AreasResponse>> {
    let areas = state.service.get_areas().await?;
    Ok(Json(AreasResponse { areas }))
}

// == Templates ==
pub async fn create_template(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateTemplateRequest>,
) -> Result<Json<TemplateCreatedResponse>> {
    let template = NewTemplate::try_from(req)?;
    let cleaning_task_template_id = state.service.create_cleaning_task_template(template).await?;
    Ok(Json(TemplateCreatedResponse {
        cleaning_task_template_id,
    }))
}

pub async fn get_template(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<TemplateResponse>> {
    let cleaning_task_template = state.service.get_cleaning_task_template(id).await?;
    Ok(Json(TemplateResponse {
        cleaning_task_template,
    }))
}

// == Template Lists ==
pub async fn list_template_lists(
    State(state): State<AppState>,
) -> Result<Json<TemplateListsResponse>> {
    let cleaning_task_template_lists = state.service.get_cleaning_task_template_lists().await?;
    Ok(Json(TemplateListsResponse {
        cleaning_task_template_lists,
    }))
}

pub async fn create_template_list(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateTemplateListRequest>,
) -> Result<Json<TemplateListCreatedResponse>> {
    let cleaning_task_template_list_id = state
        .service
        .create_cleaning_task_template_list(&req.title, &req.cleaning_task_template_ids)
        .await?;
    Ok(Json(TemplateListCreatedResponse {
        cleaning_task_template_list_id,
    }))
}

pub async fn get_template_list(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<TemplateListResponse>> {
    let cleaning_task_template_list = state.service.get_cleaning_task_template_list(id).await?;
    Ok(Json(TemplateListResponse {
        cleaning_task_template_list,
    }))
}

pub async fn delete_template_list(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<MessageResponse>> {
    state.service.delete_cleaning_task_template_list(id).await?;
    Ok(Json(MessageResponse::new("Cleaning task template list deleted")))
}

pub async fn list_template_ids(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<TemplateIdsResponse>> {
    let cleaning_task_template_ids = state.service.get_cleaning_task_template_ids(id).await?;
    Ok(Json(TemplateIdsResponse {
        cleaning_task_template_ids,
    }))
}

pub async fn list_templates(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<TemplatesResponse>> {
    let cleaning_task_templates = state.service.get_cleaning_task_templates(id).await?;
    Ok(Json(TemplatesResponse {
        cleaning_task_templates,
    }))
}

pub async fn create_template_in_list(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
    JsonBody(req): JsonBody<CreateTemplateRequest>,
) -> Result<Json<TemplateCreatedResponse>> {
    let template = NewTemplate::try_from(req)?;
    let cleaning_task_template_id = state
        .service
        .create_cleaning_task_template_in_list(id, template)
        .await?;
    Ok(Json(TemplateCreatedResponse {
        cleaning_task_template_id,
    }))
}

pub async fn add_template_to_list(
    State(state): State<AppState>,
    PathParams((id, template_id)): PathParams<(i32, i32)>,
) -> Result<Json<MessageResponse>> {
    state
        .service
        .add_cleaning_task_template_to_list(id, template_id)
        .await?;
    Ok(Json(MessageResponse::new(
        "Cleaning task template added to list",
    )))
}

pub async fn remove_template_from_list(
    State(state): State<AppState>,
    PathParams((id, template_id)): PathParams<(i32, i32)>,
) -> Result<Json<MessageResponse>> {
    state
        .service
        .remove_cleaning_task_template_from_list(id, template_id)
        .await?;
    Ok(Json(MessageResponse::new(
        "Cleaning task template removed from list",
    )))
}

// == Task Lists ==
pub async fn list_task_lists(State(state): State<AppState>) -> Result<Json<TaskListsResponse>> {
    let cleaning_task_lists = state.service.get_cleaning_task_lists().await?;
    Ok(Json(TaskListsResponse {
        cleaning_task_lists,
    }))
}

pub async fn create_task_list(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateTaskListRequest>,
) -> Result<Json<TaskListCreatedResponse>> {
    let cleaning_task_list_id = state
        .service
        .create_cleaning_task_list(
            req.cleaning_task_template_list_id,
            &req.date,
            req.staff_member_id,
        )
        .await?;
    Ok(Json(TaskListCreatedResponse {
        cleaning_task_list_id,
    }))
}

pub async fn get_task_list(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<TaskListResponse>> {
    let cleaning_task_list = state.service.get_cleaning_task_list(id).await?;
    Ok(Json(TaskListResponse { cleaning_task_list }))
}

pub async fn delete_task_list(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<MessageResponse>> {
    state.service.delete_cleaning_task_list(id).await?;
    Ok(Json(MessageResponse::new("Cleaning task list deleted")))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<TasksResponse>> {
    let cleaning_tasks = state.service.get_cleaning_tasks(id).await?;
    Ok(Json(TasksResponse { cleaning_tasks }))
}

pub async fn create_task(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
    JsonBody(req): JsonBody<CreateTaskRequest>,
) -> Result<Json<TaskCreatedResponse>> {
    let source = TaskSource::try_from(req)?;
    let cleaning_task_id = state.service.create_cleaning_task(id, source).await?;
    Ok(Json(TaskCreatedResponse { cleaning_task_id }))
}

pub async fn mark_task_complete(
    State(state): State<AppState>,
    PathParams((id, task_id)): PathParams<(i32, i32)>,
) -> Result<Json<MessageResponse>> {
    state
        .service
        .mark_cleaning_task_as_complete(id, task_id)
        .await?;
    Ok(Json(MessageResponse::new("Cleaning task marked as complete")))
}

pub async fn mark_task_incomplete(
    State(state): State<AppState>,
    PathParams((id, task_id)): PathParams<(i32, i32)>,
) -> Result<Json<MessageResponse>> {
    state
        .service
        .mark_cleaning_task_as_incomplete(id, task_id)
        .await?;
    Ok(Json(MessageResponse::new(
        "Cleaning task marked as incomplete",
    )))
}

pub async fn sign_as_manager(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    PathParams(id): PathParams<i32>,
    JsonBody(req): JsonBody<SignatureRequest>,
) -> Result<Json<MessageResponse>> {
    state.service.sign_off_as_manager(id, &req.signature).await?;
    info!(task_list_id = id, signed_by = %claims.sub, "Manager sign-off");
    Ok(Json(MessageResponse::new("Manager signature saved")))
}

pub async fn sign_as_staff_member(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    PathParams(id): PathParams<i32>,
    JsonBody(req): JsonBody<SignatureRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .service
        .sign_off_as_staff_member(id, &req.signature)
        .await?;
    info!(task_list_id = id, signed_by = %claims.sub, "Staff member sign-off");
    Ok(Json(MessageResponse::new("Staff member signature saved")))
}

pub async fn assign_staff_member(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
    JsonBody(req): JsonBody<AssignStaffMemberRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .service
        .assign_staff_member(id, req.staff_member_id)
        .await?;
    Ok(Json(MessageResponse::new(
        "Staff member assigned to cleaning task list",
    )))
}

// == Tasks ==
pub async fn delete_task(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<MessageResponse>> {
    state.service.delete_cleaning_task(id).await?;
    Ok(Json(MessageResponse::new("Cleaning task deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::staff::DirectoryUser;

    fn state() -> AppState {
        let directory = StaticStaffDirectory::new(vec![DirectoryUser::new(
            "jdoe",
            [
                ("given_name", "Jane"),
                ("family_name", "Doe"),
                ("custom:payroll_number", "12"),
            ],
        )]);
        AppState::new(
            CleaningService::new(Gateway::in_memory(), Arc::new(directory)),
            Authenticator::Disabled,
        )
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_staff_handlers() {
        let state = state();
        let list = list_staff_members(State(state.clone())).await.unwrap();
        assert_eq!(list.staff_members.len(), 1);

        let member = get_staff_member(State(state.clone()), PathParams(12))
            .await
            .unwrap();
        assert_eq!(member.first_name, "Jane");

        let missing = get_staff_member(State(state), PathParams(13)).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_template_invalid_combination() {
        let req = CreateTemplateRequest {
            description: "Wipe benches".to_string(),
            area_id: Some(1),
            area_description: Some("Gym".to_string()),
        };
        let result = create_template(State(state()), JsonBody(req)).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_template_list_round_trip() {
        let state = state();
        let created = create_template_list(
            State(state.clone()),
            JsonBody(CreateTemplateListRequest {
                title: "Poolside".to_string(),
                cleaning_task_template_ids: vec![],
            }),
        )
        .await
        .unwrap();
        let id = created.cleaning_task_template_list_id;

        let fetched = get_template_list(State(state.clone()), PathParams(id))
            .await
            .unwrap();
        assert_eq!(fetched.cleaning_task_template_list.title, "Poolside");

        let deleted = delete_template_list(State(state.clone()), PathParams(id))
            .await
            .unwrap();
        assert_eq!(deleted.message, "Cleaning task template list deleted");
        let result = get_template_list(State(state), PathParams(id)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_sign_off_with_caller_claims() {
        let state = state();
        let template_list = state
            .service
            .create_cleaning_task_template_list("Close", &[])
            .await
            .unwrap();
        let today = chrono::Local::now()
            .date_naive()
            .format("%Y-%m-%d")
            .to_string();
        let list = state
            .service
            .create_cleaning_task_list(template_list, &today, None)
            .await
            .unwrap();
        let claims = Claims {
            sub: "u-9".to_string(),
            role: crate::auth::Role::User,
        };

        let signed = sign_as_staff_member(
            State(state.clone()),
            Extension(claims.clone()),
            PathParams(list),
            JsonBody(SignatureRequest {
                signature: "A. Jones".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(signed.message, "Staff member signature saved");

        let result = sign_as_manager(
            State(state),
            Extension(claims),
            PathParams(list),
            JsonBody(SignatureRequest {
                signature: String::new(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_create_task_invalid_combination() {
        let req = CreateTaskRequest {
            cleaning_task_template_id: Some(1),
            description: Some("Mop".to_string()),
            area_description: None,
            area_id: None,
        };
        let result = create_task(State(state()), PathParams(1), JsonBody(req)).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }
}
