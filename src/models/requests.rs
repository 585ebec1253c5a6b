//! Request DTOs for the cleaning task API
//!
//! Bodies keep the optional-field shape clients send. The create-or-reference
//! bodies are converted into explicit source variants with `TryFrom`, so an
//! unsupported combination of fields is rejected before any store access.

use serde::Deserialize;

use crate::cleaning::{AreaSource, NewTemplate, TaskSource};
use crate::error::AppError;

const INVALID_COMBINATION: &str = "Invalid combination of arguments";

/// Request body for POST /cleaning-task-template-lists
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateListRequest {
    pub title: String,
    #[serde(default)]
    pub cleaning_task_template_ids: Vec<i32>,
}

/// Request body for the template creation routes
///
/// Exactly one of `area_id` and `area_description` must be present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub description: String,
    #[serde(default)]
    pub area_id: Option<i32>,
    #[serde(default)]
    pub area_description: Option<String>,
}

impl TryFrom<CreateTemplateRequest> for NewTemplate {
    type Error = AppError;

    fn try_from(req: CreateTemplateRequest) -> Result<Self, Self::Error> {
        let area = match (req.area_id, req.area_description) {
            (Some(area_id), None) => AreaSource::Existing(area_id),
            (None, Some(description)) => AreaSource::New(description),
            _ => return Err(AppError::invalid(INVALID_COMBINATION)),
        };
        Ok(NewTemplate {
            description: req.description,
            area,
        })
    }
}

/// Request body for POST /cleaning-task-lists
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskListRequest {
    pub cleaning_task_template_list_id: i32,
    pub date: String,
    #[serde(default)]
    pub staff_member_id: Option<i32>,
}

/// Request body for POST /cleaning-task-lists/:id/cleaning-tasks
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub cleaning_task_template_id: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub area_description: Option<String>,
    #[serde(default)]
    pub area_id: Option<i32>,
}

impl TryFrom<CreateTaskRequest> for TaskSource {
    type Error = AppError;

    fn try_from(req: CreateTaskRequest) -> Result<Self, Self::Error> {
        match (
            req.cleaning_task_template_id,
            req.description,
            req.area_description,
            req.area_id,
        ) {
            (Some(template_id), None, None, None) => Ok(TaskSource::FromTemplate(template_id)),
            (None, Some(description), None, Some(area_id)) => {
                Ok(TaskSource::NewWithExistingArea {
                    description,
                    area_id,
                })
            }
            (None, Some(description), Some(area_description), None) => {
                Ok(TaskSource::NewWithNewArea {
                    description,
                    area_description,
                })
            }
            _ => Err(AppError::invalid(INVALID_COMBINATION)),
        }
    }
}

/// Request body for the sign-off routes
#[derive(Debug, Clone, Deserialize)]
pub struct SignatureRequest {
    pub signature: String,
}

/// Request body for PUT /cleaning-task-lists/:id/staff-member
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignStaffMemberRequest {
    pub staff_member_id: i32,
}
