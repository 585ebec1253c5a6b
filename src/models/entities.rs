//! Row types for the cleaning task schema
//!
//! Each struct maps one query projection. Field names follow the column
//! names; JSON output uses camelCase.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A physical location in the leisure centre.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: i32,
    pub description: String,
}

/// A reusable description and area pairing.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningTaskTemplate {
    pub id: i32,
    pub description: String,
    pub area_id: i32,
}

/// A template joined with the description of its area.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningTaskTemplateDetail {
    pub id: i32,
    pub description: String,
    pub area_id: i32,
    pub area_description: String,
}

/// A named checklist blueprint.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningTaskTemplateList {
    pub id: i32,
    pub title: String,
}

/// A concrete task belonging to a task list.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningTask {
    pub id: i32,
    pub description: String,
    pub completed: bool,
    pub cleaning_task_list_id: i32,
    pub area_id: i32,
}

/// A task joined with the description of its area.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningTaskDetail {
    pub id: i32,
    pub description: String,
    pub completed: bool,
    pub cleaning_task_list_id: i32,
    pub area_id: i32,
    pub area_description: String,
}

/// A dated instantiation of a template list.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningTaskList {
    pub id: i32,
    pub date: NaiveDateTime,
    pub manager_signature: Option<String>,
    pub staff_member_signature: Option<String>,
    pub staff_member_id: Option<i32>,
}

/// Staff identity projected from the identity directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub payroll_number: i32,
    pub first_name: String,
    pub last_name: String,
}
