//! Cleaning task lists
//!
//! A task list is stamped out from a template list: every linked template is
//! copied into a fresh task row. Lists are then worked through by marking
//! tasks complete and signed off by a manager and a staff member.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info};

use crate::cleaning::{require_text, CleaningTasks, TaskSource};
use crate::db::{Gateway, StoreError};
use crate::error::{AppError, Result, ResultExt};
use crate::models::{CleaningTaskDetail, CleaningTaskList};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parses a task list date.
///
/// Accepts `YYYY-MM-DD` (local midnight), naive local date-times, and RFC 3339
/// timestamps, which are converted to local time.
pub fn parse_date(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return Ok(date.with_timezone(&Local).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .ok_or_else(|| AppError::invalid("Invalid date"))
}

/// Rejects dates earlier than midnight of `now`'s day.
pub fn check_not_past(date: NaiveDateTime, now: NaiveDateTime) -> Result<()> {
    let midnight = now.date().and_time(NaiveTime::MIN);
    if date < midnight {
        return Err(AppError::invalid("Date cannot be in the past"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CleaningTaskLists {
    gateway: Gateway,
    tasks: CleaningTasks,
}

impl CleaningTaskLists {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            tasks: CleaningTasks::new(gateway.clone()),
            gateway,
        }
    }

    /// Creates a dated list holding one task per template of the template list.
    ///
    /// A template list without templates yields a list without tasks.
    pub async fn create(
        &self,
        template_list_id: i32,
        date: &str,
        staff_member_id: Option<i32>,
    ) -> Result<i32> {
        let date = parse_date(date)?;
        check_not_past(date, Local::now().naive_local())?;

        let (id, task_count) = self
            .gateway
            .transaction(move |db| {
                Box::pin(async move {
                    if db.find_template_list(template_list_id).await?.is_none() {
                        return Err(AppError::not_found(
                            "Cleaning task template list not found",
                        ));
                    }

                    let list_id = db.insert_task_list(date, staff_member_id).await?;
                    let template_ids = db.template_ids_in_list(template_list_id).await?;
                    for template_id in &template_ids {
                        let template = db.find_template(*template_id).await?.ok_or_else(|| {
                            AppError::not_found("Cleaning task template not found")
                        })?;
                        db.insert_task(list_id, &template.description, template.area_id)
                            .await?;
                    }
                    Ok((list_id, template_ids.len()))
                })
            })
            .await
            .context("Error creating cleaning task list")?;

        info!(
            task_list_id = id,
            template_list_id, task_count, "Cleaning task list created"
        );
        Ok(id)
    }

    pub async fn get(&self, id: i32) -> Result<CleaningTaskList> {
        let mut db = self.gateway.connection().await?;
        db.find_task_list(id)
            .await
            .context("Error retrieving cleaning task list")?
            .ok_or_else(|| AppError::not_found("Cleaning task list not found"))
    }

    /// All task lists ordered by date.
    pub async fn list(&self) -> Result<Vec<CleaningTaskList>> {
        let mut db = self.gateway.connection().await?;
        db.list_task_lists()
            .await
            .context("Error retrieving cleaning task lists")
    }

    /// Adds one task to an existing list.
    pub async fn create_task(&self, list_id: i32, source: TaskSource) -> Result<i32> {
        source.validate()?;

        let id = self
            .gateway
            .transaction(move |db| {
                Box::pin(async move {
                    if db.find_task_list(list_id).await?.is_none() {
                        return Err(AppError::not_found("Cleaning task list not found"));
                    }

                    let (description, area_id) = match source {
                        TaskSource::FromTemplate(template_id) => {
                            let template = db.find_template(template_id).await?.ok_or_else(
                                || AppError::not_found("Cleaning task template not found"),
                            )?;
                            (template.description, template.area_id)
                        }
                        TaskSource::NewWithExistingArea {
                            description,
                            area_id,
                        } => (description, area_id),
                        TaskSource::NewWithNewArea {
                            description,
                            area_description,
                        } => {
                            let area_id = db.insert_area(&area_description).await?;
                            (description, area_id)
                        }
                    };

                    db.insert_task(list_id, &description, area_id)
                        .await
                        .map_err(|e| match e {
                            StoreError::MissingReference => AppError::not_found("Area not found"),
                            other => AppError::Store(other),
                        })
                })
            })
            .await
            .context("Error creating cleaning task")?;

        info!(task_list_id = list_id, task_id = id, "Cleaning task created");
        Ok(id)
    }

    /// Moves a task from incomplete to complete.
    pub async fn mark_complete(&self, task_id: i32) -> Result<()> {
        self.transition(task_id, true).await
    }

    /// Moves a task from complete to incomplete.
    pub async fn mark_incomplete(&self, task_id: i32) -> Result<()> {
        self.transition(task_id, false).await
    }

    // Re-applying the current state is an error, not a no-op.
    async fn transition(&self, task_id: i32, completed: bool) -> Result<()> {
        let task = self.tasks.get(task_id).await?;
        match (task.completed, completed) {
            (true, true) => Err(AppError::invalid("Cleaning task is already completed")),
            (false, false) => Err(AppError::invalid("Cleaning task is already incomplete")),
            _ => self.tasks.set_completed(task_id, completed).await,
        }
    }

    pub async fn set_manager_signature(&self, list_id: i32, signature: &str) -> Result<()> {
        require_text(signature, "Signature")?;
        let mut db = self.gateway.connection().await?;
        let updated = db
            .set_manager_signature(list_id, signature)
            .await
            .context("Error signing cleaning task list")?;
        if updated == 0 {
            return Err(AppError::not_found("Cleaning task list not found"));
        }
        info!(task_list_id = list_id, "Manager signed cleaning task list");
        Ok(())
    }

    pub async fn set_staff_member_signature(&self, list_id: i32, signature: &str) -> Result<()> {
        require_text(signature, "Signature")?;
        let mut db = self.gateway.connection().await?;
        let updated = db
            .set_staff_member_signature(list_id, signature)
            .await
            .context("Error signing cleaning task list")?;
        if updated == 0 {
            return Err(AppError::not_found("Cleaning task list not found"));
        }
        info!(task_list_id = list_id, "Staff member signed cleaning task list");
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut db = self.gateway.connection().await?;
        let deleted = db
            .delete_task_list(id)
            .await
            .context("Error deleting cleaning task list")?;
        if deleted == 0 {
            return Err(AppError::not_found("Cleaning task list not found"));
        }
        info!(task_list_id = id, "Cleaning task list deleted");
        Ok(())
    }

    /// Tasks of a list with their area descriptions, by ascending task id.
    pub async fn list_tasks(&self, list_id: i32) -> Result<Vec<CleaningTaskDetail>> {
        let mut db = self.gateway.connection().await?;
        let tasks = db
            .tasks_in_list(list_id)
            .await
            .context("Error retrieving cleaning tasks")?;
        if tasks.is_empty() {
            return Err(AppError::not_found(
                "No cleaning tasks linked to this cleaning task list",
            ));
        }
        debug!(task_list_id = list_id, count = tasks.len(), "Listed cleaning tasks");
        Ok(tasks)
    }

    /// Records the staff member responsible for a list.
    ///
    /// The id is not checked against the identity directory.
    pub async fn assign_staff_member(&self, list_id: i32, staff_member_id: i32) -> Result<()> {
        let mut db = self.gateway.connection().await?;
        let updated = db
            .assign_staff_member(list_id, staff_member_id)
            .await
            .context("Error assigning staff member")?;
        if updated == 0 {
            return Err(AppError::not_found("Cleaning task list not found"));
        }
        info!(
            task_list_id = list_id,
            staff_member_id, "Staff member assigned to cleaning task list"
        );
        Ok(())
    }
}
