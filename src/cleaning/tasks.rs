//! Cleaning task rows.

use tracing::{debug, info};

use crate::db::Gateway;
use crate::error::{AppError, Result, ResultExt};
use crate::models::CleaningTask;

#[derive(Clone)]
pub struct CleaningTasks {
    gateway: Gateway,
}

impl CleaningTasks {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn get(&self, id: i32) -> Result<CleaningTask> {
        let mut db = self.gateway.connection().await?;
        let task = db
            .find_task(id)
            .await
            .context("Error retrieving cleaning task")?
            .ok_or_else(|| AppError::not_found("Cleaning task not found"))?;
        debug!(task_id = id, "Retrieved cleaning task");
        Ok(task)
    }

    /// Writes the completion flag.
    ///
    /// Every failure, including a missing row, is reported as an update error;
    /// callers read the task first to report NotFound.
    pub async fn set_completed(&self, id: i32, completed: bool) -> Result<()> {
        let updated = async {
            let mut db = self.gateway.connection().await?;
            Ok::<_, AppError>(db.set_task_completed(id, completed).await?)
        }
        .await;

        match updated {
            Ok(1) => {
                info!(task_id = id, completed, "Cleaning task updated");
                Ok(())
            }
            Ok(_) => Err(AppError::Internal(
                "Error updating cleaning task".to_string(),
            )),
            Err(e) => Err(AppError::Internal(format!(
                "Error updating cleaning task: {e}"
            ))),
        }
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut db = self.gateway.connection().await?;
        let deleted = db
            .delete_task(id)
            .await
            .context("Error deleting cleaning task")?;
        if deleted == 0 {
            return Err(AppError::not_found("Cleaning task not found"));
        }
        info!(task_id = id, "Cleaning task deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    async fn seeded() -> (CleaningTasks, i32) {
        let gateway = Gateway::in_memory();
        let task_id = {
            let mut db = gateway.connection().await.unwrap();
            let area = db.insert_area("Spa").await.unwrap();
            let date = NaiveDate::from_ymd_opt(2031, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            let list = db.insert_task_list(date, None).await.unwrap();
            db.insert_task(list, "Clean jacuzzi", area).await.unwrap()
        };
        (CleaningTasks::new(gateway), task_id)
    }

    #[tokio::test]
    async fn test_set_completed() {
        let (tasks, id) = seeded().await;
        tasks.set_completed(id, true).await.unwrap();
        assert!(tasks.get(id).await.unwrap().completed);
    }

    #[tokio::test]
    async fn test_set_completed_missing_is_update_error() {
        let (tasks, _) = seeded().await;
        let result = tasks.set_completed(404, true).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let (tasks, id) = seeded().await;
        tasks.delete(id).await.unwrap();
        assert!(matches!(tasks.delete(id).await, Err(AppError::NotFound(_))));
    }
}
