//! Cleaning task template lookups.

use tracing::debug;

use crate::db::Gateway;
use crate::error::{AppError, Result, ResultExt};
use crate::models::CleaningTaskTemplate;

/// Point lookups on `cleaning_task_template`.
#[derive(Clone)]
pub struct CleaningTaskTemplates {
    gateway: Gateway,
}

impl CleaningTaskTemplates {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn get(&self, id: i32) -> Result<CleaningTaskTemplate> {
        let mut db = self.gateway.connection().await?;
        let template = db
            .find_template(id)
            .await
            .context("Error retrieving cleaning task template")?
            .ok_or_else(|| AppError::not_found("Cleaning task template not found"))?;
        debug!(template_id = id, "Retrieved cleaning task template");
        Ok(template)
    }

    pub async fn get_description(&self, id: i32) -> Result<String> {
        Ok(self.get(id).await?.description)
    }

    pub async fn get_area(&self, id: i32) -> Result<i32> {
        Ok(self.get(id).await?.area_id)
    }
}
