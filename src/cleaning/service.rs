//! Cleaning Service
//!
//! Use-case operations exposed to the HTTP layer. Everything is delegated to
//! the entity components except the task completion toggles, which first
//! check that the task belongs to the given list.

use std::sync::Arc;

use crate::cleaning::{
    Areas, CleaningTaskLists, CleaningTaskTemplateLists, CleaningTaskTemplates, CleaningTasks,
    NewTemplate, TaskSource,
};
use crate::db::Gateway;
use crate::error::{AppError, Result};
use crate::models::{
    Area, CleaningTaskDetail, CleaningTaskList, CleaningTaskTemplate, CleaningTaskTemplateDetail,
    CleaningTaskTemplateList, StaffMember,
};
use crate::staff::{StaffDirectory, StaffMembers};

#[derive(Clone)]
pub struct CleaningService {
    areas: Areas,
    templates: CleaningTaskTemplates,
    template_lists: CleaningTaskTemplateLists,
    task_lists: CleaningTaskLists,
    tasks: CleaningTasks,
    staff: StaffMembers,
}

impl CleaningService {
    pub fn new(gateway: Gateway, directory: Arc<dyn StaffDirectory>) -> Self {
        Self {
            areas: Areas::new(gateway.clone()),
            templates: CleaningTaskTemplates::new(gateway.clone()),
            template_lists: CleaningTaskTemplateLists::new(gateway.clone()),
            task_lists: CleaningTaskLists::new(gateway.clone()),
            tasks: CleaningTasks::new(gateway),
            staff: StaffMembers::new(directory),
        }
    }

    // == Staff and Areas ==
    pub async fn get_staff_members(&self) -> Result<Vec<StaffMember>> {
        self.staff.list().await
    }

    pub async fn get_staff_member(&self, payroll_number: i32) -> Result<StaffMember> {
        self.staff.get(payroll_number).await
    }

    pub async fn get_areas(&self) -> Result<Vec<Area>> {
        self.areas.list().await
    }

    // == Templates ==
    pub async fn create_cleaning_task_template(&self, template: NewTemplate) -> Result<i32> {
        self.template_lists.create_template(template, None).await
    }

    pub async fn get_cleaning_task_template(&self, id: i32) -> Result<CleaningTaskTemplate> {
        self.templates.get(id).await
    }

    // == Template Lists ==
    pub async fn get_cleaning_task_template_lists(&self) -> Result<Vec<CleaningTaskTemplateList>> {
        self.template_lists.list().await
    }

    pub async fn create_cleaning_task_template_list(
        &self,
        title: &str,
        template_ids: &[i32],
    ) -> Result<i32> {
        self.template_lists.create(title, template_ids).await
    }

    pub async fn get_cleaning_task_template_list(
        &self,
        id: i32,
    ) -> Result<CleaningTaskTemplateList> {
        self.template_lists.get(id).await
    }

    pub async fn delete_cleaning_task_template_list(&self, id: i32) -> Result<()> {
        self.template_lists.delete(id).await
    }

    pub async fn get_cleaning_task_template_ids(&self, list_id: i32) -> Result<Vec<i32>> {
        self.template_lists.list_template_ids(list_id).await
    }

    pub async fn get_cleaning_task_templates(
        &self,
        list_id: i32,
    ) -> Result<Vec<CleaningTaskTemplateDetail>> {
        self.template_lists.list_templates_with_detail(list_id).await
    }

    pub async fn create_cleaning_task_template_in_list(
        &self,
        list_id: i32,
        template: NewTemplate,
    ) -> Result<i32> {
        self.template_lists
            .create_template(template, Some(list_id))
            .await
    }

    pub async fn add_cleaning_task_template_to_list(
        &self,
        list_id: i32,
        template_id: i32,
    ) -> Result<()> {
        self.template_lists.add_template(list_id, template_id).await
    }

    pub async fn remove_cleaning_task_template_from_list(
        &self,
        list_id: i32,
        template_id: i32,
    ) -> Result<()> {
        self.template_lists
            .remove_template(list_id, template_id)
            .await
    }

    // == Task Lists ==
    pub async fn get_cleaning_task_lists(&self) -> Result<Vec<CleaningTaskList>> {
        self.task_lists.list().await
    }

    pub async fn create_cleaning_task_list(
        &self,
        template_list_id: i32,
        date: &str,
        staff_member_id: Option<i32>,
    ) -> Result<i32> {
        self.task_lists
            .create(template_list_id, date, staff_member_id)
            .await
    }

    pub async fn get_cleaning_task_list(&self, id: i32) -> Result<CleaningTaskList> {
        self.task_lists.get(id).await
    }

    pub async fn delete_cleaning_task_list(&self, id: i32) -> Result<()> {
        self.task_lists.delete(id).await
    }

    pub async fn get_cleaning_tasks(&self, list_id: i32) -> Result<Vec<CleaningTaskDetail>> {
        self.task_lists.list_tasks(list_id).await
    }

    pub async fn create_cleaning_task(&self, list_id: i32, source: TaskSource) -> Result<i32> {
        self.task_lists.create_task(list_id, source).await
    }

    pub async fn mark_cleaning_task_as_complete(&self, list_id: i32, task_id: i32) -> Result<()> {
        self.ensure_task_in_list(list_id, task_id).await?;
        self.task_lists.mark_complete(task_id).await
    }

    pub async fn mark_cleaning_task_as_incomplete(
        &self,
        list_id: i32,
        task_id: i32,
    ) -> Result<()> {
        self.ensure_task_in_list(list_id, task_id).await?;
        self.task_lists.mark_incomplete(task_id).await
    }

    pub async fn sign_off_as_manager(&self, list_id: i32, signature: &str) -> Result<()> {
        self.task_lists
            .set_manager_signature(list_id, signature)
            .await
    }

    pub async fn sign_off_as_staff_member(&self, list_id: i32, signature: &str) -> Result<()> {
        self.task_lists
            .set_staff_member_signature(list_id, signature)
            .await
    }

    pub async fn assign_staff_member(&self, list_id: i32, staff_member_id: i32) -> Result<()> {
        self.task_lists
            .assign_staff_member(list_id, staff_member_id)
            .await
    }

    pub async fn delete_cleaning_task(&self, id: i32) -> Result<()> {
        self.tasks.delete(id).await
    }

    async fn ensure_task_in_list(&self, list_id: i32, task_id: i32) -> Result<()> {
        let not_in_list = || AppError::not_found("Cleaning task not found in this cleaning task list");
        match self.tasks.get(task_id).await {
            Ok(task) if task.cleaning_task_list_id == list_id => Ok(()),
            Ok(_) | Err(AppError::NotFound(_)) => Err(not_in_list()),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::AreaSource;
    use crate::staff::StaticStaffDirectory;
    use chrono::Local;

    async fn service_with_two_lists() -> (CleaningService, i32, i32, i32) {
        let service = CleaningService::new(
            Gateway::in_memory(),
            Arc::new(StaticStaffDirectory::default()),
        );
        let template_list = service
            .create_cleaning_task_template_list("Opening", &[])
            .await
            .unwrap();
        service
            .create_cleaning_task_template_in_list(
                template_list,
                NewTemplate {
                    description: "Unlock doors".to_string(),
                    area: AreaSource::New("Entrance".to_string()),
                },
            )
            .await
            .unwrap();

        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        let first = service
            .create_cleaning_task_list(template_list, &today, None)
            .await
            .unwrap();
        let second = service
            .create_cleaning_task_list(template_list, &today, None)
            .await
            .unwrap();
        let task = service.get_cleaning_tasks(first).await.unwrap()[0].id;
        (service, first, second, task)
    }

    #[tokio::test]
    async fn test_mark_requires_list_membership() {
        let (service, first, second, task) = service_with_two_lists().await;

        let result = service.mark_cleaning_task_as_complete(second, task).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(!service.get_cleaning_tasks(first).await.unwrap()[0].completed);

        service
            .mark_cleaning_task_as_complete(first, task)
            .await
            .unwrap();
        assert!(service.get_cleaning_tasks(first).await.unwrap()[0].completed);

        service
            .mark_cleaning_task_as_incomplete(first, task)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mark_missing_task() {
        let (service, first, _, _) = service_with_two_lists().await;
        let result = service.mark_cleaning_task_as_incomplete(first, 4040).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_cleaning_task() {
        let (service, first, _, task) = service_with_two_lists().await;

        service.delete_cleaning_task(task).await.unwrap();
        assert!(matches!(
            service.get_cleaning_tasks(first).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_cleaning_task(task).await,
            Err(AppError::NotFound(_))
        ));
    }
}
