//! Cleaning task template lists
//!
//! A template list is a named checklist blueprint joined to its templates
//! through `cleaning_task_template_list_to_cleaning_task_template`. Join rows
//! are unique per (list, template) pair.

use tracing::{debug, info};

use crate::cleaning::{require_text, AreaSource, NewTemplate};
use crate::db::{Gateway, StoreError};
use crate::error::{AppError, Result, ResultExt};
use crate::models::{CleaningTaskTemplateDetail, CleaningTaskTemplateList};

#[derive(Clone)]
pub struct CleaningTaskTemplateLists {
    gateway: Gateway,
}

impl CleaningTaskTemplateLists {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Creates a list and links every template id, all or nothing.
    pub async fn create(&self, title: &str, template_ids: &[i32]) -> Result<i32> {
        require_text(title, "Title")?;

        let title = title.to_string();
        let template_ids = template_ids.to_vec();
        let id = self
            .gateway
            .transaction(move |db| {
                Box::pin(async move {
                    let list_id = db.insert_template_list(&title).await?;
                    for template_id in template_ids {
                        db.link_template(list_id, template_id)
                            .await
                            .map_err(|e| link_error(e, "Cleaning task template not found"))?;
                    }
                    Ok(list_id)
                })
            })
            .await
            .context("Error creating cleaning task template list")?;

        info!(template_list_id = id, "Cleaning task template list created");
        Ok(id)
    }

    pub async fn get(&self, id: i32) -> Result<CleaningTaskTemplateList> {
        let mut db = self.gateway.connection().await?;
        db.find_template_list(id)
            .await
            .context("Error retrieving cleaning task template list")?
            .ok_or_else(|| AppError::not_found("Cleaning task template list not found"))
    }

    /// All template lists ordered by id.
    pub async fn list(&self) -> Result<Vec<CleaningTaskTemplateList>> {
        let mut db = self.gateway.connection().await?;
        db.list_template_lists()
            .await
            .context("Error retrieving cleaning task template lists")
    }

    /// Links an existing template to a list.
    pub async fn add_template(&self, list_id: i32, template_id: i32) -> Result<()> {
        let mut db = self.gateway.connection().await?;
        db.link_template(list_id, template_id)
            .await
            .map_err(|e| {
                link_error(e, "Cleaning task template or template list not found")
            })
            .context("Error adding cleaning task template to list")?;
        info!(
            template_list_id = list_id,
            template_id, "Cleaning task template added to list"
        );
        Ok(())
    }

    /// Creates a template, with or without a new area, optionally linked to a list.
    ///
    /// Referencing an existing area without a list is a single insert; every
    /// other combination runs in one transaction.
    pub async fn create_template(&self, template: NewTemplate, list_id: Option<i32>) -> Result<i32> {
        template.validate()?;
        let NewTemplate { description, area } = template;

        let id = match (area, list_id) {
            (AreaSource::Existing(area_id), None) => {
                let mut db = self.gateway.connection().await?;
                db.insert_template(&description, area_id)
                    .await
                    .map_err(area_error)
            }
            (area, list_id) => {
                self.gateway
                    .transaction(move |db| {
                        Box::pin(async move {
                            let area_id = match area {
                                AreaSource::Existing(area_id) => area_id,
                                AreaSource::New(area_description) => {
                                    db.insert_area(&area_description).await?
                                }
                            };
                            let id = db
                                .insert_template(&description, area_id)
                                .await
                                .map_err(area_error)?;
                            if let Some(list_id) = list_id {
                                db.link_template(list_id, id).await.map_err(|e| {
                                    link_error(e, "Cleaning task template list not found")
                                })?;
                            }
                            Ok(id)
                        })
                    })
                    .await
            }
        }
        .context("Error creating cleaning task template")?;

        info!(template_id = id, ?list_id, "Cleaning task template created");
        Ok(id)
    }

    /// Unlinks a template from a list.
    pub async fn remove_template(&self, list_id: i32, template_id: i32) -> Result<()> {
        let mut db = self.gateway.connection().await?;
        let removed = db
            .unlink_template(list_id, template_id)
            .await
            .context("Error removing cleaning task template from list")?;
        if removed == 0 {
            return Err(AppError::not_found(
                "Cleaning task template is not in this template list",
            ));
        }
        info!(
            template_list_id = list_id,
            template_id, "Cleaning task template removed from list"
        );
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut db = self.gateway.connection().await?;
        let deleted = db
            .delete_template_list(id)
            .await
            .context("Error deleting cleaning task template list")?;
        if deleted == 0 {
            return Err(AppError::not_found("Cleaning task template list not found"));
        }
        info!(template_list_id = id, "Cleaning task template list deleted");
        Ok(())
    }

    /// Template ids joined to a list, in insertion order.
    pub async fn list_template_ids(&self, list_id: i32) -> Result<Vec<i32>> {
        let mut db = self.gateway.connection().await?;
        let ids = db
            .template_ids_in_list(list_id)
            .await
            .context("Error retrieving cleaning task template ids")?;
        if ids.is_empty() {
            return Err(AppError::not_found(
                "No cleaning task templates linked to this template list",
            ));
        }
        debug!(template_list_id = list_id, count = ids.len(), "Listed template ids");
        Ok(ids)
    }

    /// Templates joined to a list with their area descriptions, in insertion order.
    pub async fn list_templates_with_detail(
        &self,
        list_id: i32,
    ) -> Result<Vec<CleaningTaskTemplateDetail>> {
        let ids = self.list_template_ids(list_id).await?;

        let mut db = self.gateway.connection().await?;
        let mut templates = Vec::with_capacity(ids.len());
        for id in ids {
            let template = db
                .find_template_detail(id)
                .await
                .context("Error retrieving cleaning task templates")?
                .ok_or_else(|| AppError::not_found("Cleaning task template not found"))?;
            templates.push(template);
        }
        Ok(templates)
    }
}

fn link_error(err: StoreError, missing: &str) -> AppError {
    match err {
        StoreError::Duplicate => {
            AppError::invalid("Cleaning task template is already in this template list")
        }
        StoreError::MissingReference => AppError::not_found(missing),
        other => AppError::Store(other),
    }
}

fn area_error(err: StoreError) -> AppError {
    match err {
        StoreError::MissingReference => AppError::not_found("Area not found"),
        other => AppError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::{Areas, CleaningTaskTemplates};

    async fn seed_templates(gateway: &Gateway) -> (i32, i32) {
        let mut db = gateway.connection().await.unwrap();
        let area = db.insert_area("Sports hall").await.unwrap();
        let first = db.insert_template("Sweep court", area).await.unwrap();
        let second = db.insert_template("Stack chairs", area).await.unwrap();
        (first, second)
    }

    #[tokio::test]
    async fn test_create_and_list_template_ids() {
        let gateway = Gateway::in_memory();
        let (first, second) = seed_templates(&gateway).await;
        let lists = CleaningTaskTemplateLists::new(gateway);

        let id = lists.create("Mondays AM", &[first, second]).await.unwrap();

        assert_eq!(lists.get(id).await.unwrap().title, "Mondays AM");
        assert_eq!(lists.list_template_ids(id).await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_create_with_empty_title_writes_nothing() {
        let gateway = Gateway::in_memory();
        let lists = CleaningTaskTemplateLists::new(gateway);

        let result = lists.create("", &[]).await;

        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert!(lists.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_missing_template_rolls_back() {
        let gateway = Gateway::in_memory();
        let (first, _) = seed_templates(&gateway).await;
        let lists = CleaningTaskTemplateLists::new(gateway);

        let result = lists.create("Evenings", &[first, 999]).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(lists.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_repeated_template_rolls_back() {
        let gateway = Gateway::in_memory();
        let (first, _) = seed_templates(&gateway).await;
        let lists = CleaningTaskTemplateLists::new(gateway);

        let result = lists.create("Dup", &[first, first]).await;

        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert!(lists.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_template_rejects_duplicate() {
        let gateway = Gateway::in_memory();
        let (first, _) = seed_templates(&gateway).await;
        let lists = CleaningTaskTemplateLists::new(gateway);
        let id = lists.create("Weekend", &[first]).await.unwrap();

        let result = lists.add_template(id, first).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_remove_template() {
        let gateway = Gateway::in_memory();
        let (first, second) = seed_templates(&gateway).await;
        let lists = CleaningTaskTemplateLists::new(gateway);
        let id = lists.create("Weekend", &[first, second]).await.unwrap();

        lists.remove_template(id, first).await.unwrap();
        assert_eq!(lists.list_template_ids(id).await.unwrap(), vec![second]);
        assert!(matches!(
            lists.remove_template(id, first).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_list() {
        let lists = CleaningTaskTemplateLists::new(Gateway::in_memory());
        assert!(matches!(lists.delete(12).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_template_ids_empty_list() {
        let lists = CleaningTaskTemplateLists::new(Gateway::in_memory());
        let id = lists.create("Empty", &[]).await.unwrap();
        assert!(matches!(
            lists.list_template_ids(id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_template_with_new_area_round_trip() {
        let gateway = Gateway::in_memory();
        let lists = CleaningTaskTemplateLists::new(gateway.clone());
        let templates = CleaningTaskTemplates::new(gateway.clone());

        let id = lists
            .create_template(
                NewTemplate {
                    description: "Hose down poolside".to_string(),
                    area: AreaSource::New("Poolside".to_string()),
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(
            templates.get_description(id).await.unwrap(),
            "Hose down poolside"
        );
        let area_id = templates.get_area(id).await.unwrap();
        let areas = Areas::new(gateway).list().await.unwrap();
        let area = areas.iter().find(|a| a.id == area_id).unwrap();
        assert_eq!(area.description, "Poolside");
    }

    #[tokio::test]
    async fn test_create_template_into_list() {
        let gateway = Gateway::in_memory();
        let lists = CleaningTaskTemplateLists::new(gateway);
        let list_id = lists.create("Closing", &[]).await.unwrap();

        let id = lists
            .create_template(
                NewTemplate {
                    description: "Lock fire exits".to_string(),
                    area: AreaSource::New("Corridor".to_string()),
                },
                Some(list_id),
            )
            .await
            .unwrap();

        let detail = lists.list_templates_with_detail(list_id).await.unwrap();
        assert_eq!(detail.len(), 1);
        assert_eq!(detail[0].id, id);
        assert_eq!(detail[0].area_description, "Corridor");
    }

    #[tokio::test]
    async fn test_create_template_into_missing_list_rolls_back_area() {
        let gateway = Gateway::in_memory();
        let lists = CleaningTaskTemplateLists::new(gateway.clone());

        let result = lists
            .create_template(
                NewTemplate {
                    description: "Lock fire exits".to_string(),
                    area: AreaSource::New("Corridor".to_string()),
                },
                Some(77),
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(Areas::new(gateway).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_template_with_missing_area() {
        let lists = CleaningTaskTemplateLists::new(Gateway::in_memory());
        let result = lists
            .create_template(
                NewTemplate {
                    description: "Polish mirrors".to_string(),
                    area: AreaSource::Existing(5),
                },
                None,
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(ref msg)) if msg == "Area not found"));
    }
}
