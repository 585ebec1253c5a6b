//! In-memory store
//!
//! Holds every table in one `Data` value behind a mutex. A session owns
//! the lock for its whole lifetime; a transaction keeps a copy of the tables
//! taken at `begin` and restores it on rollback or drop.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::db::{Store, StoreError, StoreResult, Tables, Transaction};
use crate::models::{
    Area, CleaningTask, CleaningTaskDetail, CleaningTaskList, CleaningTaskTemplate,
    CleaningTaskTemplateDetail, CleaningTaskTemplateList,
};

// == Table Data ==
#[derive(Debug, Clone, Default)]
struct Data {
    last_id: i32,
    areas: BTreeMap<i32, Area>,
    templates: BTreeMap<i32, CleaningTaskTemplate>,
    template_lists: BTreeMap<i32, CleaningTaskTemplateList>,
    /// Join rows in insertion order
    links: Vec<(i32, i32)>,
    task_lists: BTreeMap<i32, CleaningTaskList>,
    tasks: BTreeMap<i32, CleaningTask>,
}

impl Data {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn area_description(&self, area_id: i32) -> StoreResult<String> {
        self.areas
            .get(&area_id)
            .map(|area| area.description.clone())
            .ok_or(StoreError::MissingReference)
    }
}

// == Memory Store ==
/// Store keeping every table in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Data>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn connection(&self) -> StoreResult<Box<dyn Tables>> {
        let guard = self.data.clone().lock_owned().await;
        Ok(Box::new(MemorySession {
            guard,
            snapshot: None,
        }))
    }

    async fn begin(&self) -> StoreResult<Box<dyn Transaction>> {
        let guard = self.data.clone().lock_owned().await;
        let snapshot = Some(guard.clone());
        Ok(Box::new(MemorySession { guard, snapshot }))
    }

    async fn close(&self) {}
}

struct MemorySession {
    guard: OwnedMutexGuard<Data>,
    /// Tables as they were when the transaction began
    snapshot: Option<Data>,
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
        }
    }
}

#[async_trait]
impl Transaction for MemorySession {
    fn tables(&mut self) -> &mut dyn Tables {
        self
    }

    async fn commit(mut self: Box<Self>) -> StoreResult<()> {
        self.snapshot = None;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        // Dropping restores the snapshot.
        Ok(())
    }
}

#[async_trait]
impl Tables for MemorySession {
    async fn insert_area(&mut self, description: &str) -> StoreResult<i32> {
        let data = &mut *self.guard;
        let id = data.next_id();
        data.areas.insert(
            id,
            Area {
                id,
                description: description.to_string(),
            },
        );
        Ok(id)
    }

    async fn list_areas(&mut self) -> StoreResult<Vec<Area>> {
        Ok(self.guard.areas.values().cloned().collect())
    }

    async fn insert_template(&mut self, description: &str, area_id: i32) -> StoreResult<i32> {
        let data = &mut *self.guard;
        if !data.areas.contains_key(&area_id) {
            return Err(StoreError::MissingReference);
        }
        let id = data.next_id();
        data.templates.insert(
            id,
            CleaningTaskTemplate {
                id,
                description: description.to_string(),
                area_id,
            },
        );
        Ok(id)
    }

    async fn find_template(&mut self, id: i32) -> StoreResult<Option<CleaningTaskTemplate>> {
        Ok(self.guard.templates.get(&id).cloned())
    }

    async fn find_template_detail(
        &mut self,
        id: i32,
    ) -> StoreResult<Option<CleaningTaskTemplateDetail>> {
        let Some(template) = self.guard.templates.get(&id) else {
            return Ok(None);
        };
        Ok(Some(CleaningTaskTemplateDetail {
            id: template.id,
            description: template.description.clone(),
            area_id: template.area_id,
            area_description: self.guard.area_description(template.area_id)?,
        }))
    }

    async fn insert_template_list(&mut self, title: &str) -> StoreResult<i32> {
        let data = &mut *self.guard;
        let id = data.next_id();
        data.template_lists.insert(
            id,
            CleaningTaskTemplateList {
                id,
                title: title.to_string(),
            },
        );
        Ok(id)
    }

    async fn find_template_list(
        &mut self,
        id: i32,
    ) -> StoreResult<Option<CleaningTaskTemplateList>> {
        Ok(self.guard.template_lists.get(&id).cloned())
    }

    async fn list_template_lists(&mut self) -> StoreResult<Vec<CleaningTaskTemplateList>> {
        Ok(self.guard.template_lists.values().cloned().collect())
    }

    async fn delete_template_list(&mut self, id: i32) -> StoreResult<u64> {
        let data = &mut *self.guard;
        if data.template_lists.remove(&id).is_none() {
            return Ok(0);
        }
        data.links.retain(|(list_id, _)| *list_id != id);
        Ok(1)
    }

    async fn link_template(&mut self, list_id: i32, template_id: i32) -> StoreResult<()> {
        let data = &mut *self.guard;
        if !data.template_lists.contains_key(&list_id) || !data.templates.contains_key(&template_id)
        {
            return Err(StoreError::MissingReference);
        }
        if data.links.contains(&(list_id, template_id)) {
            return Err(StoreError::Duplicate);
        }
        data.links.push((list_id, template_id));
        Ok(())
    }

    async fn unlink_template(&mut self, list_id: i32, template_id: i32) -> StoreResult<u64> {
        let links = &mut self.guard.links;
        let before = links.len();
        links.retain(|link| *link != (list_id, template_id));
        Ok((before - links.len()) as u64)
    }

    async fn template_ids_in_list(&mut self, list_id: i32) -> StoreResult<Vec<i32>> {
        Ok(self
            .guard
            .links
            .iter()
            .filter(|(id, _)| *id == list_id)
            .map(|(_, template_id)| *template_id)
            .collect())
    }

    async fn insert_task_list(
        &mut self,
        date: NaiveDateTime,
        staff_member_id: Option<i32>,
    ) -> StoreResult<i32> {
        let data = &mut *self.guard;
        let id = data.next_id();
        data.task_lists.insert(
            id,
            CleaningTaskList {
                id,
                date,
                manager_signature: None,
                staff_member_signature: None,
                staff_member_id,
            },
        );
        Ok(id)
    }

    async fn find_task_list(&mut self, id: i32) -> StoreResult<Option<CleaningTaskList>> {
        Ok(self.guard.task_lists.get(&id).cloned())
    }

    async fn list_task_lists(&mut self) -> StoreResult<Vec<CleaningTaskList>> {
        let mut lists: Vec<CleaningTaskList> = self.guard.task_lists.values().cloned().collect();
        lists.sort_by_key(|list| (list.date, list.id));
        Ok(lists)
    }

    async fn delete_task_list(&mut self, id: i32) -> StoreResult<u64> {
        let data = &mut *self.guard;
        if data.task_lists.remove(&id).is_none() {
            return Ok(0);
        }
        data.tasks.retain(|_, task| task.cleaning_task_list_id != id);
        Ok(1)
    }

    async fn set_manager_signature(&mut self, id: i32, signature: &str) -> StoreResult<u64> {
        Ok(match self.guard.task_lists.get_mut(&id) {
            Some(list) => {
                list.manager_signature = Some(signature.to_string());
                1
            }
            None => 0,
        })
    }

    async fn set_staff_member_signature(
        &mut self,
        id: i32,
        signature: &str,
    ) -> StoreResult<u64> {
        Ok(match self.guard.task_lists.get_mut(&id) {
            Some(list) => {
                list.staff_member_signature = Some(signature.to_string());
                1
            }
            None => 0,
        })
    }

    async fn assign_staff_member(&mut self, id: i32, staff_member_id: i32) -> StoreResult<u64> {
        Ok(match self.guard.task_lists.get_mut(&id) {
            Some(list) => {
                list.staff_member_id = Some(staff_member_id);
                1
            }
            None => 0,
        })
    }

    async fn insert_task(
        &mut self,
        list_id: i32,
        description: &str,
        area_id: i32,
    ) -> StoreResult<i32> {
        let data = &mut *self.guard;
        if !data.task_lists.contains_key(&list_id) || !data.areas.contains_key(&area_id) {
            return Err(StoreError::MissingReference);
        }
        let id = data.next_id();
        data.tasks.insert(
            id,
            CleaningTask {
                id,
                description: description.to_string(),
                completed: false,
                cleaning_task_list_id: list_id,
                area_id,
            },
        );
        Ok(id)
    }

    async fn find_task(&mut self, id: i32) -> StoreResult<Option<CleaningTask>> {
        Ok(self.guard.tasks.get(&id).cloned())
    }

    async fn tasks_in_list(&mut self, list_id: i32) -> StoreResult<Vec<CleaningTaskDetail>> {
        let data = &*self.guard;
        data.tasks
            .values()
            .filter(|task| task.cleaning_task_list_id == list_id)
            .map(|task| {
                Ok(CleaningTaskDetail {
                    id: task.id,
                    description: task.description.clone(),
                    completed: task.completed,
                    cleaning_task_list_id: task.cleaning_task_list_id,
                    area_id: task.area_id,
                    area_description: data.area_description(task.area_id)?,
                })
            })
            .collect()
    }

    async fn set_task_completed(&mut self, id: i32, completed: bool) -> StoreResult<u64> {
        Ok(match self.guard.tasks.get_mut(&id) {
            Some(task) => {
                task.completed = completed;
                1
            }
            None => 0,
        })
    }

    async fn delete_task(&mut self, id: i32) -> StoreResult<u64> {
        Ok(self.guard.tasks.remove(&id).map_or(0, |_| 1))
    }
}
