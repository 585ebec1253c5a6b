//! Store abstraction
//!
//! [`Tables`] is the set of parameterised row operations the cleaning
//! components run. A [`Store`] hands out executors for it: a plain connection
//! for single statements, or a [`Transaction`] for all-or-nothing work.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::{
    Area, CleaningTask, CleaningTaskDetail, CleaningTaskList, CleaningTaskTemplate,
    CleaningTaskTemplateDetail, CleaningTaskTemplateList,
};

// == Store Error ==
/// Failure reported by a store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique constraint rejected the row
    #[error("row already exists")]
    Duplicate,

    /// A foreign key referenced a row that does not exist
    #[error("referenced row does not exist")]
    MissingReference,

    #[error(transparent)]
    Database(sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => Self::Duplicate,
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                Self::MissingReference
            }
            other => Self::Database(other),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Row Operations ==
/// Row operations over the cleaning task schema.
///
/// Update and delete operations return the number of affected rows.
#[async_trait]
pub trait Tables: Send {
    // Area
    async fn insert_area(&mut self, description: &str) -> StoreResult<i32>;
    async fn list_areas(&mut self) -> StoreResult<Vec<Area>>;

    // CleaningTaskTemplate
    async fn insert_template(&mut self, description: &str, area_id: i32) -> StoreResult<i32>;
    async fn find_template(&mut self, id: i32) -> StoreResult<Option<CleaningTaskTemplate>>;
    async fn find_template_detail(
        &mut self,
        id: i32,
    ) -> StoreResult<Option<CleaningTaskTemplateDetail>>;

    // CleaningTaskTemplateList and its join rows
    async fn insert_template_list(&mut self, title: &str) -> StoreResult<i32>;
    async fn find_template_list(&mut self, id: i32)
        -> StoreResult<Option<CleaningTaskTemplateList>>;
    async fn list_template_lists(&mut self) -> StoreResult<Vec<CleaningTaskTemplateList>>;
    async fn delete_template_list(&mut self, id: i32) -> StoreResult<u64>;
    async fn link_template(&mut self, list_id: i32, template_id: i32) -> StoreResult<()>;
    async fn unlink_template(&mut self, list_id: i32, template_id: i32) -> StoreResult<u64>;
    async fn template_ids_in_list(&mut self, list_id: i32) -> StoreResult<Vec<i32>>;

    // CleaningTaskList
    async fn insert_task_list(
        &mut self,
        date: NaiveDateTime,
        staff_member_id: Option<i32>,
    ) -> StoreResult<i32>;
    async fn find_task_list(&mut self, id: i32) -> StoreResult<Option<CleaningTaskList>>;
    async fn list_task_lists(&mut self) -> StoreResult<Vec<CleaningTaskList>>;
    async fn delete_task_list(&mut self, id: i32) -> StoreResult<u64>;
    async fn set_manager_signature(&mut self, id: i32, signature: &str) -> StoreResult<u64>;
    async fn set_staff_member_signature(&mut self, id: i32, signature: &str)
        -> StoreResult<u64>;
    async fn assign_staff_member(&mut self, id: i32, staff_member_id: i32) -> StoreResult<u64>;

    // CleaningTask
    async fn insert_task(
        &mut self,
        list_id: i32,
        description: &str,
        area_id: i32,
    ) -> StoreResult<i32>;
    async fn find_task(&mut self, id: i32) -> StoreResult<Option<CleaningTask>>;
    async fn tasks_in_list(&mut self, list_id: i32) -> StoreResult<Vec<CleaningTaskDetail>>;
    async fn set_task_completed(&mut self, id: i32, completed: bool) -> StoreResult<u64>;
    async fn delete_task(&mut self, id: i32) -> StoreResult<u64>;
}

// == Transactions ==
/// A [`Tables`] executor whose writes become visible only on commit.
///
/// Dropping a transaction without committing rolls it back.
#[async_trait]
pub trait Transaction: Tables {
    fn tables(&mut self) -> &mut dyn Tables;
    async fn commit(self: Box<Self>) -> StoreResult<()>;
    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

// == Store ==
/// Source of connections and transactions.
#[async_trait]
pub trait Store: Send + Sync {
    /// Acquires one connection; it is released when the executor is dropped.
    async fn connection(&self) -> StoreResult<Box<dyn Tables>>;

    /// Opens a transaction on a freshly acquired connection.
    async fn begin(&self) -> StoreResult<Box<dyn Transaction>>;

    /// Releases every pooled resource.
    async fn close(&self);
}
