//! Postgres store backed by a sqlx connection pool.

use std::ops::DerefMut;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{
    pool::PoolConnection,
    postgres::{PgConnection, PgPool, PgPoolOptions},
    Postgres,
};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::db::{Store, StoreResult, Tables, Transaction};
use crate::models::{
    Area, CleaningTask, CleaningTaskDetail, CleaningTaskList, CleaningTaskTemplate,
    CleaningTaskTemplateDetail, CleaningTaskTemplateList,
};

type PgTransaction = sqlx::Transaction<'static, Postgres>;

/// The PgStore struct is a wrapper around a sqlx::PgPool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool sized from the database configuration.
    pub async fn connect(url: &str, config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout))
            .connect(url)
            .await?;
        info!(
            max_connections = config.max_connections,
            "Connected to Postgres"
        );
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn connection(&self) -> StoreResult<Box<dyn Tables>> {
        let conn: PoolConnection<Postgres> = self.pool.acquire().await?;
        Ok(Box::new(PgSession { conn }))
    }

    async fn begin(&self) -> StoreResult<Box<dyn Transaction>> {
        let conn: PgTransaction = self.pool.begin().await?;
        Ok(Box::new(PgSession { conn }))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Executor over either a pooled connection or an open transaction.
struct PgSession<C> {
    conn: C,
}

#[async_trait]
impl Transaction for PgSession<PgTransaction> {
    fn tables(&mut self) -> &mut dyn Tables {
        self
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.conn.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.conn.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl<C> Tables for PgSession<C>
where
    C: DerefMut<Target = PgConnection> + Send,
{
    async fn insert_area(&mut self, description: &str) -> StoreResult<i32> {
        let id = sqlx::query_scalar("INSERT INTO area (description) VALUES ($1) RETURNING id")
            .bind(description)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(id)
    }

    async fn list_areas(&mut self) -> StoreResult<Vec<Area>> {
        let areas = sqlx::query_as::<_, Area>("SELECT id, description FROM area ORDER BY id")
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(areas)
    }

    async fn insert_template(&mut self, description: &str, area_id: i32) -> StoreResult<i32> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO cleaning_task_template (description, area_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(description)
        .bind(area_id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(id)
    }

    async fn find_template(&mut self, id: i32) -> StoreResult<Option<CleaningTaskTemplate>> {
        let template = sqlx::query_as::<_, CleaningTaskTemplate>(
            "SELECT id, description, area_id FROM cleaning_task_template WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(template)
    }

    async fn find_template_detail(
        &mut self,
        id: i32,
    ) -> StoreResult<Option<CleaningTaskTemplateDetail>> {
        let template = sqlx::query_as::<_, CleaningTaskTemplateDetail>(
            r#"
            SELECT t.id, t.description, t.area_id, a.description AS area_description
            FROM cleaning_task_template t
            JOIN area a ON a.id = t.area_id
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(template)
    }

    async fn insert_template_list(&mut self, title: &str) -> StoreResult<i32> {
        let id = sqlx::query_scalar(
            "INSERT INTO cleaning_task_template_list (title) VALUES ($1) RETURNING id",
        )
        .bind(title)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(id)
    }

    async fn find_template_list(
        &mut self,
        id: i32,
    ) -> StoreResult<Option<CleaningTaskTemplateList>> {
        let list = sqlx::query_as::<_, CleaningTaskTemplateList>(
            "SELECT id, title FROM cleaning_task_template_list WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(list)
    }

    async fn list_template_lists(&mut self) -> StoreResult<Vec<CleaningTaskTemplateList>> {
        let lists = sqlx::query_as::<_, CleaningTaskTemplateList>(
            "SELECT id, title FROM cleaning_task_template_list ORDER BY id",
        )
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(lists)
    }

    async fn delete_template_list(&mut self, id: i32) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM cleaning_task_template_list WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }

    async fn link_template(&mut self, list_id: i32, template_id: i32) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cleaning_task_template_list_to_cleaning_task_template
                (cleaning_task_template_list_id, cleaning_task_template_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(list_id)
        .bind(template_id)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }

    async fn unlink_template(&mut self, list_id: i32, template_id: i32) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM cleaning_task_template_list_to_cleaning_task_template
            WHERE cleaning_task_template_list_id = $1 AND cleaning_task_template_id = $2
            "#,
        )
        .bind(list_id)
        .bind(template_id)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn template_ids_in_list(&mut self, list_id: i32) -> StoreResult<Vec<i32>> {
        let ids = sqlx::query_scalar(
            r#"
            SELECT cleaning_task_template_id
            FROM cleaning_task_template_list_to_cleaning_task_template
            WHERE cleaning_task_template_list_id = $1
            ORDER BY position
            "#,
        )
        .bind(list_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(ids)
    }

    async fn insert_task_list(
        &mut self,
        date: NaiveDateTime,
        staff_member_id: Option<i32>,
    ) -> StoreResult<i32> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO cleaning_task_list (date, staff_member_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(date)
        .bind(staff_member_id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(id)
    }

    async fn find_task_list(&mut self, id: i32) -> StoreResult<Option<CleaningTaskList>> {
        let list = sqlx::query_as::<_, CleaningTaskList>(
            r#"
            SELECT id, date, manager_signature, staff_member_signature, staff_member_id
            FROM cleaning_task_list
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(list)
    }

    async fn list_task_lists(&mut self) -> StoreResult<Vec<CleaningTaskList>> {
        let lists = sqlx::query_as::<_, CleaningTaskList>(
            r#"
            SELECT id, date, manager_signature, staff_member_signature, staff_member_id
            FROM cleaning_task_list
            ORDER BY date, id
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(lists)
    }

    async fn delete_task_list(&mut self, id: i32) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM cleaning_task_list WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }

    async fn set_manager_signature(&mut self, id: i32, signature: &str) -> StoreResult<u64> {
        let result =
            sqlx::query("UPDATE cleaning_task_list SET manager_signature = $2 WHERE id = $1")
                .bind(id)
                .bind(signature)
                .execute(&mut *self.conn)
                .await?;
        Ok(result.rows_affected())
    }

    async fn set_staff_member_signature(
        &mut self,
        id: i32,
        signature: &str,
    ) -> StoreResult<u64> {
        let result =
            sqlx::query("UPDATE cleaning_task_list SET staff_member_signature = $2 WHERE id = $1")
                .bind(id)
                .bind(signature)
                .execute(&mut *self.conn)
                .await?;
        Ok(result.rows_affected())
    }

    async fn assign_staff_member(&mut self, id: i32, staff_member_id: i32) -> StoreResult<u64> {
        let result =
            sqlx::query("UPDATE cleaning_task_list SET staff_member_id = $2 WHERE id = $1")
                .bind(id)
                .bind(staff_member_id)
                .execute(&mut *self.conn)
                .await?;
        Ok(result.rows_affected())
    }

    async fn insert_task(
        &mut self,
        list_id: i32,
        description: &str,
        area_id: i32,
    ) -> StoreResult<i32> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO cleaning_task (description, cleaning_task_list_id, area_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(description)
        .bind(list_id)
        .bind(area_id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(id)
    }

    async fn find_task(&mut self, id: i32) -> StoreResult<Option<CleaningTask>> {
        let task = sqlx::query_as::<_, CleaningTask>(
            r#"
            SELECT id, description, completed, cleaning_task_list_id, area_id
            FROM cleaning_task
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(task)
    }

    async fn tasks_in_list(&mut self, list_id: i32) -> StoreResult<Vec<CleaningTaskDetail>> {
        let tasks = sqlx::query_as::<_, CleaningTaskDetail>(
            r#"
            SELECT t.id, t.description, t.completed, t.cleaning_task_list_id, t.area_id,
                   a.description AS area_description
            FROM cleaning_task t
            JOIN area a ON a.id = t.area_id
            WHERE t.cleaning_task_list_id = $1
            ORDER BY t.id
            "#,
        )
        .bind(list_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(tasks)
    }

    async fn set_task_completed(&mut self, id: i32, completed: bool) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE cleaning_task SET completed = $2 WHERE id = $1")
            .bind(id)
            .bind(completed)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_task(&mut self, id: i32) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM cleaning_task WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }
}
