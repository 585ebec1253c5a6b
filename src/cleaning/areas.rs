//! Areas are created implicitly by template and task creation; this
//! component only lists them.

use tracing::debug;

use crate::db::Gateway;
use crate::error::{Result, ResultExt};
use crate::models::Area;

#[derive(Clone)]
pub struct Areas {
    gateway: Gateway,
}

impl Areas {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// All areas ordered by id.
    pub async fn list(&self) -> Result<Vec<Area>> {
        let mut db = self.gateway.connection().await?;
        let areas = db
            .list_areas()
            .await
            .context("Error retrieving areas")?;
        debug!(count = areas.len(), "Listed areas");
        Ok(areas)
    }
}
