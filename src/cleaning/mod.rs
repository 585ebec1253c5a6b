//! Cleaning Module
//!
//! Entity components for areas, templates, template lists, task lists and
//! tasks, plus the [`CleaningService`] facade composing them.
//!
//! Creation operations that may either reference an existing row or create a
//! new one take an explicit source variant instead of optional arguments.

mod areas;
mod service;
mod task_lists;
mod tasks;
mod template_lists;
mod templates;


pub use areas::Areas;
pub use service::CleaningService;
pub use task_lists::{check_not_past, parse_date, CleaningTaskLists};
pub use tasks::CleaningTasks;
pub use template_lists::CleaningTaskTemplateLists;
pub use templates::CleaningTaskTemplates;

use crate::error::{AppError, Result};

// == Create-or-reference Sources ==
/// Area of a new template or task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaSource {
    /// Reference an existing area by id
    Existing(i32),
    /// Create an area with this description
    New(String),
}

/// Template to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTemplate {
    pub description: String,
    pub area: AreaSource,
}

impl NewTemplate {
    fn validate(&self) -> Result<()> {
        require_text(&self.description, "Description")?;
        if let AreaSource::New(area_description) = &self.area {
            require_text(area_description, "Area description")?;
        }
        Ok(())
    }
}

/// Where a new task's description and area come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSource {
    /// Copy description and area from a template
    FromTemplate(i32),
    NewWithExistingArea {
        description: String,
        area_id: i32,
    },
    NewWithNewArea {
        description: String,
        area_description: String,
    },
}

impl TaskSource {
    fn validate(&self) -> Result<()> {
        match self {
            TaskSource::FromTemplate(_) => Ok(()),
            TaskSource::NewWithExistingArea { description, .. } => {
                require_text(description, "Description")
            }
            TaskSource::NewWithNewArea {
                description,
                area_description,
            } => {
                require_text(description, "Description")?;
                require_text(area_description, "Area description")
            }
        }
    }
}

/// Rejects empty or whitespace-only text.
pub(crate) fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::invalid(format!("{field} cannot be empty")));
    }
    Ok(())
}
