//! Row types and request/response models for the cleaning task API
//!
//! This module defines the rows read from the store and the DTOs used for
//! serializing/deserializing HTTP request and response bodies.

pub mod entities;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use entities::{
    Area, CleaningTask, CleaningTaskDetail, CleaningTaskList, CleaningTaskTemplate,
    CleaningTaskTemplateDetail, CleaningTaskTemplateList, StaffMember,
};
pub use requests::{
    AssignStaffMemberRequest, CreateTaskListRequest, CreateTaskRequest, CreateTemplateListRequest,
    CreateTemplateRequest, SignatureRequest,
};
pub use responses::{
    AreasResponse, ErrorResponse, HealthResponse, MessageResponse, StaffMembersResponse,
    TaskCreatedResponse, TaskListCreatedResponse, TaskListResponse, TaskListsResponse,
    TasksResponse, TemplateCreatedResponse, TemplateIdsResponse, TemplateListCreatedResponse,
    TemplateListResponse, TemplateListsResponse, TemplateResponse, TemplatesResponse,
};
