pub mod task_handlers;
pub mod task_models;
