/// Database models for tasktrack
///
/// This module contains the database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and authentication flags
/// - `task`: Tasks, their enumerated type/status, and the assigned-user set

pub mod task;
pub mod user;
