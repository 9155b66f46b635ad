pub mod project_state;
pub mod projects;
