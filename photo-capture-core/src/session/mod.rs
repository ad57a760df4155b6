pub mod machine;
pub mod media_session;
pub mod resource_manager;
pub mod selector;
pub mod submission;
