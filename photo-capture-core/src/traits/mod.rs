pub mod analysis_service;
pub mod camera_device;
pub mod capture_delegate;
pub mod file_picker;
pub mod preview_surface;
pub mod result_store;
