pub mod analysis;
pub mod config;
pub mod device;
pub mod error;
pub mod frame;
pub mod state;
