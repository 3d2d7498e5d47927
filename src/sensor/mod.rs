pub mod frame;
pub mod reader;

pub use reader::{open_device, run_pipeline};
