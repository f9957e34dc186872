pub mod logging;
pub mod vulkan;
