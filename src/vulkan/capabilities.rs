//! The pull-based query surface over the Vulkan driver.
//!
//! Device selection and swapchain negotiation only ever read from the driver
//! through this trait, which keeps every decision testable without a GPU.

use ash::vk;

use crate::vulkan::{
    errors::SwapchainError,
    physical_device::{
        DeviceProperties, FeatureRequirementNode, MemoryLayout,
        QueueFamilyInfo,
    },
};

/// Read-only access to the capabilities reported by a Vulkan implementation.
///
/// Every method maps onto one driver query. Fallible queries return the raw
/// `vk::Result` so callers can wrap it into the error for their stage.
pub trait CapabilityQuery {
    fn enumerate_physical_devices(
        &self,
    ) -> Result<Vec<vk::PhysicalDevice>, vk::Result>;

    fn queue_families(
        &self,
        device: vk::PhysicalDevice,
    ) -> Vec<QueueFamilyInfo>;

    fn features(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceFeatures;

    /// Fill a chain of feature blocks shaped like `requested`. The result has
    /// the same length and tags as `requested`, in the same order.
    fn features_extended(
        &self,
        device: vk::PhysicalDevice,
        requested: &[FeatureRequirementNode],
    ) -> Vec<FeatureRequirementNode>;

    fn properties(&self, device: vk::PhysicalDevice) -> DeviceProperties;

    fn memory_layout(&self, device: vk::PhysicalDevice) -> MemoryLayout;

    fn device_extensions(
        &self,
        device: vk::PhysicalDevice,
    ) -> Result<Vec<String>, vk::Result>;

    fn instance_extensions(&self) -> Result<Vec<String>, vk::Result>;

    fn instance_layers(&self) -> Result<Vec<String>, vk::Result>;

    fn format_properties(
        &self,
        device: vk::PhysicalDevice,
        format: vk::Format,
    ) -> vk::FormatProperties;

    fn surface_support(
        &self,
        device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> Result<bool, vk::Result>;

    fn surface_capabilities(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<vk::SurfaceCapabilitiesKHR, vk::Result>;

    fn surface_formats(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::SurfaceFormatKHR>, vk::Result>;

    fn surface_present_modes(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::PresentModeKHR>, vk::Result>;
}

/// Everything the surface reports about presenting from one device.
///
/// Queried fresh for every negotiation and never cached.
#[derive(Debug, Clone)]
pub struct SurfaceSupportDetails {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SurfaceSupportDetails {
    /// Query the capabilities, formats, and present modes of the surface.
    pub fn query(
        query: &impl CapabilityQuery,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Self, SwapchainError> {
        let capabilities = query
            .surface_capabilities(device, surface)
            .map_err(SwapchainError::SurfaceSupportQueryFailed)?;
        let formats = query
            .surface_formats(device, surface)
            .map_err(SwapchainError::SurfaceSupportQueryFailed)?;
        let present_modes = query
            .surface_present_modes(device, surface)
            .map_err(SwapchainError::SurfaceSupportQueryFailed)?;
        Ok(Self {
            capabilities,
            formats,
            present_modes,
        })
    }
}
