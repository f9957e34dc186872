use ash::vk;
use thiserror::Error;

use crate::vulkan::ApiVersion;

/// This enum represents errors which can occur when building and handling the
/// Vulkan instance.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("Unable to load the Vulkan library")]
    VulkanUnavailable(#[source] ash::LoadingError),

    #[error("Vulkan {required} is required but the loader only supports {available}")]
    VulkanVersionUnavailable {
        required: ApiVersion,
        available: ApiVersion,
    },

    #[error("Unable to list the available Vulkan extensions on this platform")]
    UnableToListAvailableExtensions(#[source] vk::Result),

    #[error("Unable to list the available Vulkan layers on this platform")]
    UnableToListAvailableLayers(#[source] vk::Result),

    #[error("Required extensions are not available on this platform: {:?}", .0)]
    RequiredExtensionsNotPresent(Vec<String>),

    #[error("Requested layers are not available on this platform: {:?}", .0)]
    RequestedLayersNotPresent(Vec<String>),

    #[error("The windowing extensions for this platform are not available")]
    WindowingExtensionsNotPresent,

    #[error("Extension or layer name contains an interior nul byte: {:?}", .0)]
    InvalidName(String),

    #[error("Unable to create the Vulkan instance")]
    UnableToCreateInstance(#[source] vk::Result),

    #[error("Unable to setup the Vulkan debug messenger")]
    UnableToCreateDebugMessenger(#[source] vk::Result),
}

/// This enum represents the errors which can occur while attempting to find
/// a usable physical device for the application.
#[derive(Debug, Error)]
pub enum PhysicalDeviceError {
    #[error(
        "A surface is required for presentation but none was provided and \
         surface initialization was not deferred"
    )]
    NoSurfaceProvided,

    #[error("Unable to enumerate physical devices")]
    EnumerationFailed(#[source] vk::Result),

    #[error("No physical devices were found")]
    NoPhysicalDevicesFound,

    #[error("No suitable physical device could be found for this application")]
    NoSuitableDevice,
}

/// This enum represents errors which can occur while resolving the queue
/// family indices used by the application.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("Present queue unavailable")]
    PresentQueueUnavailable,

    #[error("Graphics queue unavailable")]
    GraphicsQueueUnavailable,

    #[error("Compute queue unavailable")]
    ComputeQueueUnavailable,

    #[error("Transfer queue unavailable")]
    TransferQueueUnavailable,

    #[error("Only compute and transfer queues can be dedicated")]
    InvalidQueueFamilyIndex,
}

/// Errors raised while creating the logical device.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Extension name contains an interior nul byte: {:?}", .0)]
    InvalidExtensionName(String),

    #[error("Unable to create the logical device")]
    UnableToCreateDevice(#[source] vk::Result),
}

/// Errors raised while negotiating and creating the swapchain.
#[derive(Debug, Error)]
pub enum SwapchainError {
    #[error("Surface handle not provided")]
    SurfaceHandleNotProvided,

    #[error("Unable to query the surface support details")]
    SurfaceSupportQueryFailed(#[source] vk::Result),

    #[error("The surface reported no supported formats")]
    NoSurfaceFormats,

    #[error("Unable to create the swapchain")]
    SwapchainCreationFailed(#[source] vk::Result),

    #[error("Unable to get the swapchain images")]
    SwapchainImageRetrievalFailed(#[source] vk::Result),

    #[error("Unable to create the swapchain image views")]
    ImageViewCreationFailed(#[source] vk::Result),

    #[error(transparent)]
    QueueUnavailable(#[from] QueueError),
}
