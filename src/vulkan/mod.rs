//! Vulkan instance creation, physical device selection, logical device
//! creation, and swapchain negotiation.

mod api_version;
mod capabilities;
mod device;
mod ffi;
mod instance;
mod physical_device;
mod swapchain;

#[cfg(test)]
mod testing;

pub mod errors;

pub use self::{
    api_version::ApiVersion,
    capabilities::{CapabilityQuery, SurfaceSupportDetails},
    device::{
        default_queue_descriptions, CustomQueueDescription, Device,
        DeviceBuilder, GpuQueue,
    },
    errors::{
        DeviceError, InstanceError, PhysicalDeviceError, QueueError,
        SwapchainError,
    },
    instance::{
        choose_api_version, missing_names, windowing_extensions,
        DebugMessageSink, Instance, InstanceBuilder, LogSink, NoopSink,
        SystemInfo, VALIDATION_LAYER_NAME,
    },
    physical_device::{
        chain_matches, choose_device, dedicated_compute_queue_index,
        dedicated_transfer_queue_index, features_match, graphics_queue_index,
        missing_features, node_matches, present_queue_index, score,
        select_physical_device, separate_compute_queue_index,
        separate_transfer_queue_index, DeviceDescriptor, DeviceProperties,
        FeatureRequirementNode, MemoryHeap, MemoryLayout, PhysicalDevice,
        PreferredDeviceType, PresentationSupport, QueueFamilyAnalysis,
        QueueFamilyInfo, QueueType, SelectionCriteria, SuitabilityVerdict,
        FEATURE_FIELD_CAPACITY,
    },
    swapchain::{
        choose_array_layers, choose_extent, choose_image_count,
        choose_pre_transform, choose_present_mode, choose_sharing_mode,
        choose_surface_format, default_formats, default_present_modes,
        negotiate, Swapchain, SwapchainConfig, SwapchainRequest,
    },
};
