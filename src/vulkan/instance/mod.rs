mod builder;
mod debug_callback;
mod extensions;
mod layers;
mod system_info;

use ash::{vk, Entry};

pub use self::{
    builder::{choose_api_version, InstanceBuilder},
    debug_callback::{DebugMessageSink, LogSink, NoopSink},
    extensions::{missing_names, windowing_extensions},
    system_info::{SystemInfo, VALIDATION_LAYER_NAME},
};
use crate::vulkan::{
    capabilities::CapabilityQuery,
    ffi::{link_feature_blocks, owned_name, RawFeatureBlock},
    physical_device::{
        DeviceProperties, FeatureRequirementNode, MemoryLayout,
        QueueFamilyInfo, SelectionCriteria,
    },
    ApiVersion,
};

/// The Instance struct holds the ash entry and ash library handle along with
/// the debug messenger and the surface loader.
///
/// Build one with [InstanceBuilder].
pub struct Instance {
    /// The Vulkan function loader.
    pub entry: Entry,

    /// The Ash Vulkan instance.
    pub ash: ash::Instance,

    /// Present unless the instance is headless.
    surface_loader: Option<ash::khr::surface::Instance>,

    debug_utils: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,

    /// Referenced by the messenger's user data, so it must outlive it.
    #[allow(unused)]
    debug_sink: Box<Box<dyn DebugMessageSink>>,

    headless: bool,
    api_version: ApiVersion,
    allocation_callbacks: Option<vk::AllocationCallbacks<'static>>,
}

impl Instance {
    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    pub fn is_headless(&self) -> bool {
        self.headless
    }

    pub fn allocation_callbacks(&self) -> Option<&vk::AllocationCallbacks<'static>> {
        self.allocation_callbacks.as_ref()
    }

    pub fn surface_loader(&self) -> Option<&ash::khr::surface::Instance> {
        self.surface_loader.as_ref()
    }

    /// Selection criteria which already know this instance's API version and
    /// whether it is headless.
    pub fn selection_criteria(&self) -> SelectionCriteria {
        SelectionCriteria::default()
            .instance_version(self.api_version)
            .headless(self.headless)
    }

    /// Destroy a surface which was created against this instance.
    ///
    /// # Safety
    ///
    /// The surface must not be in use by any swapchain.
    pub unsafe fn destroy_surface(&self, surface: vk::SurfaceKHR) {
        if let Some(loader) = &self.surface_loader {
            loader.destroy_surface(surface, self.allocation_callbacks());
        }
    }

    fn surface(&self) -> Result<&ash::khr::surface::Instance, vk::Result> {
        self.surface_loader
            .as_ref()
            .ok_or(vk::Result::ERROR_EXTENSION_NOT_PRESENT)
    }
}

impl CapabilityQuery for Instance {
    fn enumerate_physical_devices(
        &self,
    ) -> Result<Vec<vk::PhysicalDevice>, vk::Result> {
        unsafe { self.ash.enumerate_physical_devices() }
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<QueueFamilyInfo> {
        let properties = unsafe {
            self.ash.get_physical_device_queue_family_properties(device)
        };
        properties
            .iter()
            .enumerate()
            .map(|(index, family)| {
                QueueFamilyInfo::from_properties(index as u32, family)
            })
            .collect()
    }

    fn features(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceFeatures {
        unsafe { self.ash.get_physical_device_features(device) }
    }

    fn features_extended(
        &self,
        device: vk::PhysicalDevice,
        requested: &[FeatureRequirementNode],
    ) -> Vec<FeatureRequirementNode> {
        if requested.is_empty() || self.api_version < ApiVersion::V1_1 {
            return requested
                .iter()
                .map(|node| FeatureRequirementNode::new(node.tag()))
                .collect();
        }

        let mut blocks: Vec<RawFeatureBlock> =
            requested.iter().map(RawFeatureBlock::query_for).collect();
        let mut features2 = vk::PhysicalDeviceFeatures2 {
            p_next: link_feature_blocks(&mut blocks),
            ..Default::default()
        };
        unsafe {
            self.ash
                .get_physical_device_features2(device, &mut features2);
        }
        blocks.iter().map(RawFeatureBlock::to_node).collect()
    }

    fn properties(&self, device: vk::PhysicalDevice) -> DeviceProperties {
        let properties =
            unsafe { self.ash.get_physical_device_properties(device) };
        DeviceProperties {
            name: owned_name(properties.device_name_as_c_str())
                .unwrap_or_default(),
            device_type: properties.device_type,
            api_version: ApiVersion(properties.api_version),
            driver_version: properties.driver_version,
            vendor_id: properties.vendor_id,
            device_id: properties.device_id,
            limits: properties.limits,
        }
    }

    fn memory_layout(&self, device: vk::PhysicalDevice) -> MemoryLayout {
        let properties =
            unsafe { self.ash.get_physical_device_memory_properties(device) };
        MemoryLayout::from_properties(&properties)
    }

    fn device_extensions(
        &self,
        device: vk::PhysicalDevice,
    ) -> Result<Vec<String>, vk::Result> {
        let properties =
            unsafe { self.ash.enumerate_device_extension_properties(device)? };
        Ok(properties
            .iter()
            .filter_map(|ext| owned_name(ext.extension_name_as_c_str()))
            .collect())
    }

    fn instance_extensions(&self) -> Result<Vec<String>, vk::Result> {
        extensions::available_extensions(&self.entry, None)
    }

    fn instance_layers(&self) -> Result<Vec<String>, vk::Result> {
        layers::available_layers(&self.entry)
    }

    fn format_properties(
        &self,
        device: vk::PhysicalDevice,
        format: vk::Format,
    ) -> vk::FormatProperties {
        unsafe {
            self.ash
                .get_physical_device_format_properties(device, format)
        }
    }

    fn surface_support(
        &self,
        device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> Result<bool, vk::Result> {
        unsafe {
            self.surface()?.get_physical_device_surface_support(
                device,
                queue_family_index,
                surface,
            )
        }
    }

    fn surface_capabilities(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<vk::SurfaceCapabilitiesKHR, vk::Result> {
        unsafe {
            self.surface()?
                .get_physical_device_surface_capabilities(device, surface)
        }
    }

    fn surface_formats(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::SurfaceFormatKHR>, vk::Result> {
        unsafe {
            self.surface()?
                .get_physical_device_surface_formats(device, surface)
        }
    }

    fn surface_present_modes(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::PresentModeKHR>, vk::Result> {
        unsafe {
            self.surface()?
                .get_physical_device_surface_present_modes(device, surface)
        }
    }
}

impl Drop for Instance {
    /// The owner must ensure that the Instance is only dropped after other
    /// resources which depend on it! There is no internal synchronization.
    fn drop(&mut self) {
        unsafe {
            if let Some((loader, messenger)) = self.debug_utils.take() {
                loader.destroy_debug_utils_messenger(
                    messenger,
                    self.allocation_callbacks.as_ref(),
                );
            }
            self.ash
                .destroy_instance(self.allocation_callbacks.as_ref());
        }
    }
}
