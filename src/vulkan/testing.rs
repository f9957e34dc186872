//! An in-memory driver for exercising selection and negotiation in tests.

use std::collections::HashMap;

use ash::vk::{self, Handle};

use crate::vulkan::{
    capabilities::CapabilityQuery,
    physical_device::{
        DeviceDescriptor, DeviceProperties, FeatureRequirementNode,
        MemoryHeap, MemoryLayout, QueueFamilyInfo, SelectionCriteria,
    },
    ApiVersion,
};

/// A physical device as reported by [FakeDriver].
#[derive(Debug, Clone)]
pub struct FakeDevice {
    pub handle: vk::PhysicalDevice,
    pub properties: DeviceProperties,
    pub families: Vec<QueueFamilyInfo>,
    pub present_support: bool,
    pub features: vk::PhysicalDeviceFeatures,
    pub extended_features: Vec<FeatureRequirementNode>,
    pub heaps: Vec<MemoryHeap>,
    pub extensions: Vec<String>,
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub surface_formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub format_properties: HashMap<vk::Format, vk::FormatProperties>,
    pub surface_query_error: Option<vk::Result>,
    pub extension_query_error: Option<vk::Result>,
}

impl FakeDevice {
    fn new(name: &str, device_type: vk::PhysicalDeviceType) -> Self {
        Self {
            handle: vk::PhysicalDevice::from_raw(0x1000),
            properties: DeviceProperties {
                name: name.to_owned(),
                device_type,
                api_version: ApiVersion::V1_3,
                ..Default::default()
            },
            families: vec![QueueFamilyInfo {
                index: 0,
                flags: vk::QueueFlags::GRAPHICS
                    | vk::QueueFlags::COMPUTE
                    | vk::QueueFlags::TRANSFER,
                queue_count: 16,
            }],
            present_support: true,
            features: vk::PhysicalDeviceFeatures::default(),
            extended_features: vec![],
            heaps: vec![MemoryHeap {
                size: 8 << 30,
                device_local: true,
            }],
            extensions: vec![],
            capabilities: vk::SurfaceCapabilitiesKHR {
                min_image_count: 2,
                max_image_count: 8,
                current_extent: vk::Extent2D {
                    width: 800,
                    height: 600,
                },
                min_image_extent: vk::Extent2D {
                    width: 1,
                    height: 1,
                },
                max_image_extent: vk::Extent2D {
                    width: 4096,
                    height: 4096,
                },
                max_image_array_layers: 1,
                supported_transforms: vk::SurfaceTransformFlagsKHR::IDENTITY,
                current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
                ..Default::default()
            },
            surface_formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            present_modes: vec![vk::PresentModeKHR::FIFO],
            format_properties: HashMap::new(),
            surface_query_error: None,
            extension_query_error: None,
        }
    }

    pub fn discrete(name: &str) -> Self {
        Self::new(name, vk::PhysicalDeviceType::DISCRETE_GPU)
    }

    pub fn integrated(name: &str) -> Self {
        Self::new(name, vk::PhysicalDeviceType::INTEGRATED_GPU)
    }

    pub fn cpu(name: &str) -> Self {
        Self::new(name, vk::PhysicalDeviceType::CPU)
    }

    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.properties.api_version = version;
        self
    }

    /// Append a queue family to the table.
    pub fn queue_family(mut self, flags: vk::QueueFlags, count: u32) -> Self {
        let index = self.families.len() as u32;
        self.families.push(QueueFamilyInfo {
            index,
            flags,
            queue_count: count,
        });
        self
    }

    pub fn queue_families(mut self, flags: &[vk::QueueFlags]) -> Self {
        self.families = vec![];
        for &family_flags in flags {
            self = self.queue_family(family_flags, 1);
        }
        self
    }

    pub fn without_present_support(mut self) -> Self {
        self.present_support = false;
        self
    }

    pub fn features(mut self, features: vk::PhysicalDeviceFeatures) -> Self {
        self.features = features;
        self
    }

    pub fn extended_features(mut self, node: FeatureRequirementNode) -> Self {
        self.extended_features.push(node);
        self
    }

    /// Replace the heaps with a single device-local heap of `size` bytes.
    pub fn device_local_heap(mut self, size: vk::DeviceSize) -> Self {
        self.heaps = vec![MemoryHeap {
            size,
            device_local: true,
        }];
        self
    }

    pub fn extension(mut self, name: &str) -> Self {
        self.extensions.push(name.to_owned());
        self
    }

    pub fn capabilities(mut self, capabilities: vk::SurfaceCapabilitiesKHR) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn surface_formats(mut self, formats: Vec<vk::SurfaceFormatKHR>) -> Self {
        self.surface_formats = formats;
        self
    }

    pub fn present_modes(mut self, modes: Vec<vk::PresentModeKHR>) -> Self {
        self.present_modes = modes;
        self
    }

    pub fn optimal_tiling_features(
        mut self,
        format: vk::Format,
        features: vk::FormatFeatureFlags,
    ) -> Self {
        self.format_properties.insert(
            format,
            vk::FormatProperties {
                optimal_tiling_features: features,
                ..Default::default()
            },
        );
        self
    }

    pub fn failing_surface_queries(mut self, error: vk::Result) -> Self {
        self.surface_query_error = Some(error);
        self
    }

    pub fn failing_extension_query(mut self, error: vk::Result) -> Self {
        self.extension_query_error = Some(error);
        self
    }

    /// Snapshot this device alone, the way selection would.
    pub fn descriptor(&self, criteria: &SelectionCriteria) -> DeviceDescriptor {
        let driver = FakeDriver::new(vec![self.clone()]);
        DeviceDescriptor::describe(&driver, self.handle, criteria)
    }
}

/// A driver which answers every query from a fixed list of devices.
#[derive(Debug, Clone, Default)]
pub struct FakeDriver {
    pub devices: Vec<FakeDevice>,
    pub enumerate_error: Option<vk::Result>,
    pub instance_extensions: Vec<String>,
    pub instance_layers: Vec<String>,
}

impl FakeDriver {
    /// Devices get distinct handles in list order.
    pub fn new(devices: Vec<FakeDevice>) -> Self {
        let devices = devices
            .into_iter()
            .enumerate()
            .map(|(index, mut device)| {
                device.handle = vk::PhysicalDevice::from_raw(0x1000 + index as u64);
                device
            })
            .collect();
        Self {
            devices,
            ..Default::default()
        }
    }

    pub fn handle(&self, index: usize) -> vk::PhysicalDevice {
        self.devices[index].handle
    }

    fn device(&self, handle: vk::PhysicalDevice) -> &FakeDevice {
        self.devices
            .iter()
            .find(|device| device.handle == handle)
            .expect("unknown fake physical device")
    }

    fn surface_device(
        &self,
        handle: vk::PhysicalDevice,
    ) -> Result<&FakeDevice, vk::Result> {
        let device = self.device(handle);
        match device.surface_query_error {
            Some(error) => Err(error),
            None => Ok(device),
        }
    }
}

impl CapabilityQuery for FakeDriver {
    fn enumerate_physical_devices(
        &self,
    ) -> Result<Vec<vk::PhysicalDevice>, vk::Result> {
        match self.enumerate_error {
            Some(error) => Err(error),
            None => Ok(self.devices.iter().map(|device| device.handle).collect()),
        }
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<QueueFamilyInfo> {
        self.device(device).families.clone()
    }

    fn features(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceFeatures {
        self.device(device).features
    }

    fn features_extended(
        &self,
        device: vk::PhysicalDevice,
        requested: &[FeatureRequirementNode],
    ) -> Vec<FeatureRequirementNode> {
        let supported = &self.device(device).extended_features;
        requested
            .iter()
            .map(|node| {
                supported
                    .iter()
                    .find(|candidate| candidate.tag() == node.tag())
                    .copied()
                    .unwrap_or_else(|| FeatureRequirementNode::new(node.tag()))
            })
            .collect()
    }

    fn properties(&self, device: vk::PhysicalDevice) -> DeviceProperties {
        self.device(device).properties.clone()
    }

    fn memory_layout(&self, device: vk::PhysicalDevice) -> MemoryLayout {
        MemoryLayout {
            heaps: self.device(device).heaps.clone(),
        }
    }

    fn device_extensions(
        &self,
        device: vk::PhysicalDevice,
    ) -> Result<Vec<String>, vk::Result> {
        let device = self.device(device);
        match device.extension_query_error {
            Some(error) => Err(error),
            None => Ok(device.extensions.clone()),
        }
    }

    fn instance_extensions(&self) -> Result<Vec<String>, vk::Result> {
        Ok(self.instance_extensions.clone())
    }

    fn instance_layers(&self) -> Result<Vec<String>, vk::Result> {
        Ok(self.instance_layers.clone())
    }

    fn format_properties(
        &self,
        device: vk::PhysicalDevice,
        format: vk::Format,
    ) -> vk::FormatProperties {
        self.device(device)
            .format_properties
            .get(&format)
            .copied()
            .unwrap_or_default()
    }

    fn surface_support(
        &self,
        device: vk::PhysicalDevice,
        _queue_family_index: u32,
        _surface: vk::SurfaceKHR,
    ) -> Result<bool, vk::Result> {
        Ok(self.surface_device(device)?.present_support)
    }

    fn surface_capabilities(
        &self,
        device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> Result<vk::SurfaceCapabilitiesKHR, vk::Result> {
        Ok(self.surface_device(device)?.capabilities)
    }

    fn surface_formats(
        &self,
        device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::SurfaceFormatKHR>, vk::Result> {
        Ok(self.surface_device(device)?.surface_formats.clone())
    }

    fn surface_present_modes(
        &self,
        device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::PresentModeKHR>, vk::Result> {
        Ok(self.surface_device(device)?.present_modes.clone())
    }
}
