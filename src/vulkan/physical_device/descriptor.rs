use ash::vk;

use crate::{
    logging::PrettyList,
    vulkan::{
        capabilities::CapabilityQuery,
        physical_device::{
            FeatureRequirementNode, QueueFamilyAnalysis, QueueFamilyInfo,
            SelectionCriteria,
        },
        ApiVersion,
    },
};

/// The identifying properties of a physical device.
#[derive(Debug, Clone)]
pub struct DeviceProperties {
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub api_version: ApiVersion,
    pub driver_version: u32,
    pub vendor_id: u32,
    pub device_id: u32,
    pub limits: vk::PhysicalDeviceLimits,
}

impl Default for DeviceProperties {
    fn default() -> Self {
        Self {
            name: String::new(),
            device_type: vk::PhysicalDeviceType::OTHER,
            api_version: ApiVersion::V1_0,
            driver_version: 0,
            vendor_id: 0,
            device_id: 0,
            limits: vk::PhysicalDeviceLimits::default(),
        }
    }
}

/// One memory heap exposed by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryHeap {
    pub size: vk::DeviceSize,
    pub device_local: bool,
}

/// The memory heaps exposed by the device, in driver order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLayout {
    pub heaps: Vec<MemoryHeap>,
}

impl MemoryLayout {
    pub fn from_properties(
        properties: &vk::PhysicalDeviceMemoryProperties,
    ) -> Self {
        let count = (properties.memory_heap_count as usize)
            .min(properties.memory_heaps.len());
        let heaps = properties.memory_heaps[..count]
            .iter()
            .map(|heap| MemoryHeap {
                size: heap.size,
                device_local: heap
                    .flags
                    .contains(vk::MemoryHeapFlags::DEVICE_LOCAL),
            })
            .collect();
        Self { heaps }
    }

    /// True when any device-local heap is strictly larger than `size`.
    pub fn has_device_local_heap_larger_than(&self, size: vk::DeviceSize) -> bool {
        self.heaps
            .iter()
            .any(|heap| heap.device_local && heap.size > size)
    }
}

/// What a device reported about presenting to the selection surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentationSupport {
    /// Queue family indices which can present to the surface.
    pub present_families: Vec<u32>,
    /// True when both the format and present-mode queries succeeded and each
    /// returned at least one entry.
    pub swapchain_adequate: bool,
}

/// An immutable snapshot of one physical device, taken at selection time.
#[derive(Debug, Clone)]
pub struct DeviceDescriptor {
    pub handle: vk::PhysicalDevice,
    pub queue_families: Vec<QueueFamilyInfo>,
    pub features: vk::PhysicalDeviceFeatures,
    pub feature_chain: Vec<FeatureRequirementNode>,
    pub properties: DeviceProperties,
    pub memory: MemoryLayout,
    pub extensions: Vec<String>,
    /// Set when the extension list could not be read. `extensions` is then
    /// empty, and scoring rejects the device if any extension is required.
    pub extension_error: Option<vk::Result>,
    /// None when no surface was supplied for selection.
    pub presentation: Option<PresentationSupport>,
}

impl DeviceDescriptor {
    /// Snapshot everything selection needs to know about `device`.
    ///
    /// The feature chain is queried in the shape of the criteria's required
    /// chain so the two can be compared by position.
    pub fn describe(
        query: &impl CapabilityQuery,
        device: vk::PhysicalDevice,
        criteria: &SelectionCriteria,
    ) -> Self {
        let queue_families = query.queue_families(device);
        let properties = query.properties(device);

        let (extensions, extension_error) = match query.device_extensions(device) {
            Ok(extensions) => (extensions, None),
            Err(err) => {
                log::warn!(
                    "Unable to list extensions for device {}: {:?}",
                    properties.name,
                    err
                );
                (vec![], Some(err))
            }
        };
        log::trace!(
            "Available extensions for {}: {}",
            properties.name,
            PrettyList(&extensions)
        );

        let presentation = criteria
            .surface
            .map(|surface| presentation_support(query, device, surface, &queue_families));

        Self {
            handle: device,
            features: query.features(device),
            feature_chain: query
                .features_extended(device, &criteria.required_feature_chain),
            memory: query.memory_layout(device),
            queue_families,
            properties,
            extensions,
            extension_error,
            presentation,
        }
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }

    pub fn supports_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|available| available == name)
    }

    /// Classify this device's queue families against its presentation
    /// support.
    pub fn queue_analysis(&self) -> QueueFamilyAnalysis {
        let present_families = self
            .presentation
            .as_ref()
            .map(|presentation| presentation.present_families.as_slice())
            .unwrap_or(&[]);
        QueueFamilyAnalysis::new(&self.queue_families, present_families)
    }
}

fn presentation_support(
    query: &impl CapabilityQuery,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    families: &[QueueFamilyInfo],
) -> PresentationSupport {
    let present_families = families
        .iter()
        .filter(|family| {
            query
                .surface_support(device, family.index, surface)
                .unwrap_or_else(|err| {
                    log::warn!(
                        "Error checking surface support for queue {}: {:?}",
                        family.index,
                        err
                    );
                    false
                })
        })
        .map(|family| family.index)
        .collect();

    let has_formats = query
        .surface_formats(device, surface)
        .map(|formats| !formats.is_empty())
        .unwrap_or(false);
    let has_present_modes = query
        .surface_present_modes(device, surface)
        .map(|modes| !modes.is_empty())
        .unwrap_or(false);

    PresentationSupport {
        present_families,
        swapchain_adequate: has_formats && has_present_modes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_layout_ignores_unused_heap_slots() {
        let mut properties = vk::PhysicalDeviceMemoryProperties {
            memory_heap_count: 2,
            ..Default::default()
        };
        properties.memory_heaps[0] = vk::MemoryHeap {
            size: 1024,
            flags: vk::MemoryHeapFlags::DEVICE_LOCAL,
        };
        properties.memory_heaps[1] = vk::MemoryHeap {
            size: 4096,
            flags: vk::MemoryHeapFlags::empty(),
        };
        properties.memory_heaps[2] = vk::MemoryHeap {
            size: 1 << 40,
            flags: vk::MemoryHeapFlags::DEVICE_LOCAL,
        };

        let layout = MemoryLayout::from_properties(&properties);
        assert_eq!(layout.heaps.len(), 2);
        assert!(layout.has_device_local_heap_larger_than(1023));
        assert!(!layout.has_device_local_heap_larger_than(1024));
    }
}
