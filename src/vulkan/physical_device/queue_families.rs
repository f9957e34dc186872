use ash::vk;

use crate::vulkan::capabilities::CapabilityQuery;

/// One entry of a physical device's queue family table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyInfo {
    pub index: u32,
    pub flags: vk::QueueFlags,
    pub queue_count: u32,
}

impl QueueFamilyInfo {
    pub fn from_properties(
        index: u32,
        properties: &vk::QueueFamilyProperties,
    ) -> Self {
        Self {
            index,
            flags: properties.queue_flags,
            queue_count: properties.queue_count,
        }
    }

    pub fn is_graphics(&self) -> bool {
        self.flags.contains(vk::QueueFlags::GRAPHICS)
    }

    pub fn is_compute(&self) -> bool {
        self.flags.contains(vk::QueueFlags::COMPUTE)
    }

    pub fn is_transfer(&self) -> bool {
        self.flags.contains(vk::QueueFlags::TRANSFER)
    }
}

/// Find the first queue family which supports graphics commands.
pub fn graphics_queue_index(families: &[QueueFamilyInfo]) -> Option<u32> {
    families
        .iter()
        .find(|family| family.is_graphics())
        .map(|family| family.index)
}

/// Find the first family which supports compute and neither graphics nor
/// transfer.
pub fn dedicated_compute_queue_index(
    families: &[QueueFamilyInfo],
) -> Option<u32> {
    families
        .iter()
        .find(|family| {
            family.is_compute() && !family.is_graphics() && !family.is_transfer()
        })
        .map(|family| family.index)
}

/// Find the first family which supports transfer and neither graphics nor
/// compute.
pub fn dedicated_transfer_queue_index(
    families: &[QueueFamilyInfo],
) -> Option<u32> {
    families
        .iter()
        .find(|family| {
            family.is_transfer() && !family.is_graphics() && !family.is_compute()
        })
        .map(|family| family.index)
}

/// Find a compute family without graphics support. Families which do not also
/// support transfer win, otherwise the last compute+transfer family is used.
pub fn separate_compute_queue_index(
    families: &[QueueFamilyInfo],
) -> Option<u32> {
    separate_queue_index(
        families,
        QueueFamilyInfo::is_compute,
        QueueFamilyInfo::is_transfer,
    )
}

/// Find a transfer family without graphics support. Families which do not
/// also support compute win, otherwise the last transfer+compute family is
/// used.
pub fn separate_transfer_queue_index(
    families: &[QueueFamilyInfo],
) -> Option<u32> {
    separate_queue_index(
        families,
        QueueFamilyInfo::is_transfer,
        QueueFamilyInfo::is_compute,
    )
}

fn separate_queue_index(
    families: &[QueueFamilyInfo],
    has_target: fn(&QueueFamilyInfo) -> bool,
    has_other: fn(&QueueFamilyInfo) -> bool,
) -> Option<u32> {
    let mut fallback = None;
    for family in families {
        if !has_target(family) || family.is_graphics() {
            continue;
        }
        if !has_other(family) {
            return Some(family.index);
        }
        fallback = Some(family.index);
    }
    fallback
}

/// Find the first queue family which can present to `surface`.
///
/// A failed support query is logged and treated as "no support" for that
/// family; other families are still checked.
pub fn present_queue_index(
    query: &impl CapabilityQuery,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    families: &[QueueFamilyInfo],
) -> Option<u32> {
    families
        .iter()
        .find(|family| {
            match query.surface_support(device, family.index, surface) {
                Ok(supported) => supported,
                Err(err) => {
                    log::warn!(
                        indoc::indoc!(
                            "
                            Error checking for surface support
                              - device {:?}
                              - queue {} [{:?}]
                              - error {:?}"
                        ),
                        device,
                        family.index,
                        family.flags,
                        err,
                    );
                    false
                }
            }
        })
        .map(|family| family.index)
}

/// Every queue family classification for one device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyAnalysis {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
    pub dedicated_compute: Option<u32>,
    pub dedicated_transfer: Option<u32>,
    pub separate_compute: Option<u32>,
    pub separate_transfer: Option<u32>,
}

impl QueueFamilyAnalysis {
    /// Classify `families`. `present_families` lists the family indices which
    /// reported presentation support for the surface in use, in table order.
    pub fn new(families: &[QueueFamilyInfo], present_families: &[u32]) -> Self {
        Self {
            graphics: graphics_queue_index(families),
            present: families
                .iter()
                .map(|family| family.index)
                .find(|index| present_families.contains(index)),
            dedicated_compute: dedicated_compute_queue_index(families),
            dedicated_transfer: dedicated_transfer_queue_index(families),
            separate_compute: separate_compute_queue_index(families),
            separate_transfer: separate_transfer_queue_index(families),
        }
    }
}
