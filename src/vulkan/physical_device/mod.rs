mod criteria;
mod descriptor;
mod features;
mod queue_families;
mod suitability;

use ash::vk;

pub use self::{
    criteria::{PreferredDeviceType, SelectionCriteria},
    descriptor::{
        DeviceDescriptor, DeviceProperties, MemoryHeap, MemoryLayout,
        PresentationSupport,
    },
    features::{
        chain_matches, features_match, missing_features, node_matches,
        FeatureRequirementNode, FEATURE_FIELD_CAPACITY,
    },
    queue_families::{
        dedicated_compute_queue_index, dedicated_transfer_queue_index,
        graphics_queue_index, present_queue_index, separate_compute_queue_index,
        separate_transfer_queue_index, QueueFamilyAnalysis, QueueFamilyInfo,
    },
    suitability::{choose_device, score, SuitabilityVerdict},
};
use crate::{
    logging::PrettyList,
    vulkan::{
        capabilities::CapabilityQuery,
        errors::{PhysicalDeviceError, QueueError},
        ApiVersion,
    },
};

/// The kinds of queue an application can ask the selected device for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueType {
    Present,
    Graphics,
    Compute,
    Transfer,
}

/// The physical device picked by [select_physical_device], along with the
/// choices which must carry over into logical device creation.
#[derive(Debug, Clone)]
pub struct PhysicalDevice {
    descriptor: DeviceDescriptor,
    surface: Option<vk::SurfaceKHR>,
    defer_surface_initialization: bool,
    instance_version: ApiVersion,
    extensions_to_enable: Vec<String>,
    features_to_enable: vk::PhysicalDeviceFeatures,
    feature_chain_to_enable: Vec<FeatureRequirementNode>,
}

impl PhysicalDevice {
    pub fn raw(&self) -> vk::PhysicalDevice {
        self.descriptor.handle
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn surface(&self) -> Option<vk::SurfaceKHR> {
        self.surface
    }

    pub fn defer_surface_initialization(&self) -> bool {
        self.defer_surface_initialization
    }

    pub fn instance_version(&self) -> ApiVersion {
        self.instance_version
    }

    /// The required extensions plus every desired extension the device
    /// supports.
    pub fn extensions_to_enable(&self) -> &[String] {
        &self.extensions_to_enable
    }

    /// The core features requested during selection.
    pub fn features_to_enable(&self) -> &vk::PhysicalDeviceFeatures {
        &self.features_to_enable
    }

    /// The extension feature blocks requested during selection.
    pub fn feature_chain_to_enable(&self) -> &[FeatureRequirementNode] {
        &self.feature_chain_to_enable
    }

    pub fn queue_families(&self) -> &[QueueFamilyInfo] {
        &self.descriptor.queue_families
    }

    pub fn has_dedicated_compute_queue(&self) -> bool {
        dedicated_compute_queue_index(self.queue_families()).is_some()
    }

    pub fn has_dedicated_transfer_queue(&self) -> bool {
        dedicated_transfer_queue_index(self.queue_families()).is_some()
    }

    pub fn has_separate_compute_queue(&self) -> bool {
        separate_compute_queue_index(self.queue_families()).is_some()
    }

    pub fn has_separate_transfer_queue(&self) -> bool {
        separate_transfer_queue_index(self.queue_families()).is_some()
    }

    /// The queue family to use for a kind of queue. Compute and transfer
    /// resolve to the separate family, which may also be dedicated.
    pub fn queue_index(&self, queue_type: QueueType) -> Result<u32, QueueError> {
        let analysis = self.descriptor.queue_analysis();
        match queue_type {
            QueueType::Present => analysis
                .present
                .ok_or(QueueError::PresentQueueUnavailable),
            QueueType::Graphics => analysis
                .graphics
                .ok_or(QueueError::GraphicsQueueUnavailable),
            QueueType::Compute => analysis
                .separate_compute
                .ok_or(QueueError::ComputeQueueUnavailable),
            QueueType::Transfer => analysis
                .separate_transfer
                .ok_or(QueueError::TransferQueueUnavailable),
        }
    }

    /// The dedicated queue family for compute or transfer work.
    pub fn dedicated_queue_index(
        &self,
        queue_type: QueueType,
    ) -> Result<u32, QueueError> {
        match queue_type {
            QueueType::Compute => {
                dedicated_compute_queue_index(self.queue_families())
                    .ok_or(QueueError::ComputeQueueUnavailable)
            }
            QueueType::Transfer => {
                dedicated_transfer_queue_index(self.queue_families())
                    .ok_or(QueueError::TransferQueueUnavailable)
            }
            QueueType::Present | QueueType::Graphics => {
                Err(QueueError::InvalidQueueFamilyIndex)
            }
        }
    }
}

/// Pick the physical device which best fits `criteria`.
///
/// Devices are scored in enumeration order. The first `Suitable` device wins;
/// without one the last `PartiallySuitable` device wins.
pub fn select_physical_device(
    query: &impl CapabilityQuery,
    criteria: &SelectionCriteria,
) -> Result<PhysicalDevice, PhysicalDeviceError> {
    if !criteria.headless
        && !criteria.defer_surface_initialization
        && criteria.surface.is_none()
    {
        return Err(PhysicalDeviceError::NoSurfaceProvided);
    }

    let handles = query
        .enumerate_physical_devices()
        .map_err(PhysicalDeviceError::EnumerationFailed)?;
    if handles.is_empty() {
        return Err(PhysicalDeviceError::NoPhysicalDevicesFound);
    }

    let mut descriptors: Vec<DeviceDescriptor> = handles
        .iter()
        .map(|&handle| DeviceDescriptor::describe(query, handle, criteria))
        .collect();

    let chosen = if criteria.use_first_gpu_unconditionally {
        0
    } else {
        let verdicts: Vec<SuitabilityVerdict> = descriptors
            .iter()
            .map(|descriptor| score(criteria, descriptor))
            .collect();
        log::debug!(
            "Device verdicts: {:?}",
            PrettyList(
                &descriptors
                    .iter()
                    .map(DeviceDescriptor::name)
                    .zip(&verdicts)
                    .collect::<Vec<_>>()
            )
        );
        choose_device(&verdicts).ok_or(PhysicalDeviceError::NoSuitableDevice)?
    };
    let descriptor = descriptors.swap_remove(chosen);

    let mut extensions_to_enable = criteria.required_extensions.clone();
    extensions_to_enable.extend(
        criteria
            .desired_extensions
            .iter()
            .filter(|name| descriptor.supports_extension(name))
            .cloned(),
    );

    log::info!("Selected physical device {}", descriptor.name());

    Ok(PhysicalDevice {
        descriptor,
        surface: criteria.surface,
        defer_surface_initialization: criteria.defer_surface_initialization,
        instance_version: criteria.instance_version,
        extensions_to_enable,
        features_to_enable: criteria.required_features,
        feature_chain_to_enable: criteria.required_feature_chain.clone(),
    })
}
