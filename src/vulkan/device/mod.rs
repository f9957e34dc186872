mod gpu_queue;

use ash::vk;

pub use self::gpu_queue::GpuQueue;
use crate::{
    logging::PrettyList,
    vulkan::{
        errors::{DeviceError, QueueError},
        ffi::{link_feature_blocks, to_os_ptrs, RawFeatureBlock},
        physical_device::{PhysicalDevice, QueueFamilyInfo, QueueType},
        ApiVersion, Instance,
    },
};

/// The queues to create in one queue family.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomQueueDescription {
    pub index: u32,
    pub priorities: Vec<f32>,
}

impl CustomQueueDescription {
    pub fn new(index: u32, priorities: Vec<f32>) -> Self {
        Self { index, priorities }
    }
}

/// Create a logical device for the selected physical device.
///
/// # Example
///
///     use ccthw_vk_bootstrap::vulkan::{
///         CustomQueueDescription, DeviceBuilder, PhysicalDevice,
///     };
///
///     fn builder(physical_device: PhysicalDevice) -> DeviceBuilder {
///         DeviceBuilder::new(physical_device)
///             .custom_queue_setup(vec![CustomQueueDescription::new(0, vec![1.0])])
///     }
///
pub struct DeviceBuilder {
    physical_device: PhysicalDevice,
    flags: vk::DeviceCreateFlags,
    queue_descriptions: Vec<CustomQueueDescription>,
    allocation_callbacks: Option<vk::AllocationCallbacks<'static>>,
}

impl DeviceBuilder {
    pub fn new(physical_device: PhysicalDevice) -> Self {
        Self {
            physical_device,
            flags: vk::DeviceCreateFlags::empty(),
            queue_descriptions: vec![],
            allocation_callbacks: None,
        }
    }

    pub fn flags(mut self, flags: vk::DeviceCreateFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Replace the default of one queue per family.
    pub fn custom_queue_setup(
        mut self,
        descriptions: Vec<CustomQueueDescription>,
    ) -> Self {
        self.queue_descriptions = descriptions;
        self
    }

    /// Host allocation callbacks for the device. Defaults to the instance's.
    pub fn allocation_callbacks(
        mut self,
        callbacks: vk::AllocationCallbacks<'static>,
    ) -> Self {
        self.allocation_callbacks = Some(callbacks);
        self
    }

    /// The device extensions which will be enabled.
    ///
    /// The swapchain extension is added when a surface was used for
    /// selection or surface initialization was deferred.
    pub fn extensions_to_enable(&self) -> Vec<String> {
        let mut extensions = self.physical_device.extensions_to_enable().to_vec();
        let swapchain = ash::khr::swapchain::NAME.to_string_lossy().into_owned();
        let wants_swapchain = self.physical_device.surface().is_some()
            || self.physical_device.defer_surface_initialization();
        if wants_swapchain && !extensions.contains(&swapchain) {
            extensions.push(swapchain);
        }
        extensions
    }

    /// The queue families and priorities which will be created.
    pub fn queue_descriptions(&self) -> Vec<CustomQueueDescription> {
        if !self.queue_descriptions.is_empty() {
            return self.queue_descriptions.clone();
        }
        default_queue_descriptions(self.physical_device.queue_families())
    }

    /// Create the logical device.
    pub fn build(self, instance: &Instance) -> Result<Device, DeviceError> {
        let descriptions = self.queue_descriptions();
        let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = descriptions
            .iter()
            .map(|description| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(description.index)
                    .queue_priorities(&description.priorities)
            })
            .collect();

        let extensions = self.extensions_to_enable();
        let (_ext_names, ext_ptrs) =
            to_os_ptrs(&extensions).map_err(DeviceError::InvalidExtensionName)?;

        let features = *self.physical_device.features_to_enable();
        let mut feature_blocks: Vec<RawFeatureBlock> = self
            .physical_device
            .feature_chain_to_enable()
            .iter()
            .map(RawFeatureBlock::enable_for)
            .collect();
        let mut features2 = vk::PhysicalDeviceFeatures2 {
            features,
            p_next: link_feature_blocks(&mut feature_blocks),
            ..Default::default()
        };

        let mut create_info = vk::DeviceCreateInfo::default()
            .flags(self.flags)
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&ext_ptrs);
        if self.physical_device.instance_version() >= ApiVersion::V1_1 {
            create_info = create_info.push_next(&mut features2);
        } else {
            create_info = create_info.enabled_features(&features);
        }

        log::debug!(
            "Creating logical device for {} with extensions {}",
            self.physical_device.name(),
            PrettyList(&extensions)
        );

        let allocation_callbacks = self
            .allocation_callbacks
            .or_else(|| instance.allocation_callbacks().copied());
        let device = unsafe {
            instance
                .ash
                .create_device(
                    self.physical_device.raw(),
                    &create_info,
                    allocation_callbacks.as_ref(),
                )
                .map_err(DeviceError::UnableToCreateDevice)?
        };

        let swapchain_name =
            ash::khr::swapchain::NAME.to_string_lossy().into_owned();
        let swapchain_loader = extensions
            .contains(&swapchain_name)
            .then(|| ash::khr::swapchain::Device::new(&instance.ash, &device));

        Ok(Device {
            ash: device,
            physical_device: self.physical_device,
            swapchain_loader,
            allocation_callbacks,
        })
    }
}

/// One queue with priority 1.0 in every family.
pub fn default_queue_descriptions(
    families: &[QueueFamilyInfo],
) -> Vec<CustomQueueDescription> {
    families
        .iter()
        .map(|family| CustomQueueDescription::new(family.index, vec![1.0]))
        .collect()
}

/// The logical device along with the physical device it was created from.
pub struct Device {
    /// The Ash logical device.
    pub ash: ash::Device,

    physical_device: PhysicalDevice,
    swapchain_loader: Option<ash::khr::swapchain::Device>,
    allocation_callbacks: Option<vk::AllocationCallbacks<'static>>,
}

impl Device {
    pub fn physical_device(&self) -> &PhysicalDevice {
        &self.physical_device
    }

    /// Present when the swapchain extension was enabled.
    pub fn swapchain_loader(&self) -> Option<&ash::khr::swapchain::Device> {
        self.swapchain_loader.as_ref()
    }

    pub fn allocation_callbacks(
        &self,
    ) -> Option<&vk::AllocationCallbacks<'static>> {
        self.allocation_callbacks.as_ref()
    }

    pub fn queue_index(&self, queue_type: QueueType) -> Result<u32, QueueError> {
        self.physical_device.queue_index(queue_type)
    }

    pub fn dedicated_queue_index(
        &self,
        queue_type: QueueType,
    ) -> Result<u32, QueueError> {
        self.physical_device.dedicated_queue_index(queue_type)
    }

    /// The first queue of the family resolved for `queue_type`.
    pub fn queue(&self, queue_type: QueueType) -> Result<GpuQueue, QueueError> {
        let family_id = self.queue_index(queue_type)?;
        Ok(self.queue_at(family_id))
    }

    /// The first queue of the dedicated family for `queue_type`.
    pub fn dedicated_queue(
        &self,
        queue_type: QueueType,
    ) -> Result<GpuQueue, QueueError> {
        let family_id = self.dedicated_queue_index(queue_type)?;
        Ok(self.queue_at(family_id))
    }

    fn queue_at(&self, family_id: u32) -> GpuQueue {
        let queue = unsafe { self.ash.get_device_queue(family_id, 0) };
        GpuQueue::from_raw(queue, family_id, 0)
    }
}

impl Drop for Device {
    /// The owner must ensure that every object created from the device is
    /// destroyed first.
    fn drop(&mut self) {
        unsafe {
            self.ash.destroy_device(self.allocation_callbacks.as_ref());
        }
    }
}
