use ash::vk;

use crate::vulkan::{physical_device::FeatureRequirementNode, ApiVersion};

/// The kind of physical device an application would rather run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreferredDeviceType {
    Other,
    Integrated,
    #[default]
    Discrete,
    VirtualGpu,
    Cpu,
}

impl PreferredDeviceType {
    pub fn as_vk(self) -> vk::PhysicalDeviceType {
        match self {
            Self::Other => vk::PhysicalDeviceType::OTHER,
            Self::Integrated => vk::PhysicalDeviceType::INTEGRATED_GPU,
            Self::Discrete => vk::PhysicalDeviceType::DISCRETE_GPU,
            Self::VirtualGpu => vk::PhysicalDeviceType::VIRTUAL_GPU,
            Self::Cpu => vk::PhysicalDeviceType::CPU,
        }
    }
}

/// Everything an application requires from, or would like in, a physical
/// device.
///
/// Build with the fluent setters then hand to
/// [select_physical_device](crate::vulkan::select_physical_device). The
/// criteria are never modified by selection.
///
/// # Example
///
///     use ccthw_vk_bootstrap::vulkan::{
///         ApiVersion, PreferredDeviceType, SelectionCriteria,
///     };
///
///     let criteria = SelectionCriteria::default()
///         .headless(true)
///         .minimum_version(ApiVersion::V1_1)
///         .preferred_device_type(PreferredDeviceType::Integrated)
///         .require_separate_transfer_queue(true);
///
#[derive(Debug, Clone)]
pub struct SelectionCriteria {
    pub(crate) surface: Option<vk::SurfaceKHR>,
    pub(crate) headless: bool,
    pub(crate) preferred_type: PreferredDeviceType,
    pub(crate) allow_any_type: bool,
    pub(crate) require_present: bool,
    pub(crate) require_dedicated_transfer_queue: bool,
    pub(crate) require_dedicated_compute_queue: bool,
    pub(crate) require_separate_transfer_queue: bool,
    pub(crate) require_separate_compute_queue: bool,
    pub(crate) required_mem_size: vk::DeviceSize,
    pub(crate) desired_mem_size: vk::DeviceSize,
    pub(crate) required_extensions: Vec<String>,
    pub(crate) desired_extensions: Vec<String>,
    pub(crate) required_version: ApiVersion,
    pub(crate) desired_version: ApiVersion,
    pub(crate) instance_version: ApiVersion,
    pub(crate) required_features: vk::PhysicalDeviceFeatures,
    pub(crate) required_feature_chain: Vec<FeatureRequirementNode>,
    pub(crate) defer_surface_initialization: bool,
    pub(crate) use_first_gpu_unconditionally: bool,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            surface: None,
            headless: false,
            preferred_type: PreferredDeviceType::Discrete,
            allow_any_type: true,
            require_present: true,
            require_dedicated_transfer_queue: false,
            require_dedicated_compute_queue: false,
            require_separate_transfer_queue: false,
            require_separate_compute_queue: false,
            required_mem_size: 0,
            desired_mem_size: 0,
            required_extensions: vec![],
            desired_extensions: vec![],
            required_version: ApiVersion::V1_0,
            desired_version: ApiVersion::V1_0,
            instance_version: ApiVersion::V1_0,
            required_features: vk::PhysicalDeviceFeatures::default(),
            required_feature_chain: vec![],
            defer_surface_initialization: false,
            use_first_gpu_unconditionally: false,
        }
    }
}

impl SelectionCriteria {
    /// The surface the selected device must be able to present to.
    pub fn surface(mut self, surface: vk::SurfaceKHR) -> Self {
        self.surface = if surface == vk::SurfaceKHR::null() {
            None
        } else {
            Some(surface)
        };
        self
    }

    /// A headless session never presents, so presentation is no longer
    /// required and no surface is expected.
    ///
    /// Also sets `require_present` to `!headless`, replacing any earlier
    /// [SelectionCriteria::require_present] call. Call `require_present`
    /// afterwards to override it.
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self.require_present = !headless;
        self
    }

    /// The API version the instance was created with. Extended feature
    /// requirements need at least 1.1.
    pub fn instance_version(mut self, version: ApiVersion) -> Self {
        self.instance_version = version;
        self
    }

    pub fn preferred_device_type(mut self, device_type: PreferredDeviceType) -> Self {
        self.preferred_type = device_type;
        self
    }

    pub fn allow_any_gpu_device_type(mut self, allow: bool) -> Self {
        self.allow_any_type = allow;
        self
    }

    /// Whether the device needs a queue which can present to the surface.
    ///
    /// [SelectionCriteria::headless] overwrites this flag, so the last of the
    /// two calls wins.
    pub fn require_present(mut self, require: bool) -> Self {
        self.require_present = require;
        self
    }

    pub fn require_dedicated_transfer_queue(mut self, require: bool) -> Self {
        self.require_dedicated_transfer_queue = require;
        self
    }

    pub fn require_dedicated_compute_queue(mut self, require: bool) -> Self {
        self.require_dedicated_compute_queue = require;
        self
    }

    pub fn require_separate_transfer_queue(mut self, require: bool) -> Self {
        self.require_separate_transfer_queue = require;
        self
    }

    pub fn require_separate_compute_queue(mut self, require: bool) -> Self {
        self.require_separate_compute_queue = require;
        self
    }

    /// Require a device-local heap strictly larger than `size` bytes.
    pub fn required_device_memory_size(mut self, size: vk::DeviceSize) -> Self {
        self.required_mem_size = size;
        self
    }

    /// Prefer a device-local heap strictly larger than `size` bytes.
    pub fn desired_device_memory_size(mut self, size: vk::DeviceSize) -> Self {
        self.desired_mem_size = size;
        self
    }

    pub fn add_required_extension(mut self, name: impl Into<String>) -> Self {
        self.required_extensions.push(name.into());
        self
    }

    pub fn add_required_extensions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_extensions
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn add_desired_extension(mut self, name: impl Into<String>) -> Self {
        self.desired_extensions.push(name.into());
        self
    }

    pub fn add_desired_extensions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.desired_extensions
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn minimum_version(mut self, version: ApiVersion) -> Self {
        self.required_version = version;
        self
    }

    pub fn desired_version(mut self, version: ApiVersion) -> Self {
        self.desired_version = version;
        self
    }

    pub fn required_features(mut self, features: vk::PhysicalDeviceFeatures) -> Self {
        self.required_features = features;
        self
    }

    /// Append a block of extension features the device must support.
    ///
    /// # Panics
    ///
    /// Panics when the instance version is below 1.1, or when the block is
    /// tagged `PHYSICAL_DEVICE_FEATURES_2` (that struct is managed
    /// internally).
    pub fn add_required_extension_features(
        mut self,
        node: FeatureRequirementNode,
    ) -> Self {
        assert!(
            self.instance_version >= ApiVersion::V1_1,
            "Extended feature requirements need a Vulkan 1.1 instance"
        );
        assert_ne!(
            node.tag(),
            vk::StructureType::PHYSICAL_DEVICE_FEATURES_2,
            "Pass core features through required_features instead"
        );
        self.required_feature_chain.push(node);
        self
    }

    pub fn required_features_11(
        self,
        features: &vk::PhysicalDeviceVulkan11Features,
    ) -> Self {
        self.add_required_extension_features(
            FeatureRequirementNode::vulkan_11(features),
        )
    }

    pub fn required_features_12(
        self,
        features: &vk::PhysicalDeviceVulkan12Features,
    ) -> Self {
        self.add_required_extension_features(
            FeatureRequirementNode::vulkan_12(features),
        )
    }

    pub fn required_features_13(
        self,
        features: &vk::PhysicalDeviceVulkan13Features,
    ) -> Self {
        self.add_required_extension_features(
            FeatureRequirementNode::vulkan_13(features),
        )
    }

    /// Skip the surface checks during selection. The swapchain extension is
    /// still enabled on the created device.
    pub fn defer_surface_initialization(mut self, defer: bool) -> Self {
        self.defer_surface_initialization = defer;
        self
    }

    /// Take the first enumerated device without scoring anything.
    pub fn select_first_device_unconditionally(mut self, select: bool) -> Self {
        self.use_first_gpu_unconditionally = select;
        self
    }
}
