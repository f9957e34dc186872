use ash::vk;

/// What the application would like from a swapchain.
///
/// Desired formats and present modes are listed in priority order. When a
/// list is left empty the defaults are used: sRGB BGRA8 then RGBA8 formats,
/// and MAILBOX then FIFO present modes. Adding any entry replaces the
/// defaults for that list.
#[derive(Debug, Clone)]
pub struct SwapchainRequest {
    pub(crate) surface: Option<vk::SurfaceKHR>,
    pub(crate) desired_formats: Vec<vk::SurfaceFormatKHR>,
    pub(crate) desired_present_modes: Vec<vk::PresentModeKHR>,
    pub(crate) desired_extent: vk::Extent2D,
    pub(crate) array_layer_count: u32,
    pub(crate) image_usage: vk::ImageUsageFlags,
    pub(crate) format_features: vk::FormatFeatureFlags,
    pub(crate) pre_transform: vk::SurfaceTransformFlagsKHR,
    pub(crate) composite_alpha: vk::CompositeAlphaFlagsKHR,
    pub(crate) clipped: bool,
    pub(crate) old_swapchain: vk::SwapchainKHR,
    pub(crate) flags: vk::SwapchainCreateFlagsKHR,
}

impl Default for SwapchainRequest {
    fn default() -> Self {
        Self {
            surface: None,
            desired_formats: vec![],
            desired_present_modes: vec![],
            desired_extent: vk::Extent2D {
                width: 256,
                height: 256,
            },
            array_layer_count: 1,
            image_usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,
            format_features: vk::FormatFeatureFlags::SAMPLED_IMAGE,
            pre_transform: vk::SurfaceTransformFlagsKHR::empty(),
            composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
            clipped: true,
            old_swapchain: vk::SwapchainKHR::null(),
            flags: vk::SwapchainCreateFlagsKHR::empty(),
        }
    }
}

pub fn default_formats() -> Vec<vk::SurfaceFormatKHR> {
    vec![
        vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_SRGB,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
        vk::SurfaceFormatKHR {
            format: vk::Format::R8G8B8A8_SRGB,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
    ]
}

pub fn default_present_modes() -> Vec<vk::PresentModeKHR> {
    vec![vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::FIFO]
}

impl SwapchainRequest {
    /// Present to this surface instead of the one used for device
    /// selection. Required when surface initialization was deferred.
    pub fn surface(mut self, surface: vk::SurfaceKHR) -> Self {
        self.surface = (surface != vk::SurfaceKHR::null()).then_some(surface);
        self
    }

    /// Put `format` ahead of every other desired format.
    pub fn set_desired_format(mut self, format: vk::SurfaceFormatKHR) -> Self {
        self.desired_formats.insert(0, format);
        self
    }

    /// Append `format` after every other desired format.
    pub fn add_fallback_format(mut self, format: vk::SurfaceFormatKHR) -> Self {
        self.desired_formats.push(format);
        self
    }

    pub fn use_default_format_selection(mut self) -> Self {
        self.desired_formats = default_formats();
        self
    }

    /// Put `mode` ahead of every other desired present mode.
    pub fn set_desired_present_mode(mut self, mode: vk::PresentModeKHR) -> Self {
        self.desired_present_modes.insert(0, mode);
        self
    }

    /// Append `mode` after every other desired present mode.
    pub fn add_fallback_present_mode(mut self, mode: vk::PresentModeKHR) -> Self {
        self.desired_present_modes.push(mode);
        self
    }

    pub fn use_default_present_mode_selection(mut self) -> Self {
        self.desired_present_modes = default_present_modes();
        self
    }

    /// Only used when the surface lets the swapchain pick its extent.
    pub fn set_desired_extent(mut self, width: u32, height: u32) -> Self {
        self.desired_extent = vk::Extent2D { width, height };
        self
    }

    pub fn set_image_array_layer_count(mut self, count: u32) -> Self {
        self.array_layer_count = count;
        self
    }

    pub fn add_image_usage_flags(mut self, usage: vk::ImageUsageFlags) -> Self {
        self.image_usage |= usage;
        self
    }

    pub fn use_default_image_usage_flags(mut self) -> Self {
        self.image_usage = vk::ImageUsageFlags::COLOR_ATTACHMENT;
        self
    }

    /// Formats must support these features with optimal tiling to be picked
    /// from the desired list.
    pub fn add_format_feature_flags(
        mut self,
        features: vk::FormatFeatureFlags,
    ) -> Self {
        self.format_features |= features;
        self
    }

    pub fn use_default_format_feature_flags(mut self) -> Self {
        self.format_features = vk::FormatFeatureFlags::SAMPLED_IMAGE;
        self
    }

    /// Override the surface's current transform.
    pub fn set_pre_transform_flags(
        mut self,
        transform: vk::SurfaceTransformFlagsKHR,
    ) -> Self {
        self.pre_transform = transform;
        self
    }

    pub fn set_composite_alpha_flags(
        mut self,
        composite_alpha: vk::CompositeAlphaFlagsKHR,
    ) -> Self {
        self.composite_alpha = composite_alpha;
        self
    }

    pub fn set_clipped(mut self, clipped: bool) -> Self {
        self.clipped = clipped;
        self
    }

    /// The swapchain being replaced, if any.
    pub fn set_old_swapchain(mut self, old_swapchain: vk::SwapchainKHR) -> Self {
        self.old_swapchain = old_swapchain;
        self
    }

    pub fn set_create_flags(mut self, flags: vk::SwapchainCreateFlagsKHR) -> Self {
        self.flags = flags;
        self
    }

    /// The desired formats, or the defaults when none were given.
    pub fn desired_formats(&self) -> Vec<vk::SurfaceFormatKHR> {
        if self.desired_formats.is_empty() {
            default_formats()
        } else {
            self.desired_formats.clone()
        }
    }

    /// The desired present modes, or the defaults when none were given.
    pub fn desired_present_modes(&self) -> Vec<vk::PresentModeKHR> {
        if self.desired_present_modes.is_empty() {
            default_present_modes()
        } else {
            self.desired_present_modes.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }
    }

    #[test]
    fn empty_lists_use_the_defaults() {
        let request = SwapchainRequest::default();
        assert_eq!(request.desired_formats().len(), 2);
        assert_eq!(
            request.desired_formats()[0].format,
            vk::Format::B8G8R8A8_SRGB
        );
        assert_eq!(
            request.desired_present_modes(),
            vec![vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::FIFO]
        );
    }

    #[test]
    fn set_desired_goes_first_and_fallback_goes_last() {
        let request = SwapchainRequest::default()
            .add_fallback_format(format(vk::Format::R8G8B8A8_UNORM))
            .set_desired_format(format(vk::Format::R16G16B16A16_SFLOAT))
            .add_fallback_format(format(vk::Format::B8G8R8A8_UNORM));
        let formats: Vec<vk::Format> = request
            .desired_formats()
            .iter()
            .map(|format| format.format)
            .collect();
        assert_eq!(
            formats,
            vec![
                vk::Format::R16G16B16A16_SFLOAT,
                vk::Format::R8G8B8A8_UNORM,
                vk::Format::B8G8R8A8_UNORM,
            ]
        );
    }

    #[test]
    fn set_desired_replaces_the_defaults() {
        let request = SwapchainRequest::default()
            .set_desired_present_mode(vk::PresentModeKHR::IMMEDIATE)
            .set_desired_format(format(vk::Format::R8G8B8A8_UNORM));
        assert_eq!(
            request.desired_present_modes(),
            vec![vk::PresentModeKHR::IMMEDIATE]
        );
        assert_eq!(request.desired_formats().len(), 1);
        assert_eq!(
            request.desired_formats()[0].format,
            vk::Format::R8G8B8A8_UNORM
        );
    }

    #[test]
    fn default_selection_replaces_custom_modes() {
        let request = SwapchainRequest::default()
            .set_desired_present_mode(vk::PresentModeKHR::IMMEDIATE)
            .use_default_present_mode_selection();
        assert_eq!(request.desired_present_modes(), default_present_modes());
    }

    #[test]
    fn null_surface_is_no_surface() {
        let request = SwapchainRequest::default().surface(vk::SurfaceKHR::null());
        assert!(request.surface.is_none());
    }
}
