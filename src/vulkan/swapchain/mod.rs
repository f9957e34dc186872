mod request;
mod selection;

use ash::vk;
use scopeguard::ScopeGuard;

pub use self::{
    request::{default_formats, default_present_modes, SwapchainRequest},
    selection::{
        choose_array_layers, choose_extent, choose_image_count,
        choose_pre_transform, choose_present_mode, choose_sharing_mode,
        choose_surface_format,
    },
};
use crate::vulkan::{
    capabilities::{CapabilityQuery, SurfaceSupportDetails},
    errors::{QueueError, SwapchainError},
    physical_device::{present_queue_index, QueueType},
    Device, Instance,
};

/// Every decision needed to create a swapchain.
#[derive(Debug, Clone)]
pub struct SwapchainConfig {
    pub image_count: u32,
    pub surface_format: vk::SurfaceFormatKHR,
    pub extent: vk::Extent2D,
    pub image_array_layers: u32,
    pub present_mode: vk::PresentModeKHR,
    pub sharing_mode: vk::SharingMode,

    /// One family for exclusive sharing, two for concurrent sharing.
    pub queue_family_indices: Vec<u32>,

    pub pre_transform: vk::SurfaceTransformFlagsKHR,
    pub composite_alpha: vk::CompositeAlphaFlagsKHR,
}

/// Negotiate a swapchain configuration between the request and what the
/// surface supports on this device.
///
/// The surface details are queried fresh on every call.
pub fn negotiate(
    query: &impl CapabilityQuery,
    device: vk::PhysicalDevice,
    surface: Option<vk::SurfaceKHR>,
    graphics_index: u32,
    present_index: u32,
    request: &SwapchainRequest,
) -> Result<SwapchainConfig, SwapchainError> {
    let surface = surface.ok_or(SwapchainError::SurfaceHandleNotProvided)?;
    let support = SurfaceSupportDetails::query(query, device, surface)?;
    let capabilities = &support.capabilities;

    let surface_format = choose_surface_format(
        query,
        device,
        &support.formats,
        &request.desired_formats(),
        request.format_features,
    )?;
    let present_mode = choose_present_mode(
        &support.present_modes,
        &request.desired_present_modes(),
    );
    let (sharing_mode, queue_family_indices) =
        choose_sharing_mode(graphics_index, present_index);

    Ok(SwapchainConfig {
        image_count: choose_image_count(capabilities),
        surface_format,
        extent: choose_extent(capabilities, request.desired_extent),
        image_array_layers: choose_array_layers(
            request.array_layer_count,
            capabilities,
        ),
        present_mode,
        sharing_mode,
        queue_family_indices,
        pre_transform: choose_pre_transform(
            request.pre_transform,
            capabilities,
        ),
        composite_alpha: request.composite_alpha,
    })
}

/// A created swapchain along with its images.
///
/// The swapchain is destroyed on drop. Image views made with
/// [Swapchain::create_image_views] belong to the caller.
pub struct Swapchain {
    pub khr: vk::SwapchainKHR,

    device: ash::Device,
    loader: ash::khr::swapchain::Device,
    surface: vk::SurfaceKHR,
    images: Vec<vk::Image>,
    config: SwapchainConfig,
    image_usage: vk::ImageUsageFlags,
    allocation_callbacks: Option<vk::AllocationCallbacks<'static>>,
}

impl Swapchain {
    /// Negotiate and create a swapchain for the device.
    ///
    /// The surface comes from the request when set, otherwise from device
    /// selection. A surface which was not used for selection has its present
    /// queue resolved here.
    pub fn new(
        instance: &Instance,
        device: &Device,
        request: &SwapchainRequest,
    ) -> Result<Self, SwapchainError> {
        let physical_device = device.physical_device();
        let surface = request
            .surface
            .or_else(|| physical_device.surface())
            .ok_or(SwapchainError::SurfaceHandleNotProvided)?;
        let loader = device
            .swapchain_loader()
            .ok_or(SwapchainError::SwapchainCreationFailed(
                vk::Result::ERROR_EXTENSION_NOT_PRESENT,
            ))?
            .clone();

        let graphics_index = device.queue_index(QueueType::Graphics)?;
        let present_index = if Some(surface) == physical_device.surface() {
            device.queue_index(QueueType::Present)?
        } else {
            present_queue_index(
                instance,
                physical_device.raw(),
                surface,
                physical_device.queue_families(),
            )
            .ok_or(QueueError::PresentQueueUnavailable)?
        };

        let config = negotiate(
            instance,
            physical_device.raw(),
            Some(surface),
            graphics_index,
            present_index,
            request,
        )?;

        let create_info = vk::SwapchainCreateInfoKHR::default()
            .flags(request.flags)
            .surface(surface)
            .min_image_count(config.image_count)
            .image_format(config.surface_format.format)
            .image_color_space(config.surface_format.color_space)
            .image_extent(config.extent)
            .image_array_layers(config.image_array_layers)
            .image_usage(request.image_usage)
            .image_sharing_mode(config.sharing_mode)
            .queue_family_indices(&config.queue_family_indices)
            .pre_transform(config.pre_transform)
            .composite_alpha(config.composite_alpha)
            .present_mode(config.present_mode)
            .clipped(request.clipped)
            .old_swapchain(request.old_swapchain);

        let allocation_callbacks = device.allocation_callbacks().copied();
        let khr = unsafe {
            loader
                .create_swapchain(&create_info, allocation_callbacks.as_ref())
                .map_err(SwapchainError::SwapchainCreationFailed)?
        };
        let khr = scopeguard::guard(khr, |khr| unsafe {
            log::warn!("Destroying swapchain after a failed build");
            loader.destroy_swapchain(khr, allocation_callbacks.as_ref());
        });

        let images = unsafe {
            loader
                .get_swapchain_images(*khr)
                .map_err(SwapchainError::SwapchainImageRetrievalFailed)?
        };

        log::debug!(
            "Created swapchain with {} images, {:?}",
            images.len(),
            config
        );

        let khr = ScopeGuard::into_inner(khr);
        Ok(Self {
            khr,
            device: device.ash.clone(),
            loader,
            surface,
            images,
            config,
            image_usage: request.image_usage,
            allocation_callbacks,
        })
    }

    pub fn config(&self) -> &SwapchainConfig {
        &self.config
    }

    pub fn surface(&self) -> vk::SurfaceKHR {
        self.surface
    }

    pub fn images(&self) -> &[vk::Image] {
        &self.images
    }

    pub fn image_format(&self) -> vk::Format {
        self.config.surface_format.format
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.config.extent
    }

    pub fn image_usage(&self) -> vk::ImageUsageFlags {
        self.image_usage
    }

    /// Create one 2D color view for every swapchain image.
    ///
    /// Views created before a failure are destroyed before the error is
    /// returned.
    pub fn create_image_views(&self) -> Result<Vec<vk::ImageView>, SwapchainError> {
        let mut views = scopeguard::guard(vec![], |views: Vec<vk::ImageView>| {
            unsafe { self.destroy_image_views(&views) };
        });
        for &image in &self.images {
            let create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(self.image_format())
                .components(vk::ComponentMapping {
                    r: vk::ComponentSwizzle::IDENTITY,
                    g: vk::ComponentSwizzle::IDENTITY,
                    b: vk::ComponentSwizzle::IDENTITY,
                    a: vk::ComponentSwizzle::IDENTITY,
                })
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: self.config.image_array_layers,
                });
            let view = unsafe {
                self.device
                    .create_image_view(
                        &create_info,
                        self.allocation_callbacks.as_ref(),
                    )
                    .map_err(SwapchainError::ImageViewCreationFailed)?
            };
            views.push(view);
        }
        Ok(ScopeGuard::into_inner(views))
    }

    /// # Safety
    ///
    /// The views must have been created by [Swapchain::create_image_views]
    /// and must no longer be in use.
    pub unsafe fn destroy_image_views(&self, views: &[vk::ImageView]) {
        for &view in views {
            self.device
                .destroy_image_view(view, self.allocation_callbacks.as_ref());
        }
    }
}

impl Drop for Swapchain {
    /// The owner must ensure that the swapchain images are no longer in use.
    fn drop(&mut self) {
        unsafe {
            self.loader
                .destroy_swapchain(self.khr, self.allocation_callbacks.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use ash::vk::Handle;

    use super::*;
    use crate::vulkan::testing::{FakeDevice, FakeDriver};

    fn surface() -> Option<vk::SurfaceKHR> {
        Some(vk::SurfaceKHR::from_raw(7))
    }

    fn surface_format(format: vk::Format) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }
    }

    fn window_device() -> FakeDevice {
        FakeDevice::discrete("gpu")
            .capabilities(vk::SurfaceCapabilitiesKHR {
                min_image_count: 2,
                max_image_count: 8,
                current_extent: vk::Extent2D {
                    width: 1280,
                    height: 720,
                },
                max_image_array_layers: 1,
                current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
                ..Default::default()
            })
            .surface_formats(vec![
                surface_format(vk::Format::B8G8R8A8_UNORM),
                surface_format(vk::Format::B8G8R8A8_SRGB),
            ])
            .present_modes(vec![
                vk::PresentModeKHR::FIFO,
                vk::PresentModeKHR::MAILBOX,
            ])
            .optimal_tiling_features(
                vk::Format::B8G8R8A8_SRGB,
                vk::FormatFeatureFlags::SAMPLED_IMAGE,
            )
    }

    #[test]
    fn negotiates_the_default_request() {
        let driver = FakeDriver::new(vec![window_device()]);
        let config = negotiate(
            &driver,
            driver.handle(0),
            surface(),
            0,
            0,
            &SwapchainRequest::default(),
        )
        .unwrap();

        assert_eq!(config.image_count, 3);
        assert_eq!(config.surface_format.format, vk::Format::B8G8R8A8_SRGB);
        assert_eq!((config.extent.width, config.extent.height), (1280, 720));
        assert_eq!(config.image_array_layers, 1);
        assert_eq!(config.present_mode, vk::PresentModeKHR::MAILBOX);
        assert_eq!(config.sharing_mode, vk::SharingMode::EXCLUSIVE);
        assert_eq!(config.queue_family_indices, vec![0]);
        assert_eq!(
            config.pre_transform,
            vk::SurfaceTransformFlagsKHR::IDENTITY
        );
        assert_eq!(config.composite_alpha, vk::CompositeAlphaFlagsKHR::OPAQUE);
    }

    #[test]
    fn distinct_queues_share_concurrently() {
        let driver = FakeDriver::new(vec![window_device()]);
        let request = SwapchainRequest::default()
            .set_desired_present_mode(vk::PresentModeKHR::IMMEDIATE)
            .add_fallback_present_mode(vk::PresentModeKHR::MAILBOX);
        let config =
            negotiate(&driver, driver.handle(0), surface(), 0, 1, &request)
                .unwrap();

        assert_eq!(config.sharing_mode, vk::SharingMode::CONCURRENT);
        assert_eq!(config.queue_family_indices, vec![0, 1]);
        // IMMEDIATE is unsupported so the fallback wins.
        assert_eq!(config.present_mode, vk::PresentModeKHR::MAILBOX);
    }

    #[test]
    fn a_set_present_mode_replaces_the_defaults() {
        let driver = FakeDriver::new(vec![window_device()]);
        let request = SwapchainRequest::default()
            .set_desired_present_mode(vk::PresentModeKHR::IMMEDIATE);
        let config =
            negotiate(&driver, driver.handle(0), surface(), 0, 0, &request)
                .unwrap();

        // MAILBOX is supported but no longer desired.
        assert_eq!(config.present_mode, vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn missing_surface_fails_before_any_query() {
        let driver = FakeDriver::new(vec![window_device()]);
        let result = negotiate(
            &driver,
            driver.handle(0),
            None,
            0,
            0,
            &SwapchainRequest::default(),
        );
        assert!(matches!(
            result,
            Err(SwapchainError::SurfaceHandleNotProvided)
        ));
    }

    #[test]
    fn failed_surface_queries_are_wrapped() {
        let driver = FakeDriver::new(vec![window_device()
            .failing_surface_queries(vk::Result::ERROR_SURFACE_LOST_KHR)]);
        let result = negotiate(
            &driver,
            driver.handle(0),
            surface(),
            0,
            0,
            &SwapchainRequest::default(),
        );
        assert!(matches!(
            result,
            Err(SwapchainError::SurfaceSupportQueryFailed(
                vk::Result::ERROR_SURFACE_LOST_KHR
            ))
        ));
    }

    #[test]
    fn empty_surface_formats_abort_negotiation() {
        let driver =
            FakeDriver::new(vec![window_device().surface_formats(vec![])]);
        let result = negotiate(
            &driver,
            driver.handle(0),
            surface(),
            0,
            0,
            &SwapchainRequest::default(),
        );
        assert!(matches!(result, Err(SwapchainError::NoSurfaceFormats)));
    }
}
