use ash::vk;

use crate::{
    logging::PrettyList,
    vulkan::{capabilities::CapabilityQuery, errors::SwapchainError},
};

/// Choose the number of images for the swapchain to manage.
///
/// One more than the minimum, clamped to the maximum when the surface
/// declares one. A maximum of 0 means unbounded.
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let proposed_image_count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        proposed_image_count.min(capabilities.max_image_count)
    } else {
        proposed_image_count
    }
}

/// Choose a surface format from the desired list, in priority order.
///
/// A desired entry is usable when the surface reports the exact
/// format/color-space pair and the device supports `required_features` for
/// the format with optimal tiling. Without a usable entry the surface's first
/// format is used.
pub fn choose_surface_format(
    query: &impl CapabilityQuery,
    device: vk::PhysicalDevice,
    available: &[vk::SurfaceFormatKHR],
    desired: &[vk::SurfaceFormatKHR],
    required_features: vk::FormatFeatureFlags,
) -> Result<vk::SurfaceFormatKHR, SwapchainError> {
    let fallback = *available.first().ok_or(SwapchainError::NoSurfaceFormats)?;

    log::debug!("Available formats: {:?}", PrettyList(available));

    let format = desired
        .iter()
        .copied()
        .find(|wanted| {
            available.iter().any(|format| {
                format.format == wanted.format
                    && format.color_space == wanted.color_space
            }) && query
                .format_properties(device, wanted.format)
                .optimal_tiling_features
                .contains(required_features)
        })
        .unwrap_or(fallback);

    log::debug!("Chosen format {:?}", format);

    Ok(format)
}

/// Choose the swap extent.
///
/// A surface which reports `u32::MAX` as its current width lets the
/// swapchain decide, so the desired extent is clamped into the surface's
/// range. Otherwise the current extent is used as-is.
pub fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    desired: vk::Extent2D,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        log::debug!("Use current extent {:?}", capabilities.current_extent);
        return capabilities.current_extent;
    }
    let extent = vk::Extent2D {
        width: desired.width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: desired.height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    };
    log::debug!("Use computed extent {:?}", extent);
    extent
}

/// A requested layer count of 0 is treated as 1.
pub fn choose_array_layers(
    requested: u32,
    capabilities: &vk::SurfaceCapabilitiesKHR,
) -> u32 {
    requested.max(1).min(capabilities.max_image_array_layers.max(1))
}

/// Choose the first desired present mode the surface supports, or FIFO which
/// every surface must support.
pub fn choose_present_mode(
    available: &[vk::PresentModeKHR],
    desired: &[vk::PresentModeKHR],
) -> vk::PresentModeKHR {
    log::debug!("Available presentation modes: {:?}", PrettyList(available));

    let mode = desired
        .iter()
        .copied()
        .find(|mode| available.contains(mode))
        .unwrap_or(vk::PresentModeKHR::FIFO);

    log::debug!("Chosen presentation mode {:?}", mode);

    mode
}

/// Exclusive ownership when one family does both jobs, otherwise concurrent
/// sharing between the two families.
pub fn choose_sharing_mode(
    graphics_index: u32,
    present_index: u32,
) -> (vk::SharingMode, Vec<u32>) {
    if graphics_index == present_index {
        (vk::SharingMode::EXCLUSIVE, vec![graphics_index])
    } else {
        (
            vk::SharingMode::CONCURRENT,
            vec![graphics_index, present_index],
        )
    }
}

/// Use the caller's transform when one was given, otherwise keep the
/// surface's current transform.
pub fn choose_pre_transform(
    requested: vk::SurfaceTransformFlagsKHR,
    capabilities: &vk::SurfaceCapabilitiesKHR,
) -> vk::SurfaceTransformFlagsKHR {
    if requested.is_empty() {
        capabilities.current_transform
    } else {
        requested
    }
}
