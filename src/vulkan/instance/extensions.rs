//! This module provides functions for verifying the available Vulkan
//! extensions.

use std::ffi::CStr;

use ash::{vk, Entry};

use crate::{
    logging::PrettyList,
    vulkan::{errors::InstanceError, ffi::owned_name},
};

/// List the names of every instance extension provided by the loader, or by
/// the named layer when `layer` is set.
pub fn available_extensions(
    entry: &Entry,
    layer: Option<&CStr>,
) -> Result<Vec<String>, vk::Result> {
    let properties =
        unsafe { entry.enumerate_instance_extension_properties(layer)? };
    Ok(properties
        .iter()
        .filter_map(|ext| owned_name(ext.extension_name_as_c_str()))
        .collect())
}

/// Check that each of the required extensions is in the available list.
pub fn check_extensions(
    available: &[String],
    required: &[String],
) -> Result<(), InstanceError> {
    let missing = missing_names(available, required);
    if !missing.is_empty() {
        Err(InstanceError::RequiredExtensionsNotPresent(missing))
    } else {
        Ok(())
    }
}

/// Every required name which does not appear in the available list.
pub fn missing_names(available: &[String], required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|name| !available.contains(name))
        .cloned()
        .collect()
}

/// The platform surface extensions, any one of which is enough to present on
/// this target.
pub fn platform_surface_extensions() -> Vec<&'static CStr> {
    if cfg!(target_os = "windows") {
        vec![ash::khr::win32_surface::NAME]
    } else if cfg!(any(target_os = "macos", target_os = "ios")) {
        vec![ash::ext::metal_surface::NAME]
    } else if cfg!(unix) {
        vec![
            ash::khr::xlib_surface::NAME,
            ash::khr::wayland_surface::NAME,
            ash::khr::xcb_surface::NAME,
        ]
    } else {
        vec![]
    }
}

/// Pick the windowing extensions to enable from the available list.
///
/// `VK_KHR_surface` is always required. When `platform` is non-empty at
/// least one of its entries must be available too; every available entry is
/// enabled.
pub fn windowing_extensions(
    available: &[String],
    platform: &[&CStr],
) -> Result<Vec<String>, InstanceError> {
    let surface = ash::khr::surface::NAME.to_string_lossy().into_owned();
    if !available.contains(&surface) {
        return Err(InstanceError::WindowingExtensionsNotPresent);
    }

    let platform_available: Vec<String> = platform
        .iter()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| available.contains(name))
        .collect();
    if !platform.is_empty() && platform_available.is_empty() {
        return Err(InstanceError::WindowingExtensionsNotPresent);
    }

    log::debug!("Windowing extensions: {}", PrettyList(&platform_available));

    let mut extensions = vec![surface];
    extensions.extend(platform_available);
    Ok(extensions)
}
