//! This module defines functions for checking supported Vulkan layers.

use ash::{vk, Entry};

use crate::vulkan::{
    errors::InstanceError, ffi::owned_name, instance::extensions::missing_names,
};

/// List the names of every layer the loader knows about.
pub fn available_layers(entry: &Entry) -> Result<Vec<String>, vk::Result> {
    let properties = unsafe { entry.enumerate_instance_layer_properties()? };
    Ok(properties
        .iter()
        .filter_map(|layer| owned_name(layer.layer_name_as_c_str()))
        .collect())
}

/// Check that each of the requested layers is available on the current
/// platform.
pub fn check_layers(
    available: &[String],
    requested: &[String],
) -> Result<(), InstanceError> {
    let missing = missing_names(available, requested);
    if !missing.is_empty() {
        Err(InstanceError::RequestedLayersNotPresent(missing))
    } else {
        Ok(())
    }
}
