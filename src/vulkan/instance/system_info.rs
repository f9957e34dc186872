use std::ffi::CString;

use ash::{vk, Entry};

use crate::{
    logging::PrettyList,
    vulkan::{
        errors::InstanceError,
        instance::{extensions::available_extensions, layers::available_layers},
    },
};

pub const VALIDATION_LAYER_NAME: &str = "VK_LAYER_KHRONOS_validation";

/// What the Vulkan loader offers before any instance exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemInfo {
    pub available_layers: Vec<String>,
    pub available_extensions: Vec<String>,
    pub validation_layer_available: bool,
    pub debug_utils_available: bool,
}

impl SystemInfo {
    /// Ask the loader for its layers and instance extensions.
    pub fn query(entry: &Entry) -> Result<Self, InstanceError> {
        let layers = available_layers(entry)
            .map_err(InstanceError::UnableToListAvailableLayers)?;
        let extensions = available_extensions(entry, None)
            .map_err(InstanceError::UnableToListAvailableExtensions)?;

        log::debug!(
            indoc::indoc!(
                "
                Loader layers: {}
                Loader extensions: {}"
            ),
            PrettyList(&layers),
            PrettyList(&extensions),
        );

        let layer_extensions: Vec<Result<Vec<String>, vk::Result>> = layers
            .iter()
            .map(|layer| {
                let name = CString::new(layer.as_str())
                    .map_err(|_| vk::Result::ERROR_LAYER_NOT_PRESENT)?;
                available_extensions(entry, Some(&name))
            })
            .collect();

        Ok(Self::from_lists(layers, extensions, layer_extensions))
    }

    /// Build the summary from lists which have already been queried.
    ///
    /// `layer_extensions` yields each layer's own extension list. A layer
    /// whose list could not be read is ignored.
    pub fn from_lists(
        available_layers: Vec<String>,
        available_extensions: Vec<String>,
        layer_extensions: impl IntoIterator<Item = Result<Vec<String>, vk::Result>>,
    ) -> Self {
        let debug_utils = debug_utils_name();
        let debug_utils_available = available_extensions.contains(&debug_utils)
            || layer_extensions.into_iter().any(|extensions| {
                extensions
                    .map(|extensions| extensions.contains(&debug_utils))
                    .unwrap_or(false)
            });
        Self {
            validation_layer_available: available_layers
                .iter()
                .any(|layer| layer == VALIDATION_LAYER_NAME),
            debug_utils_available,
            available_layers,
            available_extensions,
        }
    }

    pub fn is_extension_available(&self, name: &str) -> bool {
        self.available_extensions.iter().any(|ext| ext == name)
    }

    pub fn is_layer_available(&self, name: &str) -> bool {
        self.available_layers.iter().any(|layer| layer == name)
    }
}

pub fn debug_utils_name() -> String {
    ash::ext::debug_utils::NAME.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_utils_found_at_loader_level() {
        let info = SystemInfo::from_lists(
            vec![],
            vec!["VK_EXT_debug_utils".to_owned()],
            [],
        );
        assert!(info.debug_utils_available);
        assert!(!info.validation_layer_available);
    }

    #[test]
    fn debug_utils_found_through_a_layer() {
        let info = SystemInfo::from_lists(
            vec![VALIDATION_LAYER_NAME.to_owned()],
            vec![],
            [Ok(vec!["VK_EXT_debug_utils".to_owned()])],
        );
        assert!(info.debug_utils_available);
        assert!(info.validation_layer_available);
        assert!(info.is_layer_available(VALIDATION_LAYER_NAME));
    }

    #[test]
    fn failed_layer_enumeration_does_not_count() {
        let info = SystemInfo::from_lists(
            vec!["VK_LAYER_broken".to_owned()],
            vec![],
            [
                Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY),
                Ok(vec!["VK_KHR_surface".to_owned()]),
            ],
        );
        assert!(!info.debug_utils_available);
    }
}
