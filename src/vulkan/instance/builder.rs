use std::ffi::{c_void, CString};

use ash::{vk, Entry};

use crate::{
    logging::PrettyList,
    vulkan::{
        errors::InstanceError,
        ffi::to_os_ptrs,
        instance::{
            debug_callback::{
                debug_callback, default_severity, default_types,
                DebugMessageSink, LogSink, NoopSink,
            },
            extensions::{
                check_extensions, platform_surface_extensions,
                windowing_extensions,
            },
            layers::check_layers,
            system_info::{debug_utils_name, SystemInfo, VALIDATION_LAYER_NAME},
            Instance,
        },
        ApiVersion,
    },
};

/// Everything needed to create a Vulkan instance.
///
/// # Example
///
///     use ccthw_vk_bootstrap::vulkan::{ApiVersion, InstanceBuilder, LogSink};
///
///     let builder = InstanceBuilder::default()
///         .app_name("list devices")
///         .desired_api_version(ApiVersion::V1_2)
///         .request_validation_layers(true)
///         .debug_sink(LogSink)
///         .headless(true);
///
pub struct InstanceBuilder {
    app_name: String,
    engine_name: String,
    app_version: ApiVersion,
    engine_version: ApiVersion,
    required_api_version: ApiVersion,
    desired_api_version: ApiVersion,
    layers: Vec<String>,
    extensions: Vec<String>,
    flags: vk::InstanceCreateFlags,
    use_debug_messenger: bool,
    debug_sink: Box<dyn DebugMessageSink>,
    debug_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    debug_types: vk::DebugUtilsMessageTypeFlagsEXT,
    disabled_validation_checks: Vec<vk::ValidationCheckEXT>,
    enabled_validation_features: Vec<vk::ValidationFeatureEnableEXT>,
    disabled_validation_features: Vec<vk::ValidationFeatureDisableEXT>,
    allocation_callbacks: Option<vk::AllocationCallbacks<'static>>,
    request_validation_layers: bool,
    enable_validation_layers: bool,
    headless: bool,
}

impl Default for InstanceBuilder {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            engine_name: String::new(),
            app_version: ApiVersion(0),
            engine_version: ApiVersion(0),
            required_api_version: ApiVersion::V1_0,
            desired_api_version: ApiVersion::V1_0,
            layers: vec![],
            extensions: vec![],
            flags: vk::InstanceCreateFlags::empty(),
            use_debug_messenger: false,
            debug_sink: Box::new(NoopSink),
            debug_severity: default_severity(),
            debug_types: default_types(),
            disabled_validation_checks: vec![],
            enabled_validation_features: vec![],
            disabled_validation_features: vec![],
            allocation_callbacks: None,
            request_validation_layers: false,
            enable_validation_layers: false,
            headless: false,
        }
    }
}

impl InstanceBuilder {
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    pub fn engine_name(mut self, name: impl Into<String>) -> Self {
        self.engine_name = name.into();
        self
    }

    pub fn app_version(mut self, version: ApiVersion) -> Self {
        self.app_version = version;
        self
    }

    pub fn engine_version(mut self, version: ApiVersion) -> Self {
        self.engine_version = version;
        self
    }

    /// Fail instance creation when the loader is older than `version`.
    pub fn require_api_version(mut self, version: ApiVersion) -> Self {
        self.required_api_version = version;
        self
    }

    /// Use `version` when the loader supports it.
    pub fn desired_api_version(mut self, version: ApiVersion) -> Self {
        self.desired_api_version = version;
        self
    }

    pub fn enable_layer(mut self, layer: impl Into<String>) -> Self {
        self.layers.push(layer.into());
        self
    }

    pub fn enable_extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    pub fn flags(mut self, flags: vk::InstanceCreateFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Create a debug messenger which forwards every message to `sink`.
    pub fn debug_sink(mut self, sink: impl DebugMessageSink + 'static) -> Self {
        self.debug_sink = Box::new(sink);
        self.use_debug_messenger = true;
        self
    }

    /// Create a debug messenger which forwards to the `log` facade.
    pub fn use_default_debug_messenger(self) -> Self {
        self.debug_sink(LogSink)
    }

    pub fn add_debug_messenger_severity(
        mut self,
        severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    ) -> Self {
        self.debug_severity |= severity;
        self
    }

    pub fn add_debug_messenger_type(
        mut self,
        types: vk::DebugUtilsMessageTypeFlagsEXT,
    ) -> Self {
        self.debug_types |= types;
        self
    }

    pub fn add_validation_disable(mut self, check: vk::ValidationCheckEXT) -> Self {
        self.disabled_validation_checks.push(check);
        self
    }

    pub fn add_validation_feature_enable(
        mut self,
        feature: vk::ValidationFeatureEnableEXT,
    ) -> Self {
        self.enabled_validation_features.push(feature);
        self
    }

    pub fn add_validation_feature_disable(
        mut self,
        feature: vk::ValidationFeatureDisableEXT,
    ) -> Self {
        self.disabled_validation_features.push(feature);
        self
    }

    /// Host allocation callbacks used for every object this crate creates.
    pub fn allocation_callbacks(
        mut self,
        callbacks: vk::AllocationCallbacks<'static>,
    ) -> Self {
        self.allocation_callbacks = Some(callbacks);
        self
    }

    /// Enable the Khronos validation layer when it is installed.
    pub fn request_validation_layers(mut self, request: bool) -> Self {
        self.request_validation_layers = request;
        self
    }

    /// Enable the Khronos validation layer, failing when it is missing.
    pub fn enable_validation_layers(mut self, enable: bool) -> Self {
        self.enable_validation_layers = enable;
        self
    }

    /// A headless instance skips every windowing extension.
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Load the Vulkan library and create the instance.
    pub fn build(self) -> Result<Instance, InstanceError> {
        let entry =
            unsafe { Entry::load().map_err(InstanceError::VulkanUnavailable)? };
        let system_info = SystemInfo::query(&entry)?;

        let api_version = if self.required_api_version > ApiVersion::V1_0
            || self.desired_api_version > ApiVersion::V1_0
        {
            let loader_version = unsafe { entry.try_enumerate_instance_version() }
                .ok()
                .flatten()
                .map(ApiVersion)
                .unwrap_or(ApiVersion::V1_0);
            choose_api_version(
                self.required_api_version,
                self.desired_api_version,
                loader_version,
            )?
        } else {
            ApiVersion::V1_0
        };

        let extensions = self.extensions_to_enable(&system_info)?;
        let layers = self.layers_to_enable(&system_info)?;

        log::debug!(
            indoc::indoc!(
                "
                Creating Vulkan {} instance
                Extensions: {}
                Layers: {}"
            ),
            api_version,
            PrettyList(&extensions),
            PrettyList(&layers),
        );

        let debug_enabled = extensions.contains(&debug_utils_name());
        self.create(entry, api_version, &extensions, &layers, debug_enabled)
    }

    fn extensions_to_enable(
        &self,
        system_info: &SystemInfo,
    ) -> Result<Vec<String>, InstanceError> {
        let mut extensions = self.extensions.clone();
        if self.use_debug_messenger && system_info.debug_utils_available {
            extensions.push(debug_utils_name());
        }
        if !self.headless {
            extensions.extend(windowing_extensions(
                &system_info.available_extensions,
                &platform_surface_extensions(),
            )?);
        }
        check_extensions(&system_info.available_extensions, &extensions)?;
        Ok(extensions)
    }

    fn layers_to_enable(
        &self,
        system_info: &SystemInfo,
    ) -> Result<Vec<String>, InstanceError> {
        let mut layers = self.layers.clone();
        if self.enable_validation_layers
            || (self.request_validation_layers
                && system_info.validation_layer_available)
        {
            layers.push(VALIDATION_LAYER_NAME.to_owned());
        }
        check_layers(&system_info.available_layers, &layers)?;
        Ok(layers)
    }

    fn create(
        self,
        entry: Entry,
        api_version: ApiVersion,
        extensions: &[String],
        layers: &[String],
        debug_enabled: bool,
    ) -> Result<Instance, InstanceError> {
        let app_name = CString::new(self.app_name.as_str())
            .map_err(|_| InstanceError::InvalidName(self.app_name.clone()))?;
        let engine_name = CString::new(self.engine_name.as_str())
            .map_err(|_| InstanceError::InvalidName(self.engine_name.clone()))?;
        let (_ext_names, ext_ptrs) =
            to_os_ptrs(extensions).map_err(InstanceError::InvalidName)?;
        let (_layer_names, layer_ptrs) =
            to_os_ptrs(layers).map_err(InstanceError::InvalidName)?;

        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(self.app_version.raw())
            .engine_name(&engine_name)
            .engine_version(self.engine_version.raw())
            .api_version(api_version.raw());

        // The sink lives on the heap so the pointer handed to the driver
        // stays put when the instance moves.
        let debug_sink: Box<Box<dyn DebugMessageSink>> = Box::new(self.debug_sink);
        let user_data =
            &*debug_sink as *const Box<dyn DebugMessageSink> as *mut c_void;

        let mut instance_messenger_info = messenger_create_info(
            self.debug_severity,
            self.debug_types,
            user_data,
        );
        let mut validation_features = vk::ValidationFeaturesEXT::default()
            .enabled_validation_features(&self.enabled_validation_features)
            .disabled_validation_features(&self.disabled_validation_features);
        let mut validation_flags = vk::ValidationFlagsEXT::default()
            .disabled_validation_checks(&self.disabled_validation_checks);

        let mut create_info = vk::InstanceCreateInfo::default()
            .flags(self.flags)
            .application_info(&app_info)
            .enabled_extension_names(&ext_ptrs)
            .enabled_layer_names(&layer_ptrs);
        if self.use_debug_messenger && debug_enabled {
            create_info = create_info.push_next(&mut instance_messenger_info);
        }
        if !self.enabled_validation_features.is_empty()
            || !self.disabled_validation_features.is_empty()
        {
            create_info = create_info.push_next(&mut validation_features);
        }
        if !self.disabled_validation_checks.is_empty() {
            create_info = create_info.push_next(&mut validation_flags);
        }

        let allocation_callbacks = self.allocation_callbacks;
        let instance = unsafe {
            entry
                .create_instance(&create_info, allocation_callbacks.as_ref())
                .map_err(InstanceError::UnableToCreateInstance)?
        };
        let instance = scopeguard::guard(instance, |instance| unsafe {
            instance.destroy_instance(allocation_callbacks.as_ref());
        });

        let debug_utils = if self.use_debug_messenger {
            if !debug_enabled {
                return Err(InstanceError::UnableToCreateDebugMessenger(
                    vk::Result::ERROR_EXTENSION_NOT_PRESENT,
                ));
            }
            let loader = ash::ext::debug_utils::Instance::new(&entry, &instance);
            let create_info = messenger_create_info(
                self.debug_severity,
                self.debug_types,
                user_data,
            );
            let messenger = unsafe {
                loader
                    .create_debug_utils_messenger(
                        &create_info,
                        allocation_callbacks.as_ref(),
                    )
                    .map_err(InstanceError::UnableToCreateDebugMessenger)?
            };
            Some((loader, messenger))
        } else {
            None
        };

        let instance = scopeguard::ScopeGuard::into_inner(instance);
        let surface_loader = if self.headless {
            None
        } else {
            Some(ash::khr::surface::Instance::new(&entry, &instance))
        };

        log::info!("Created Vulkan {} instance", api_version);

        Ok(Instance {
            entry,
            ash: instance,
            surface_loader,
            debug_utils,
            debug_sink,
            headless: self.headless,
            api_version,
            allocation_callbacks,
        })
    }
}

fn messenger_create_info<'a>(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    types: vk::DebugUtilsMessageTypeFlagsEXT,
    user_data: *mut c_void,
) -> vk::DebugUtilsMessengerCreateInfoEXT<'a> {
    vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(severity)
        .message_type(types)
        .pfn_user_callback(Some(debug_callback))
        .user_data(user_data)
}

/// Decide which API version to request from the loader.
///
/// A required version above 1.0 is used as-is. Otherwise the desired version
/// is capped at what the loader supports.
pub fn choose_api_version(
    required: ApiVersion,
    desired: ApiVersion,
    loader: ApiVersion,
) -> Result<ApiVersion, InstanceError> {
    if loader < required {
        return Err(InstanceError::VulkanVersionUnavailable {
            required,
            available: loader,
        });
    }
    if required > ApiVersion::V1_0 {
        Ok(required)
    } else {
        Ok(desired.min(loader))
    }
}
