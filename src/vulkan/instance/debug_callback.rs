use std::ffi::{c_void, CStr};

use ash::vk;

/// Receives every message emitted by the Vulkan debug messenger.
///
/// The sink is owned by the [Instance](crate::vulkan::Instance) and may be
/// called from any thread the driver chooses.
pub trait DebugMessageSink: Send + Sync {
    fn message(
        &self,
        severity: vk::DebugUtilsMessageSeverityFlagsEXT,
        types: vk::DebugUtilsMessageTypeFlagsEXT,
        message: &str,
    );
}

/// Discards every message. Used when a messenger is enabled without a sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DebugMessageSink for NoopSink {
    fn message(
        &self,
        _severity: vk::DebugUtilsMessageSeverityFlagsEXT,
        _types: vk::DebugUtilsMessageTypeFlagsEXT,
        _message: &str,
    ) {
    }
}

/// Forwards messages to the `log` facade at a level matching the severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DebugMessageSink for LogSink {
    fn message(
        &self,
        severity: vk::DebugUtilsMessageSeverityFlagsEXT,
        types: vk::DebugUtilsMessageTypeFlagsEXT,
        message: &str,
    ) {
        let level = log_level(severity);
        log::log!(
            level,
            indoc::indoc!(
                "
                Vulkan Debug Message
                  - types {:?}
                  - message {}"
            ),
            types,
            message
        );
    }
}

fn log_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING)
    {
        log::Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Info
    } else {
        log::Level::Trace
    }
}

/// The native callback handed to the debug messenger.
///
/// `user_data` must point at the `Box<dyn DebugMessageSink>` owned by the
/// instance.
pub unsafe extern "system" fn debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    types: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    user_data: *mut c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() || user_data.is_null() {
        return vk::FALSE;
    }
    let callback_data = &*p_callback_data;
    let message = if callback_data.p_message.is_null() {
        std::borrow::Cow::Borrowed("")
    } else {
        CStr::from_ptr(callback_data.p_message).to_string_lossy()
    };
    let sink = &*(user_data as *const Box<dyn DebugMessageSink>);
    sink.message(severity, types, &message);
    vk::FALSE
}

/// The severities reported when the caller does not choose.
pub fn default_severity() -> vk::DebugUtilsMessageSeverityFlagsEXT {
    vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
        | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
}

/// The message types reported when the caller does not choose.
pub fn default_types() -> vk::DebugUtilsMessageTypeFlagsEXT {
    vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
        | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
        | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl DebugMessageSink for Recorder {
        fn message(
            &self,
            _severity: vk::DebugUtilsMessageSeverityFlagsEXT,
            _types: vk::DebugUtilsMessageTypeFlagsEXT,
            message: &str,
        ) {
            self.0.lock().unwrap().push(message.to_owned());
        }
    }

    #[test]
    fn callback_forwards_to_the_sink() {
        let messages = Arc::new(Mutex::new(vec![]));
        let sink: Box<Box<dyn DebugMessageSink>> =
            Box::new(Box::new(Recorder(messages.clone())));
        let user_data =
            &*sink as *const Box<dyn DebugMessageSink> as *mut c_void;
        let text = c"validation says hello";
        let data = vk::DebugUtilsMessengerCallbackDataEXT {
            p_message: text.as_ptr(),
            ..Default::default()
        };

        let result = unsafe {
            debug_callback(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
                vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
                &data,
                user_data,
            )
        };
        assert_eq!(result, vk::FALSE);
        assert_eq!(*messages.lock().unwrap(), vec!["validation says hello"]);
    }

    #[test]
    fn severity_maps_to_log_level() {
        assert_eq!(
            log_level(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR),
            log::Level::Error
        );
        assert_eq!(
            log_level(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE),
            log::Level::Trace
        );
    }
}
