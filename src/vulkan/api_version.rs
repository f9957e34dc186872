use std::fmt;

use ash::vk;

/// A packed Vulkan API version number.
///
/// Ordering follows the packed integer, so variant, major, minor, and patch
/// compare in that priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion(pub u32);

impl ApiVersion {
    pub const V1_0: Self = Self(vk::API_VERSION_1_0);
    pub const V1_1: Self = Self(vk::API_VERSION_1_1);
    pub const V1_2: Self = Self(vk::API_VERSION_1_2);
    pub const V1_3: Self = Self(vk::API_VERSION_1_3);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self(vk::make_api_version(0, major, minor, patch))
    }

    pub const fn major(self) -> u32 {
        vk::api_version_major(self.0)
    }

    pub const fn minor(self) -> u32 {
        vk::api_version_minor(self.0)
    }

    pub const fn patch(self) -> u32 {
        vk::api_version_patch(self.0)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::V1_0
    }
}

impl From<u32> for ApiVersion {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}
