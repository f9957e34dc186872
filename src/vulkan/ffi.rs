use std::{
    ffi::{c_void, CStr, CString, FromBytesUntilNulError},
    os::raw::c_char,
};

use ash::vk;

use crate::vulkan::physical_device::{
    FeatureRequirementNode, FEATURE_FIELD_CAPACITY,
};

/// Build a vector of pointers to c-style strings from a slice of rust strings.
///
/// The returned pointers are only valid while the returned cstrings are alive.
/// Returns the offending name when a string contains an interior nul byte.
pub fn to_os_ptrs(
    strings: &[String],
) -> Result<(Vec<CString>, Vec<*const c_char>), String> {
    let cstrings = strings
        .iter()
        .map(|name| CString::new(name.as_str()).map_err(|_| name.clone()))
        .collect::<Result<Vec<CString>, String>>()?;
    let ptrs = cstrings
        .iter()
        .map(|cstr| cstr.as_ptr())
        .collect::<Vec<*const c_char>>();
    Ok((cstrings, ptrs))
}

/// Convert a name reported by the driver into an owned string.
///
/// Names which are not nul-terminated or not valid utf-8 are skipped by
/// callers, so this returns None for them.
pub fn owned_name(
    name: Result<&CStr, FromBytesUntilNulError>,
) -> Option<String> {
    name.ok()
        .and_then(|cstr| cstr.to_str().ok())
        .map(str::to_owned)
}

/// The common memory layout shared by every Vulkan feature struct which can be
/// chained behind `VkPhysicalDeviceFeatures2`: the structure type, the next
/// pointer, then a run of `VkBool32` fields.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawFeatureBlock {
    pub s_type: vk::StructureType,
    pub p_next: *mut c_void,
    pub fields: [vk::Bool32; FEATURE_FIELD_CAPACITY],
}

impl RawFeatureBlock {
    /// An all-false block carrying the node's tag, ready to be filled by
    /// `vkGetPhysicalDeviceFeatures2`.
    pub fn query_for(node: &FeatureRequirementNode) -> Self {
        Self {
            s_type: node.tag(),
            p_next: std::ptr::null_mut(),
            fields: [vk::FALSE; FEATURE_FIELD_CAPACITY],
        }
    }

    /// A block with the node's requested flags set, for device creation.
    pub fn enable_for(node: &FeatureRequirementNode) -> Self {
        let mut block = Self::query_for(node);
        for (raw, &enabled) in block.fields.iter_mut().zip(node.fields()) {
            *raw = enabled as vk::Bool32;
        }
        block
    }

    pub fn to_node(&self) -> FeatureRequirementNode {
        let mut node = FeatureRequirementNode::new(self.s_type);
        for (index, &raw) in self.fields.iter().enumerate() {
            if raw != vk::FALSE {
                node = node.with_field(index);
            }
        }
        node
    }
}

/// Link a slice of feature blocks into a pNext chain, in order.
///
/// Returns a pointer to the first block, or null when the slice is empty. The
/// pointer is only valid while `blocks` is neither moved nor reallocated.
pub fn link_feature_blocks(blocks: &mut [RawFeatureBlock]) -> *mut c_void {
    let mut next: *mut c_void = std::ptr::null_mut();
    for block in blocks.iter_mut().rev() {
        block.p_next = next;
        next = block as *mut RawFeatureBlock as *mut c_void;
    }
    next
}
