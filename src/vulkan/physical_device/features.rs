use ash::vk;

/// The number of boolean fields a single feature block can describe.
pub const FEATURE_FIELD_CAPACITY: usize = 256;

/// One block of extension features, identified by the structure type of the
/// Vulkan struct it mirrors.
///
/// Fields are stored by position: field `i` is the `i`th `VkBool32` member
/// after the struct's `sType` and `pNext` header.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FeatureRequirementNode {
    tag: vk::StructureType,
    fields: [bool; FEATURE_FIELD_CAPACITY],
}

impl FeatureRequirementNode {
    /// A block with no fields set.
    pub fn new(tag: vk::StructureType) -> Self {
        Self {
            tag,
            fields: [false; FEATURE_FIELD_CAPACITY],
        }
    }

    /// Copy the first `field_count` boolean members of a Vulkan feature
    /// struct.
    ///
    /// # Safety
    ///
    /// `T` must be a Vulkan feature struct laid out as `sType`, `pNext`, then
    /// at least `field_count` consecutive `VkBool32` members.
    pub unsafe fn from_vk_struct<T: vk::TaggedStructure>(
        features: &T,
        field_count: usize,
    ) -> Self {
        let header = std::mem::size_of::<vk::BaseOutStructure>();
        debug_assert!(
            header + field_count * std::mem::size_of::<vk::Bool32>()
                <= std::mem::size_of::<T>()
        );
        let count = field_count.min(FEATURE_FIELD_CAPACITY);
        let first = (features as *const T as *const u8).add(header)
            as *const vk::Bool32;
        let raw = std::slice::from_raw_parts(first, count);

        let mut node = Self::new(T::STRUCTURE_TYPE);
        for (field, &value) in node.fields.iter_mut().zip(raw) {
            *field = value != vk::FALSE;
        }
        node
    }

    pub fn vulkan_11(features: &vk::PhysicalDeviceVulkan11Features) -> Self {
        unsafe { Self::from_vk_struct(features, 12) }
    }

    pub fn vulkan_12(features: &vk::PhysicalDeviceVulkan12Features) -> Self {
        unsafe { Self::from_vk_struct(features, 47) }
    }

    pub fn vulkan_13(features: &vk::PhysicalDeviceVulkan13Features) -> Self {
        unsafe { Self::from_vk_struct(features, 15) }
    }

    /// Mark the field at `index` as set.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [FEATURE_FIELD_CAPACITY].
    pub fn with_field(mut self, index: usize) -> Self {
        self.fields[index] = true;
        self
    }

    pub fn tag(&self) -> vk::StructureType {
        self.tag
    }

    pub fn fields(&self) -> &[bool; FEATURE_FIELD_CAPACITY] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> bool {
        self.fields.get(index).copied().unwrap_or(false)
    }
}

impl std::fmt::Debug for FeatureRequirementNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, &enabled)| enabled)
            .map(|(index, _)| index)
            .collect();
        f.debug_struct("FeatureRequirementNode")
            .field("tag", &self.tag)
            .field("fields", &set)
            .finish()
    }
}

/// Compare a single requested block against the block the device reported for
/// the same structure type.
///
/// # Panics
///
/// Panics when the two blocks carry different tags. Chains are always built in
/// lock-step, so a mismatch is a bug in the caller.
pub fn node_matches(
    requested: &FeatureRequirementNode,
    supported: &FeatureRequirementNode,
) -> bool {
    assert_eq!(
        requested.tag, supported.tag,
        "Non-matching structure types in feature nodes"
    );
    requested
        .fields
        .iter()
        .zip(supported.fields.iter())
        .all(|(&wanted, &present)| !wanted || present)
}

/// Walk both chains by position. A requested block with no supported
/// counterpart is treated as entirely unsupported.
pub fn chain_matches(
    requested: &[FeatureRequirementNode],
    supported: &[FeatureRequirementNode],
) -> bool {
    requested.iter().enumerate().all(|(position, wanted)| {
        match supported.get(position) {
            Some(present) => node_matches(wanted, present),
            None => wanted.fields.iter().all(|&field| !field),
        }
    })
}

macro_rules! core_feature_fields {
    ($($field:ident),+ $(,)?) => {
        /// Every boolean member of `VkPhysicalDeviceFeatures`, by name.
        const CORE_FEATURE_FIELDS: &[(
            &str,
            fn(&vk::PhysicalDeviceFeatures) -> vk::Bool32,
        )] = &[$((stringify!($field), |features| features.$field)),+];
    };
}

core_feature_fields!(
    robust_buffer_access,
    full_draw_index_uint32,
    image_cube_array,
    independent_blend,
    geometry_shader,
    tessellation_shader,
    sample_rate_shading,
    dual_src_blend,
    logic_op,
    multi_draw_indirect,
    draw_indirect_first_instance,
    depth_clamp,
    depth_bias_clamp,
    fill_mode_non_solid,
    depth_bounds,
    wide_lines,
    large_points,
    alpha_to_one,
    multi_viewport,
    sampler_anisotropy,
    texture_compression_etc2,
    texture_compression_astc_ldr,
    texture_compression_bc,
    occlusion_query_precise,
    pipeline_statistics_query,
    vertex_pipeline_stores_and_atomics,
    fragment_stores_and_atomics,
    shader_tessellation_and_geometry_point_size,
    shader_image_gather_extended,
    shader_storage_image_extended_formats,
    shader_storage_image_multisample,
    shader_storage_image_read_without_format,
    shader_storage_image_write_without_format,
    shader_uniform_buffer_array_dynamic_indexing,
    shader_sampled_image_array_dynamic_indexing,
    shader_storage_buffer_array_dynamic_indexing,
    shader_storage_image_array_dynamic_indexing,
    shader_clip_distance,
    shader_cull_distance,
    shader_float64,
    shader_int64,
    shader_int16,
    shader_resource_residency,
    shader_resource_min_lod,
    sparse_binding,
    sparse_residency_buffer,
    sparse_residency_image2_d,
    sparse_residency_image3_d,
    sparse_residency2_samples,
    sparse_residency4_samples,
    sparse_residency8_samples,
    sparse_residency16_samples,
    sparse_residency_aliased,
    variable_multisample_rate,
    inherited_queries,
);

/// The names of every core feature which is requested but not supported.
pub fn missing_features(
    requested: &vk::PhysicalDeviceFeatures,
    supported: &vk::PhysicalDeviceFeatures,
) -> Vec<&'static str> {
    CORE_FEATURE_FIELDS
        .iter()
        .filter(|(_, get)| {
            get(requested) != vk::FALSE && get(supported) == vk::FALSE
        })
        .map(|(name, _)| *name)
        .collect()
}

/// True when every requested core feature is supported. Features which are
/// not requested are ignored.
pub fn features_match(
    requested: &vk::PhysicalDeviceFeatures,
    supported: &vk::PhysicalDeviceFeatures,
) -> bool {
    CORE_FEATURE_FIELDS.iter().all(|(_, get)| {
        get(requested) == vk::FALSE || get(supported) != vk::FALSE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG_12: vk::StructureType =
        vk::StructureType::PHYSICAL_DEVICE_VULKAN_1_2_FEATURES;
    const TAG_13: vk::StructureType =
        vk::StructureType::PHYSICAL_DEVICE_VULKAN_1_3_FEATURES;

    #[test]
    fn all_core_fields_are_listed() {
        assert_eq!(CORE_FEATURE_FIELDS.len(), 55);
    }

    #[test]
    fn unsupported_request_fails() {
        let requested = vk::PhysicalDeviceFeatures {
            robust_buffer_access: vk::TRUE,
            ..Default::default()
        };
        let supported = vk::PhysicalDeviceFeatures::default();
        assert!(!features_match(&requested, &supported));
        assert_eq!(
            missing_features(&requested, &supported),
            vec!["robust_buffer_access"]
        );
    }

    #[test]
    fn empty_request_always_matches() {
        let empty = vk::PhysicalDeviceFeatures::default();
        assert!(features_match(&empty, &empty));
    }

    #[test]
    fn unrequested_support_is_ignored() {
        let requested = vk::PhysicalDeviceFeatures {
            wide_lines: vk::TRUE,
            ..Default::default()
        };
        let supported = vk::PhysicalDeviceFeatures {
            wide_lines: vk::TRUE,
            geometry_shader: vk::TRUE,
            sparse_binding: vk::TRUE,
            ..Default::default()
        };
        assert!(features_match(&requested, &supported));
    }

    #[test]
    fn chain_fails_on_any_missing_flag() {
        let requested =
            vec![FeatureRequirementNode::new(TAG_12).with_field(3).with_field(9)];
        let partial = vec![FeatureRequirementNode::new(TAG_12).with_field(3)];
        let full = vec![FeatureRequirementNode::new(TAG_12)
            .with_field(3)
            .with_field(9)
            .with_field(10)];
        assert!(!chain_matches(&requested, &partial));
        assert!(chain_matches(&requested, &full));
    }

    #[test]
    fn missing_supported_nodes_count_as_unsupported() {
        let requested = vec![
            FeatureRequirementNode::new(TAG_12).with_field(0),
            FeatureRequirementNode::new(TAG_13).with_field(1),
        ];
        let supported = vec![FeatureRequirementNode::new(TAG_12).with_field(0)];
        assert!(!chain_matches(&requested, &supported));
        assert!(!chain_matches(&requested, &[]));
        assert!(chain_matches(&[], &[]));
    }

    #[test]
    #[should_panic(expected = "Non-matching structure types")]
    fn mismatched_tags_are_a_programming_error() {
        node_matches(
            &FeatureRequirementNode::new(TAG_12),
            &FeatureRequirementNode::new(TAG_13),
        );
    }

    #[test]
    fn vulkan_12_struct_fields_are_copied_by_position() {
        let features = vk::PhysicalDeviceVulkan12Features {
            sampler_mirror_clamp_to_edge: vk::TRUE,
            descriptor_indexing: vk::TRUE,
            subgroup_broadcast_dynamic_id: vk::TRUE,
            ..Default::default()
        };
        let node = FeatureRequirementNode::vulkan_12(&features);
        assert_eq!(node.tag(), TAG_12);
        assert!(node.field(0));
        assert!(node.field(9));
        assert!(node.field(46));
        assert!(!node.field(1));
        assert!(!node.field(47));
    }
}
