use crate::{
    logging::PrettyList,
    vulkan::physical_device::{
        chain_matches, features_match, missing_features, DeviceDescriptor,
        SelectionCriteria,
    },
};

/// How well a device fits the selection criteria.
///
/// Variants are declared worst first so the derived ordering ranks
/// `Suitable > PartiallySuitable > Unsuitable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SuitabilityVerdict {
    Unsuitable,
    PartiallySuitable,
    Suitable,
}

/// Score a single device against the criteria.
///
/// Pure: the verdict depends only on the criteria and the snapshot.
pub fn score(
    criteria: &SelectionCriteria,
    device: &DeviceDescriptor,
) -> SuitabilityVerdict {
    use SuitabilityVerdict::*;

    let name = device.name();
    let mut verdict = Suitable;

    // api version
    let api_version = device.properties.api_version;
    if api_version < criteria.required_version {
        log::trace!(
            "{} supports Vulkan {} but {} is required",
            name,
            api_version,
            criteria.required_version
        );
        return Unsuitable;
    }
    if api_version < criteria.desired_version {
        verdict = verdict.min(PartiallySuitable);
    }

    // queues
    let queues = device.queue_analysis();
    let present_deferred =
        criteria.defer_surface_initialization || criteria.headless;
    // Deferring only skips the present queue check when no surface was
    // queried.
    let present_queue_required = criteria.require_present
        && (criteria.surface.is_some() || !present_deferred);
    let missing_queue = [
        (
            criteria.require_dedicated_compute_queue,
            queues.dedicated_compute,
            "dedicated compute",
        ),
        (
            criteria.require_dedicated_transfer_queue,
            queues.dedicated_transfer,
            "dedicated transfer",
        ),
        (
            criteria.require_separate_compute_queue,
            queues.separate_compute,
            "separate compute",
        ),
        (
            criteria.require_separate_transfer_queue,
            queues.separate_transfer,
            "separate transfer",
        ),
        (
            present_queue_required,
            queues.present,
            "present",
        ),
    ]
    .into_iter()
    .find(|(required, index, _)| *required && index.is_none());
    if let Some((_, _, kind)) = missing_queue {
        log::trace!("{} has no {} queue", name, kind);
        return Unsuitable;
    }

    // extensions
    if let Some(err) = device.extension_error {
        if !criteria.required_extensions.is_empty() {
            log::trace!(
                "{} could not list its extensions ({:?}) but some are required",
                name,
                err
            );
            return Unsuitable;
        }
    }
    let missing_required: Vec<&String> = criteria
        .required_extensions
        .iter()
        .filter(|extension| !device.supports_extension(extension))
        .collect();
    if !missing_required.is_empty() {
        log::trace!(
            "{} is missing required extensions {:?}",
            name,
            PrettyList(&missing_required)
        );
        return Unsuitable;
    }
    if criteria
        .desired_extensions
        .iter()
        .any(|extension| !device.supports_extension(extension))
    {
        verdict = verdict.min(PartiallySuitable);
    }

    // surface
    if criteria.require_present && !present_deferred {
        let adequate = device
            .presentation
            .as_ref()
            .map(|presentation| presentation.swapchain_adequate)
            .unwrap_or(false);
        if !adequate {
            log::trace!(
                "{} reports no surface formats or no present modes",
                name
            );
            return Unsuitable;
        }
    }

    // device type
    if device.properties.device_type != criteria.preferred_type.as_vk() {
        if criteria.allow_any_type {
            verdict = verdict.min(PartiallySuitable);
        } else {
            log::trace!(
                "{} is a {:?} but {:?} is required",
                name,
                device.properties.device_type,
                criteria.preferred_type
            );
            return Unsuitable;
        }
    }

    // features
    if !features_match(&criteria.required_features, &device.features) {
        log::trace!(
            "{} is missing required features {:?}",
            name,
            PrettyList(&missing_features(
                &criteria.required_features,
                &device.features
            ))
        );
        return Unsuitable;
    }
    if !chain_matches(&criteria.required_feature_chain, &device.feature_chain) {
        log::trace!("{} is missing required extension features", name);
        return Unsuitable;
    }

    // memory
    if !device
        .memory
        .has_device_local_heap_larger_than(criteria.required_mem_size)
    {
        log::trace!(
            "{} has no device local heap larger than {} bytes",
            name,
            criteria.required_mem_size
        );
        return Unsuitable;
    }
    if !device
        .memory
        .has_device_local_heap_larger_than(criteria.desired_mem_size)
    {
        verdict = verdict.min(PartiallySuitable);
    }

    verdict
}

/// Apply the selection tie-break to verdicts listed in enumeration order.
///
/// The first `Suitable` entry wins outright. Without one, the last
/// `PartiallySuitable` entry wins. Returns the index of the winner.
pub fn choose_device(verdicts: &[SuitabilityVerdict]) -> Option<usize> {
    let mut chosen = None;
    for (index, verdict) in verdicts.iter().enumerate() {
        match verdict {
            SuitabilityVerdict::Suitable => return Some(index),
            SuitabilityVerdict::PartiallySuitable => chosen = Some(index),
            SuitabilityVerdict::Unsuitable => {}
        }
    }
    chosen
}
