use {
    anyhow::{Context, Result},
    ccthw_vk_bootstrap::{
        logging,
        vulkan::{
            score, select_physical_device, ApiVersion, CapabilityQuery,
            DeviceBuilder, DeviceDescriptor, InstanceBuilder, LogSink,
            QueueType,
        },
    },
};

/// Create a headless instance, score every device, and open the best one.
fn main() -> Result<()> {
    let _logger = logging::setup()?;

    let instance = InstanceBuilder::default()
        .app_name("list_devices")
        .desired_api_version(ApiVersion::V1_3)
        .request_validation_layers(true)
        .debug_sink(LogSink)
        .headless(true)
        .build()
        .context("Unable to create the Vulkan instance")?;
    log::info!("Using Vulkan {}", instance.api_version());

    let criteria = instance
        .selection_criteria()
        .add_desired_extension("VK_KHR_swapchain");

    let handles = instance
        .enumerate_physical_devices()
        .context("Unable to enumerate physical devices")?;
    for handle in handles {
        let descriptor = DeviceDescriptor::describe(&instance, handle, &criteria);
        println!(
            "{} [{:?}, Vulkan {}] => {:?}",
            descriptor.name(),
            descriptor.properties.device_type,
            descriptor.properties.api_version,
            score(&criteria, &descriptor),
        );
    }

    let physical_device = select_physical_device(&instance, &criteria)
        .context("Unable to pick a physical device")?;
    let device = DeviceBuilder::new(physical_device)
        .build(&instance)
        .context("Unable to create the logical device")?;

    let graphics = device.queue(QueueType::Graphics)?;
    println!(
        "Selected {} with graphics queue family {}",
        device.physical_device().name(),
        graphics.family_id
    );
    match device.dedicated_queue(QueueType::Transfer) {
        Ok(queue) => println!("Dedicated transfer family {}", queue.family_id),
        Err(err) => println!("{}", err),
    }

    Ok(())
}
