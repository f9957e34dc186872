use ash::vk;

/// A device queue along with the family it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuQueue {
    pub queue: vk::Queue,
    pub family_id: u32,
    pub index: u32,
}

impl GpuQueue {
    pub fn from_raw(queue: vk::Queue, family_id: u32, index: u32) -> Self {
        Self {
            queue,
            family_id,
            index,
        }
    }

    /// Returns true if this instance and another represent the same device
    /// queue.
    pub fn is_same(&self, queue: &GpuQueue) -> bool {
        self.family_id == queue.family_id && self.index == queue.index
    }
}

#[cfg(test)]
mod tests {
    use ash::vk::Handle;

    use super::*;

    #[test]
    fn same_family_and_index_is_the_same_queue() {
        let a = GpuQueue::from_raw(vk::Queue::from_raw(1), 0, 0);
        let b = GpuQueue::from_raw(vk::Queue::from_raw(1), 0, 0);
        let c = GpuQueue::from_raw(vk::Queue::from_raw(2), 1, 0);
        assert!(a.is_same(&b));
        assert!(!a.is_same(&c));
    }
}
