use std::mem::size_of;

use crate::SkinWeights;

/// Running total of the heap memory owned by one or more objects.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoryAccumulator {
    total: usize,
    buffers: usize,
}

impl MemoryAccumulator {
    /// Create an empty `MemoryAccumulator`
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a buffer of `bytes` bytes to the total
    pub fn accumulate(&mut self, bytes: usize) {
        self.total += bytes;
        self.buffers += 1;
    }

    /// Add the heap buffer owned by `vec`, including any spare capacity
    pub fn accumulate_vec<T>(&mut self, vec: &Vec<T>) {
        self.accumulate(vec.capacity() * size_of::<T>());
    }

    /// Total bytes accumulated so far
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of buffers accumulated so far
    pub fn buffers(&self) -> usize {
        self.buffers
    }
}

/// Anything that can report the memory it owns to a [`MemoryAccumulator`].
pub trait MemoryUsage {
    /// Add the memory owned by `self` to `accumulator`
    fn memory_usage(&self, accumulator: &mut MemoryAccumulator);

    /// Convenience: the total memory owned by `self` on its own
    fn memory_usage_bytes(&self) -> usize {
        let mut accumulator = MemoryAccumulator::new();
        self.memory_usage(&mut accumulator);
        accumulator.total()
    }
}

impl MemoryUsage for SkinWeights {
    fn memory_usage(&self, accumulator: &mut MemoryAccumulator) {
        let names = &self.influence_names;
        let name_bytes: usize = names.iter().map(String::capacity).sum();
        // The names buffer owns the strings' contents as well.
        accumulator.accumulate(names.capacity() * size_of::<String>() + name_bytes);
        accumulator.accumulate_vec(&self.influence_poses);
        accumulator.accumulate_vec(&self.point_index_offsets);
        accumulator.accumulate_vec(&self.point_influence_counts);
        accumulator.accumulate_vec(&self.point_influence_indices);
        accumulator.accumulate_vec(&self.point_influence_weights);
    }
}
