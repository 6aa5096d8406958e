//! Worker pool sizing

/// Processing mode for multi-viewpoint runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// A single worker
    Sequential,
    /// One worker per available core
    #[default]
    Parallel,
    /// Parallel with specified number of workers
    ParallelWith(usize),
}

impl ProcessingMode {
    /// Number of workers this mode starts; never 0
    pub fn worker_count(&self) -> usize {
        match self {
            ProcessingMode::Sequential => 1,
            ProcessingMode::Parallel => num_cpus(),
            ProcessingMode::ParallelWith(workers) => (*workers).max(1),
        }
    }
}

/// Get the number of available CPU cores
#[cfg(feature = "parallel")]
pub fn num_cpus() -> usize {
    rayon::current_num_threads()
}

/// Get the number of available CPU cores
#[cfg(not(feature = "parallel"))]
pub fn num_cpus() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count() {
        assert_eq!(ProcessingMode::Sequential.worker_count(), 1);
        assert_eq!(ProcessingMode::ParallelWith(6).worker_count(), 6);
        assert_eq!(ProcessingMode::ParallelWith(0).worker_count(), 1);
        assert!(ProcessingMode::Parallel.worker_count() >= 1);
        assert_eq!(ProcessingMode::default(), ProcessingMode::Parallel);
    }
}
