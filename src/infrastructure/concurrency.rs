/// Thread pool setup for parallel file checking.
use anyhow::Result;

/// Initialize the global rayon thread pool.
/// `jobs` of None uses one worker per CPU. Returns the worker count.
pub fn init_thread_pool(jobs: Option<usize>) -> Result<usize> {
    let cores = num_cpus::get();
    let workers = std::cmp::max(1, jobs.unwrap_or(cores));

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    log::info!(
        "initialized thread pool: {} workers (system has {} cores)",
        workers,
        cores
    );

    Ok(workers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_thread_pool_once() {
        // The global pool can only be built once per process; a second call
        // must fail instead of replacing it.
        let first = init_thread_pool(Some(2));
        let second = init_thread_pool(Some(2));
        assert!(second.is_err());
        if let Ok(workers) = first {
            assert_eq!(workers, 2);
        }
    }
}
