//! Worker-count budgeting.
//!
//! Rasterisation and OCR are both CPU-hungry. The budget leaves a share of
//! the host's cores to the OS and whatever else is running, while still
//! spreading the work over the rest.

use once_cell::sync::Lazy;
use std::num::NonZeroUsize;
use tracing::debug;

/// Share of the host's cores used when no explicit fraction is given.
pub const DEFAULT_CPU_FRACTION: f64 = 0.7;

static THREAD_BUDGET: Lazy<usize> = Lazy::new(|| {
    let cpus = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    let budget = compute_thread_budget(cpus, DEFAULT_CPU_FRACTION);
    debug!("Thread budget: {} of {} CPUs", budget, cpus);
    budget
});

/// Number of workers to use out of `cpu_count`, given a utilisation fraction.
///
/// Rounds half to even, then clamps to `[0, cpu_count]`. The fraction is
/// clamped to `[0, 1]` and a NaN fraction yields `0`.
///
/// A result of `0` means "let the engine choose", never "do no work".
///
/// ```rust
/// use docvision::pipeline::budget::compute_thread_budget;
///
/// assert_eq!(compute_thread_budget(8, 0.7), 6);
/// assert!(compute_thread_budget(1, 0.7) <= 1);
/// ```
pub fn compute_thread_budget(cpu_count: usize, fraction: f64) -> usize {
    if fraction.is_nan() {
        return 0;
    }
    let wanted = (cpu_count as f64 * fraction.clamp(0.0, 1.0)).round_ties_even();
    // `as` saturates for out-of-range floats.
    (wanted as usize).min(cpu_count)
}

/// The process-wide budget, computed once from the host's parallelism.
pub fn thread_budget() -> usize {
    *THREAD_BUDGET
}

/// Resolve a worker hint: `0` becomes the host's parallelism.
pub(crate) fn effective_workers(hint: usize) -> usize {
    if hint > 0 {
        return hint;
    }
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_cpus_at_seventy_percent() {
        assert_eq!(compute_thread_budget(8, 0.7), 6);
    }

    #[test]
    fn single_cpu_stays_in_range() {
        let b = compute_thread_budget(1, 0.7);
        assert!(b <= 1, "got {b}");
    }

    #[test]
    fn rounds_half_to_even() {
        // 5 * 0.5 = 2.5 → 2, 3 * 0.5 = 1.5 → 2
        assert_eq!(compute_thread_budget(5, 0.5), 2);
        assert_eq!(compute_thread_budget(3, 0.5), 2);
    }

    #[test]
    fn clamps_fraction() {
        assert_eq!(compute_thread_budget(4, 3.0), 4);
        assert_eq!(compute_thread_budget(4, -1.0), 0);
        assert_eq!(compute_thread_budget(4, f64::NAN), 0);
        assert_eq!(compute_thread_budget(0, 0.7), 0);
    }

    #[test]
    fn process_budget_is_stable() {
        assert_eq!(thread_budget(), thread_budget());
    }

    #[test]
    fn zero_hint_means_host_default() {
        assert!(effective_workers(0) >= 1);
        assert_eq!(effective_workers(3), 3);
    }
}
