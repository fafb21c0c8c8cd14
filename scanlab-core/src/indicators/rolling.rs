//! Fixed-size trailing window primitives.
//!
//! A window yields a value only once it holds exactly `window` observations.
//! Non-finite inputs (void bars) poison every window that contains them.

use std::collections::VecDeque;

/// Running sum with Neumaier compensation.
///
/// A large term entering and later leaving the window would otherwise
/// leave its rounding error in every subsequent sum.
#[derive(Debug, Default, Clone, Copy)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Trailing sum over `window` values, maintained as a compensated running sum.
pub fn rolling_sum(values: &[f64], window: usize) -> Vec<Option<f64>> {
    assert!(window >= 1, "window must be >= 1");
    let n = values.len();
    let mut result = vec![None; n];
    if n < window {
        return result;
    }

    let mut sum = CompensatedSum::default();
    // Count of non-finite values currently inside the window.
    let mut bad = 0usize;

    for i in 0..n {
        let entering = values[i];
        if entering.is_finite() {
            sum.add(entering);
        } else {
            bad += 1;
        }

        if i >= window {
            let leaving = values[i - window];
            if leaving.is_finite() {
                sum.add(-leaving);
            } else {
                bad -= 1;
            }
        }

        if i + 1 >= window && bad == 0 {
            result[i] = Some(sum.value());
        }
    }

    result
}

/// Trailing arithmetic mean over `window` values.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_sum(values, window)
        .into_iter()
        .map(|s| s.map(|s| s / window as f64))
        .collect()
}

/// Trailing minimum over `window` values using a monotonic deque.
///
/// The deque holds indices whose values are strictly increasing, so the
/// front is always the window minimum. Amortized O(1) per element.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<Option<f64>> {
    assert!(window >= 1, "window must be >= 1");
    let n = values.len();
    let mut result = vec![None; n];
    if n < window {
        return result;
    }

    let mut deque: VecDeque<usize> = VecDeque::with_capacity(window);
    let mut last_bad: Option<usize> = None;

    for i in 0..n {
        let v = values[i];
        if !v.is_finite() {
            last_bad = Some(i);
            deque.clear();
        } else {
            while let Some(&back) = deque.back() {
                if values[back] >= v {
                    deque.pop_back();
                } else {
                    break;
                }
            }
            deque.push_back(i);
        }

        if i + 1 < window {
            continue;
        }
        let start = i + 1 - window;
        while let Some(&front) = deque.front() {
            if front < start {
                deque.pop_front();
            } else {
                break;
            }
        }

        let poisoned = matches!(last_bad, Some(b) if b >= start);
        if !poisoned {
            result[i] = deque.front().map(|&idx| values[idx]);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_requires_full_window() {
        let r = rolling_sum(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(r, vec![None, None, Some(6.0), Some(9.0)]);
    }

    #[test]
    fn sum_too_few_values_is_all_none() {
        assert!(rolling_sum(&[1.0, 2.0], 3).iter().all(Option::is_none));
    }

    #[test]
    fn mean_window_one_is_identity() {
        let r = rolling_mean(&[5.0, 7.0, 9.0], 1);
        assert_eq!(r, vec![Some(5.0), Some(7.0), Some(9.0)]);
    }

    #[test]
    fn nan_poisons_windows_containing_it() {
        let r = rolling_mean(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0], 3);
        assert_eq!(r[0], None);
        assert_eq!(r[1], None);
        assert_eq!(r[2], None);
        assert_eq!(r[3], None);
        assert_eq!(r[4], None);
        assert_eq!(r[5], Some(14.0));
    }

    #[test]
    fn large_term_leaves_no_residue_after_exiting() {
        let mut values = vec![5.0e9];
        values.extend(std::iter::repeat(1.1).take(100));
        let window = 20;
        let sums = rolling_sum(&values, window);

        for i in window..values.len() {
            let direct: f64 = values[(i + 1 - window)..=i].iter().sum();
            let got = sums[i].unwrap();
            assert!((got - direct).abs() < 1e-9, "bar {i}: {got} vs {direct}");
        }
    }

    #[test]
    fn min_tracks_sliding_window() {
        let r = rolling_min(&[9.0, 10.0, 13.0, 12.0, 14.0], 3);
        assert_eq!(r, vec![None, None, Some(9.0), Some(10.0), Some(12.0)]);
    }

    #[test]
    fn min_handles_equal_values() {
        let r = rolling_min(&[5.0, 5.0, 5.0, 6.0], 2);
        assert_eq!(r, vec![None, Some(5.0), Some(5.0), Some(5.0)]);
    }

    #[test]
    fn min_nan_poisons_window() {
        let r = rolling_min(&[9.0, f64::NAN, 13.0, 12.0, 14.0], 3);
        assert_eq!(r[2], None);
        assert_eq!(r[3], None);
        assert_eq!(r[4], Some(12.0));
    }

    #[test]
    fn min_matches_naive_scan() {
        let values: Vec<f64> = (0..50)
            .map(|i| ((i * 37) % 17) as f64 - 3.5)
            .collect();
        let window = 7;
        let fast = rolling_min(&values, window);
        for i in 0..values.len() {
            let expected = if i + 1 >= window {
                Some(
                    values[(i + 1 - window)..=i]
                        .iter()
                        .copied()
                        .fold(f64::INFINITY, f64::min),
                )
            } else {
                None
            };
            assert_eq!(fast[i], expected, "mismatch at {i}");
        }
    }
}
