// Basic descriptive statistics over integer sequences.
//
// Every function here borrows its input and never reorders it. Anything
// that is undefined for an empty sequence returns `None` instead of a NaN,
// so callers cannot accidentally render `0/0`.
use std::collections::BTreeMap;

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(xs: &[i64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    let sum: i64 = xs.iter().sum();
    Some(sum as f64 / xs.len() as f64)
}

/// Median of a sequence. Sorts a private copy; the caller's slice keeps
/// its order. Even lengths average the two middle values.
pub fn median(xs: &[i64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid] as f64)
    } else {
        Some((sorted[mid - 1] + sorted[mid]) as f64 / 2.0)
    }
}

/// Most frequent value. When several values share the highest frequency
/// the smallest of them wins.
pub fn mode(xs: &[i64]) -> Option<i64> {
    let mut freq: BTreeMap<i64, usize> = BTreeMap::new();
    for &x in xs {
        *freq.entry(x).or_insert(0) += 1;
    }
    let mut best: Option<(i64, usize)> = None;
    // BTreeMap iterates ascending, so a strict `>` keeps the smallest value.
    for (value, count) in freq {
        match best {
            Some((_, c)) if count <= c => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

/// Population standard deviation (divides by N).
pub fn std_dev(xs: &[i64]) -> Option<f64> {
    let m = mean(xs)?;
    let variance = xs
        .iter()
        .map(|&x| {
            let d = x as f64 - m;
            d * d
        })
        .sum::<f64>()
        / xs.len() as f64;
    Some(variance.sqrt())
}

/// Length of the longest contiguous run of `true`.
pub fn longest_run(flags: &[bool]) -> usize {
    let (mut best, mut current) = (0usize, 0usize);
    for &f in flags {
        if f {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

pub fn max(xs: &[i64]) -> Option<i64> {
    xs.iter().copied().max()
}

pub fn min(xs: &[i64]) -> Option<i64> {
    xs.iter().copied().min()
}

/// `num / den`, or `None` when the denominator is zero or the result is
/// not finite.
pub fn ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        return None;
    }
    let r = num / den;
    r.is_finite().then_some(r)
}

/// `num / den * 100`, with the same guard as `ratio`.
pub fn percent(num: f64, den: f64) -> Option<f64> {
    ratio(num, den).map(|r| r * 100.0)
}

/// Standard deviation expressed as a percentage of the mean
/// (coefficient of variation).
pub fn relative_std_dev(std_dev: Option<f64>, mean: Option<f64>) -> Option<f64> {
    percent(std_dev?, mean?)
}
