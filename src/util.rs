use core::ops::{Neg, Sub};
use num::{Float, Num};
use std::ops::{Add, AddAssign};

/// Drop the first `tau` elements of a series.
pub fn lag<T: Num + Copy>(x: &[T], tau: usize) -> Vec<T> {
    assert!(tau < x.len());
    x[tau..].to_vec()
}

/// Apply first differences `d` times.
///
/// # Arguments
///
/// * `&x` - Reference to input vector of length n
/// * `d` - Differencing degree
///
/// # Returns
///
/// * Output vector of length n-d
///
/// # Example
///
/// ```
/// use arima_garch::util;
/// let x = vec![1, 2, 4];
/// assert_eq!(util::diff(&x, 1), vec![1, 2]);
/// assert_eq!(util::diff(&x, 2), vec![1]);
/// ```
pub fn diff<T: Num + Copy + Neg<Output = T> + Sub>(x: &[T], d: usize) -> Vec<T> {
    let mut y: Vec<T> = x.to_vec();
    for _ in 0..d {
        if y.len() < 2 {
            return Vec::new();
        }
        let mut next: Vec<T> = Vec::with_capacity(y.len() - 1);
        for i in 1..y.len() {
            next.push(y[i] - y[i - 1]);
        }
        y = next;
    }
    y
}

/// Pairwise log differences ln(x_t) - ln(x_t-1).
pub fn diff_log<T: Float>(x: &[T]) -> Vec<T> {
    let mut y: Vec<T> = Vec::new();
    for i in 1..x.len() {
        y.push(x[i].ln() - x[i - 1].ln());
    }
    y
}

pub fn cumsum<T: Num + Add + AddAssign + Copy + From<u8>>(x: &[T]) -> Vec<T> {
    let mut y: Vec<T> = Vec::new();
    if x.len() < 2 {
        y.push(From::from(0));
        return y;
    }
    y.push(x[0]);
    for i in 1..x.len() {
        let prev = y[i - 1];
        y.push(prev + x[i]);
    }
    y
}

/// Invert differencing by cumulating `differences` times, prepending one
/// zero per inverted difference.
pub fn diffinv<T: Num + Add + AddAssign + Copy + From<u8>>(x: &[T], differences: usize) -> Vec<T> {
    let mut y: Vec<T> = Vec::new();
    let zero: T = From::from(0);

    // build cumulative sum n times where n is the order of differences
    let mut cum: Vec<T> = x.to_vec();
    for _ in 0..differences {
        y.push(zero);
        cum = cumsum(&cum);
    }

    y.extend_from_slice(&cum);
    y
}

pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    x.iter().sum::<f64>() / x.len() as f64
}

/// Subtract the mean; returns the centered series and the mean.
pub fn center(x: &[f64]) -> (Vec<f64>, f64) {
    let m = mean(x);
    (x.iter().map(|v| v - m).collect(), m)
}
