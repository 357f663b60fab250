//! Selection of points by position
//!
//! Coordinates are passed flattened as `[x0, y0, z0, x1, ...]`, as returned by
//! [crate::Decomposition::owned_coordinates]. Selections return the local indices of
//! the chosen points in increasing order.

use crate::types::Axis;

/// Points whose coordinate along `axis` is within `tolerance` of the largest one
pub fn points_axis_aligned_maximum(axis: Axis, coordinates: &[f64], tolerance: f64) -> Vec<usize> {
    let values = axis_values(axis, coordinates);
    let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
    values
        .enumerate()
        .filter(|(_, x)| max - x <= tolerance)
        .map(|(i, _)| i)
        .collect()
}

/// Points whose coordinate along `axis` is within `tolerance` of the smallest one
pub fn points_axis_aligned_minimum(axis: Axis, coordinates: &[f64], tolerance: f64) -> Vec<usize> {
    let values = axis_values(axis, coordinates);
    let min = values.clone().fold(f64::INFINITY, f64::min);
    values
        .enumerate()
        .filter(|(_, x)| x - min <= tolerance)
        .map(|(i, _)| i)
        .collect()
}

/// Points for which `predicate` holds
pub fn points_in<F: Fn(&[f64; 3]) -> bool>(coordinates: &[f64], predicate: F) -> Vec<usize> {
    coordinates
        .chunks_exact(3)
        .enumerate()
        .filter(|(_, x)| predicate(&[x[0], x[1], x[2]]))
        .map(|(i, _)| i)
        .collect()
}

fn axis_values(axis: Axis, coordinates: &[f64]) -> impl Iterator<Item = f64> + Clone + '_ {
    assert_eq!(coordinates.len() % 3, 0);
    coordinates
        .chunks_exact(3)
        .map(move |x| x[axis.index()])
}
