//! Recursive coordinate bisection

use crate::types::{BoundingBox, Error, Point, Result};
use std::cmp::Ordering;

/// Assign each point to one of `num_parts` parts.
///
/// The point set is split along the axis of greatest extent; the cut is placed so that
/// the point counts, not the volumes, of the two halves are proportional to the number
/// of parts each half receives. Points are ordered by coordinate and then by id, so the
/// result does not depend on the order of `points`. Part sizes differ by at most one.
///
/// Returns the part of `points[i]` at index `i`.
pub fn partition(points: &[Point], num_parts: usize) -> Result<Vec<usize>> {
    if num_parts == 0 {
        return Err(Error::InvalidConfiguration(
            "Cannot partition points into zero parts".to_string(),
        ));
    }
    if num_parts > points.len() {
        return Err(Error::UnderPopulatedPartition {
            processes: num_parts,
            points: points.len(),
        });
    }

    let mut owners = vec![0; points.len()];
    let mut indices = (0..points.len()).collect::<Vec<_>>();
    bisect(points, &mut indices, 0, num_parts, &mut owners);
    Ok(owners)
}

fn bisect(
    points: &[Point],
    indices: &mut [usize],
    first_part: usize,
    num_parts: usize,
    owners: &mut [usize],
) {
    if num_parts == 1 {
        for i in indices.iter() {
            owners[*i] = first_part;
        }
        return;
    }

    let axis = BoundingBox::from_coordinates(indices.iter().map(|i| points[*i].coordinate()))
        .longest_axis()
        .index();

    let left_parts = num_parts / 2;
    // Never zero and never the whole range: every part holds at least one point
    let cut = indices.len() * left_parts / num_parts;

    indices.select_nth_unstable_by(cut, |a, b| compare(&points[*a], &points[*b], axis));

    let (left, right) = indices.split_at_mut(cut);
    bisect(points, left, first_part, left_parts, owners);
    bisect(
        points,
        right,
        first_part + left_parts,
        num_parts - left_parts,
        owners,
    );
}

fn compare(a: &Point, b: &Point, axis: usize) -> Ordering {
    a.coordinate()[axis]
        .total_cmp(&b.coordinate()[axis])
        .then(a.id().cmp(&b.id()))
}
