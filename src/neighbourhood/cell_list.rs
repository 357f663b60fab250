//! Uniform cell list

use crate::types::BoundingBox;

// Upper bound on cells per point before the cell edge is widened
const MAX_CELLS_PER_POINT: usize = 8;

// Relative slack on the search radius; covers rounding in the squared distance test
const REACH_TOLERANCE: f64 = 1e-9;

/// Points bucketed into a uniform grid of cubic cells.
///
/// The cell edge is at least the requested width. Queries visit the cells overlapping
/// the box of half-width `radius` around the query point, so a query with a radius of
/// one edge inspects only a handful of cells per axis. Cell indices are monotone in the
/// coordinate, so a point is never missed because of rounding. Within a cell, points are
/// stored in increasing index order.
#[derive(Debug, Clone)]
pub struct CellList {
    origin: [f64; 3],
    edge: f64,
    dims: [usize; 3],
    starts: Vec<usize>,
    entries: Vec<usize>,
}

impl CellList {
    /// Bucket `coordinates` into cells with an edge of at least `min_edge`
    pub fn new(coordinates: &[[f64; 3]], min_edge: f64) -> Self {
        assert!(min_edge > 0.0);
        let bounds = BoundingBox::from_coordinates(coordinates);
        if bounds.is_empty() {
            return Self {
                origin: [0.0; 3],
                edge: min_edge,
                dims: [1, 1, 1],
                starts: vec![0, 0],
                entries: vec![],
            };
        }

        // Sparse point sets in large boxes would otherwise allocate mostly empty cells
        let max_cells = MAX_CELLS_PER_POINT * coordinates.len();
        let mut edge = min_edge;
        let mut dims = cell_dims(&bounds, edge);
        while cell_count(dims) > max_cells {
            edge *= 2.0;
            dims = cell_dims(&bounds, edge);
        }

        let mut cells = Self {
            origin: bounds.lower,
            edge,
            dims,
            starts: vec![],
            entries: vec![],
        };

        let ncells = dims.iter().product::<usize>();
        let cell_of = coordinates
            .iter()
            .map(|x| cells.linear_index(cells.clamped_cell(x)))
            .collect::<Vec<_>>();

        let mut counts = vec![0; ncells];
        for c in &cell_of {
            counts[*c] += 1;
        }
        let mut starts = Vec::with_capacity(ncells + 1);
        starts.push(0);
        for count in &counts {
            starts.push(starts[starts.len() - 1] + count);
        }

        let mut fill = starts[..ncells].to_vec();
        let mut entries = vec![0; coordinates.len()];
        for (i, c) in cell_of.iter().enumerate() {
            entries[fill[*c]] = i;
            fill[*c] += 1;
        }

        cells.starts = starts;
        cells.entries = entries;
        cells
    }

    /// Edge length of the cells
    pub fn edge(&self) -> f64 {
        self.edge
    }

    /// Number of cells along each axis
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Number of cells
    pub fn num_cells(&self) -> usize {
        self.starts.len() - 1
    }

    /// Indices of the points in a cell
    pub fn cell(&self, index: usize) -> &[usize] {
        &self.entries[self.starts[index]..self.starts[index + 1]]
    }

    /// Call `f` with the index of every point in the cells within `radius` of `x`.
    ///
    /// Every point whose rounded distance from `x` is at most `radius` is visited; other
    /// points may be visited too. For `radius` up to the cell edge this is at most 4 cells
    /// per axis. `x` does not need to lie inside the bucketed box.
    pub fn for_each_candidate<F: FnMut(usize)>(&self, x: &[f64; 3], radius: f64, mut f: F) {
        let reach = radius * (1.0 + REACH_TOLERANCE);
        let mut range = [(0usize, 0usize); 3];
        for d in 0..3 {
            let lo = self.axis_cell(x[d] - reach, d);
            let hi = self.axis_cell(x[d] + reach, d);
            let last = self.dims[d] as i64 - 1;
            if hi < 0 || lo > last {
                return;
            }
            range[d] = (lo.max(0) as usize, hi.min(last) as usize);
        }
        for k in range[2].0..=range[2].1 {
            for j in range[1].0..=range[1].1 {
                for i in range[0].0..=range[0].1 {
                    for p in self.cell(self.linear_index([i, j, k])) {
                        f(*p);
                    }
                }
            }
        }
    }

    fn axis_cell(&self, x: f64, d: usize) -> i64 {
        // Saturating float-to-int cast keeps far away points out of range
        ((x - self.origin[d]) / self.edge).floor() as i64
    }

    fn cell_of(&self, x: &[f64; 3]) -> [i64; 3] {
        let mut cell = [0i64; 3];
        for (d, c) in cell.iter_mut().enumerate() {
            *c = self.axis_cell(x[d], d);
        }
        cell
    }

    fn clamped_cell(&self, x: &[f64; 3]) -> [usize; 3] {
        let cell = self.cell_of(x);
        let mut clamped = [0usize; 3];
        for d in 0..3 {
            clamped[d] = cell[d].clamp(0, self.dims[d] as i64 - 1) as usize;
        }
        clamped
    }

    fn linear_index(&self, cell: [usize; 3]) -> usize {
        cell[0] + self.dims[0] * (cell[1] + self.dims[1] * cell[2])
    }
}

fn cell_dims(bounds: &BoundingBox, edge: f64) -> [usize; 3] {
    let mut dims = [1usize; 3];
    for (d, dim) in dims.iter_mut().enumerate() {
        let width = bounds.upper[d] - bounds.lower[d];
        *dim = ((width / edge).floor() as usize).saturating_add(1);
    }
    dims
}

fn cell_count(dims: [usize; 3]) -> usize {
    dims.iter().fold(1usize, |n, d| n.saturating_mul(*d))
}

#[cfg(test)]
mod test {
    use super::CellList;
    use crate::types::distance_squared;

    #[test]
    fn test_every_point_in_one_cell() {
        let coords = (0..100)
            .map(|i| [i as f64 * 0.1, (i % 7) as f64, (i % 3) as f64 * 0.5])
            .collect::<Vec<_>>();
        let cells = CellList::new(&coords, 0.75);
        assert!(cells.edge() >= 0.75);
        let mut seen = vec![0; coords.len()];
        for c in 0..cells.num_cells() {
            for p in cells.cell(c) {
                seen[*p] += 1;
            }
        }
        assert!(seen.iter().all(|s| *s == 1));
    }

    #[test]
    fn test_candidates_cover_edge_ball() {
        let coords = (0..6)
            .flat_map(|k| (0..6).flat_map(move |j| (0..6).map(move |i| [i as f64, j as f64, k as f64])))
            .collect::<Vec<_>>();
        let cells = CellList::new(&coords, 1.0);
        for x in [[2.5, 2.5, 2.5], [0.0, 0.0, 0.0], [5.0, 5.0, 5.0], [-0.5, 3.0, 6.2]] {
            let mut visited = vec![false; coords.len()];
            cells.for_each_candidate(&x, cells.edge(), |p| visited[p] = true);
            for (p, y) in coords.iter().enumerate() {
                if distance_squared(&x, y) <= cells.edge() * cells.edge() {
                    assert!(visited[p], "point {p} missed for query {x:?}");
                }
            }
        }
    }

    #[test]
    fn test_sparse_points_widen_cells() {
        let coords = [[0.0, 0.0, 0.0], [1000.0, 1000.0, 1000.0]];
        let cells = CellList::new(&coords, 0.001);
        assert!(cells.num_cells() <= 16);
        assert!(cells.edge() >= 0.001);
    }

    #[test]
    fn test_empty() {
        let cells = CellList::new(&[], 1.0);
        let mut count = 0;
        cells.for_each_candidate(&[0.0, 0.0, 0.0], 1.0, |_| count += 1);
        assert_eq!(count, 0);
    }
}
