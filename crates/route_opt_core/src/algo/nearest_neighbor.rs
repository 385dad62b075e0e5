use crate::{DistanceMatrix, Error, Result};

/// Greedy tour from `start`: always step to the closest unvisited stop.
///
/// Ties go to the lowest index. A NaN distance only wins when every
/// remaining candidate is NaN, so the result is always a permutation.
pub fn nearest_neighbor_tour(matrix: &DistanceMatrix, start: usize) -> Result<Vec<usize>> {
    let n = matrix.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if start >= n {
        return Err(Error::invalid_input(format!(
            "start index {start} out of range for {n} stops"
        )));
    }

    let mut visited = vec![false; n];
    let mut tour = Vec::with_capacity(n);
    visited[start] = true;
    tour.push(start);

    let mut current = start;
    while tour.len() < n {
        let mut next: Option<(usize, f64)> = None;
        for (idx, &d) in matrix.row(current).iter().enumerate() {
            if visited[idx] {
                continue;
            }
            match next {
                None => next = Some((idx, d)),
                Some((_, best)) if d < best || (best.is_nan() && !d.is_nan()) => {
                    next = Some((idx, d));
                }
                _ => {}
            }
        }

        let Some((idx, _)) = next else {
            break;
        };
        visited[idx] = true;
        tour.push(idx);
        current = idx;
    }

    Ok(tour)
}
