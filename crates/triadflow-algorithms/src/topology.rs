//! Graph topology analysis algorithms
//!
//! Exact triangle counting and listing on an in-memory `GraphView`.

use super::common::{GraphView, NodeId};
use rayon::prelude::*;

/// A triangle as three node ids with `a < b < c`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriangleTriple {
    pub a: NodeId,
    pub b: NodeId,
    pub c: NodeId,
}

/// Calls `f(u, v, w)` with dense indices `u < v < w` for every triangle through `u`.
fn for_each_triangle_at<F>(view: &GraphView, u: usize, mut f: F)
where
    F: FnMut(usize, usize, usize),
{
    let u_higher = view.higher_neighbors(u);
    for (pos, &v) in u_higher.iter().enumerate() {
        // Merge-intersect the tail of N+(u) after v with N+(v)
        let mut left = &u_higher[pos + 1..];
        let mut right = view.higher_neighbors(v);
        while let (Some(&x), Some(&y)) = (left.first(), right.first()) {
            if x < y {
                left = &left[1..];
            } else if y < x {
                right = &right[1..];
            } else {
                f(u, v, x);
                left = &left[1..];
                right = &right[1..];
            }
        }
    }
}

/// Triangle Counting
///
/// Returns total number of triangles in the graph; each triangle is counted once.
pub fn count_triangles(view: &GraphView) -> usize {
    let mut triangle_count = 0;
    for u in 0..view.node_count {
        for_each_triangle_at(view, u, |_, _, _| triangle_count += 1);
    }
    triangle_count
}

/// Same as [`count_triangles`], split across the rayon pool by start node.
pub fn par_count_triangles(view: &GraphView) -> usize {
    (0..view.node_count)
        .into_par_iter()
        .map(|u| {
            let mut local = 0;
            for_each_triangle_at(view, u, |_, _, _| local += 1);
            local
        })
        .sum()
}

/// Lists every triangle, ordered ascending.
pub fn list_triangles(view: &GraphView) -> Vec<TriangleTriple> {
    let mut triangles = Vec::new();
    for u in 0..view.node_count {
        for_each_triangle_at(view, u, |a, b, c| {
            triangles.push(TriangleTriple {
                a: view.index_to_node[a],
                b: view.index_to_node[b],
                c: view.index_to_node[c],
            });
        });
    }
    triangles.sort_unstable();
    triangles
}
