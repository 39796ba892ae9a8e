//! Polygon triangulation rules.
//!
//! Triangles are expressed as corner indices into the polygon, not as vertex
//! indices, so per-corner data (UVs) follows each triangle.

use cgmath::{InnerSpace, Vector2, Vector3};

use super::Face;

pub trait Triangulate {
    /// Splits `face` into triangles. Each triangle holds three corner indices of `face`
    /// in the polygon's winding order.
    fn triangulate(&self, face: &Face, positions: &[[f32; 3]]) -> Vec<[usize; 3]>;
}

/// Fans every polygon around its first corner.
#[derive(Copy, Clone, Debug, Default)]
pub struct FanTriangulator;

impl Triangulate for FanTriangulator {
    fn triangulate(&self, face: &Face, _positions: &[[f32; 3]]) -> Vec<[usize; 3]> {
        fan(&(0..face.corners.len()).collect::<Vec<_>>())
    }
}

fn fan(corners: &[usize]) -> Vec<[usize; 3]> {
    if corners.len() < 3 {
        return Vec::new();
    }
    (1..corners.len() - 1)
        .map(|i| [corners[0], corners[i], corners[i + 1]])
        .collect()
}

/// Ear clipping on the polygon projected onto its dominant plane.
///
/// Handles concave polygons. Degenerate input (collinear or self-overlapping
/// corners) falls back to a fan over whatever is left.
#[derive(Copy, Clone, Debug, Default)]
pub struct EarClipTriangulator;

const EPSILON: f32 = 1e-9;

impl Triangulate for EarClipTriangulator {
    fn triangulate(&self, face: &Face, positions: &[[f32; 3]]) -> Vec<[usize; 3]> {
        let n = face.corners.len();
        if n <= 3 {
            return fan(&(0..n).collect::<Vec<_>>());
        }
        let points3: Vec<Vector3<f32>> = face
            .corners
            .iter()
            .map(|corner| {
                positions
                    .get(corner.vertex as usize)
                    .copied()
                    .unwrap_or([0.0; 3])
                    .into()
            })
            .collect();
        let points = project(&points3);

        // Twice the signed area; its sign tells the winding of the projection.
        let area: f32 = (0..n)
            .map(|i| {
                let a = points[i];
                let b = points[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();
        if area.abs() <= EPSILON {
            return fan(&(0..n).collect::<Vec<_>>());
        }
        let winding = area.signum();

        let mut remaining: Vec<usize> = (0..n).collect();
        let mut triangles = Vec::with_capacity(n - 2);
        while remaining.len() > 3 {
            let len = remaining.len();
            let ear = (0..len).find(|&i| {
                let prev = remaining[(i + len - 1) % len];
                let cur = remaining[i];
                let next = remaining[(i + 1) % len];
                is_ear(&points, &remaining, prev, cur, next, winding)
            });
            match ear {
                Some(i) => {
                    let prev = remaining[(i + len - 1) % len];
                    let next = remaining[(i + 1) % len];
                    triangles.push([prev, remaining[i], next]);
                    remaining.remove(i);
                }
                None => {
                    log::debug!("no ear left in a {}-gon, fanning the rest", n);
                    triangles.extend(fan(&remaining));
                    return triangles;
                }
            }
        }
        triangles.push([remaining[0], remaining[1], remaining[2]]);
        triangles
    }
}

/// Drops the axis the Newell normal points along the most.
fn project(points: &[Vector3<f32>]) -> Vec<Vector2<f32>> {
    let n = points.len();
    let mut normal = Vector3::new(0.0, 0.0, 0.0);
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    if normal.magnitude2() > 0.0 {
        normal = normal.normalize();
    }
    let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
    points
        .iter()
        .map(|p| {
            if az >= ax && az >= ay {
                Vector2::new(p.x, p.y)
            } else if ax >= ay {
                Vector2::new(p.y, p.z)
            } else {
                Vector2::new(p.z, p.x)
            }
        })
        .collect()
}

fn cross(o: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn is_ear(
    points: &[Vector2<f32>],
    remaining: &[usize],
    prev: usize,
    cur: usize,
    next: usize,
    winding: f32,
) -> bool {
    let (a, b, c) = (points[prev], points[cur], points[next]);
    if cross(a, b, c) * winding <= EPSILON {
        return false;
    }
    remaining
        .iter()
        .filter(|&&idx| idx != prev && idx != cur && idx != next)
        .map(|&idx| points[idx])
        .filter(|&p| p != a && p != b && p != c)
        .all(|p| !inside(p, a, b, c, winding))
}

fn inside(p: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>, winding: f32) -> bool {
    cross(a, b, p) * winding >= 0.0 && cross(b, c, p) * winding >= 0.0 && cross(c, a, p) * winding >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Corner;

    fn polygon(count: u32) -> Face {
        Face::new((0..count).map(Corner::new).collect(), 0)
    }

    #[test]
    fn fan_of_quad_gives_two_triangles() {
        let triangles = FanTriangulator.triangulate(&polygon(4), &[]);
        assert_eq!(triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn fan_ignores_degenerate_faces() {
        assert!(FanTriangulator.triangulate(&polygon(2), &[]).is_empty());
    }

    #[test]
    fn ear_clipping_handles_concave_polygon() {
        // Arrow shape, concave at corner 3, lying in the XZ plane.
        let positions = [
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.0, 0.0, 2.0],
            [1.0, 0.0, 0.5],
            [0.0, 0.0, 2.0],
        ];
        let triangles = EarClipTriangulator.triangulate(&polygon(5), &positions);
        assert_eq!(triangles.len(), 3);

        // The reflex corner must never be the tip of an ear, and no triangle may use
        // the diagonal 2-4 that crosses outside the polygon.
        for tri in &triangles {
            let has_2 = tri.contains(&2);
            let has_4 = tri.contains(&4);
            assert!(!(has_2 && has_4 && !tri.contains(&3)), "{:?}", triangles);
        }
        let used: std::collections::HashSet<usize> = triangles.iter().flatten().copied().collect();
        assert_eq!(used.len(), 5);
    }

    #[test]
    fn ear_clipping_falls_back_to_fan_for_collinear_input() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]];
        let triangles = EarClipTriangulator.triangulate(&polygon(4), &positions);
        assert_eq!(triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }
}
