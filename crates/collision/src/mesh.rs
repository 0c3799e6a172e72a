use glam::Vec3;
use serde::{Deserialize, Serialize};
use walkthrough_common::{Ray, RayHit};

use crate::{CollisionProxy, ProxyError};

/// Below this, a triangle or a ray/plane determinant counts as zero.
const EPSILON: f32 = 1e-7;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box holding every point. `None` when `points` is empty.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| {
            Self::new(acc.min.min(p), acc.max.max(p))
        }))
    }

    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Slab test: parametric entry distance of `ray` into the box, if it enters at all.
    pub fn ray_entry(&self, ray: &Ray) -> Option<f32> {
        let mut t_near = 0.0_f32;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            let (origin, dir) = (ray.origin[axis], ray.direction[axis]);
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if dir == 0.0 {
                // Parallel to this slab: the ray is inside it everywhere or nowhere.
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }
            let inv = dir.recip();
            let (t1, t2) = ((lo - origin) * inv, (hi - origin) * inv);
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
            if t_far < t_near {
                return None;
            }
        }
        Some(t_near)
    }

    /// The twelve triangles covering the six faces.
    pub fn triangles(&self) -> [[Vec3; 3]; 12] {
        let (a, b) = (self.min, self.max);
        let c = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        let v = [
            c(a.x, a.y, a.z),
            c(b.x, a.y, a.z),
            c(b.x, b.y, a.z),
            c(a.x, b.y, a.z),
            c(a.x, a.y, b.z),
            c(b.x, a.y, b.z),
            c(b.x, b.y, b.z),
            c(a.x, b.y, b.z),
        ];
        [
            // -Z face
            [v[0], v[2], v[1]],
            [v[0], v[3], v[2]],
            // +Z face
            [v[4], v[5], v[6]],
            [v[4], v[6], v[7]],
            // -X face
            [v[0], v[4], v[7]],
            [v[0], v[7], v[3]],
            // +X face
            [v[1], v[2], v[6]],
            [v[1], v[6], v[5]],
            // -Y face
            [v[0], v[1], v[5]],
            [v[0], v[5], v[4]],
            // +Y face
            [v[3], v[7], v[6]],
            [v[3], v[6], v[2]],
        ]
    }
}

/// Static triangle soup answering ray queries from both sides of every face.
#[derive(Debug, Clone)]
pub struct TriangleMeshProxy {
    name: String,
    triangles: Vec<[Vec3; 3]>,
    bounds: Aabb,
}

impl TriangleMeshProxy {
    /// Build from explicit triangles. Rejects empty input and zero-area triangles.
    pub fn from_triangles(
        name: impl Into<String>,
        triangles: Vec<[Vec3; 3]>,
    ) -> Result<Self, ProxyError> {
        for (i, [a, b, c]) in triangles.iter().enumerate() {
            if (*b - *a).cross(*c - *a).length_squared() <= EPSILON * EPSILON {
                return Err(ProxyError::DegenerateTriangle(i));
            }
        }
        let bounds = Aabb::from_points(triangles.iter().flatten().copied())
            .ok_or(ProxyError::Empty)?;
        let name = name.into();
        tracing::debug!(%name, triangles = triangles.len(), "built collision proxy");
        Ok(Self {
            name,
            triangles,
            bounds,
        })
    }

    /// Build from solid axis-aligned boxes (walls, floors, pillars).
    pub fn from_boxes(name: impl Into<String>, boxes: &[Aabb]) -> Result<Self, ProxyError> {
        let mut triangles = Vec::with_capacity(boxes.len() * 12);
        for (i, b) in boxes.iter().enumerate() {
            if !b.is_valid() {
                return Err(ProxyError::InvalidBox(i));
            }
            triangles.extend(b.triangles());
        }
        Self::from_triangles(name, triangles)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }
}

impl CollisionProxy for TriangleMeshProxy {
    fn intersect(&self, ray: &Ray) -> Vec<RayHit> {
        if self.bounds.ray_entry(ray).is_none() {
            return Vec::new();
        }

        let mut hits: Vec<RayHit> = self
            .triangles
            .iter()
            .filter_map(|tri| ray_triangle(ray, tri))
            .map(|distance| RayHit {
                distance,
                point: ray.at(distance),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        // Rays through a shared edge report the same surface twice.
        hits.dedup_by(|a, b| (a.distance - b.distance).abs() <= 1e-5);
        hits
    }
}

/// Möller–Trumbore, double-sided. Returns the distance along the ray.
fn ray_triangle(ray: &Ray, [a, b, c]: &[Vec3; 3]) -> Option<f32> {
    let e1 = *b - *a;
    let e2 = *c - *a;
    let p = ray.direction.cross(e2);
    let det = e1.dot(p);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - *a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    (t > EPSILON).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(origin: Vec3, dir: Vec3) -> Ray {
        Ray::new(origin, dir).unwrap()
    }

    fn wall_at_z(z: f32) -> TriangleMeshProxy {
        TriangleMeshProxy::from_boxes(
            "wall",
            &[Aabb::new(Vec3::new(-5.0, 0.0, z - 0.1), Vec3::new(5.0, 3.0, z))],
        )
        .unwrap()
    }

    #[test]
    fn ray_hits_wall_at_expected_distance() {
        let proxy = wall_at_z(-3.0);
        let hit = proxy
            .nearest(&ray(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z))
            .unwrap();
        assert!((hit.distance - 3.0).abs() < 1e-4);
        assert!(hit.point.abs_diff_eq(Vec3::new(0.0, 1.0, -3.0), 1e-4));
    }

    #[test]
    fn hits_are_sorted_nearest_first() {
        let proxy = wall_at_z(-3.0);
        let hits = proxy.intersect(&ray(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z));
        // Front and back face of the slab.
        assert_eq!(hits.len(), 2);
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn ray_pointing_away_misses() {
        let proxy = wall_at_z(-3.0);
        assert!(proxy
            .intersect(&ray(Vec3::new(0.0, 1.0, 0.0), Vec3::Z))
            .is_empty());
    }

    #[test]
    fn ray_above_wall_misses() {
        let proxy = wall_at_z(-3.0);
        assert!(proxy
            .nearest(&ray(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Z))
            .is_none());
    }

    #[test]
    fn floor_hit_from_above() {
        let proxy = TriangleMeshProxy::from_boxes(
            "floor",
            &[Aabb::new(Vec3::new(-10.0, -0.2, -10.0), Vec3::new(10.0, 0.0, 10.0))],
        )
        .unwrap();
        let hit = proxy
            .nearest(&ray(Vec3::new(1.0, 2.5, 1.0), Vec3::NEG_Y))
            .unwrap();
        assert!(hit.point.abs_diff_eq(Vec3::new(1.0, 0.0, 1.0), 1e-4));
    }

    #[test]
    fn inside_box_hits_far_face_once() {
        let proxy = TriangleMeshProxy::from_boxes(
            "room",
            &[Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))],
        )
        .unwrap();
        let hits = proxy.intersect(&ray(Vec3::ZERO, Vec3::X));
        assert_eq!(hits.len(), 1);
        assert!((hits[0].distance - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_proxy_rejected() {
        assert!(matches!(
            TriangleMeshProxy::from_triangles("none", Vec::new()),
            Err(ProxyError::Empty)
        ));
    }

    #[test]
    fn degenerate_triangle_rejected() {
        let tri = [Vec3::ZERO, Vec3::X, Vec3::X * 2.0];
        assert!(matches!(
            TriangleMeshProxy::from_triangles("line", vec![tri]),
            Err(ProxyError::DegenerateTriangle(0))
        ));
    }

    #[test]
    fn inverted_box_rejected() {
        let b = Aabb::new(Vec3::ONE, Vec3::ZERO);
        assert!(matches!(
            TriangleMeshProxy::from_boxes("bad", &[b]),
            Err(ProxyError::InvalidBox(0))
        ));
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let proxy = wall_at_z(-3.0);
        let b = proxy.bounds();
        assert!(b.min.abs_diff_eq(Vec3::new(-5.0, 0.0, -3.1), 1e-5));
        assert!(b.max.abs_diff_eq(Vec3::new(5.0, 3.0, -3.0), 1e-5));
        assert_eq!(proxy.triangle_count(), 12);
    }

    #[test]
    fn ray_along_bounds_face_still_enters() {
        let slab = Aabb::new(Vec3::new(0.0, -0.2, 0.0), Vec3::new(5.0, 0.0, 5.0));
        let down = ray(Vec3::new(0.0, 2.5, 2.5), Vec3::NEG_Y);
        assert_eq!(slab.ray_entry(&down), Some(2.5));

        let outside = ray(Vec3::new(-0.01, 2.5, 2.5), Vec3::NEG_Y);
        assert_eq!(slab.ray_entry(&outside), None);
    }

    #[test]
    fn floor_probe_at_proxy_corner_hits() {
        let floor = Aabb::new(Vec3::new(0.0, -0.2, 0.0), Vec3::new(5.0, 0.0, 5.0));
        let proxy = TriangleMeshProxy::from_boxes("floor", &[floor]).unwrap();
        let hit = proxy
            .nearest(&ray(Vec3::new(0.0, 2.5, 0.0), Vec3::NEG_Y))
            .unwrap();
        assert!((hit.distance - 2.5).abs() < 1e-5);
        assert!(hit.point.abs_diff_eq(Vec3::ZERO, 1e-5));
    }
}
