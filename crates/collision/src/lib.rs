//! Collision Query Surface: simplified static geometry used only for ray queries.
//!
//! # Invariants
//! - Proxies are immutable once built.
//! - `intersect` returns hits ordered nearest first; an empty result is a miss, not an error.
//!
//! The proxy is a stand-in for the walls and floors of the visual environment.
//! It is never rendered and never simulated.

mod description;
mod mesh;

pub use description::{BoxDesc, ProxyDescription};
pub use mesh::{Aabb, TriangleMeshProxy};

use walkthrough_common::{Ray, RayHit};

/// Errors from building a proxy.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("proxy has no triangles")]
    Empty,
    #[error("triangle {0} is degenerate")]
    DegenerateTriangle(usize),
    #[error("box {0} has min > max on some axis")]
    InvalidBox(usize),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything that can answer ray-intersection queries against static geometry.
pub trait CollisionProxy {
    /// All hits along `ray`, nearest first. May be empty.
    fn intersect(&self, ray: &Ray) -> Vec<RayHit>;

    /// Nearest hit along `ray`, if any.
    fn nearest(&self, ray: &Ray) -> Option<RayHit> {
        self.intersect(ray).into_iter().next()
    }
}
