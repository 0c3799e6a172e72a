use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{Aabb, ProxyError, TriangleMeshProxy};

/// An axis-aligned box in a proxy description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxDesc {
    pub min: Vec3,
    pub max: Vec3,
}

/// Serializable description of a collision proxy.
///
/// ```json
/// {
///   "name": "college-proxy",
///   "boxes": [{ "min": [-10, -0.2, -10], "max": [10, 0, 10] }],
///   "triangles": [[[0, 0, 0], [1, 0, 0], [0, 1, 0]]]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyDescription {
    pub name: String,
    pub boxes: Vec<BoxDesc>,
    pub triangles: Vec<[Vec3; 3]>,
}

impl ProxyDescription {
    pub fn from_json(json: &str) -> Result<Self, ProxyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Triangulate boxes and append raw triangles into one proxy.
    pub fn build(&self) -> Result<TriangleMeshProxy, ProxyError> {
        let mut triangles = self.triangles.clone();
        for (i, b) in self.boxes.iter().enumerate() {
            let aabb = Aabb::new(b.min, b.max);
            if !aabb.is_valid() {
                return Err(ProxyError::InvalidBox(i));
            }
            triangles.extend(aabb.triangles());
        }
        let name = if self.name.is_empty() {
            "proxy"
        } else {
            self.name.as_str()
        };
        TriangleMeshProxy::from_triangles(name, triangles)
    }
}
