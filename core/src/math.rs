//! Math type aliases and bounding volumes.

pub use nalgebra;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AaBox {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl AaBox {
    /// Create a box from its corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box spanning a single point.
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grow the box so it contains `point`.
    pub fn merge_point(&mut self, point: &Vec3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Center of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Size of the box along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

impl Default for AaBox {
    fn default() -> Self {
        Self {
            min: Vec3::zeros(),
            max: Vec3::zeros(),
        }
    }
}

/// Bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Sphere center.
    pub center: Vec3,
    /// Sphere radius.
    pub radius: f32,
}

impl Sphere {
    /// Create a sphere.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether `point` lies inside or on the sphere.
    pub fn contains(&self, point: &Vec3) -> bool {
        (point - self.center).norm() <= self.radius
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            center: Vec3::zeros(),
            radius: 0.0,
        }
    }
}

/// Combined box and sphere bounds of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    /// Axis-aligned box.
    pub bounding_box: AaBox,
    /// Bounding sphere.
    pub sphere: Sphere,
}

impl Bounds {
    /// Create bounds from a box and a sphere.
    pub fn new(bounding_box: AaBox, sphere: Sphere) -> Self {
        Self {
            bounding_box,
            sphere,
        }
    }
}
