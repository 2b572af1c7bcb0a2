use serde::Serialize;

use crate::config::{FixedRotation, StackAxis};

/// Rotation followed by translation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RigidTransform {
    /// Row-major 3x3 rotation.
    pub rotation: [[f64; 3]; 3],
    pub translation: [f64; 3],
}

impl RigidTransform {
    pub const IDENTITY: RigidTransform = RigidTransform {
        rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        translation: [0.0; 3],
    };

    /// Right-handed rotation of `angle` radians about a unit `axis`.
    pub fn rotation_about(axis: [f64; 3], angle: f64) -> Self {
        let [x, y, z] = axis;
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        Self {
            rotation: [
                [t * x * x + c, t * x * y - s * z, t * x * z + s * y],
                [t * x * y + s * z, t * y * y + c, t * y * z - s * x],
                [t * x * z - s * y, t * y * z + s * x, t * z * z + c],
            ],
            translation: [0.0; 3],
        }
    }

    pub fn apply(&self, p: [f64; 3]) -> [f64; 3] {
        let r = &self.rotation;
        let mut out = self.translation;
        for (row, o) in r.iter().zip(out.iter_mut()) {
            *o += row[0] * p[0] + row[1] * p[1] + row[2] * p[2];
        }
        out
    }
}

/// Where rib `index` sits in the assembled sculpture: `index * pitch` along
/// the stacking axis, after the optional fixed rotation.
pub fn placement(
    index: usize,
    pitch: f64,
    axis: StackAxis,
    fixed: Option<FixedRotation>,
) -> RigidTransform {
    let mut transform = match fixed {
        Some(r) => RigidTransform::rotation_about(r.axis.unit(), r.angle),
        None => RigidTransform::IDENTITY,
    };
    let offset = index as f64 * pitch;
    let unit = axis.unit();
    transform.translation = [unit[0] * offset, unit[1] * offset, unit[2] * offset];
    transform
}
