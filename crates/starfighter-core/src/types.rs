//! Fundamental geometric and simulation types.
//!
//! Ships use a right-handed frame: local -Z is forward, +Y is up, +X is right.

use glam::{DMat3, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Local forward axis.
pub const FORWARD: DVec3 = DVec3::NEG_Z;

/// Local up axis.
pub const UP: DVec3 = DVec3::Y;

/// Below this length two points are treated as coincident.
pub const COINCIDENT_EPSILON: f64 = 1e-3;

/// Position and orientation of a ship or projectile in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec3,
    pub rotation: DQuat,
}

/// World-space linear velocity (units/s).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec3);

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of steps taken.
    pub step: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            rotation: DQuat::IDENTITY,
        }
    }

    pub fn with_rotation(position: DVec3, rotation: DQuat) -> Self {
        Self { position, rotation }
    }

    /// Unit vector along the nose.
    pub fn forward(&self) -> DVec3 {
        (self.rotation * FORWARD).normalize()
    }

    pub fn up(&self) -> DVec3 {
        (self.rotation * UP).normalize()
    }

    /// Muzzle point a fixed distance ahead of the nose.
    pub fn muzzle(&self, offset: f64) -> DVec3 {
        self.position + self.forward() * offset
    }

    /// Move along a vector expressed in the local frame.
    pub fn translate_local(&mut self, local: DVec3) {
        self.position += self.rotation * local;
    }

    /// Rotate about a local axis by `angle` radians.
    pub fn rotate_local(&mut self, axis: DVec3, angle: f64) {
        if angle == 0.0 {
            return;
        }
        self.rotation = (self.rotation * DQuat::from_axis_angle(axis, angle)).normalize();
    }

    /// Express a world-space point in this pose's local frame.
    pub fn to_local(&self, world: DVec3) -> DVec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Express a local-frame offset in world space.
    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.position + self.rotation * local
    }

    pub fn range_to(&self, other: &Pose) -> f64 {
        self.position.distance(other.position)
    }

    /// Cosine of the angle between the nose and the direction to `point`.
    /// Returns `None` if the point is on top of us.
    pub fn alignment_to(&self, point: DVec3) -> Option<f64> {
        direction_to(self.position, point).map(|dir| self.forward().dot(dir))
    }
}

impl Velocity {
    pub fn speed(&self) -> f64 {
        self.0.length()
    }
}

impl SimTime {
    /// Advance by one step of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.step += 1;
        self.elapsed_secs += dt;
    }
}

/// Unit direction from `from` to `to`, or `None` for coincident points.
pub fn direction_to(from: DVec3, to: DVec3) -> Option<DVec3> {
    let delta = to - from;
    let len = delta.length();
    if len <= COINCIDENT_EPSILON || !len.is_finite() {
        return None;
    }
    Some(delta / len)
}

pub fn distance(a: DVec3, b: DVec3) -> f64 {
    a.distance(b)
}

/// Rotation that points local -Z from `eye` toward `target`, keeping `up`
/// as close to local +Y as possible.
pub fn look_rotation(eye: DVec3, target: DVec3, up: DVec3) -> DQuat {
    let mut z = eye - target;
    if z.length_squared() == 0.0 {
        z = DVec3::Z;
    }
    let z = z.normalize();

    let mut x = up.cross(z);
    if x.length_squared() == 0.0 {
        // up is parallel to the view axis; nudge it
        let nudged = if up.z.abs() == 1.0 {
            DVec3::new(z.x + 1e-4, z.y, z.z)
        } else {
            DVec3::new(z.x, z.y, z.z + 1e-4)
        }
        .normalize();
        x = up.cross(nudged);
    }
    let x = x.normalize();
    let y = z.cross(x);

    DQuat::from_mat3(&DMat3::from_cols(x, y, z)).normalize()
}

/// Spherical interpolation with the blend factor clamped to `[0, 1]`, so
/// large `rate * dt` products never overshoot the target rotation.
pub fn slerp_towards(current: DQuat, target: DQuat, factor: f64) -> DQuat {
    let t = sanitize(factor).min(1.0);
    current.slerp(target, t).normalize()
}

/// Linear interpolation with a clamped factor.
pub fn ease(current: f64, target: f64, factor: f64) -> f64 {
    let t = sanitize(factor).min(1.0);
    current + (target - current) * t
}

/// Finite, non-negative, or zero.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Finite, non-negative, or `None`.
pub fn sanitize_opt(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}
