//! Intercept solving for lead aim.
//!
//! Given a shooter, a target moving in a straight line and a projectile
//! speed, find where to aim so the projectile and target arrive together.

use glam::DVec3;

/// Below this, quadratic coefficients are treated as zero.
const SOLVER_EPSILON: f64 = 1e-6;

/// A solved intercept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intercept {
    /// Where the target will be when the projectile arrives.
    pub point: DVec3,
    /// Flight time of the projectile (s).
    pub time: f64,
}

/// Solve `|r + v·t| = speed·t` for the smallest positive `t`.
///
/// Expands to `a·t² + b·t + c = 0` with `a = v·v − speed²`, `b = 2·r·v`,
/// `c = r·r`. Returns `None` when the target cannot be caught at this speed.
pub fn solve_intercept(
    shooter: DVec3,
    target_pos: DVec3,
    target_vel: DVec3,
    projectile_speed: f64,
) -> Option<Intercept> {
    if !projectile_speed.is_finite() || projectile_speed <= 0.0 {
        return None;
    }
    let r = target_pos - shooter;
    let v = if target_vel.is_finite() {
        target_vel
    } else {
        DVec3::ZERO
    };

    let a = v.dot(v) - projectile_speed * projectile_speed;
    let b = 2.0 * r.dot(v);
    let c = r.dot(r);

    let t = if a.abs() < SOLVER_EPSILON {
        // Target as fast as the projectile: linear case
        if b.abs() > SOLVER_EPSILON {
            Some(-c / b)
        } else {
            None
        }
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            None
        } else {
            let s = disc.sqrt();
            let t1 = (-b - s) / (2.0 * a);
            let t2 = (-b + s) / (2.0 * a);
            match (t1 > 0.0, t2 > 0.0) {
                (true, true) => Some(t1.min(t2)),
                (true, false) => Some(t1),
                (false, true) => Some(t2),
                (false, false) => None,
            }
        }
    };

    let t = t.filter(|t| t.is_finite() && *t > 0.0)?;
    Some(Intercept {
        point: target_pos + v * t,
        time: t,
    })
}

/// Aim point: the intercept if one exists, otherwise the target itself.
pub fn aim_point(shooter: DVec3, target_pos: DVec3, target_vel: DVec3, projectile_speed: f64) -> DVec3 {
    solve_intercept(shooter, target_pos, target_vel, projectile_speed)
        .map(|i| i.point)
        .unwrap_or(target_pos)
}
