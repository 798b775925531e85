//! Material-specific collapse choreography and particles
//!
//! Poses are computed in pixels relative to the base center with y pointing up,
//! as a pure function of the time elapsed since collapse onset.
//!
//! - concrete: pancake from the weak story at ⌊n/3⌋ (at least 1)
//! - steel: sidesway tilt toward 0.6 rad, upper floors detach after 3 s
//! - wood: brittle failure above mid-height with splinters
//! - hybrid: rocking, then a hinge at mid-height, then a semi-rigid fall

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::SeismicResult;
use crate::math::{hash_unit, lerp, smoothstep, TWO_PI};
use crate::profiles::StructuralMaterial;

use super::{Canvas, Point, RenderState, Viewport};

const STEEL_MAX_TILT: f64 = 0.6;
const STEEL_DETACH_TIME: f64 = 3.0;
const HYBRID_ROCK_END: f64 = 1.5;
const HYBRID_HINGE_END: f64 = 3.0;
const HYBRID_HINGE_ANGLE: f64 = 0.3;
const HYBRID_FALL_ANGLE: f64 = 1.2;

const DUST_COUNT: u64 = 48;
const DEBRIS_COUNT: u64 = 30;
const SPLINTER_COUNT: u64 = 24;

/// Geometry the choreographies work in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollapseGeometry {
    pub num_floors: usize,
    pub story_px: f64,
    pub half_width_px: f64,
    pub slab_px: f64,
    /// +1 falls to the right, -1 to the left
    pub direction: f64,
}

impl CollapseGeometry {
    /// Pixels per second² for free fall, scaled to the story height
    fn gravity(&self) -> f64 {
        self.story_px * 6.0
    }

    /// Height of the `k`-th slab in a rubble pile
    fn pile_height(&self, k: usize) -> f64 {
        (k as f64 + 0.5) * self.slab_px * 1.4
    }
}

/// Placement of one slab (index 0 is the foundation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlabPose {
    /// Slab center in px relative to the base, y up
    pub center: Point,
    /// Clockwise tilt in radians
    pub tilt: f64,
    /// Still connected to the slab below by columns
    pub attached: bool,
}

impl SlabPose {
    fn upright(height: f64) -> Self {
        Self {
            center: (0.0, height),
            tilt: 0.0,
            attached: true,
        }
    }
}

/// Clockwise rotation of `p` by `angle` (tilts +y toward +x)
pub fn rotate(p: Point, angle: f64) -> Point {
    let (s, c) = angle.sin_cos();
    (p.0 * c + p.1 * s, -p.0 * s + p.1 * c)
}

/// Story where a concrete frame pancakes
pub fn weak_story(num_floors: usize) -> usize {
    (num_floors / 3).max(1)
}

/// Pose of every slab for `material` at `elapsed` seconds after onset
pub fn collapse_pose(
    material: StructuralMaterial,
    geom: &CollapseGeometry,
    elapsed: f64,
) -> Vec<SlabPose> {
    let elapsed = elapsed.max(0.0);
    let geom = &CollapseGeometry {
        num_floors: geom.num_floors.max(1),
        ..*geom
    };
    match material {
        StructuralMaterial::Concrete => pancake(geom, elapsed),
        StructuralMaterial::Steel => sidesway(geom, elapsed),
        StructuralMaterial::Wood => brittle(geom, elapsed),
        StructuralMaterial::Hybrid => hinge_fall(geom, elapsed),
    }
}

fn pancake(geom: &CollapseGeometry, elapsed: f64) -> Vec<SlabPose> {
    let n = geom.num_floors;
    let weak = weak_story(n).min(n);
    (0..=n)
        .map(|i| {
            let standing = i as f64 * geom.story_px;
            if i < weak {
                return SlabPose::upright(standing);
            }
            // Upper floors land on the floor below the weak story one after another
            let delay = 0.12 * (i - weak) as f64;
            let p = smoothstep((elapsed - delay) / 1.2);
            let rest = (weak - 1) as f64 * geom.story_px + geom.pile_height(i - weak + 1);
            let jitter = hash_unit(i as u64 * 31 + 7) - 0.5;
            SlabPose {
                center: (
                    geom.direction * jitter * 0.3 * geom.half_width_px * p,
                    lerp(standing, rest, p),
                ),
                tilt: geom.direction * 0.08 * jitter * p,
                attached: p < 0.05,
            }
        })
        .collect()
}

fn sidesway(geom: &CollapseGeometry, elapsed: f64) -> Vec<SlabPose> {
    let n = geom.num_floors;
    let tilt = geom.direction * STEEL_MAX_TILT * smoothstep(elapsed / 2.5);
    let detached_from = n - (n / 4).max(1).min(n.saturating_sub(1));
    (0..=n)
        .map(|i| {
            let (x, y) = rotate((0.0, i as f64 * geom.story_px), tilt);
            if i > detached_from && elapsed > STEEL_DETACH_TIME {
                let dt = elapsed - STEEL_DETACH_TIME;
                let drop = 0.5 * geom.gravity() * dt * dt;
                let floor = geom.pile_height(i - detached_from - 1);
                SlabPose {
                    center: (x + geom.direction * geom.story_px * 0.8 * dt, (y - drop).max(floor)),
                    tilt: tilt + geom.direction * (0.8 * dt).min(1.2),
                    attached: false,
                }
            } else {
                SlabPose {
                    center: (x, y),
                    tilt,
                    attached: true,
                }
            }
        })
        .collect()
}

fn brittle(geom: &CollapseGeometry, elapsed: f64) -> Vec<SlabPose> {
    let n = geom.num_floors;
    let mid = (n / 2).max(1);
    let lean = geom.direction * 0.08 * smoothstep(elapsed);
    let drop = 0.5 * geom.gravity() * elapsed * elapsed;
    (0..=n)
        .map(|i| {
            let standing = i as f64 * geom.story_px;
            if i <= mid {
                let (x, y) = rotate((0.0, standing), lean);
                return SlabPose {
                    center: (x, y),
                    tilt: lean,
                    attached: true,
                };
            }
            let scatter = hash_unit(i as u64 * 131 + 3);
            let spin = hash_unit(i as u64 * 71 + 11) - 0.5;
            let floor = geom.pile_height(i - mid - 1);
            SlabPose {
                center: (
                    geom.direction * scatter * geom.half_width_px * 1.5 * smoothstep(elapsed / 1.5),
                    (standing - drop).max(floor),
                ),
                tilt: spin * 1.2 * smoothstep(elapsed),
                attached: false,
            }
        })
        .collect()
}

fn hinge_fall(geom: &CollapseGeometry, elapsed: f64) -> Vec<SlabPose> {
    let n = geom.num_floors;
    let hinge = (n / 2).max(1);
    let hinge_point = (0.0, hinge as f64 * geom.story_px);

    let (base_tilt, hinge_tilt) = if elapsed < HYBRID_ROCK_END {
        let x = elapsed / HYBRID_ROCK_END;
        (geom.direction * 0.08 * x * (TWO_PI * 2.0 * x).sin(), 0.0)
    } else if elapsed < HYBRID_HINGE_END {
        let p = smoothstep((elapsed - HYBRID_ROCK_END) / (HYBRID_HINGE_END - HYBRID_ROCK_END));
        (0.0, geom.direction * HYBRID_HINGE_ANGLE * p)
    } else {
        let p = smoothstep((elapsed - HYBRID_HINGE_END) / 2.0);
        (
            geom.direction * HYBRID_FALL_ANGLE * p,
            geom.direction * HYBRID_HINGE_ANGLE,
        )
    };

    (0..=n)
        .map(|i| {
            let local = if i <= hinge {
                (0.0, i as f64 * geom.story_px)
            } else {
                let (dx, dy) = rotate((0.0, (i - hinge) as f64 * geom.story_px), hinge_tilt);
                (hinge_point.0 + dx, hinge_point.1 + dy)
            };
            let (x, y) = rotate(local, base_tilt);
            let tilt = if i <= hinge { base_tilt } else { base_tilt + hinge_tilt };
            let y = if i == 0 { y } else { y.max(geom.slab_px * 0.5) };
            SlabPose {
                center: (x, y),
                tilt,
                attached: true,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Dust,
    Debris,
    Splinter,
}

/// One dust puff, debris chunk or splinter, px relative to the base, y up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub position: Point,
    pub radius: f64,
    /// Orientation for splinters
    pub angle: f64,
    pub color: Color,
}

/// Deterministic particle field for one collapse
///
/// Every particle is a hash of `(seed, index)` so the same onset replays identically.
pub fn particles(
    material: StructuralMaterial,
    geom: &CollapseGeometry,
    elapsed: f64,
    seed: u64,
) -> Vec<Particle> {
    let elapsed = elapsed.max(0.0);
    let building_px = geom.num_floors as f64 * geom.story_px;
    let g = geom.gravity();
    let mut out = Vec::with_capacity((DUST_COUNT + DEBRIS_COUNT + SPLINTER_COUNT) as usize);

    let fade = (1.0 - elapsed / 8.0).max(0.0);
    for k in 0..DUST_COUNT {
        let u = |salt: u64| hash_unit(seed ^ (k * 0x9e37_79b9 + salt));
        let spread = (u(1) - 0.5) * geom.half_width_px * 3.0 * (1.0 + 0.4 * elapsed);
        let rise = u(2) * building_px * 0.5 * smoothstep(elapsed / 2.0);
        out.push(Particle {
            kind: ParticleKind::Dust,
            position: (spread + geom.direction * elapsed * 6.0, rise),
            radius: (4.0 + u(3) * 10.0) * (1.0 + 0.3 * elapsed),
            angle: 0.0,
            color: Color::DUST.with_alpha((140.0 * fade) as u8),
        });
    }

    let chunk = match material {
        StructuralMaterial::Wood => material.profile().color.darken(0.1),
        _ => material.profile().color.darken(0.35),
    };
    for k in 0..DEBRIS_COUNT {
        let u = |salt: u64| hash_unit(seed ^ (k * 0x85eb_ca6b + salt + 0x100));
        let vx = (u(1) - 0.5) * geom.story_px * 2.0;
        let vy = u(2) * geom.story_px * 2.0;
        let start = u(3) * building_px * 0.6;
        let y = (start + vy * elapsed - 0.5 * g * elapsed * elapsed).max(0.0);
        out.push(Particle {
            kind: ParticleKind::Debris,
            position: (vx * elapsed, y),
            radius: 2.0 + u(4) * 2.0,
            angle: 0.0,
            color: chunk,
        });
    }

    if material == StructuralMaterial::Wood {
        let mid = (geom.num_floors / 2).max(1) as f64 * geom.story_px;
        for k in 0..SPLINTER_COUNT {
            let u = |salt: u64| hash_unit(seed ^ (k * 0xc2b2_ae35 + salt + 0x200));
            let vx = (u(1) - 0.5) * geom.story_px * 3.0;
            let vy = u(2) * geom.story_px * 1.5;
            let y = (mid + vy * elapsed - 0.5 * g * elapsed * elapsed).max(0.0);
            out.push(Particle {
                kind: ParticleKind::Splinter,
                position: (vx * elapsed, y),
                radius: 3.0 + u(3) * 4.0,
                angle: u(4) * TWO_PI + elapsed * (u(5) - 0.5) * 8.0,
                color: Color::rgb(0xd2, 0xa6, 0x79),
            });
        }
    }
    out
}

fn slab_corners(vp: &Viewport, geom: &CollapseGeometry, pose: &SlabPose) -> [Point; 4] {
    let hw = geom.half_width_px;
    let t = geom.slab_px;
    [(-hw, 0.0), (hw, 0.0), (hw, -t), (-hw, -t)].map(|corner| {
        let (x, y) = rotate(corner, pose.tilt);
        vp.offset(pose.center.0 + x, pose.center.1 + y)
    })
}

fn slab_end(vp: &Viewport, geom: &CollapseGeometry, pose: &SlabPose, side: f64) -> Point {
    let (x, y) = rotate((side * geom.half_width_px, 0.0), pose.tilt);
    vp.offset(pose.center.0 + x, pose.center.1 + y)
}

/// Collapse geometry for the current frame
pub fn geometry(vp: &Viewport, state: &RenderState<'_>) -> CollapseGeometry {
    let roof = state.floors.last().map_or(0.0, |f| f.x_displacement);
    CollapseGeometry {
        num_floors: state.config.num_floors.max(1),
        story_px: vp.story_px(state.config.story_height_cm),
        half_width_px: vp.half_width_px,
        slab_px: vp.slab_px,
        direction: if roof < 0.0 { -1.0 } else { 1.0 },
    }
}

pub fn draw_collapse<C: Canvas + ?Sized>(
    canvas: &mut C,
    vp: &Viewport,
    state: &RenderState<'_>,
) -> SeismicResult<()> {
    let material = state.params.material;
    let geom = geometry(vp, state);
    let elapsed = state.collapse.elapsed(state.t);
    let poses = collapse_pose(material, &geom, elapsed);
    let color = material.profile().color.darken(0.1);

    for pair in poses.windows(2) {
        if pair[1].attached {
            for side in [-1.0, 1.0] {
                let a = slab_end(vp, &geom, &pair[0], side);
                let b = slab_end(vp, &geom, &pair[1], side);
                canvas.line(a, b, Color::RED, 3.0)?;
            }
        }
    }
    for pose in &poses {
        canvas.fill_polygon(&slab_corners(vp, &geom, pose), color)?;
    }

    let seed = state.config.seed ^ state.collapse.onset_time.map_or(0, f64::to_bits);
    for p in particles(material, &geom, elapsed, seed) {
        let center = vp.offset(p.position.0, p.position.1);
        match p.kind {
            ParticleKind::Splinter => {
                let (dx, dy) = (p.radius * p.angle.cos(), p.radius * p.angle.sin());
                canvas.line(
                    (center.0 - dx, center.1 - dy),
                    (center.0 + dx, center.1 + dy),
                    p.color,
                    1.5,
                )?;
            }
            ParticleKind::Dust | ParticleKind::Debris => {
                canvas.fill_circle(center, p.radius, p.color)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn geom(n: usize) -> CollapseGeometry {
        CollapseGeometry {
            num_floors: n,
            story_px: 37.0,
            half_width_px: 72.0,
            slab_px: 7.0,
            direction: 1.0,
        }
    }

    #[test]
    fn every_choreography_starts_upright() {
        let g = geom(10);
        for material in StructuralMaterial::ALL {
            let poses = collapse_pose(material, &g, 0.0);
            assert_eq!(poses.len(), 11);
            for (i, p) in poses.iter().enumerate() {
                assert_relative_eq!(p.center.1, i as f64 * g.story_px, epsilon = 1e-9);
                assert_relative_eq!(p.center.0, 0.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn concrete_pancakes_from_weak_story() {
        let g = geom(10);
        assert_eq!(weak_story(10), 3);
        assert_eq!(weak_story(2), 1);
        let poses = collapse_pose(StructuralMaterial::Concrete, &g, 10.0);
        // Floors below the weak story keep their height
        assert_relative_eq!(poses[2].center.1, 2.0 * g.story_px);
        // Everything above is stacked close to the floor below the weak story
        let roof = poses[10].center.1;
        assert!(roof < 5.0 * g.story_px, "roof at {roof}");
        assert!(poses[3..].windows(2).all(|w| w[1].center.1 > w[0].center.1));
    }

    #[test]
    fn steel_tilts_then_sheds_top_floors() {
        let g = geom(12);
        let early = collapse_pose(StructuralMaterial::Steel, &g, 2.9);
        assert!(early.iter().all(|p| p.attached));
        let settled = collapse_pose(StructuralMaterial::Steel, &g, 2.5);
        assert_relative_eq!(settled[0].tilt, STEEL_MAX_TILT, epsilon = 1e-9);

        let late = collapse_pose(StructuralMaterial::Steel, &g, 4.0);
        assert!(!late[12].attached);
        assert!(late[12].center.0 > late[8].center.0);
        assert!(late[8].attached);
    }

    #[test]
    fn wood_fails_above_mid_height() {
        let g = geom(10);
        let poses = collapse_pose(StructuralMaterial::Wood, &g, 3.0);
        assert!(poses[..=5].iter().all(|p| p.attached));
        assert!(poses[6..].iter().all(|p| !p.attached));
        assert!(poses[10].center.1 < 5.0 * g.story_px);
        let splinters = particles(StructuralMaterial::Wood, &g, 1.0, 9)
            .iter()
            .filter(|p| p.kind == ParticleKind::Splinter)
            .count();
        assert_eq!(splinters, SPLINTER_COUNT as usize);
    }

    #[test]
    fn hybrid_phases() {
        let g = geom(10);
        let rocking = collapse_pose(StructuralMaterial::Hybrid, &g, 0.6);
        assert!(rocking[0].tilt.abs() <= 0.08);
        assert_eq!(rocking[3].tilt, rocking[9].tilt);

        let hinged = collapse_pose(StructuralMaterial::Hybrid, &g, 2.9);
        assert_eq!(hinged[2].tilt, 0.0);
        assert!(hinged[9].tilt > 0.2);

        let fallen = collapse_pose(StructuralMaterial::Hybrid, &g, 8.0);
        assert_relative_eq!(fallen[1].tilt, HYBRID_FALL_ANGLE, epsilon = 1e-9);
        assert!(fallen.iter().skip(1).all(|p| p.center.1 >= g.slab_px * 0.5));
    }

    #[test]
    fn falling_left_mirrors_right() {
        let right = geom(10);
        let left = CollapseGeometry {
            direction: -1.0,
            ..right
        };
        let a = collapse_pose(StructuralMaterial::Steel, &right, 2.0);
        let b = collapse_pose(StructuralMaterial::Steel, &left, 2.0);
        assert_relative_eq!(a[10].center.0, -b[10].center.0, epsilon = 1e-9);
    }

    #[test]
    fn particles_are_deterministic_and_dust_fades() {
        let g = geom(10);
        let a = particles(StructuralMaterial::Concrete, &g, 1.5, 42);
        let b = particles(StructuralMaterial::Concrete, &g, 1.5, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), (DUST_COUNT + DEBRIS_COUNT) as usize);
        let gone = particles(StructuralMaterial::Concrete, &g, 9.0, 42);
        assert!(gone
            .iter()
            .filter(|p| p.kind == ParticleKind::Dust)
            .all(|p| p.color.a == 0));
        assert!(gone.iter().all(|p| p.position.1 >= 0.0));
    }
}
