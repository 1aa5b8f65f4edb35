//! The animated point light and the disk that stands in for it in the
//! occlusion pass.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Peak height of the light's vertical oscillation.
pub const LIGHT_AMPLITUDE: f32 = 50.0;

/// Angular frequency of the oscillation, in radians per second of age.
pub const LIGHT_FREQUENCY: f32 = 0.3;

pub const DISK_RADIUS: f32 = 10.0;
pub const DISK_THICKNESS: f32 = 4.0;
pub const DISK_SEGMENTS: u32 = 32;

/// Clip-space `w` magnitudes below this are nudged to keep projections finite.
const MIN_CLIP_W: f32 = 1e-6;

/// A point light bobbing up and down through the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatedLight {
    pub position: Vec3,
    pub amplitude: f32,
    pub frequency: f32,
}

impl AnimatedLight {
    /// Move the light to its height for `age`.
    pub fn update(&mut self, age: f32) {
        self.position.y = (age * self.frequency).sin() * self.amplitude;
    }
}

impl Default for AnimatedLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            amplitude: LIGHT_AMPLITUDE,
            frequency: LIGHT_FREQUENCY,
        }
    }
}

/// Project a world position to texture UV space (origin top-left).
///
/// Never clamped: points off screen or behind the camera still map to finite
/// coordinates, and the streaks follow them.
pub fn project_to_screen(world: Vec3, view_proj: Mat4) -> Vec2 {
    let clip = view_proj * Vec4::new(world.x, world.y, world.z, 1.0);
    let w = if clip.w.abs() < MIN_CLIP_W {
        MIN_CLIP_W.copysign(clip.w)
    } else {
        clip.w
    };
    let ndc = Vec2::new(clip.x / w, clip.y / w);
    Vec2::new(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5)
}

/// Position-only vertex of the light disk.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DiskVertex {
    pub position: [f32; 3],
}

pub const DISK_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![0 => Float32x3];

pub const DISK_VERTEX_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<DiskVertex>() as u64,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &DISK_VERTEX_ATTRIBUTES,
};

/// Unindexed triangle list for a flat cylinder lying in the XZ plane,
/// centered on the origin.
pub fn disk_vertices(radius: f32, thickness: f32, segments: u32) -> Vec<DiskVertex> {
    let segments = segments.max(3);
    let half = thickness * 0.5;
    let rim = |i: u32, y: f32| {
        let theta = i as f32 / segments as f32 * std::f32::consts::TAU;
        Vec3::new(radius * theta.cos(), y, radius * theta.sin())
    };

    let mut vertices = Vec::with_capacity(segments as usize * 12);
    let mut push = |points: [Vec3; 3]| {
        vertices.extend(points.map(|p| DiskVertex {
            position: p.to_array(),
        }));
    };

    for i in 0..segments {
        let top_a = rim(i, half);
        let top_b = rim(i + 1, half);
        let bottom_a = rim(i, -half);
        let bottom_b = rim(i + 1, -half);

        push([Vec3::new(0.0, half, 0.0), top_b, top_a]);
        push([Vec3::new(0.0, -half, 0.0), bottom_a, bottom_b]);
        push([top_a, top_b, bottom_b]);
        push([top_a, bottom_b, bottom_a]);
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    #[test]
    fn test_light_oscillates_with_age() {
        let mut light = AnimatedLight::default();
        light.update(0.0);
        assert_eq!(light.position.y, 0.0);

        let quarter = std::f32::consts::FRAC_PI_2 / LIGHT_FREQUENCY;
        light.update(quarter);
        assert!((light.position.y - LIGHT_AMPLITUDE).abs() < 1e-3);

        for i in 0..100 {
            light.update(i as f32 * 1.7);
            assert!(light.position.y.abs() <= LIGHT_AMPLITUDE + 1e-4);
        }
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::orbit(1.0, 16.0 / 9.0);
        let uv = project_to_screen(Vec3::ZERO, camera.view_projection_matrix());
        assert!((uv - Vec2::splat(0.5)).length() < 1e-4);
    }

    #[test]
    fn test_point_above_projects_toward_top() {
        let camera = Camera::orbit(0.0, 1.0);
        let uv = project_to_screen(Vec3::new(0.0, 20.0, 0.0), camera.view_projection_matrix());
        assert!(uv.y < 0.5);
    }

    #[test]
    fn test_behind_camera_is_finite() {
        let camera = Camera::background(1.0);
        let vp = camera.view_projection_matrix();
        let uv = project_to_screen(Vec3::new(3.0, 50.0, 40.0), vp);
        assert!(uv.x.is_finite() && uv.y.is_finite());
        // Exactly on the camera plane.
        let uv = project_to_screen(Vec3::new(1.0, 1.0, 0.0), vp);
        assert!(uv.x.is_finite() && uv.y.is_finite());
    }

    #[test]
    fn test_disk_vertex_count_and_extent() {
        let vertices = disk_vertices(DISK_RADIUS, DISK_THICKNESS, DISK_SEGMENTS);
        assert_eq!(vertices.len(), DISK_SEGMENTS as usize * 12);
        for v in &vertices {
            let p = Vec3::from_array(v.position);
            assert!(Vec2::new(p.x, p.z).length() <= DISK_RADIUS + 1e-4);
            assert!(p.y.abs() <= DISK_THICKNESS * 0.5 + 1e-6);
        }
    }

    #[test]
    fn test_disk_segments_clamped() {
        assert_eq!(disk_vertices(1.0, 1.0, 0).len(), 3 * 12);
    }
}
