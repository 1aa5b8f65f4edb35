//! Procedural cube field geometry.
//!
//! The whole field is one unindexed vertex buffer. Each cube is 12 triangles
//! whose 36 vertices all carry the same per-cube random parameters, so the
//! vertex shader can animate every cube independently from `age` alone.
//!
//! Generation is split in two steps: [`generate_instances`] draws a compact
//! [`CubeInstance`] per cube, [`expand_instances`] replicates each instance
//! across its triangles.
//!
//! ## Attribute Packing
//!
//! | Location | Offset | Format    | Field                         |
//! |----------|--------|-----------|-------------------------------|
//! | 0        | 0      | Float32x3 | corner position               |
//! | 1        | 12     | Float32x3 | flat triangle normal          |
//! | 2        | 24     | Float32x3 | rotation axis (color channel) |
//! | 3        | 36     | Float32x4 | random1                       |
//! | 4        | 52     | Float32x4 | random2                       |

use std::mem;
use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use rand::Rng;
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// Half the edge length of every cube.
pub const CUBE_HALF_SIZE: f32 = 0.45;

pub const TRIANGLES_PER_CUBE: usize = 12;
pub const VERTICES_PER_CUBE: usize = TRIANGLES_PER_CUBE * 3;

/// Cube corners, `v1..v8` of the classic unit cube table.
const CUBE_CORNERS: [[f32; 3]; 8] = [
    [-CUBE_HALF_SIZE, -CUBE_HALF_SIZE, -CUBE_HALF_SIZE],
    [CUBE_HALF_SIZE, -CUBE_HALF_SIZE, -CUBE_HALF_SIZE],
    [CUBE_HALF_SIZE, CUBE_HALF_SIZE, -CUBE_HALF_SIZE],
    [-CUBE_HALF_SIZE, CUBE_HALF_SIZE, -CUBE_HALF_SIZE],
    [-CUBE_HALF_SIZE, -CUBE_HALF_SIZE, CUBE_HALF_SIZE],
    [CUBE_HALF_SIZE, -CUBE_HALF_SIZE, CUBE_HALF_SIZE],
    [CUBE_HALF_SIZE, CUBE_HALF_SIZE, CUBE_HALF_SIZE],
    [-CUBE_HALF_SIZE, CUBE_HALF_SIZE, CUBE_HALF_SIZE],
];

/// Corner indices per triangle, counter-clockwise seen from outside.
const CUBE_TRIANGLES: [[usize; 3]; TRIANGLES_PER_CUBE] = [
    [3, 1, 0],
    [3, 2, 1],
    [4, 5, 7],
    [5, 6, 7],
    [0, 1, 4],
    [1, 5, 4],
    [1, 2, 5],
    [2, 6, 5],
    [2, 3, 6],
    [3, 7, 6],
    [4, 3, 0],
    [4, 7, 3],
];

/// Per-cube animation parameters, drawn once at startup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubeInstance {
    /// Unit rotation axis.
    pub axis: Vec3,
    /// Rotation speed factor in `[0, 1)`.
    pub rotation_speed: f32,
    /// Vertical drift speed factor in `[0, 1)`.
    pub age_speed: f32,
    /// Vertical drift phase in `[0, 1)`.
    pub age_phase: f32,
    /// `-1.0` or `1.0`: sign of the horizontal orbit's x term.
    pub left_right: f32,
    /// `-1.0` or `1.0`: sign of the horizontal orbit's z term.
    pub front_back: f32,
    /// Bell-shaped offsets in `[-1, 1]` per axis.
    pub jitter: Vec3,
}

impl CubeInstance {
    /// `(rotation speed, age speed, age phase, y jitter)`.
    pub fn random1(&self) -> Vec4 {
        Vec4::new(
            self.rotation_speed,
            self.age_speed,
            self.age_phase,
            self.jitter.y,
        )
    }

    /// `(left/right, front/back, x jitter, z jitter)`.
    pub fn random2(&self) -> Vec4 {
        Vec4::new(self.left_right, self.front_back, self.jitter.x, self.jitter.z)
    }
}

/// One vertex of the cube field buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Rotation axis of the owning cube.
    pub color: [f32; 3],
    pub random1: [f32; 4],
    pub random2: [f32; 4],
}

static_assertions::assert_eq_size!(CubeVertex, [u8; 68]);

pub const CUBE_VERTEX_ATTRIBUTES: [VertexAttribute; 5] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 24,
        shader_location: 2,
    },
    VertexAttribute {
        format: VertexFormat::Float32x4,
        offset: 36,
        shader_location: 3,
    },
    VertexAttribute {
        format: VertexFormat::Float32x4,
        offset: 52,
        shader_location: 4,
    },
];

/// Layout shared by every cube program (diffuse, black, background).
pub const CUBE_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<CubeVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &CUBE_VERTEX_ATTRIBUTES,
};

const _: () = assert!(
    CUBE_VERTEX_ATTRIBUTES[4].offset + 16 == mem::size_of::<CubeVertex>() as u64,
    "CubeVertex size changed, update CUBE_VERTEX_ATTRIBUTES"
);

/// Uniformly distributed unit vector.
///
/// Azimuth from `U(0, 2π)`, height from `U(-1, 1)`, the remaining radius
/// from `√(1 − z²)`.
pub fn random_unit_vector(rng: &mut impl Rng) -> Vec3 {
    let azimuth = rng.random::<f32>() * std::f32::consts::TAU;
    let z = rng.random::<f32>() * 2.0 - 1.0;
    let radius = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(radius * azimuth.cos(), radius * azimuth.sin(), z).normalize()
}

/// Approximately normal value in `[-1, 1]`: mean of 4 uniform deviates.
pub fn normally_distributed(rng: &mut impl Rng) -> f32 {
    (0..4)
        .map(|_| rng.random::<f32>() * 2.0 - 1.0)
        .sum::<f32>()
        * 0.25
}

/// `-1.0` or `1.0` with equal probability.
pub fn coin_flip(rng: &mut impl Rng) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

/// Draw `count` cube instances.
pub fn generate_instances(count: usize, rng: &mut impl Rng) -> Vec<CubeInstance> {
    (0..count)
        .map(|_| {
            let axis = random_unit_vector(rng);
            let rotation_speed = rng.random::<f32>();
            let age_speed = rng.random::<f32>();
            let age_phase = rng.random::<f32>();
            let jitter_y = normally_distributed(rng);
            let left_right = coin_flip(rng);
            let front_back = coin_flip(rng);
            let jitter_x = normally_distributed(rng);
            let jitter_z = normally_distributed(rng);
            CubeInstance {
                axis,
                rotation_speed,
                age_speed,
                age_phase,
                left_right,
                front_back,
                jitter: Vec3::new(jitter_x, jitter_y, jitter_z),
            }
        })
        .collect()
}

/// Replicate every instance across the 36 vertices of its cube.
///
/// Normals are flat per triangle, taken from the cross product of the two
/// edges leaving the triangle's first corner.
pub fn expand_instances(instances: &[CubeInstance]) -> Vec<CubeVertex> {
    let mut vertices = Vec::with_capacity(instances.len() * VERTICES_PER_CUBE);

    for instance in instances {
        let color = instance.axis.to_array();
        let random1 = instance.random1().to_array();
        let random2 = instance.random2().to_array();

        for triangle in &CUBE_TRIANGLES {
            let [a, b, c] = triangle.map(|i| Vec3::from_array(CUBE_CORNERS[i]));
            let normal = (b - a).cross(c - a).normalize().to_array();
            for corner in [a, b, c] {
                vertices.push(CubeVertex {
                    position: corner.to_array(),
                    normal,
                    color,
                    random1,
                    random2,
                });
            }
        }
    }

    vertices
}

/// Generate and expand `cube_count` cubes in one go.
pub fn build_cubes(cube_count: usize, rng: &mut impl Rng) -> Vec<CubeVertex> {
    let instances = generate_instances(cube_count, rng);
    let vertices = expand_instances(&instances);
    log::debug!(
        "Built {} cubes ({} vertices, {} KiB)",
        cube_count,
        vertices.len(),
        vertices.len() * mem::size_of::<CubeVertex>() / 1024
    );
    vertices
}

/// Sub-range of the cube buffer selected for the next draw.
///
/// The background layer narrows the range to its leading cubes and restores
/// it before the main scene is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawRange {
    vertex_count: u32,
    start: u32,
    count: u32,
}

impl DrawRange {
    /// A range covering all `vertex_count` vertices.
    pub fn full(vertex_count: u32) -> Self {
        Self {
            vertex_count,
            start: 0,
            count: vertex_count,
        }
    }

    /// Restrict to `count` vertices from `start`, clipped to the buffer.
    pub fn set(&mut self, start: u32, count: u32) {
        self.start = start.min(self.vertex_count);
        self.count = count.min(self.vertex_count - self.start);
    }

    /// Restore the full range.
    pub fn reset(&mut self) {
        self.start = 0;
        self.count = self.vertex_count;
    }

    pub fn range(&self) -> Range<u32> {
        self.start..self.start + self.count
    }

    pub fn is_full(&self) -> bool {
        self.start == 0 && self.count == self.vertex_count
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn seeded() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0xC0BE)
    }

    #[test]
    fn test_single_cube_has_36_vertices() {
        let vertices = build_cubes(1, &mut seeded());
        assert_eq!(vertices.len(), 36);
    }

    #[test]
    fn test_zero_cubes_is_empty() {
        assert!(build_cubes(0, &mut seeded()).is_empty());
        assert!(expand_instances(&[]).is_empty());
    }

    #[test]
    fn test_single_cube_has_six_face_normals_each_used_twice() {
        let vertices = build_cubes(1, &mut seeded());
        let mut directions: Vec<([i32; 3], usize)> = Vec::new();
        for triangle in vertices.chunks(3) {
            let key = triangle[0].normal.map(|c| c.round() as i32);
            match directions.iter_mut().find(|(d, _)| *d == key) {
                Some((_, n)) => *n += 1,
                None => directions.push((key, 1)),
            }
        }
        assert_eq!(directions.len(), 6);
        assert!(directions.iter().all(|(_, n)| *n == 2));
    }

    #[test]
    fn test_normals_point_outward() {
        let vertices = build_cubes(1, &mut seeded());
        for triangle in vertices.chunks(3) {
            let centroid = triangle
                .iter()
                .map(|v| Vec3::from_array(v.position))
                .sum::<Vec3>()
                / 3.0;
            let normal = Vec3::from_array(triangle[0].normal);
            assert!(normal.dot(centroid) > 0.0);
            assert!((normal.length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_normals_are_flat_per_triangle() {
        let vertices = build_cubes(3, &mut seeded());
        for triangle in vertices.chunks(3) {
            assert_eq!(triangle[0].normal, triangle[1].normal);
            assert_eq!(triangle[1].normal, triangle[2].normal);
        }
    }

    #[test]
    fn test_random_values_uniform_within_cube() {
        let vertices = build_cubes(50, &mut seeded());
        for cube in vertices.chunks(VERTICES_PER_CUBE) {
            let first = &cube[0];
            for v in cube {
                assert_eq!(v.color, first.color);
                assert_eq!(v.random1, first.random1);
                assert_eq!(v.random2, first.random2);
            }
        }
    }

    #[test]
    fn test_axes_are_unit_length() {
        let instances = generate_instances(2000, &mut seeded());
        for instance in &instances {
            assert!((instance.axis.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_parameter_ranges() {
        let instances = generate_instances(2000, &mut seeded());
        for i in &instances {
            for value in [i.rotation_speed, i.age_speed, i.age_phase] {
                assert!((0.0..1.0).contains(&value));
            }
            assert!(i.left_right == 1.0 || i.left_right == -1.0);
            assert!(i.front_back == 1.0 || i.front_back == -1.0);
            for j in i.jitter.to_array() {
                assert!((-1.0..=1.0).contains(&j));
            }
        }
    }

    #[test]
    fn test_coin_flips_take_both_signs() {
        let instances = generate_instances(200, &mut seeded());
        assert!(instances.iter().any(|i| i.left_right > 0.0));
        assert!(instances.iter().any(|i| i.left_right < 0.0));
    }

    #[test]
    fn test_jitter_is_bell_shaped() {
        let mut rng = seeded();
        let samples: Vec<f32> = (0..10_000).map(|_| normally_distributed(&mut rng)).collect();
        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        let central = samples.iter().filter(|s| s.abs() < 0.5).count() as f32;
        assert!(mean.abs() < 0.02);
        // A flat distribution would put 50% inside |x| < 0.5.
        assert!(central / samples.len() as f32 > 0.7);
    }

    #[test]
    fn test_same_seed_same_buffer() {
        let a = build_cubes(10, &mut seeded());
        let b = build_cubes(10, &mut seeded());
        assert_eq!(a, b);
    }

    #[test]
    fn test_instance_packing_matches_vertices() {
        let instances = generate_instances(4, &mut seeded());
        let vertices = expand_instances(&instances);
        for (instance, cube) in instances.iter().zip(vertices.chunks(VERTICES_PER_CUBE)) {
            assert_eq!(cube[0].random1, instance.random1().to_array());
            assert_eq!(cube[0].random2, instance.random2().to_array());
            assert_eq!(cube[0].random1[3], instance.jitter.y);
        }
    }

    #[test]
    fn test_layout_stride_matches_vertex_struct_size() {
        assert_eq!(CUBE_VERTEX_LAYOUT.array_stride, 68);
        for (i, attr) in CUBE_VERTEX_ATTRIBUTES.iter().enumerate() {
            assert_eq!(attr.shader_location, i as u32);
        }
    }

    #[test]
    fn test_draw_range_set_and_reset() {
        let mut range = DrawRange::full(360);
        assert!(range.is_full());

        range.set(0, 36 * 5);
        assert_eq!(range.range(), 0..180);
        assert!(!range.is_full());

        range.reset();
        assert_eq!(range.range(), 0..360);
        assert!(range.is_full());
    }

    #[test]
    fn test_draw_range_clips_to_buffer() {
        let mut range = DrawRange::full(100);
        range.set(0, 36 * 60);
        assert_eq!(range.range(), 0..100);
        range.set(500, 10);
        assert_eq!(range.range(), 100..100);
    }
}
