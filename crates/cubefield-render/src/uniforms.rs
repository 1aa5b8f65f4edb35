//! GPU-side uniform blocks, packed from materials.
//!
//! Each struct mirrors the WGSL struct of the same program in
//! [`programs`](crate::programs); sizes are checked at compile time.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::material::{Material, UniformError};

/// `SceneUniforms` of the three cube programs.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub point_light_position: [f32; 3],
    pub age: f32,
    pub point_light_color: [f32; 3],
    pub _pad: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LightDiskUniform {
    pub view_proj: [[f32; 4]; 4],
    pub offset: [f32; 3],
    pub _pad0: f32,
    pub color: [f32; 3],
    pub _pad1: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BlurUniform {
    pub step: [f32; 2],
    pub _pad: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GodRaysUniform {
    pub light_position: [f32; 2],
    pub exposure: f32,
    pub decay: f32,
    pub density: f32,
    pub weight: f32,
    pub clamp_max: f32,
    pub _pad: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct AdditiveUniform {
    pub coefficient: f32,
    pub _pad: [f32; 3],
}

static_assertions::assert_eq_size!(SceneUniform, [u8; 96]);
static_assertions::assert_eq_size!(LightDiskUniform, [u8; 96]);
static_assertions::assert_eq_size!(BlurUniform, [u8; 16]);
static_assertions::assert_eq_size!(GodRaysUniform, [u8; 32]);
static_assertions::assert_eq_size!(AdditiveUniform, [u8; 16]);

/// Pack a cube program. Programs without point light slots get zeros there.
pub fn pack_scene(material: &Material, view_proj: Mat4) -> Result<SceneUniform, UniformError> {
    let (position, color) = match (
        material.vec3("point_light_position"),
        material.color("point_light_color"),
    ) {
        (Ok(position), Ok(color)) => (position, color),
        (Err(UniformError::Unknown { .. }), Err(UniformError::Unknown { .. })) => {
            (Vec3::ZERO, [0.0; 3])
        }
        (Err(e), _) | (_, Err(e)) => return Err(e),
    };

    Ok(SceneUniform {
        view_proj: view_proj.to_cols_array_2d(),
        point_light_position: position.to_array(),
        age: material.float("age")?,
        point_light_color: color,
        _pad: 0.0,
    })
}

pub fn pack_light_disk(
    material: &Material,
    view_proj: Mat4,
    offset: Vec3,
) -> Result<LightDiskUniform, UniformError> {
    Ok(LightDiskUniform {
        view_proj: view_proj.to_cols_array_2d(),
        offset: offset.to_array(),
        _pad0: 0.0,
        color: material.color("color")?,
        _pad1: 0.0,
    })
}

pub fn pack_horizontal_blur(material: &Material) -> Result<BlurUniform, UniformError> {
    Ok(BlurUniform {
        step: [material.float("h")?, 0.0],
        _pad: [0.0; 2],
    })
}

pub fn pack_vertical_blur(material: &Material) -> Result<BlurUniform, UniformError> {
    Ok(BlurUniform {
        step: [0.0, material.float("v")?],
        _pad: [0.0; 2],
    })
}

pub fn pack_god_rays(material: &Material) -> Result<GodRaysUniform, UniformError> {
    Ok(GodRaysUniform {
        light_position: material.vec2("light_position")?.to_array(),
        exposure: material.float("exposure")?,
        decay: material.float("decay")?,
        density: material.float("density")?,
        weight: material.float("weight")?,
        clamp_max: material.float("clamp")?,
        _pad: 0.0,
    })
}

pub fn pack_additive(material: &Material) -> Result<AdditiveUniform, UniformError> {
    Ok(AdditiveUniform {
        coefficient: material.float("coefficient")?,
        _pad: [0.0; 3],
    })
}
