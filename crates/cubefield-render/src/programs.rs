//! Declarative GPU program table.
//!
//! Every program is plain data: a name, the uniforms it exposes (with their
//! kinds and defaults), and the WGSL chunks composed into its module. Nothing
//! here touches the GPU; [`ShaderLibrary`](crate::shader::ShaderLibrary)
//! compiles the composed sources and [`Material`](crate::material::Material)
//! holds the live uniform values.

use glam::{Vec2, Vec3};

use crate::targets::TargetId;

/// Identifies one entry of [`PROGRAMS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgramId {
    CubesDiffuse,
    CubesBlack,
    Background,
    LightDisk,
    GodRays,
    HorizontalBlur,
    VerticalBlur,
    Additive,
}

impl ProgramId {
    pub const ALL: [ProgramId; 8] = [
        ProgramId::CubesDiffuse,
        ProgramId::CubesBlack,
        ProgramId::Background,
        ProgramId::LightDisk,
        ProgramId::GodRays,
        ProgramId::HorizontalBlur,
        ProgramId::VerticalBlur,
        ProgramId::Additive,
    ];

    pub fn descriptor(self) -> &'static ProgramDescriptor {
        &PROGRAMS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Look a program up by its table name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }
}

/// Semantic type of a uniform slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Color,
    Vec2,
    Vec3,
    Texture,
}

/// A uniform value as seen by materials and external tools.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    /// RGB in 0..1, written to the output unencoded.
    Color([f32; 3]),
    Vec2(Vec2),
    Vec3(Vec3),
    /// A render target sampled by the program; `None` until bound.
    Texture(Option<TargetId>),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Color(_) => UniformKind::Color,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Texture(_) => UniformKind::Texture,
        }
    }
}

/// One named uniform and its default.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformDecl {
    pub name: &'static str,
    pub default: UniformValue,
}

impl UniformDecl {
    pub fn kind(&self) -> UniformKind {
        self.default.kind()
    }
}

/// A GPU program as data.
#[derive(Debug)]
pub struct ProgramDescriptor {
    pub id: ProgramId,
    pub name: &'static str,
    pub uniforms: &'static [UniformDecl],
    /// WGSL chunks concatenated, in order, into one module.
    pub sources: &'static [&'static str],
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
}

impl ProgramDescriptor {
    pub fn uniform(&self, name: &str) -> Option<&UniformDecl> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    /// Names of the texture uniforms, in binding order.
    pub fn texture_inputs(&self) -> impl Iterator<Item = &'static str> {
        self.uniforms
            .iter()
            .filter(|u| u.kind() == UniformKind::Texture)
            .map(|u| u.name)
    }

    /// The full WGSL module text.
    pub fn compose_source(&self) -> String {
        self.sources.concat()
    }
}

/// Default blur step before the first resize: one texel of a 512 px target.
pub const DEFAULT_BLUR_STEP: f32 = 1.0 / 512.0;

/// The program table, indexed by `ProgramId as usize`.
pub static PROGRAMS: [ProgramDescriptor; 8] = [
    ProgramDescriptor {
        id: ProgramId::CubesDiffuse,
        name: "cubes_diffuse",
        uniforms: &[
            UniformDecl {
                name: "age",
                default: UniformValue::Float(60.0),
            },
            UniformDecl {
                name: "point_light_color",
                default: UniformValue::Color([0.349, 1.0, 1.0]),
            },
            UniformDecl {
                name: "point_light_position",
                default: UniformValue::Vec3(Vec3::ZERO),
            },
        ],
        sources: &[QUATERNION_WGSL, CUBE_COMMON_WGSL, CUBES_DIFFUSE_WGSL],
        vertex_entry: "vs_main",
        fragment_entry: "fs_main",
    },
    ProgramDescriptor {
        id: ProgramId::CubesBlack,
        name: "cubes_black",
        uniforms: &[UniformDecl {
            name: "age",
            default: UniformValue::Float(60.0),
        }],
        sources: &[QUATERNION_WGSL, CUBE_COMMON_WGSL, CUBES_BLACK_WGSL],
        vertex_entry: "vs_main",
        fragment_entry: "fs_main",
    },
    ProgramDescriptor {
        id: ProgramId::Background,
        name: "background",
        uniforms: &[UniformDecl {
            name: "age",
            default: UniformValue::Float(60.0),
        }],
        sources: &[QUATERNION_WGSL, CUBE_COMMON_WGSL, BACKGROUND_WGSL],
        vertex_entry: "vs_main",
        fragment_entry: "fs_main",
    },
    ProgramDescriptor {
        id: ProgramId::LightDisk,
        name: "light_disk",
        uniforms: &[UniformDecl {
            name: "color",
            default: UniformValue::Color([0.8, 0.6, 0.5]),
        }],
        sources: &[LIGHT_DISK_WGSL],
        vertex_entry: "vs_main",
        fragment_entry: "fs_main",
    },
    ProgramDescriptor {
        id: ProgramId::GodRays,
        name: "god_rays",
        uniforms: &[
            UniformDecl {
                name: "t_input",
                default: UniformValue::Texture(None),
            },
            UniformDecl {
                name: "exposure",
                default: UniformValue::Float(0.6),
            },
            UniformDecl {
                name: "decay",
                default: UniformValue::Float(0.9),
            },
            UniformDecl {
                name: "density",
                default: UniformValue::Float(0.8),
            },
            UniformDecl {
                name: "weight",
                default: UniformValue::Float(0.75),
            },
            UniformDecl {
                name: "clamp",
                default: UniformValue::Float(1.0),
            },
            UniformDecl {
                name: "light_position",
                default: UniformValue::Vec2(Vec2::new(0.5, 0.5)),
            },
        ],
        sources: &[FULLSCREEN_WGSL, GOD_RAYS_WGSL],
        vertex_entry: "vs_fullscreen",
        fragment_entry: "fs_god_rays",
    },
    ProgramDescriptor {
        id: ProgramId::HorizontalBlur,
        name: "horizontal_blur",
        uniforms: &[
            UniformDecl {
                name: "t_input",
                default: UniformValue::Texture(None),
            },
            UniformDecl {
                name: "h",
                default: UniformValue::Float(DEFAULT_BLUR_STEP),
            },
        ],
        sources: &[FULLSCREEN_WGSL, BLUR_WGSL],
        vertex_entry: "vs_fullscreen",
        fragment_entry: "fs_blur",
    },
    ProgramDescriptor {
        id: ProgramId::VerticalBlur,
        name: "vertical_blur",
        uniforms: &[
            UniformDecl {
                name: "t_input",
                default: UniformValue::Texture(None),
            },
            UniformDecl {
                name: "v",
                default: UniformValue::Float(DEFAULT_BLUR_STEP),
            },
        ],
        sources: &[FULLSCREEN_WGSL, BLUR_WGSL],
        vertex_entry: "vs_fullscreen",
        fragment_entry: "fs_blur",
    },
    ProgramDescriptor {
        id: ProgramId::Additive,
        name: "additive",
        uniforms: &[
            UniformDecl {
                name: "t_diffuse",
                default: UniformValue::Texture(None),
            },
            UniformDecl {
                name: "t_add",
                default: UniformValue::Texture(None),
            },
            UniformDecl {
                name: "coefficient",
                default: UniformValue::Float(1.0),
            },
        ],
        sources: &[FULLSCREEN_WGSL, ADDITIVE_WGSL],
        vertex_entry: "vs_fullscreen",
        fragment_entry: "fs_additive",
    },
];

/// Quaternion helpers and a GLSL-style `mod`, shared by every cube program.
pub const QUATERNION_WGSL: &str = r#"
fn axis_angle_to_quaternion(axis: vec3<f32>, angle: f32) -> vec4<f32> {
    let half_angle = angle * 0.5;
    return vec4<f32>(axis * sin(half_angle), cos(half_angle));
}

fn rotate_vector_by_quaternion(v: vec3<f32>, q: vec4<f32>) -> vec3<f32> {
    return v + 2.0 * cross(q.xyz, cross(q.xyz, v) + q.w * v);
}

// x - y * floor(x / y); WGSL's % truncates toward zero
fn wrap(x: f32, y: f32) -> f32 {
    return x - y * floor(x / y);
}
"#;

/// Scene uniforms, cube vertex input and the cube field motion.
pub const CUBE_COMMON_WGSL: &str = r#"
struct SceneUniforms {
    view_proj: mat4x4<f32>,
    point_light_position: vec3<f32>,
    age: f32,
    point_light_color: vec3<f32>,
    _pad: f32,
};

@group(0) @binding(0) var<uniform> scene: SceneUniforms;

struct CubeInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) axis: vec3<f32>,
    @location(3) random1: vec4<f32>,
    @location(4) random2: vec4<f32>,
};

struct LitVertex {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) diffuse: vec3<f32>,
};

struct RotatedCube {
    position: vec3<f32>,
    normal: vec3<f32>,
};

const ROTATION_SPEED: f32 = 3.0;
const Y_OFFSET: f32 = 60.0;
const Y_DISTANCE: f32 = 120.0;
const FIELD_TRANSITION_SECONDS: f32 = 60.0;
const XZ_DISTANCE: f32 = 20.0;
const XZ_AGE_FACTOR: f32 = 0.2;
const OFFSET_AMOUNT: f32 = 9.5;

const DIR_LIGHT_COLOR: vec3<f32> = vec3<f32>(0.35, 1.0, 1.0) * 0.25;
const DIR_LIGHT_INV_DIR: vec3<f32> = vec3<f32>(0.0, 1.0, 0.0);

fn rotate_cube(input: CubeInput) -> RotatedCube {
    let rotation = axis_angle_to_quaternion(
        input.axis,
        scene.age * input.random1.x * ROTATION_SPEED,
    );
    return RotatedCube(
        rotate_vector_by_quaternion(input.position, rotation),
        rotate_vector_by_quaternion(input.normal, rotation),
    );
}

// Seconds into the cube's current vertical sweep, in [0, transition_seconds).
fn drift_seconds(input: CubeInput, transition_seconds: f32) -> f32 {
    let randomized_age = scene.age * (input.random1.y + 0.5) * 0.5
        + input.random1.z * transition_seconds;
    return wrap(randomized_age, transition_seconds);
}

fn field_position(input: CubeInput, local: vec3<f32>) -> vec3<f32> {
    let drift = drift_seconds(input, FIELD_TRANSITION_SECONDS);
    let y = local.y - Y_OFFSET + drift / FIELD_TRANSITION_SECONDS * Y_DISTANCE;

    let orbit = drift * XZ_AGE_FACTOR;
    let x = local.x + cos(orbit) * input.random2.x * XZ_DISTANCE;
    let z = local.z + sin(orbit) * input.random2.y * XZ_DISTANCE;

    return vec3<f32>(
        x + input.random2.z * OFFSET_AMOUNT,
        y + input.random1.w * OFFSET_AMOUNT,
        z + input.random2.w * OFFSET_AMOUNT,
    );
}

fn directional_light(normal: vec3<f32>) -> vec3<f32> {
    return max(dot(normal, DIR_LIGHT_INV_DIR), 0.0) * DIR_LIGHT_COLOR;
}
"#;

/// Gouraud-lit field cubes: directional light plus the animated point light.
pub const CUBES_DIFFUSE_WGSL: &str = r#"
const POINT_LIGHT_MAX_DISTANCE: f32 = 65.0;

@vertex
fn vs_main(input: CubeInput) -> LitVertex {
    let cube = rotate_cube(input);
    let position = field_position(input, cube.position);

    var diffuse = directional_light(cube.normal);

    let to_light = scene.point_light_position - position;
    let distance = max(length(to_light), 1e-4);
    let falloff = 1.0 - min(distance / POINT_LIGHT_MAX_DISTANCE, 1.0);
    diffuse += max(dot(cube.normal, to_light / distance), 0.0) * falloff * scene.point_light_color;

    var out: LitVertex;
    out.clip_position = scene.view_proj * vec4<f32>(position, 1.0);
    out.diffuse = diffuse;
    return out;
}

@fragment
fn fs_main(in: LitVertex) -> @location(0) vec4<f32> {
    return vec4<f32>(in.diffuse, 1.0);
}
"#;

/// Field cubes as black silhouettes for the occlusion pass.
pub const CUBES_BLACK_WGSL: &str = r#"
@vertex
fn vs_main(input: CubeInput) -> @builtin(position) vec4<f32> {
    let cube = rotate_cube(input);
    return scene.view_proj * vec4<f32>(field_position(input, cube.position), 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(0.0, 0.0, 0.0, 1.0);
}
"#;

/// Distant parallax layer: slower drift, spread wide on a far z band,
/// directional light only.
pub const BACKGROUND_WGSL: &str = r#"
const BACKGROUND_TRANSITION_SECONDS: f32 = 30.0;
const BACKGROUND_Z_OFFSET: f32 = -150.0;
const BACKGROUND_Z_DISTANCE: f32 = 30.0;
const BACKGROUND_X_OFFSET: f32 = 160.0;

@vertex
fn vs_main(input: CubeInput) -> LitVertex {
    let cube = rotate_cube(input);
    let drift = drift_seconds(input, BACKGROUND_TRANSITION_SECONDS);

    let position = vec3<f32>(
        cube.position.x + input.random2.z * BACKGROUND_X_OFFSET,
        cube.position.y - Y_OFFSET + drift / BACKGROUND_TRANSITION_SECONDS * Y_DISTANCE,
        BACKGROUND_Z_OFFSET + input.random1.w * BACKGROUND_Z_DISTANCE,
    );

    var out: LitVertex;
    out.clip_position = scene.view_proj * vec4<f32>(position, 1.0);
    out.diffuse = directional_light(cube.normal);
    return out;
}

@fragment
fn fs_main(in: LitVertex) -> @location(0) vec4<f32> {
    return vec4<f32>(in.diffuse, 1.0);
}
"#;

pub const LIGHT_DISK_WGSL: &str = r#"
struct LightDiskUniforms {
    view_proj: mat4x4<f32>,
    offset: vec3<f32>,
    _pad0: f32,
    color: vec3<f32>,
    _pad1: f32,
};

@group(0) @binding(0) var<uniform> disk: LightDiskUniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return disk.view_proj * vec4<f32>(position + disk.offset, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(disk.color, 1.0);
}
"#;

/// Fullscreen triangle with UVs flipped to texture space.
pub const FULLSCREEN_WGSL: &str = r#"
struct FullscreenOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) idx: u32) -> FullscreenOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: FullscreenOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}
"#;

/// 9-tap separable blur; `blur.step` is `(h, 0)` or `(0, v)`.
pub const BLUR_WGSL: &str = r#"
struct BlurUniforms {
    step: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0) var<uniform> blur: BlurUniforms;
@group(1) @binding(0) var t_input: texture_2d<f32>;
@group(1) @binding(1) var t_sampler: sampler;

@fragment
fn fs_blur(in: FullscreenOutput) -> @location(0) vec4<f32> {
    var kernel = array<f32, 9>(0.051, 0.0918, 0.12245, 0.1531, 0.1633, 0.1531, 0.12245, 0.0918, 0.051);
    var sum = vec4<f32>(0.0);
    for (var i = 0; i < 9; i++) {
        let offset = f32(i - 4) * blur.step;
        sum += textureSampleLevel(t_input, t_sampler, in.uv + offset, 0.0) * kernel[i];
    }
    return sum;
}
"#;

/// Radial light streaks marching from each pixel toward the light.
pub const GOD_RAYS_WGSL: &str = r#"
struct GodRaysUniforms {
    light_position: vec2<f32>,
    exposure: f32,
    decay: f32,
    density: f32,
    weight: f32,
    clamp_max: f32,
    _pad: f32,
};

const RADIAL_SAMPLES: i32 = 20;

@group(0) @binding(0) var<uniform> rays: GodRaysUniforms;
@group(1) @binding(0) var t_input: texture_2d<f32>;
@group(1) @binding(1) var t_sampler: sampler;

@fragment
fn fs_god_rays(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let delta = (in.uv - rays.light_position) * (rays.density / f32(RADIAL_SAMPLES));
    var coord = in.uv;
    var illumination_decay = 1.0;
    var color = vec4<f32>(0.0);

    for (var i = 0; i < RADIAL_SAMPLES; i++) {
        coord -= delta;
        color += textureSampleLevel(t_input, t_sampler, coord, 0.0) * illumination_decay * rays.weight;
        illumination_decay *= rays.decay;
    }

    return clamp(color * rays.exposure, vec4<f32>(0.0), vec4<f32>(rays.clamp_max));
}
"#;

pub const ADDITIVE_WGSL: &str = r#"
struct AdditiveUniforms {
    coefficient: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0) var<uniform> additive: AdditiveUniforms;
@group(1) @binding(0) var t_diffuse: texture_2d<f32>;
@group(1) @binding(1) var t_add: texture_2d<f32>;
@group(1) @binding(2) var t_sampler: sampler;

@fragment
fn fs_additive(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(t_diffuse, t_sampler, in.uv);
    let add = textureSample(t_add, t_sampler, in.uv);
    return texel + add * additive.coefficient;
}
"#;
