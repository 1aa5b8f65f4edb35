//! Rotating cube field with a volumetric light post-process: geometry
//! generation, the program table, per-frame planning and the wgpu executor.

pub mod animation;
pub mod buffer;
pub mod camera;
pub mod depth;
pub mod frame;
pub mod geometry;
pub mod god_rays;
pub mod gpu;
pub mod light;
pub mod material;
pub mod pass;
pub mod programs;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod simulation;
pub mod targets;
pub mod uniforms;

pub use animation::AnimationState;
pub use camera::Camera;
pub use frame::{FramePlan, PassPlan, PassTarget};
pub use geometry::{CubeVertex, build_cubes};
pub use god_rays::PostProcessPipeline;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use material::{Material, Materials, UniformError};
pub use programs::{ProgramId, UniformValue};
pub use renderer::{RenderError, Renderer};
pub use scene::SceneRenderer;
pub use shader::{ShaderError, ShaderLibrary};
pub use simulation::{Simulation, SimulationSettings};
pub use targets::TargetId;
