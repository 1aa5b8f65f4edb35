//! Volumetric light ("god rays") post-process.
//!
//! Per frame, strictly in this order:
//!
//! 1. move the light, copy it into the diffuse material, project it to
//!    screen space for the streak center
//! 2. background + main scene into the diffuse target
//! 3. occlusion: light disk + black cube silhouettes into god rays target 1,
//!    cleared to black
//! 4. blur H (1 → 2), V (2 → 1), twice
//! 5. radial streaks (1 → 2)
//! 6. diffuse + streaks × coefficient onto the surface

use glam::Vec2;

use crate::camera::Camera;
use crate::frame::{DrawItem, FramePlan, Geometry, LoadAction, PassPlan, PassTarget};
use crate::light::{AnimatedLight, project_to_screen};
use crate::material::{Materials, UniformError};
use crate::programs::{ProgramId, UniformValue};
use crate::scene::SceneRenderer;
use crate::targets::{TargetId, TargetSizes};

/// Separable blur weights, centered on index 4.
pub const BLUR_KERNEL: [f32; 9] = [
    0.051, 0.0918, 0.12245, 0.1531, 0.1633, 0.1531, 0.12245, 0.0918, 0.051,
];

/// Full horizontal + vertical blur cycles before the streak pass.
pub const BLUR_ITERATIONS: usize = 2;

/// Samples marched toward the light by the streak pass.
pub const RADIAL_SAMPLES: u32 = 20;

pub const DEFAULT_BLUR_RADIUS_PX: f32 = 3.0;

pub const OCCLUSION_CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Plans the god rays passes and keeps their per-frame uniforms current.
#[derive(Clone, Debug)]
pub struct PostProcessPipeline {
    pub enabled: bool,
    pub light: AnimatedLight,
    /// Blur tap spacing in god rays target pixels.
    pub blur_radius_px: f32,
    sizes: TargetSizes,
    light_screen_position: Vec2,
}

impl PostProcessPipeline {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            enabled: true,
            light: AnimatedLight::default(),
            blur_radius_px: DEFAULT_BLUR_RADIUS_PX,
            sizes: TargetSizes::new(width, height),
            light_screen_position: Vec2::splat(0.5),
        }
    }

    pub fn sizes(&self) -> TargetSizes {
        self.sizes
    }

    /// Where the light landed on screen last frame, in texture UV.
    pub fn light_screen_position(&self) -> Vec2 {
        self.light_screen_position
    }

    /// Track a new viewport size and recompute the blur steps.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        materials: &mut Materials,
    ) -> Result<(), UniformError> {
        self.sizes = TargetSizes::new(width, height);
        self.apply_blur_steps(materials)
    }

    /// Write `h` and `v` from [`blur_radius_px`](Self::blur_radius_px) and
    /// the current god rays target size.
    pub fn apply_blur_steps(&self, materials: &mut Materials) -> Result<(), UniformError> {
        let steps = self.sizes.blur_steps(self.blur_radius_px);
        materials
            .get_mut(ProgramId::HorizontalBlur)
            .set("h", UniformValue::Float(steps.x))?;
        materials
            .get_mut(ProgramId::VerticalBlur)
            .set("v", UniformValue::Float(steps.y))
    }

    /// Step 1: animate the light and refresh every per-frame uniform.
    pub fn update_uniforms(
        &mut self,
        age: f32,
        camera: &Camera,
        materials: &mut Materials,
    ) -> Result<(), UniformError> {
        self.light.update(age);

        let light_color = materials.get(ProgramId::LightDisk).color("color")?;
        let diffuse = materials.get_mut(ProgramId::CubesDiffuse);
        diffuse.set(
            "point_light_position",
            UniformValue::Vec3(self.light.position),
        )?;
        diffuse.set("point_light_color", UniformValue::Color(light_color))?;

        self.light_screen_position =
            project_to_screen(self.light.position, camera.view_projection_matrix());
        materials.get_mut(ProgramId::GodRays).set(
            "light_position",
            UniformValue::Vec2(self.light_screen_position),
        )?;

        bind_inputs(materials)
    }

    /// Steps 2 to 6.
    pub fn record(&self, scene: &mut SceneRenderer, materials: &Materials, plan: &mut FramePlan) {
        scene.record_scene(plan, PassTarget::Offscreen(TargetId::Diffuse));

        plan.push(
            PassPlan::scene(
                "occlusion",
                PassTarget::Offscreen(TargetId::GodRays1),
                LoadAction::Clear(OCCLUSION_CLEAR_COLOR),
            )
            .draw(DrawItem::new(ProgramId::LightDisk, Geometry::LightDisk))
            .draw(DrawItem::new(
                ProgramId::CubesBlack,
                Geometry::Cubes(scene.draw_range().range()),
            )),
        );

        let inputs = move |program: ProgramId| materials.get(program).texture_inputs();

        for _ in 0..BLUR_ITERATIONS {
            plan.push(PassPlan::fullscreen(
                "horizontal-blur",
                PassTarget::Offscreen(TargetId::GodRays2),
                ProgramId::HorizontalBlur,
                inputs(ProgramId::HorizontalBlur),
            ));
            plan.push(PassPlan::fullscreen(
                "vertical-blur",
                PassTarget::Offscreen(TargetId::GodRays1),
                ProgramId::VerticalBlur,
                inputs(ProgramId::VerticalBlur),
            ));
        }

        plan.push(PassPlan::fullscreen(
            "god-rays",
            PassTarget::Offscreen(TargetId::GodRays2),
            ProgramId::GodRays,
            inputs(ProgramId::GodRays),
        ));

        plan.push(PassPlan::fullscreen(
            "combine",
            PassTarget::Surface,
            ProgramId::Additive,
            inputs(ProgramId::Additive),
        ));
    }
}

/// Point every texture uniform at the target its pass reads.
fn bind_inputs(materials: &mut Materials) -> Result<(), UniformError> {
    let bindings = [
        (ProgramId::HorizontalBlur, "t_input", TargetId::GodRays1),
        (ProgramId::VerticalBlur, "t_input", TargetId::GodRays2),
        (ProgramId::GodRays, "t_input", TargetId::GodRays1),
        (ProgramId::Additive, "t_diffuse", TargetId::Diffuse),
        (ProgramId::Additive, "t_add", TargetId::GodRays2),
    ];
    for (program, name, target) in bindings {
        materials
            .get_mut(program)
            .set(name, UniformValue::Texture(Some(target)))?;
    }
    Ok(())
}
