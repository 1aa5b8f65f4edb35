//! Per-frame driver tying animation, materials and pass planning together.
//!
//! Everything here is CPU-side state; [`Renderer`](crate::renderer::Renderer)
//! turns it into GPU work.

use crate::animation::AnimationState;
use crate::camera::Camera;
use crate::frame::FramePlan;
use crate::god_rays::{DEFAULT_BLUR_RADIUS_PX, PostProcessPipeline};
use crate::material::{Materials, UniformError};
use crate::programs::{ProgramId, UniformValue};
use crate::scene::SceneRenderer;

/// Startup values for a [`Simulation`].
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationSettings {
    pub initial_age: f32,
    pub initial_camera_angle: f32,
    /// Camera orbit speed in radians per second.
    pub rotation_speed: f32,
    pub god_rays_enabled: bool,
    pub background_enabled: bool,
    pub light_color: [f32; 3],
    pub clear_color: [f32; 3],
    pub blur_radius_px: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            initial_age: 60.0,
            initial_camera_angle: 0.0,
            rotation_speed: std::f32::consts::PI * 0.05,
            god_rays_enabled: true,
            background_enabled: true,
            light_color: [0.8, 0.6, 0.5],
            clear_color: [0.0, 27.0 / 255.0, 27.0 / 255.0],
            blur_radius_px: DEFAULT_BLUR_RADIUS_PX,
        }
    }
}

/// The cube field's frame state.
pub struct Simulation {
    pub animation: AnimationState,
    pub scene: SceneRenderer,
    pub post: PostProcessPipeline,
    pub materials: Materials,
    camera: Camera,
    background_camera: Camera,
    plan: FramePlan,
}

impl Simulation {
    /// `vertex_count` is the length of the cube buffer.
    pub fn new(vertex_count: u32, width: u32, height: u32, settings: &SimulationSettings) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let animation = AnimationState::new(
            settings.initial_age,
            settings.initial_camera_angle,
            settings.rotation_speed,
        );

        let mut simulation = Self {
            camera: Camera::orbit(animation.camera_angle(), aspect),
            background_camera: Camera::background(aspect),
            animation,
            scene: SceneRenderer::new(vertex_count),
            post: PostProcessPipeline::new(width, height),
            materials: Materials::new(),
            plan: FramePlan::new(),
        };

        simulation.set_god_rays_enabled(settings.god_rays_enabled);
        simulation.set_background_enabled(settings.background_enabled);
        simulation.set_clear_color(settings.clear_color);
        simulation.post.blur_radius_px = settings.blur_radius_px;
        let blur = simulation.post.apply_blur_steps(&mut simulation.materials);
        debug_assert!(blur.is_ok(), "blur steps not applied: {blur:?}");
        simulation.materials.set_age(simulation.animation.age());
        let light = simulation.set_light_color(settings.light_color);
        debug_assert!(light.is_ok(), "light color not applied: {light:?}");
        simulation
    }

    /// Advance the animation by one frame and publish the new age.
    pub fn advance(&mut self, delta_seconds: f32) {
        self.animation.advance(delta_seconds);
        self.materials.set_age(self.animation.age());
    }

    /// Track a new viewport size. Zero dimensions are treated as 1.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), UniformError> {
        self.camera.set_aspect_ratio(width, height);
        self.background_camera.set_aspect_ratio(width, height);
        self.post.resize(width, height, &mut self.materials)
    }

    /// Plan this frame's passes.
    ///
    /// Picks the god rays path or the direct path from the current toggle.
    pub fn plan_frame(&mut self) -> Result<&FramePlan, UniformError> {
        self.camera.set_orbit_angle(self.animation.camera_angle());
        self.plan.clear();

        if self.post.enabled {
            self.post
                .update_uniforms(self.animation.age(), &self.camera, &mut self.materials)?;
            self.post
                .record(&mut self.scene, &self.materials, &mut self.plan);
        } else {
            self.scene.render_direct(&mut self.plan);
        }

        Ok(&self.plan)
    }

    /// The most recently planned frame.
    pub fn plan(&self) -> &FramePlan {
        &self.plan
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn background_camera(&self) -> &Camera {
        &self.background_camera
    }

    pub fn god_rays_enabled(&self) -> bool {
        self.post.enabled
    }

    pub fn set_god_rays_enabled(&mut self, enabled: bool) {
        self.post.enabled = enabled;
    }

    pub fn background_enabled(&self) -> bool {
        self.scene.background_enabled
    }

    pub fn set_background_enabled(&mut self, enabled: bool) {
        self.scene.background_enabled = enabled;
    }

    /// Color of the light disk, and of the point light on the next god rays frame.
    pub fn set_light_color(&mut self, color: [f32; 3]) -> Result<(), UniformError> {
        self.materials
            .get_mut(ProgramId::LightDisk)
            .set("color", UniformValue::Color(color))
    }

    pub fn set_clear_color(&mut self, [r, g, b]: [f32; 3]) {
        self.scene.clear_color = wgpu::Color {
            r: f64::from(r),
            g: f64::from(g),
            b: f64::from(b),
            a: 1.0,
        };
    }

    /// The externally mutable camera rotation accumulator.
    pub fn camera_rotation(&self) -> f32 {
        self.animation.camera_angle()
    }

    pub fn set_camera_rotation(&mut self, angle: f32) {
        self.animation.set_camera_angle(angle);
    }

    pub fn nudge_camera(&mut self, delta: f32) {
        self.animation.nudge_camera(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Geometry, PassTarget};

    fn simulation() -> Simulation {
        Simulation::new(36 * 200, 1280, 720, &SimulationSettings::default())
    }

    #[test]
    fn test_advance_publishes_age() {
        let mut sim = simulation();
        sim.advance(0.5);
        let age = sim.materials.get(ProgramId::CubesBlack).float("age").unwrap();
        assert!((age - 60.5).abs() < 1e-4);
    }

    #[test]
    fn test_god_rays_plan_ends_on_surface() {
        let mut sim = simulation();
        let plan = sim.plan_frame().unwrap();
        assert_eq!(plan.len(), 9);
        assert_eq!(plan.passes.last().map(|p| p.target), Some(PassTarget::Surface));
    }

    #[test]
    fn test_direct_plan_when_god_rays_disabled() {
        let mut sim = simulation();
        sim.set_god_rays_enabled(false);
        let plan = sim.plan_frame().unwrap();
        assert_eq!(plan.scene_pass_count(), 2);
        assert_eq!(plan.len(), 2);
        assert!(plan.passes.iter().all(|p| p.target == PassTarget::Surface));
        assert_eq!(plan.passes[1].draws[0].geometry, Geometry::Cubes(0..36 * 200));
        assert!(sim.scene.draw_range().is_full());
    }

    #[test]
    fn test_toggles_apply_next_frame() {
        let mut sim = simulation();
        sim.plan_frame().unwrap();
        sim.set_background_enabled(false);
        sim.set_god_rays_enabled(false);
        assert_eq!(sim.plan_frame().unwrap().len(), 1);
    }

    #[test]
    fn test_camera_follows_external_rotation() {
        let mut sim = simulation();
        sim.set_camera_rotation(std::f32::consts::PI);
        sim.plan_frame().unwrap();
        assert!((sim.camera().position.x + 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_light_color_reaches_point_light() {
        let mut sim = simulation();
        sim.set_light_color([1.0, 0.0, 0.0]).unwrap();
        sim.plan_frame().unwrap();
        assert_eq!(
            sim.materials
                .get(ProgramId::CubesDiffuse)
                .color("point_light_color"),
            Ok([1.0, 0.0, 0.0])
        );
    }

    #[test]
    fn test_clear_color_setting() {
        let mut sim = simulation();
        sim.set_clear_color([1.0, 0.5, 0.25]);
        assert_eq!(sim.scene.clear_color.g, 0.5);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut sim = simulation();
        sim.resize(1000, 500).unwrap();
        assert_eq!(sim.camera().aspect_ratio, 2.0);
        assert_eq!(sim.background_camera().aspect_ratio, 2.0);
        assert_eq!(sim.post.sizes().god_rays_width, 500);
    }

    #[test]
    fn test_resize_twice_to_same_size_changes_nothing() {
        let mut sim = simulation();
        sim.resize(1000, 500).unwrap();
        let sizes = sim.post.sizes();
        let materials = sim.materials.clone();
        let range = *sim.scene.draw_range();
        let aspect = sim.camera().aspect_ratio;

        sim.resize(1000, 500).unwrap();
        assert_eq!(sim.post.sizes(), sizes);
        assert_eq!(sim.materials, materials);
        assert_eq!(*sim.scene.draw_range(), range);
        assert_eq!(sim.camera().aspect_ratio, aspect);
        assert_eq!(
            sim.materials.get(ProgramId::HorizontalBlur).float("h"),
            Ok(3.0 / 500.0)
        );
    }
}
