//! Main scene and parallax background layer.

use crate::frame::{DrawItem, FramePlan, Geometry, LoadAction, PassPlan, PassTarget};
use crate::geometry::{DrawRange, VERTICES_PER_CUBE};
use crate::programs::ProgramId;

/// Leading cubes of the shared buffer reused as background shapes.
pub const BACKGROUND_CUBES: u32 = 60;

/// Default clear color, `#001B1B`.
pub const DEFAULT_CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 27.0 / 255.0,
    b: 27.0 / 255.0,
    a: 1.0,
};

/// Plans the cube field passes shared by both render paths.
#[derive(Clone, Debug)]
pub struct SceneRenderer {
    pub background_enabled: bool,
    pub clear_color: wgpu::Color,
    draw_range: DrawRange,
}

impl SceneRenderer {
    pub fn new(vertex_count: u32) -> Self {
        Self {
            background_enabled: true,
            clear_color: DEFAULT_CLEAR_COLOR,
            draw_range: DrawRange::full(vertex_count),
        }
    }

    pub fn draw_range(&self) -> &DrawRange {
        &self.draw_range
    }

    pub fn vertex_count(&self) -> u32 {
        self.draw_range.vertex_count()
    }

    /// Plan the path used when god rays are off: background and main scene
    /// straight onto the surface.
    pub fn render_direct(&mut self, plan: &mut FramePlan) {
        self.record_scene(plan, PassTarget::Surface);
    }

    /// Append the background pass (if enabled) and the main scene pass.
    ///
    /// The first pass clears `target`. The background narrows the draw range
    /// to its leading cubes; the range is full again before the main pass.
    pub fn record_scene(&mut self, plan: &mut FramePlan, target: PassTarget) {
        let mut load = LoadAction::Clear(self.clear_color);

        if self.background_enabled {
            self.draw_range
                .set(0, BACKGROUND_CUBES * VERTICES_PER_CUBE as u32);
            plan.push(PassPlan::scene("background", target, load).draw(DrawItem::new(
                ProgramId::Background,
                Geometry::Cubes(self.draw_range.range()),
            )));
            self.draw_range.reset();
            load = LoadAction::Load;
        }

        plan.push(PassPlan::scene("main-scene", target, load).draw(DrawItem::new(
            ProgramId::CubesDiffuse,
            Geometry::Cubes(self.draw_range.range()),
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTICES: u32 = 36 * 1000;

    #[test]
    fn test_direct_with_background_is_two_passes() {
        let mut scene = SceneRenderer::new(VERTICES);
        let mut plan = FramePlan::new();
        scene.render_direct(&mut plan);

        assert_eq!(plan.scene_pass_count(), 2);
        let background = &plan.passes[0];
        let main = &plan.passes[1];

        assert_eq!(background.target, PassTarget::Surface);
        assert_eq!(background.load, LoadAction::Clear(DEFAULT_CLEAR_COLOR));
        assert_eq!(background.draws[0].program, ProgramId::Background);
        assert_eq!(background.draws[0].geometry, Geometry::Cubes(0..36 * 60));

        assert_eq!(main.load, LoadAction::Load);
        assert_eq!(main.draws[0].program, ProgramId::CubesDiffuse);
        assert_eq!(main.draws[0].geometry, Geometry::Cubes(0..VERTICES));

        assert!(scene.draw_range().is_full());
        assert_eq!(scene.draw_range().range(), 0..VERTICES);
    }

    #[test]
    fn test_direct_without_background_clears_main_pass() {
        let mut scene = SceneRenderer::new(VERTICES);
        scene.background_enabled = false;
        let mut plan = FramePlan::new();
        scene.render_direct(&mut plan);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.passes[0].load, LoadAction::Clear(DEFAULT_CLEAR_COLOR));
        assert_eq!(plan.passes[0].draws[0].geometry, Geometry::Cubes(0..VERTICES));
    }

    #[test]
    fn test_small_buffer_background_is_clipped() {
        let mut scene = SceneRenderer::new(36 * 10);
        let mut plan = FramePlan::new();
        scene.render_direct(&mut plan);
        assert_eq!(plan.passes[0].draws[0].geometry, Geometry::Cubes(0..360));
        assert!(scene.draw_range().is_full());
    }

    #[test]
    fn test_clear_color_is_used() {
        let mut scene = SceneRenderer::new(VERTICES);
        scene.clear_color = wgpu::Color::RED;
        let mut plan = FramePlan::new();
        scene.record_scene(&mut plan, PassTarget::Surface);
        assert_eq!(plan.passes[0].load, LoadAction::Clear(wgpu::Color::RED));
    }
}
