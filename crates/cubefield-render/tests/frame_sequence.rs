//! Multi-frame behavior of the planning layer, without a GPU.

use cubefield_render::frame::{Geometry, LoadAction, PassTarget};
use cubefield_render::geometry::VERTICES_PER_CUBE;
use cubefield_render::{ProgramId, Simulation, SimulationSettings, TargetId, UniformValue, build_cubes};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn simulation(cubes: usize) -> Simulation {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let vertices = build_cubes(cubes, &mut rng);
    assert_eq!(vertices.len(), cubes * VERTICES_PER_CUBE);
    Simulation::new(vertices.len() as u32, 1280, 720, &SimulationSettings::default())
}

#[test]
fn test_age_is_monotonic_over_many_frames() {
    let mut sim = simulation(100);
    let mut last = sim.animation.age();
    for _ in 0..600 {
        sim.advance(1.0 / 60.0);
        let age = sim.animation.age();
        assert!(age > last);
        last = age;
    }
    assert!((last - 70.0).abs() < 1e-2);
}

#[test]
fn test_camera_angle_stays_in_range() {
    let mut sim = simulation(10);
    for i in 0..5_000 {
        sim.advance(if i % 7 == 0 { 0.9 } else { 1.0 / 30.0 });
        let angle = sim.camera_rotation();
        assert!((0.0..std::f32::consts::TAU).contains(&angle), "{angle}");
    }
}

#[test]
fn test_dropped_frames_do_not_move_camera() {
    let mut sim = simulation(10);
    let angle = sim.camera_rotation();
    let age = sim.animation.age();
    for delta in [-1.0, 2.0, f32::NAN, f32::INFINITY] {
        sim.advance(delta);
    }
    assert_eq!(sim.camera_rotation(), angle);
    assert!((sim.animation.age() - (age + 4.0 / 60.0)).abs() < 1e-4);
    assert_eq!(sim.animation.dropped_frames(), 4);
}

#[test]
fn test_god_rays_frames_repeat_the_same_pass_sequence() {
    let mut sim = simulation(500);
    let first: Vec<_> = sim.plan_frame().unwrap().labels().collect();
    for _ in 0..10 {
        sim.advance(1.0 / 60.0);
        let labels: Vec<_> = sim.plan_frame().unwrap().labels().collect();
        assert_eq!(labels, first);
        assert!(sim.scene.draw_range().is_full());
    }
}

#[test]
fn test_toggling_god_rays_switches_paths_next_frame() {
    let mut sim = simulation(500);
    assert_eq!(sim.plan_frame().unwrap().len(), 9);

    sim.set_god_rays_enabled(false);
    let plan = sim.plan_frame().unwrap();
    assert_eq!(plan.len(), 2);
    assert!(plan.passes.iter().all(|p| p.target == PassTarget::Surface));

    sim.set_god_rays_enabled(true);
    let plan = sim.plan_frame().unwrap();
    assert_eq!(plan.passes.last().map(|p| p.target), Some(PassTarget::Surface));
    assert_eq!(
        plan.passes[0].target,
        PassTarget::Offscreen(TargetId::Diffuse)
    );
}

#[test]
fn test_background_draws_leading_cubes_only() {
    let mut sim = simulation(500);
    let plan = sim.plan_frame().unwrap();
    let background = &plan.passes[0];
    assert_eq!(background.draws[0].program, ProgramId::Background);
    assert_eq!(
        background.draws[0].geometry,
        Geometry::Cubes(0..60 * VERTICES_PER_CUBE as u32)
    );
    assert_eq!(
        plan.passes[1].draws[0].geometry,
        Geometry::Cubes(0..500 * VERTICES_PER_CUBE as u32)
    );
    assert_eq!(plan.passes[1].load, LoadAction::Load);
}

#[test]
fn test_external_uniform_edits_survive_frames() {
    let mut sim = simulation(50);
    sim.materials
        .set_by_path("god_rays.exposure", UniformValue::Float(0.4))
        .unwrap();
    sim.materials
        .set_by_path("additive.coefficient", UniformValue::Float(0.5))
        .unwrap();
    for _ in 0..3 {
        sim.advance(1.0 / 60.0);
        sim.plan_frame().unwrap();
    }
    assert_eq!(sim.materials.get(ProgramId::GodRays).float("exposure"), Ok(0.4));
    assert_eq!(
        sim.materials.get(ProgramId::Additive).float("coefficient"),
        Ok(0.5)
    );
    assert!(
        sim.materials
            .set_by_path("god_rays.exposure", UniformValue::Vec2(glam::Vec2::ZERO))
            .is_err()
    );
}

#[test]
fn test_light_screen_position_tracks_camera() {
    let mut sim = simulation(50);
    sim.plan_frame().unwrap();
    let before = sim.post.light_screen_position();
    sim.advance(0.5);
    sim.plan_frame().unwrap();
    let after = sim.post.light_screen_position();
    assert!(before.is_finite() && after.is_finite());
    assert_ne!(before, after);
}
