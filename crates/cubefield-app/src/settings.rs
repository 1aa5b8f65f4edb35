//! Translation from the on-disk [`Config`] to simulation state.

use cubefield_config::{Config, EffectsConfig};
use cubefield_render::{Simulation, SimulationSettings, UniformError, UniformValue};
use rand::Rng;

/// Startup settings for the simulation.
///
/// A missing `initial_camera_angle` is drawn uniformly from `[0, 2π)`.
pub fn simulation_settings(config: &Config, rng: &mut impl Rng) -> SimulationSettings {
    let simulation = &config.simulation;
    let effects = &config.effects;
    SimulationSettings {
        initial_age: simulation.initial_age,
        initial_camera_angle: simulation
            .initial_camera_angle
            .unwrap_or_else(|| rng.random_range(0.0..std::f32::consts::TAU)),
        rotation_speed: simulation.rotation_speed,
        god_rays_enabled: effects.god_rays_enabled,
        background_enabled: effects.background_enabled,
        light_color: effects.light_color,
        clear_color: effects.clear_color,
        blur_radius_px: effects.blur_radius_px,
    }
}

/// Push the effect parameters into a running simulation.
///
/// Used at startup and again whenever the config is reloaded.
pub fn apply_effects(simulation: &mut Simulation, effects: &EffectsConfig) -> Result<(), UniformError> {
    simulation.set_god_rays_enabled(effects.god_rays_enabled);
    simulation.set_background_enabled(effects.background_enabled);
    simulation.set_light_color(effects.light_color)?;
    simulation.set_clear_color(effects.clear_color);

    simulation.post.blur_radius_px = effects.blur_radius_px;
    simulation.post.apply_blur_steps(&mut simulation.materials)?;

    let floats = [
        ("god_rays.exposure", effects.exposure),
        ("god_rays.decay", effects.decay),
        ("god_rays.density", effects.density),
        ("god_rays.weight", effects.weight),
        ("god_rays.clamp", effects.clamp),
        ("additive.coefficient", effects.additive_coefficient),
    ];
    for (path, value) in floats {
        simulation
            .materials
            .set_by_path(path, UniformValue::Float(value))?;
    }
    Ok(())
}
