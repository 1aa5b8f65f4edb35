//! Orbit and background cameras.
//!
//! Both use a reverse-Z perspective projection: near maps to depth 1.0, far
//! to 0.0, matching [`DepthBuffer`](crate::depth::DepthBuffer).

use glam::{Mat3, Mat4, Quat, Vec3};

/// Distance from the origin at which the main camera orbits.
pub const ORBIT_DISTANCE: f32 = 100.0;

/// Unnormalized orbit axis; also the main camera's up vector.
pub const ORBIT_AXIS: Vec3 = Vec3::new(0.0, 1.0, 0.25);

pub const FOV_Y_DEGREES: f32 = 45.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;

/// A camera producing view and projection matrices.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// Camera at the origin looking down −Z, used for the background layer.
    pub fn background(aspect_ratio: f32) -> Self {
        Self {
            aspect_ratio,
            ..Self::default()
        }
    }

    /// Main camera orbiting the origin by `angle` radians around [`ORBIT_AXIS`].
    pub fn orbit(angle: f32, aspect_ratio: f32) -> Self {
        let mut camera = Self {
            aspect_ratio,
            ..Self::default()
        };
        camera.set_orbit_angle(angle);
        camera
    }

    /// Move to the orbit position for `angle` and face the origin.
    pub fn set_orbit_angle(&mut self, angle: f32) {
        let axis = ORBIT_AXIS.normalize();
        self.position = Quat::from_axis_angle(axis, angle) * Vec3::new(ORBIT_DISTANCE, 0.0, 0.0);
        self.look_at(Vec3::ZERO, axis);
    }

    /// Rotate to face `target`, keeping `up` as close to camera +Y as possible.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        let right = forward.cross(up).normalize_or_zero();
        if forward == Vec3::ZERO || right == Vec3::ZERO {
            return;
        }
        let true_up = right.cross(forward);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, true_up, -forward));
    }

    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::from_translation(self.position) * Mat4::from_quat(self.rotation)).inverse()
    }

    /// Reverse-Z perspective projection.
    pub fn projection_matrix(&self) -> Mat4 {
        // near/far swapped
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// The up direction vector (+Y in camera space).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Update the aspect ratio. Zero heights are treated as 1.
    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        self.aspect_ratio = width.max(1) as f32 / height.max(1) as f32;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: FOV_Y_DEGREES.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: NEAR,
            far: FAR,
        }
    }
}
