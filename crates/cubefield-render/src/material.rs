//! Live uniform values per program.
//!
//! A [`Material`] starts from its program's declared defaults and is mutated
//! in place every frame. Slots are addressed by name so a control surface can
//! tweak any tunable without knowing the program's layout. Access is main
//! thread only; nothing here synchronizes.

use glam::{Vec2, Vec3};
use thiserror::Error;

use crate::programs::{ProgramId, UniformKind, UniformValue};
use crate::targets::TargetId;

#[derive(Debug, Error, PartialEq)]
pub enum UniformError {
    #[error("program '{program}' has no uniform '{name}'")]
    Unknown {
        program: &'static str,
        name: String,
    },

    #[error("uniform '{program}.{name}' is {expected:?}, got {found:?}")]
    KindMismatch {
        program: &'static str,
        name: String,
        expected: UniformKind,
        found: UniformKind,
    },
}

/// The uniform values of one program.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    program: ProgramId,
    slots: Vec<(&'static str, UniformValue)>,
}

impl Material {
    /// A material holding `program`'s declared defaults.
    pub fn new(program: ProgramId) -> Self {
        let slots = program
            .descriptor()
            .uniforms
            .iter()
            .map(|decl| (decl.name, decl.default))
            .collect();
        Self { program, slots }
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn get(&self, name: &str) -> Result<UniformValue, UniformError> {
        self.slots
            .iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| self.unknown(name))
    }

    /// Overwrite a slot. The value must have the slot's declared kind.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        let program = self.program.name();
        let slot = self
            .slots
            .iter_mut()
            .find(|(slot, _)| *slot == name)
            .map(|(_, slot)| slot)
            .ok_or_else(|| UniformError::Unknown {
                program,
                name: name.to_string(),
            })?;

        if slot.kind() != value.kind() {
            return Err(UniformError::KindMismatch {
                program,
                name: name.to_string(),
                expected: slot.kind(),
                found: value.kind(),
            });
        }
        *slot = value;
        Ok(())
    }

    /// All slots in declaration order.
    pub fn uniforms(&self) -> impl Iterator<Item = (&'static str, UniformValue)> + '_ {
        self.slots.iter().copied()
    }

    pub fn float(&self, name: &str) -> Result<f32, UniformError> {
        match self.get(name)? {
            UniformValue::Float(v) => Ok(v),
            other => Err(self.mismatch(name, UniformKind::Float, other)),
        }
    }

    pub fn color(&self, name: &str) -> Result<[f32; 3], UniformError> {
        match self.get(name)? {
            UniformValue::Color(v) => Ok(v),
            other => Err(self.mismatch(name, UniformKind::Color, other)),
        }
    }

    pub fn vec2(&self, name: &str) -> Result<Vec2, UniformError> {
        match self.get(name)? {
            UniformValue::Vec2(v) => Ok(v),
            other => Err(self.mismatch(name, UniformKind::Vec2, other)),
        }
    }

    pub fn vec3(&self, name: &str) -> Result<Vec3, UniformError> {
        match self.get(name)? {
            UniformValue::Vec3(v) => Ok(v),
            other => Err(self.mismatch(name, UniformKind::Vec3, other)),
        }
    }

    pub fn texture(&self, name: &str) -> Result<Option<TargetId>, UniformError> {
        match self.get(name)? {
            UniformValue::Texture(v) => Ok(v),
            other => Err(self.mismatch(name, UniformKind::Texture, other)),
        }
    }

    /// Bound targets of the texture uniforms, in binding order.
    pub fn texture_inputs(&self) -> impl Iterator<Item = Option<TargetId>> + '_ {
        self.slots.iter().filter_map(|(_, value)| match value {
            UniformValue::Texture(target) => Some(*target),
            _ => None,
        })
    }

    fn unknown(&self, name: &str) -> UniformError {
        UniformError::Unknown {
            program: self.program.name(),
            name: name.to_string(),
        }
    }

    fn mismatch(&self, name: &str, expected: UniformKind, found: UniformValue) -> UniformError {
        UniformError::KindMismatch {
            program: self.program.name(),
            name: name.to_string(),
            expected,
            found: found.kind(),
        }
    }
}

/// One material per program.
#[derive(Clone, Debug, PartialEq)]
pub struct Materials {
    materials: Vec<Material>,
}

impl Materials {
    pub fn new() -> Self {
        Self {
            materials: ProgramId::ALL.into_iter().map(Material::new).collect(),
        }
    }

    pub fn get(&self, program: ProgramId) -> &Material {
        &self.materials[program as usize]
    }

    pub fn get_mut(&mut self, program: ProgramId) -> &mut Material {
        &mut self.materials[program as usize]
    }

    /// Set a uniform addressed as `program.uniform`, e.g. `god_rays.exposure`.
    pub fn set_by_path(&mut self, path: &str, value: UniformValue) -> Result<(), UniformError> {
        let (program, name) = path.split_once('.').unwrap_or((path, ""));
        let id = ProgramId::from_name(program).ok_or_else(|| UniformError::Unknown {
            program: "<none>",
            name: path.to_string(),
        })?;
        self.get_mut(id).set(name, value)
    }

    /// Copy the animation age into every cube program.
    pub fn set_age(&mut self, age: f32) {
        for program in [
            ProgramId::CubesDiffuse,
            ProgramId::CubesBlack,
            ProgramId::Background,
        ] {
            let result = self.get_mut(program).set("age", UniformValue::Float(age));
            debug_assert!(result.is_ok(), "{} has no age uniform", program.name());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }
}

impl Default for Materials {
    fn default() -> Self {
        Self::new()
    }
}
