//! Shader module compilation and caching, keyed by [`ProgramId`].

use log::{debug, info};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use wgpu::{ShaderModuleDescriptor, ShaderSource};

use crate::programs::ProgramId;

/// Error types for shader loading operations.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader '{name}' failed to compile: {message}")]
    CompilationFailed { name: String, message: String },

    #[error("shader '{name}' not found in library")]
    NotLoaded { name: String },

    #[error("unknown program '{name}'")]
    UnknownProgram { name: String },
}

/// Compiled modules for the program table.
pub struct ShaderLibrary {
    modules: HashMap<ProgramId, Arc<wgpu::ShaderModule>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Compile (or recompile) the module for `id`.
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        id: ProgramId,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        let descriptor = id.descriptor();
        let module = Arc::new(compile(device, descriptor.name, &descriptor.compose_source())?);

        if self.modules.insert(id, module.clone()).is_some() {
            info!("Replaced shader '{}'", descriptor.name);
        } else {
            info!("Loaded shader '{}'", descriptor.name);
        }
        Ok(module)
    }

    /// Load a program by its table name.
    pub fn load_by_name(
        &mut self,
        device: &wgpu::Device,
        name: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        let id = ProgramId::from_name(name).ok_or_else(|| ShaderError::UnknownProgram {
            name: name.to_string(),
        })?;
        self.load(device, id)
    }

    /// Compile every program in the table.
    pub fn load_all(&mut self, device: &wgpu::Device) -> Result<(), ShaderError> {
        for id in ProgramId::ALL {
            self.load(device, id)?;
        }
        Ok(())
    }

    pub fn get(&self, id: ProgramId) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        self.modules
            .get(&id)
            .cloned()
            .ok_or_else(|| ShaderError::NotLoaded {
                name: id.name().to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a module from WGSL and surface its compiler errors.
pub fn compile(
    device: &wgpu::Device,
    name: &str,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    debug!("Compiling shader '{}' ({} bytes)", name, source.len());

    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(ShaderModuleDescriptor {
        label: Some(name),
        source: ShaderSource::Wgsl(source.into()),
    });
    let validation = pollster::block_on(scope.pop());

    let info = pollster::block_on(module.get_compilation_info());
    let mut errors: Vec<String> = info
        .messages
        .iter()
        .filter(|m| m.message_type == wgpu::CompilationMessageType::Error)
        .map(|m| match &m.location {
            Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
            None => m.message.clone(),
        })
        .collect();
    if errors.is_empty()
        && let Some(error) = validation
    {
        errors.push(error.to_string());
    }

    if errors.is_empty() {
        Ok(module)
    } else {
        Err(ShaderError::CompilationFailed {
            name: name.to_string(),
            message: errors.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device;

    #[test]
    fn test_every_program_compiles() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        library.load_all(&device).unwrap();
        assert_eq!(library.len(), ProgramId::ALL.len());
    }

    #[test]
    fn test_cache_returns_same_module() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        library.load(&device, ProgramId::GodRays).unwrap();

        let a = library.get(ProgramId::GodRays).unwrap();
        let b = library.get(ProgramId::GodRays).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_reload_replaces_cached_module() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        let original = library.load(&device, ProgramId::Additive).unwrap();
        library.load_by_name(&device, "additive").unwrap();
        let reloaded = library.get(ProgramId::Additive).unwrap();
        assert!(!Arc::ptr_eq(&original, &reloaded));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_library_starts_empty() {
        let library = ShaderLibrary::new();
        assert!(library.is_empty());
        assert!(matches!(
            library.get(ProgramId::CubesDiffuse),
            Err(ShaderError::NotLoaded { .. })
        ));
    }

    #[test]
    fn test_unknown_program_name() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        let result = library.load_by_name(&device, "no_such_program");
        assert!(matches!(result, Err(ShaderError::UnknownProgram { .. })));
    }

    #[test]
    fn test_invalid_wgsl_is_an_error() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let result = compile(&device, "broken", "fn main( { return 1; }");
        match result {
            Err(ShaderError::CompilationFailed { name, message }) => {
                assert_eq!(name, "broken");
                assert!(!message.is_empty());
            }
            other => panic!("expected a compilation failure, got {other:?}"),
        }
    }
}
