//! GPU executor: owns pipelines, buffers and render targets, and replays a
//! [`FramePlan`] into a command encoder.

use thiserror::Error;

use crate::buffer::{UniformBuffer, create_vertex_buffer, uniform_bind_group_layout};
use crate::depth::DepthBuffer;
use crate::frame::{DrawItem, FramePlan, Geometry, PassPlan};
use crate::geometry::{CUBE_VERTEX_LAYOUT, CubeVertex};
use crate::light::{DISK_RADIUS, DISK_SEGMENTS, DISK_THICKNESS, DISK_VERTEX_LAYOUT, disk_vertices};
use crate::material::UniformError;
use crate::pass::{FrameEncoder, PassAttachments};
use crate::programs::ProgramId;
use crate::shader::{ShaderError, ShaderLibrary};
use crate::simulation::Simulation;
use crate::targets::{RenderTargets, TargetBindings, TargetSizes};
use crate::uniforms;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Uniform(#[from] UniformError),

    #[error("program '{program}' samples {expected} texture(s) but {found} are bound")]
    UnboundInput {
        program: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("pass '{pass}' samples the target it renders into")]
    FeedbackLoop { pass: &'static str },

    #[error("GPU validation failed: {0}")]
    Validation(String),

    #[error("GPU allocation failed: {0}")]
    Allocation(String),
}

/// Run `build` inside validation and out-of-memory error scopes.
///
/// An error returned by `build` itself wins over whatever the scopes caught.
fn with_error_scopes<T>(
    device: &wgpu::Device,
    build: impl FnOnce() -> Result<T, RenderError>,
) -> Result<T, RenderError> {
    let allocation = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let result = build();
    let validation = pollster::block_on(validation.pop());
    let allocation = pollster::block_on(allocation.pop());

    let value = result?;
    if let Some(error) = validation {
        return Err(RenderError::Validation(error.to_string()));
    }
    if let Some(error) = allocation {
        return Err(RenderError::Allocation(error.to_string()));
    }
    Ok(value)
}

/// How a program's pipeline is assembled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PipelineKind {
    Cubes,
    LightDisk,
    /// Fullscreen triangle sampling one target.
    FullscreenSingle,
    /// Fullscreen triangle sampling two targets.
    FullscreenPair,
}

impl PipelineKind {
    fn of(program: ProgramId) -> Self {
        match program {
            ProgramId::CubesDiffuse | ProgramId::CubesBlack | ProgramId::Background => Self::Cubes,
            ProgramId::LightDisk => Self::LightDisk,
            ProgramId::GodRays | ProgramId::HorizontalBlur | ProgramId::VerticalBlur => {
                Self::FullscreenSingle
            }
            ProgramId::Additive => Self::FullscreenPair,
        }
    }

    /// Group 1 layout, if the program samples targets.
    fn texture_layout<'a>(
        self,
        single: &'a wgpu::BindGroupLayout,
        pair: &'a wgpu::BindGroupLayout,
    ) -> Option<&'a wgpu::BindGroupLayout> {
        match self {
            Self::FullscreenSingle => Some(single),
            Self::FullscreenPair => Some(pair),
            Self::Cubes | Self::LightDisk => None,
        }
    }
}

pub struct Renderer {
    format: wgpu::TextureFormat,
    uniform_layout: wgpu::BindGroupLayout,
    single_layout: wgpu::BindGroupLayout,
    pair_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    shaders: ShaderLibrary,
    /// Indexed by `ProgramId as usize`.
    pipelines: Vec<wgpu::RenderPipeline>,
    /// Indexed by `ProgramId as usize`.
    uniforms: Vec<UniformBuffer>,
    cube_buffer: wgpu::Buffer,
    cube_vertex_count: u32,
    disk_buffer: wgpu::Buffer,
    disk_vertex_count: u32,
    targets: RenderTargets,
}

impl Renderer {
    /// Compile every program and allocate buffers and targets for a
    /// `width × height` output in `format`.
    ///
    /// Any GPU validation or allocation failure is returned as an error.
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        cube_vertices: &[CubeVertex],
    ) -> Result<Self, RenderError> {
        with_error_scopes(device, || {
            Self::build(device, format, width, height, cube_vertices)
        })
    }

    fn build(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        cube_vertices: &[CubeVertex],
    ) -> Result<Self, RenderError> {
        let uniform_layout = uniform_bind_group_layout(device);
        let single_layout = texture_bind_group_layout(device, "single-texture-bgl", 1);
        let pair_layout = texture_bind_group_layout(device, "pair-texture-bgl", 2);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("target-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let mut shaders = ShaderLibrary::new();
        shaders.load_all(device)?;

        let mut pipelines = Vec::with_capacity(ProgramId::ALL.len());
        for program in ProgramId::ALL {
            let shader = shaders.get(program)?;
            pipelines.push(create_pipeline(
                device,
                &shader,
                program,
                &uniform_layout,
                PipelineKind::of(program).texture_layout(&single_layout, &pair_layout),
                format,
            ));
        }

        let uniforms = ProgramId::ALL
            .iter()
            .map(|program| {
                UniformBuffer::new(
                    device,
                    &uniform_layout,
                    &format!("{}-uniforms", program.name()),
                    uniform_block_size(*program),
                )
            })
            .collect();

        let disk = disk_vertices(DISK_RADIUS, DISK_THICKNESS, DISK_SEGMENTS);
        let disk_buffer = create_vertex_buffer(device, "light-disk-vertices", &disk);
        let cube_buffer = create_vertex_buffer(device, "cube-vertices", cube_vertices);

        let targets = RenderTargets::new(
            device,
            &TargetBindings {
                single_layout: &single_layout,
                pair_layout: &pair_layout,
                sampler: &sampler,
            },
            format,
            TargetSizes::new(width, height),
        );

        log::info!(
            "Renderer ready: {} programs, {} cube vertices, {:?}",
            pipelines.len(),
            cube_vertices.len(),
            format
        );

        Ok(Self {
            format,
            uniform_layout,
            single_layout,
            pair_layout,
            sampler,
            shaders,
            pipelines,
            uniforms,
            cube_buffer,
            cube_vertex_count: cube_vertices.len() as u32,
            disk_buffer,
            disk_vertex_count: disk.len() as u32,
            targets,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn cube_vertex_count(&self) -> u32 {
        self.cube_vertex_count
    }

    pub fn targets(&self) -> &RenderTargets {
        &self.targets
    }

    pub fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.uniform_layout
    }

    /// Recompile `program` and rebuild its pipeline.
    pub fn reload_program(
        &mut self,
        device: &wgpu::Device,
        program: ProgramId,
    ) -> Result<(), RenderError> {
        let pipeline = with_error_scopes(device, || {
            let shader = self.shaders.load(device, program)?;
            Ok(create_pipeline(
                device,
                &shader,
                program,
                &self.uniform_layout,
                PipelineKind::of(program).texture_layout(&self.single_layout, &self.pair_layout),
                self.format,
            ))
        })?;
        self.pipelines[program as usize] = pipeline;
        Ok(())
    }

    /// Rebuild the render targets for a new output size.
    ///
    /// Returns `false` when the size is unchanged and nothing was rebuilt.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Result<bool, RenderError> {
        let bindings = TargetBindings {
            single_layout: &self.single_layout,
            pair_layout: &self.pair_layout,
            sampler: &self.sampler,
        };
        let targets = &mut self.targets;
        let resized =
            with_error_scopes(device, || Ok(targets.resize(device, &bindings, width, height)))?;
        if resized {
            log::debug!("Resized render targets to {}x{}", width, height);
        }
        Ok(resized)
    }

    /// Write every program's uniform block from the simulation's materials.
    pub fn upload(&self, queue: &wgpu::Queue, simulation: &Simulation) -> Result<(), UniformError> {
        let materials = &simulation.materials;
        let view_proj = simulation.camera().view_projection_matrix();
        let background_view_proj = simulation.background_camera().view_projection_matrix();

        for program in ProgramId::ALL {
            let material = materials.get(program);
            let buffer = &self.uniforms[program as usize];
            match program {
                ProgramId::CubesDiffuse | ProgramId::CubesBlack => {
                    buffer.write(queue, &uniforms::pack_scene(material, view_proj)?);
                }
                ProgramId::Background => {
                    buffer.write(queue, &uniforms::pack_scene(material, background_view_proj)?);
                }
                ProgramId::LightDisk => buffer.write(
                    queue,
                    &uniforms::pack_light_disk(material, view_proj, simulation.post.light.position)?,
                ),
                ProgramId::HorizontalBlur => {
                    buffer.write(queue, &uniforms::pack_horizontal_blur(material)?);
                }
                ProgramId::VerticalBlur => {
                    buffer.write(queue, &uniforms::pack_vertical_blur(material)?);
                }
                ProgramId::GodRays => buffer.write(queue, &uniforms::pack_god_rays(material)?),
                ProgramId::Additive => buffer.write(queue, &uniforms::pack_additive(material)?),
            }
        }
        Ok(())
    }

    /// Record every pass of `plan`. Passes targeting the surface draw into
    /// `surface_view`.
    pub fn encode(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        plan: &FramePlan,
    ) -> Result<(), RenderError> {
        for pass in &plan.passes {
            self.encode_pass(device, encoder, surface_view, pass)?;
        }
        Ok(())
    }

    /// Upload, encode and present one frame.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_texture: wgpu::SurfaceTexture,
        simulation: &Simulation,
    ) -> Result<(), RenderError> {
        self.upload(queue, simulation)?;
        let mut frame = FrameEncoder::new(device, queue, surface_texture);
        let encoded = match frame.parts() {
            Some((encoder, view)) => self.encode(device, encoder, view, simulation.plan()),
            None => Ok(()),
        };
        match encoded {
            Ok(()) => {
                frame.submit();
                Ok(())
            }
            Err(e) => {
                // never present a partly recorded frame
                frame.discard();
                Err(e)
            }
        }
    }

    fn encode_pass(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        pass: &PassPlan,
    ) -> Result<(), RenderError> {
        if pass.reads_own_target() {
            return Err(RenderError::FeedbackLoop { pass: pass.label });
        }

        let texture_groups = pass
            .draws
            .iter()
            .map(|draw| self.texture_bind_group(device, draw))
            .collect::<Result<Vec<_>, _>>()?;

        let target = pass.target.offscreen();
        let color = match target {
            Some(id) => self.targets.view(id),
            None => surface_view,
        };
        let depth = pass.depth.then(|| self.targets.depth_for(target));

        let attachments = PassAttachments {
            label: pass.label,
            color,
            load: pass.load,
            depth,
        };
        let mut render_pass = attachments.begin(encoder);

        for (draw, texture_group) in pass.draws.iter().zip(&texture_groups) {
            render_pass.set_pipeline(&self.pipelines[draw.program as usize]);
            render_pass.set_bind_group(0, &self.uniforms[draw.program as usize].bind_group, &[]);
            if let Some(group) = texture_group {
                render_pass.set_bind_group(1, group.get(), &[]);
            }

            match &draw.geometry {
                Geometry::Cubes(range) => {
                    let range = range.start.min(self.cube_vertex_count)
                        ..range.end.min(self.cube_vertex_count);
                    if range.is_empty() {
                        continue;
                    }
                    render_pass.set_vertex_buffer(0, self.cube_buffer.slice(..));
                    render_pass.draw(range, 0..1);
                }
                Geometry::LightDisk => {
                    render_pass.set_vertex_buffer(0, self.disk_buffer.slice(..));
                    render_pass.draw(0..self.disk_vertex_count, 0..1);
                }
                Geometry::FullscreenTriangle => render_pass.draw(0..3, 0..1),
            }
        }
        Ok(())
    }

    /// Resolve the group 1 bind group for a draw's texture inputs.
    fn texture_bind_group(
        &self,
        device: &wgpu::Device,
        draw: &DrawItem,
    ) -> Result<Option<TextureGroup<'_>>, RenderError> {
        let expected = draw.program.descriptor().texture_inputs().count();
        let found = draw.inputs.iter().flatten().count();
        let unbound = RenderError::UnboundInput {
            program: draw.program.name(),
            expected,
            found,
        };
        if found != expected {
            return Err(unbound);
        }

        Ok(match draw.inputs {
            [None, None] => None,
            [Some(single), None] => {
                Some(TextureGroup::Borrowed(self.targets.single_bind_group(single)))
            }
            [Some(first), Some(second)] => {
                Some(match self.targets.cached_pair_bind_group(first, second) {
                    Some(group) => TextureGroup::Borrowed(group),
                    None => TextureGroup::Built(self.targets.build_pair_bind_group(
                        device,
                        &TargetBindings {
                            single_layout: &self.single_layout,
                            pair_layout: &self.pair_layout,
                            sampler: &self.sampler,
                        },
                        first,
                        second,
                    )),
                })
            }
            [None, Some(_)] => return Err(unbound),
        })
    }
}

/// A draw's texture bind group: owned by the targets or built for this frame.
enum TextureGroup<'a> {
    Borrowed(&'a wgpu::BindGroup),
    Built(wgpu::BindGroup),
}

impl TextureGroup<'_> {
    fn get(&self) -> &wgpu::BindGroup {
        match self {
            TextureGroup::Borrowed(group) => group,
            TextureGroup::Built(group) => group,
        }
    }
}

/// Byte size of `program`'s uniform block.
fn uniform_block_size(program: ProgramId) -> u64 {
    let size = match program {
        ProgramId::CubesDiffuse | ProgramId::CubesBlack | ProgramId::Background => {
            std::mem::size_of::<uniforms::SceneUniform>()
        }
        ProgramId::LightDisk => std::mem::size_of::<uniforms::LightDiskUniform>(),
        ProgramId::HorizontalBlur | ProgramId::VerticalBlur => {
            std::mem::size_of::<uniforms::BlurUniform>()
        }
        ProgramId::GodRays => std::mem::size_of::<uniforms::GodRaysUniform>(),
        ProgramId::Additive => std::mem::size_of::<uniforms::AdditiveUniform>(),
    };
    size as u64
}

fn texture_bind_group_layout(
    device: &wgpu::Device,
    label: &str,
    textures: u32,
) -> wgpu::BindGroupLayout {
    let mut entries: Vec<wgpu::BindGroupLayoutEntry> = (0..textures)
        .map(|binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        })
        .collect();
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: textures,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    });

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    program: ProgramId,
    uniform_layout: &wgpu::BindGroupLayout,
    texture_layout: Option<&wgpu::BindGroupLayout>,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let descriptor = program.descriptor();
    let kind = PipelineKind::of(program);

    let bind_group_layouts: Vec<&wgpu::BindGroupLayout> =
        std::iter::once(uniform_layout).chain(texture_layout).collect();
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(descriptor.name),
        bind_group_layouts: &bind_group_layouts,
        immediate_size: 0,
    });

    let (buffers, cull_mode, depth_stencil) = match kind {
        PipelineKind::Cubes => (
            &[CUBE_VERTEX_LAYOUT][..],
            Some(wgpu::Face::Back),
            Some(DepthBuffer::depth_stencil_state()),
        ),
        PipelineKind::LightDisk => (
            &[DISK_VERTEX_LAYOUT][..],
            None,
            Some(DepthBuffer::depth_stencil_state()),
        ),
        PipelineKind::FullscreenSingle | PipelineKind::FullscreenPair => (&[][..], None, None),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(descriptor.name),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(descriptor.vertex_entry),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            ..Default::default()
        },
        depth_stencil,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(descriptor.fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::build_cubes;
    use crate::gpu::create_test_device;
    use crate::simulation::SimulationSettings;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
    const SIZE: u32 = 64;

    fn output_texture(device: &wgpu::Device) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test-output"),
            size: wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    /// Render one planned frame into an offscreen texture and read back its
    /// top-left pixel.
    fn render_corner_pixel(simulation: &mut Simulation, cubes: &[CubeVertex]) -> Option<[u8; 4]> {
        let (device, queue) = create_test_device()?;
        let renderer = Renderer::new(&device, FORMAT, SIZE, SIZE, cubes).unwrap();
        let output = output_texture(&device);
        let view = output.create_view(&wgpu::TextureViewDescriptor::default());

        simulation.plan_frame().unwrap();
        renderer.upload(&queue, simulation).unwrap();

        let padded = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("test-readback"),
            size: u64::from(padded * SIZE),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        renderer
            .encode(&device, &mut encoder, &view, simulation.plan())
            .unwrap();
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &output,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(SIZE),
                },
            },
            wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
        );
        queue.submit([encoder.finish()]);

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        });
        rx.recv().unwrap().unwrap();
        let mapped = slice.get_mapped_range();
        Some([mapped[0], mapped[1], mapped[2], mapped[3]])
    }

    #[test]
    fn test_direct_path_clears_to_clear_color() {
        let mut simulation = Simulation::new(0, SIZE, SIZE, &SimulationSettings::default());
        simulation.set_god_rays_enabled(false);
        let Some(pixel) = render_corner_pixel(&mut simulation, &[]) else {
            return;
        };
        assert_eq!(pixel, [0, 27, 27, 255]);
    }

    #[test]
    fn test_god_rays_path_adds_onto_scene() {
        let mut simulation = Simulation::new(0, SIZE, SIZE, &SimulationSettings::default());
        let Some(pixel) = render_corner_pixel(&mut simulation, &[]) else {
            return;
        };
        // streaks only ever add light on top of the scene
        assert!(pixel[1] >= 27 && pixel[2] >= 27, "{pixel:?}");
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn test_full_frame_with_cubes_encodes() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let cubes = build_cubes(200, &mut rng);
        let mut simulation =
            Simulation::new(cubes.len() as u32, SIZE, SIZE, &SimulationSettings::default());
        simulation.advance(1.0 / 60.0);
        let _ = render_corner_pixel(&mut simulation, &cubes);
    }

    #[test]
    fn test_resize_rebuilds_targets() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut renderer = Renderer::new(&device, FORMAT, 128, 96, &[]).unwrap();
        assert!(renderer.resize(&device, 256, 128).unwrap());
        assert_eq!(renderer.targets().sizes(), TargetSizes::new(256, 128));
        assert_eq!(renderer.targets().occlusion_depth.width(), 128);
    }

    #[test]
    fn test_resize_to_same_size_is_a_no_op() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut renderer = Renderer::new(&device, FORMAT, 128, 96, &[]).unwrap();
        assert!(renderer.resize(&device, 300, 200).unwrap());
        let sizes = renderer.targets().sizes();

        assert!(!renderer.resize(&device, 300, 200).unwrap());
        assert_eq!(renderer.targets().sizes(), sizes);
        assert_eq!(renderer.targets().occlusion_depth.width(), 150);
    }

    #[test]
    fn test_mismatched_layout_is_a_validation_error() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let shader = ShaderLibrary::new()
            .load(&device, ProgramId::GodRays)
            .unwrap();
        let uniform_layout = uniform_bind_group_layout(&device);

        // god rays samples group 1, which this layout leaves out
        let result = with_error_scopes(&device, || {
            Ok(create_pipeline(
                &device,
                &shader,
                ProgramId::GodRays,
                &uniform_layout,
                None,
                FORMAT,
            ))
        });
        assert!(
            matches!(result, Err(RenderError::Validation(_))),
            "{:?}",
            result.err()
        );
    }

    #[test]
    fn test_unbound_input_rejected() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let renderer = Renderer::new(&device, FORMAT, SIZE, SIZE, &[]).unwrap();
        let draw = DrawItem::new(ProgramId::GodRays, Geometry::FullscreenTriangle);
        assert!(matches!(
            renderer.texture_bind_group(&device, &draw),
            Err(RenderError::UnboundInput { expected: 1, found: 0, .. })
        ));
    }

    #[test]
    fn test_reload_program() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut renderer = Renderer::new(&device, FORMAT, SIZE, SIZE, &[]).unwrap();
        renderer
            .reload_program(&device, ProgramId::CubesDiffuse)
            .unwrap();
    }

    #[test]
    fn test_uniform_block_sizes_are_16_byte_aligned() {
        for program in ProgramId::ALL {
            assert_eq!(uniform_block_size(program) % 16, 0, "{}", program.name());
        }
    }

    #[test]
    fn test_pipeline_kinds() {
        assert_eq!(PipelineKind::of(ProgramId::Background), PipelineKind::Cubes);
        assert_eq!(PipelineKind::of(ProgramId::Additive), PipelineKind::FullscreenPair);
        assert_eq!(
            PipelineKind::of(ProgramId::VerticalBlur),
            PipelineKind::FullscreenSingle
        );
    }
}
