//! Off-screen render targets for the god rays post-process.
//!
//! One full-resolution diffuse target and two half-resolution ping-pong
//! targets, each with a depth attachment where geometry is drawn into it.
//! Resize builds a complete new set and swaps it in; the old set is dropped
//! only after the swap, so no pass can see a half-resized mix.

use glam::Vec2;

use crate::depth::DepthBuffer;

/// Off-screen targets addressable from materials and frame plans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetId {
    /// Full-resolution scene.
    Diffuse,
    /// Occlusion mask, then blur ping.
    GodRays1,
    /// Blur pong, then the streak texture.
    GodRays2,
}

impl TargetId {
    pub const ALL: [TargetId; 3] = [TargetId::Diffuse, TargetId::GodRays1, TargetId::GodRays2];

    pub fn label(self) -> &'static str {
        match self {
            TargetId::Diffuse => "diffuse-target",
            TargetId::GodRays1 => "god-rays-target-1",
            TargetId::GodRays2 => "god-rays-target-2",
        }
    }
}

/// God rays targets are the viewport size shifted right by this many bits.
pub const GOD_RAYS_REDUCTION: u32 = 1;

/// Target dimensions derived from a viewport size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetSizes {
    pub width: u32,
    pub height: u32,
    pub god_rays_width: u32,
    pub god_rays_height: u32,
}

impl TargetSizes {
    /// Sizes for a `width × height` viewport. Zero dimensions become 1.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            god_rays_width: (width >> GOD_RAYS_REDUCTION).max(1),
            god_rays_height: (height >> GOD_RAYS_REDUCTION).max(1),
        }
    }

    pub fn size_of(&self, target: TargetId) -> (u32, u32) {
        match target {
            TargetId::Diffuse => (self.width, self.height),
            TargetId::GodRays1 | TargetId::GodRays2 => (self.god_rays_width, self.god_rays_height),
        }
    }

    /// Blur tap spacing in UV units: `radius_px` texels of the god rays targets.
    pub fn blur_steps(&self, radius_px: f32) -> Vec2 {
        Vec2::new(
            radius_px / self.god_rays_width as f32,
            radius_px / self.god_rays_height as f32,
        )
    }
}

/// A sampled color target.
pub struct Target {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Target {
    fn new(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        (width, height): (u32, u32),
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Every off-screen target plus the bind groups that sample them.
pub struct RenderTargets {
    sizes: TargetSizes,
    format: wgpu::TextureFormat,
    targets: [Target; 3],
    /// Depth for full-resolution scene passes (surface and diffuse).
    pub scene_depth: DepthBuffer,
    /// Depth for the half-resolution occlusion pass.
    pub occlusion_depth: DepthBuffer,
    single_bind_groups: [wgpu::BindGroup; 3],
    combine_bind_group: wgpu::BindGroup,
}

/// Layouts and sampler needed to build target bind groups.
pub struct TargetBindings<'a> {
    /// `texture + sampler`.
    pub single_layout: &'a wgpu::BindGroupLayout,
    /// `texture + texture + sampler`.
    pub pair_layout: &'a wgpu::BindGroupLayout,
    pub sampler: &'a wgpu::Sampler,
}

impl RenderTargets {
    pub fn new(
        device: &wgpu::Device,
        bindings: &TargetBindings<'_>,
        format: wgpu::TextureFormat,
        sizes: TargetSizes,
    ) -> Self {
        let targets =
            TargetId::ALL.map(|id| Target::new(device, id.label(), format, sizes.size_of(id)));
        let single_bind_groups = TargetId::ALL.map(|id| {
            single_bind_group(device, bindings, &targets[id as usize].view, id.label())
        });
        let combine_bind_group = pair_bind_group(
            device,
            bindings,
            &targets[TargetId::Diffuse as usize].view,
            &targets[TargetId::GodRays2 as usize].view,
        );

        log::debug!(
            "Created render targets {}x{} (god rays {}x{})",
            sizes.width,
            sizes.height,
            sizes.god_rays_width,
            sizes.god_rays_height
        );

        Self {
            sizes,
            format,
            targets,
            scene_depth: DepthBuffer::new(device, "scene-depth", sizes.width, sizes.height),
            occlusion_depth: DepthBuffer::new(
                device,
                "occlusion-depth",
                sizes.god_rays_width,
                sizes.god_rays_height,
            ),
            single_bind_groups,
            combine_bind_group,
        }
    }

    /// Swap in a freshly built set for a new viewport size.
    ///
    /// Returns `false` without touching the GPU when the size is unchanged.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        bindings: &TargetBindings<'_>,
        width: u32,
        height: u32,
    ) -> bool {
        let sizes = TargetSizes::new(width, height);
        if sizes == self.sizes {
            return false;
        }
        let replacement = Self::new(device, bindings, self.format, sizes);
        drop(std::mem::replace(self, replacement));
        true
    }

    pub fn sizes(&self) -> TargetSizes {
        self.sizes
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn view(&self, target: TargetId) -> &wgpu::TextureView {
        &self.targets[target as usize].view
    }

    pub fn texture(&self, target: TargetId) -> &wgpu::Texture {
        &self.targets[target as usize].texture
    }

    /// Depth attachment matching `target`'s resolution.
    pub fn depth_for(&self, target: Option<TargetId>) -> &DepthBuffer {
        match target {
            Some(TargetId::GodRays1 | TargetId::GodRays2) => &self.occlusion_depth,
            Some(TargetId::Diffuse) | None => &self.scene_depth,
        }
    }

    /// Bind group sampling a single target.
    pub fn single_bind_group(&self, target: TargetId) -> &wgpu::BindGroup {
        &self.single_bind_groups[target as usize]
    }

    /// Cached bind group sampling `(first, second)`; only the diffuse/streak
    /// combination is cached.
    pub fn cached_pair_bind_group(
        &self,
        first: TargetId,
        second: TargetId,
    ) -> Option<&wgpu::BindGroup> {
        ((first, second) == (TargetId::Diffuse, TargetId::GodRays2))
            .then_some(&self.combine_bind_group)
    }

    /// Build a bind group sampling `(first, second)`.
    pub fn build_pair_bind_group(
        &self,
        device: &wgpu::Device,
        bindings: &TargetBindings<'_>,
        first: TargetId,
        second: TargetId,
    ) -> wgpu::BindGroup {
        pair_bind_group(device, bindings, self.view(first), self.view(second))
    }
}

fn single_bind_group(
    device: &wgpu::Device,
    bindings: &TargetBindings<'_>,
    view: &wgpu::TextureView,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: bindings.single_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(bindings.sampler),
            },
        ],
    })
}

fn pair_bind_group(
    device: &wgpu::Device,
    bindings: &TargetBindings<'_>,
    first: &wgpu::TextureView,
    second: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("combine-bg"),
        layout: bindings.pair_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(first),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(second),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(bindings.sampler),
            },
        ],
    })
}
