//! Render pass setup and the per-frame command encoding lifecycle.

use crate::depth::DepthBuffer;
use crate::frame::LoadAction;

/// Attachments for one render pass.
pub struct PassAttachments<'a> {
    pub label: &'static str,
    pub color: &'a wgpu::TextureView,
    pub load: LoadAction,
    /// Cleared to the reverse-Z far value when present.
    pub depth: Option<&'a DepthBuffer>,
}

impl<'a> PassAttachments<'a> {
    pub fn begin<'e>(&self, encoder: &'e mut wgpu::CommandEncoder) -> wgpu::RenderPass<'e> {
        let color_attachment = wgpu::RenderPassColorAttachment {
            view: self.color,
            resolve_target: None,
            ops: wgpu::Operations {
                load: self.load.to_load_op(),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        };

        let depth_stencil_attachment =
            self.depth
                .map(|depth| wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.label),
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Owns one frame's command encoder and surface texture; submits and
/// presents at most once.
pub struct FrameEncoder<'q> {
    encoder: Option<wgpu::CommandEncoder>,
    queue: &'q wgpu::Queue,
    surface_texture: Option<wgpu::SurfaceTexture>,
    surface_view: wgpu::TextureView,
}

impl<'q> FrameEncoder<'q> {
    pub fn new(
        device: &wgpu::Device,
        queue: &'q wgpu::Queue,
        surface_texture: wgpu::SurfaceTexture,
    ) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            encoder: Some(encoder),
            queue,
            surface_texture: Some(surface_texture),
            surface_view,
        }
    }

    /// Record into `view` instead of a surface texture. Nothing is presented.
    pub fn offscreen(
        device: &wgpu::Device,
        queue: &'q wgpu::Queue,
        view: wgpu::TextureView,
    ) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("offscreen-frame-encoder"),
        });
        Self {
            encoder: Some(encoder),
            queue,
            surface_texture: None,
            surface_view: view,
        }
    }

    pub fn surface_view(&self) -> &wgpu::TextureView {
        &self.surface_view
    }

    /// The encoder and the surface view together, for recording passes.
    /// `None` once submitted.
    pub fn parts(&mut self) -> Option<(&mut wgpu::CommandEncoder, &wgpu::TextureView)> {
        let encoder = self.encoder.as_mut()?;
        Some((encoder, &self.surface_view))
    }

    /// Submit the command buffer and present the surface texture.
    pub fn submit(mut self) {
        self.finish();
    }

    /// Drop the recorded commands. Nothing is submitted or presented.
    pub fn discard(mut self) {
        self.encoder = None;
        self.surface_texture = None;
    }

    fn finish(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.queue.submit([encoder.finish()]);
            if let Some(surface_texture) = self.surface_texture.take() {
                surface_texture.present();
            }
        }
    }
}

impl Drop for FrameEncoder<'_> {
    fn drop(&mut self) {
        if self.encoder.is_some() {
            log::warn!("FrameEncoder dropped without explicit submit() - auto-submitting");
            self.finish();
        }
    }
}
