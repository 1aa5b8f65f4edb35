//! Frame plans: the ordered list of passes a frame will execute.
//!
//! Planning is pure data so the pass sequence can be inspected and tested
//! without a GPU; [`Renderer`](crate::renderer::Renderer) replays a plan into
//! a command encoder. Passes run in plan order on a single queue, so a pass
//! always sees the finished output of the passes before it.

use std::ops::Range;

use crate::programs::ProgramId;
use crate::targets::TargetId;

/// Where a pass writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassTarget {
    /// The presented frame.
    Surface,
    Offscreen(TargetId),
}

impl PassTarget {
    pub fn offscreen(self) -> Option<TargetId> {
        match self {
            PassTarget::Surface => None,
            PassTarget::Offscreen(id) => Some(id),
        }
    }
}

/// What happens to the color attachment when a pass begins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LoadAction {
    Clear(wgpu::Color),
    Load,
}

impl LoadAction {
    pub fn to_load_op(self) -> wgpu::LoadOp<wgpu::Color> {
        match self {
            LoadAction::Clear(color) => wgpu::LoadOp::Clear(color),
            LoadAction::Load => wgpu::LoadOp::Load,
        }
    }
}

/// Geometry bound for one draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Geometry {
    /// A vertex range of the shared cube buffer.
    Cubes(Range<u32>),
    LightDisk,
    /// Three generated vertices covering the target.
    FullscreenTriangle,
}

/// One draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub program: ProgramId,
    pub geometry: Geometry,
    /// Targets sampled by the program, in binding order.
    pub inputs: [Option<TargetId>; 2],
}

impl DrawItem {
    pub fn new(program: ProgramId, geometry: Geometry) -> Self {
        Self {
            program,
            geometry,
            inputs: [None, None],
        }
    }

    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = Option<TargetId>>) -> Self {
        for (slot, input) in self.inputs.iter_mut().zip(inputs) {
            *slot = input;
        }
        self
    }

    pub fn reads(&self, target: TargetId) -> bool {
        self.inputs.contains(&Some(target))
    }
}

/// One render pass.
#[derive(Clone, Debug, PartialEq)]
pub struct PassPlan {
    pub label: &'static str,
    pub target: PassTarget,
    pub load: LoadAction,
    /// Attach (and clear) a depth buffer. Only geometry passes need one.
    pub depth: bool,
    pub draws: Vec<DrawItem>,
}

impl PassPlan {
    /// A pass over scene geometry, depth tested.
    pub fn scene(label: &'static str, target: PassTarget, load: LoadAction) -> Self {
        Self {
            label,
            target,
            load,
            depth: true,
            draws: Vec::new(),
        }
    }

    /// A fullscreen post-process pass drawing `program` once.
    pub fn fullscreen(
        label: &'static str,
        target: PassTarget,
        program: ProgramId,
        inputs: impl IntoIterator<Item = Option<TargetId>>,
    ) -> Self {
        Self {
            label,
            target,
            load: LoadAction::Load,
            depth: false,
            draws: vec![DrawItem::new(program, Geometry::FullscreenTriangle).with_inputs(inputs)],
        }
    }

    pub fn draw(mut self, item: DrawItem) -> Self {
        self.draws.push(item);
        self
    }

    /// Whether this pass draws cube geometry.
    pub fn is_scene_pass(&self) -> bool {
        self.draws
            .iter()
            .any(|d| matches!(d.geometry, Geometry::Cubes(_)))
    }

    /// Whether any draw samples the target this pass writes.
    pub fn reads_own_target(&self) -> bool {
        match self.target.offscreen() {
            Some(target) => self.draws.iter().any(|d| d.reads(target)),
            None => false,
        }
    }
}

/// Every pass of one frame, in execution order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FramePlan {
    pub passes: Vec<PassPlan>,
}

impl FramePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all passes but keep the allocation for the next frame.
    pub fn clear(&mut self) {
        self.passes.clear();
    }

    pub fn push(&mut self, pass: PassPlan) {
        self.passes.push(pass);
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn scene_pass_count(&self) -> usize {
        self.passes.iter().filter(|p| p.is_scene_pass()).count()
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passes.iter().map(|p| p.label)
    }
}
