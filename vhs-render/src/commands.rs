//! Recorded frame: an ordered list of target acquisitions, fullscreen blits
//! and releases, replayed by a GPU backend.

use vhs_gpu_shared::uniforms::{CompositeParams, DownsampleParams, NoiseGenParams, SmearParams};

use crate::pool::{TargetDesc, TargetHandle, TargetSlot};
use crate::resources::{AssetKind, ShaderPass};

/// A texture a pass reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureRef {
    /// The host's input frame.
    Source,
    /// The host's output frame.
    Destination,
    Transient(TargetHandle),
    Asset(AssetKind),
    /// 1x1 black stand-in for a disabled input.
    Placeholder,
}

/// Uniform block for one blit, tagged by kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassParams {
    NoiseGen(NoiseGenParams),
    Downsample(DownsampleParams),
    Smear(SmearParams),
    Composite(CompositeParams),
}

impl PassParams {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PassParams::NoiseGen(p) => bytemuck::bytes_of(p),
            PassParams::Downsample(p) => bytemuck::bytes_of(p),
            PassParams::Smear(p) => bytemuck::bytes_of(p),
            PassParams::Composite(p) => bytemuck::bytes_of(p),
        }
    }
}

/// One fullscreen pass. `inputs` follow the kernel's binding order
/// (binding 1 upwards, after the uniform block).
#[derive(Debug, Clone, PartialEq)]
pub struct Blit {
    pub pass: ShaderPass,
    pub target: TextureRef,
    pub inputs: Vec<TextureRef>,
    pub params: PassParams,
}

impl Blit {
    pub fn reads(&self, texture: TextureRef) -> bool {
        self.inputs.contains(&texture)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Acquire { handle: TargetHandle, desc: TargetDesc },
    Blit(Blit),
    Release { handle: TargetHandle },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandStream {
    commands: Vec<Command>,
}

impl CommandStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn blits(&self) -> impl Iterator<Item = &Blit> {
        self.commands.iter().filter_map(|c| match c {
            Command::Blit(b) => Some(b),
            _ => None,
        })
    }

    pub fn blits_of(&self, pass: ShaderPass) -> impl Iterator<Item = &Blit> {
        self.blits().filter(move |b| b.pass == pass)
    }

    /// Every acquisition of `slot` in this stream.
    pub fn acquisitions(&self, slot: TargetSlot) -> impl Iterator<Item = (&TargetHandle, &TargetDesc)> {
        self.commands.iter().filter_map(move |c| match c {
            Command::Acquire { handle, desc } if handle.slot == slot => Some((handle, desc)),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
