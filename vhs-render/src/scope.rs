//! Per-frame recording scope.

use crate::commands::{Blit, Command, CommandStream};
use crate::pool::{ResourcePool, TargetAllocator, TargetDesc, TargetHandle, TargetSlot};
use crate::temporal::CameraId;

/// Pairs the pool with one camera's command stream and releases every target
/// acquired through it when dropped, whichever way recording exits.
pub struct FrameScope<'a, A: TargetAllocator> {
    pool: &'a mut ResourcePool<A>,
    commands: &'a mut CommandStream,
    camera: CameraId,
    acquired: Vec<TargetHandle>,
}

impl<'a, A: TargetAllocator> FrameScope<'a, A> {
    pub fn new(pool: &'a mut ResourcePool<A>, commands: &'a mut CommandStream, camera: CameraId) -> Self {
        Self {
            pool,
            commands,
            camera,
            acquired: Vec::new(),
        }
    }

    pub fn acquire(&mut self, slot: TargetSlot, desc: TargetDesc) -> TargetHandle {
        let handle = self.pool.acquire(self.camera, slot, desc);
        self.commands.push(Command::Acquire { handle, desc });
        if !self.acquired.contains(&handle) {
            self.acquired.push(handle);
        }
        handle
    }

    pub fn blit(&mut self, blit: Blit) {
        self.commands.push(Command::Blit(blit));
    }

    pub fn desc(&self, handle: TargetHandle) -> Option<TargetDesc> {
        self.pool.desc(handle)
    }

    pub fn camera(&self) -> CameraId {
        self.camera
    }

    pub fn acquired(&self) -> &[TargetHandle] {
        &self.acquired
    }
}

impl<A: TargetAllocator> Drop for FrameScope<'_, A> {
    fn drop(&mut self) {
        // Reverse order: deepest pyramid levels and overlays go first.
        for handle in self.acquired.drain(..).rev() {
            self.pool.release(handle);
            self.commands.push(Command::Release { handle });
        }
    }
}
