//! Transient render target pool keyed by camera and logical slot.
//!
//! Targets are reused while the requested descriptor matches; a changed
//! descriptor frees the old target and allocates a new one. Released targets
//! stay valid until `end_frame`, so a recorded frame can still be executed.
//! Each camera owns its own set of slots, so cameras at different sizes
//! recorded in the same host frame never reallocate each other's targets.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::temporal::CameraId;

/// Logical name of a transient buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetSlot {
    Noise,
    NoiseStreak,
    Smear,
    Smear2,
    Pyramid(u8),
}

impl fmt::Display for TargetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSlot::Noise => write!(f, "VHS Noise"),
            TargetSlot::NoiseStreak => write!(f, "VHS Noise Streak"),
            TargetSlot::Smear => write!(f, "VHS Smear"),
            TargetSlot::Smear2 => write!(f, "VHS Smear 2"),
            TargetSlot::Pyramid(i) => write!(f, "VHS Pyramid {i}"),
        }
    }
}

/// Size and format of a pooled target. Filtering is a sampler property and
/// is not part of the reuse key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetDesc {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
}

impl TargetDesc {
    pub fn new(width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        Self { width, height, format }
    }
}

/// Reference to a pooled target. Invalidated when its slot is reallocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetHandle {
    pub camera: CameraId,
    pub slot: TargetSlot,
    generation: u32,
}

/// Creates and destroys the actual GPU images behind the pool.
pub trait TargetAllocator {
    type Target;

    fn allocate(&mut self, label: &str, desc: &TargetDesc) -> Self::Target;

    fn free(&mut self, target: Self::Target);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Free every released target at the end of the frame.
    ReleaseEachFrame,
    /// Keep released targets for reuse until idle for more than `max_idle_frames`.
    KeepAcrossFrames { max_idle_frames: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub allocations: u64,
    pub reuses: u64,
    pub frees: u64,
}

struct PoolEntry<T> {
    desc: TargetDesc,
    target: T,
    generation: u32,
    in_use: bool,
    idle_frames: u32,
}

pub struct ResourcePool<A: TargetAllocator> {
    allocator: A,
    entries: HashMap<(CameraId, TargetSlot), PoolEntry<A::Target>>,
    retention: RetentionPolicy,
    next_generation: u32,
    stats: PoolStats,
}

impl<A: TargetAllocator> ResourcePool<A> {
    pub fn new(allocator: A, retention: RetentionPolicy) -> Self {
        Self {
            allocator,
            entries: HashMap::new(),
            retention,
            next_generation: 0,
            stats: PoolStats::default(),
        }
    }

    /// Get a target for `camera`'s `slot` matching `desc`, reusing the held
    /// one when possible.
    pub fn acquire(&mut self, camera: CameraId, slot: TargetSlot, desc: TargetDesc) -> TargetHandle {
        let key = (camera, slot);
        if let Some(entry) = self.entries.get_mut(&key) {
            if entry.desc == desc {
                if entry.in_use {
                    log::warn!("{slot} of camera {} acquired twice in one frame", camera.0);
                }
                entry.in_use = true;
                entry.idle_frames = 0;
                self.stats.reuses += 1;
                return TargetHandle {
                    camera,
                    slot,
                    generation: entry.generation,
                };
            }
        }

        if let Some(old) = self.entries.remove(&key) {
            log::trace!(
                "{slot} of camera {} resized {}x{} -> {}x{}",
                camera.0,
                old.desc.width,
                old.desc.height,
                desc.width,
                desc.height
            );
            self.allocator.free(old.target);
            self.stats.frees += 1;
        }

        let label = slot.to_string();
        log::trace!("Allocating {label} {}x{} {:?}", desc.width, desc.height, desc.format);
        let target = self.allocator.allocate(&label, &desc);
        self.stats.allocations += 1;

        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        self.entries.insert(
            key,
            PoolEntry {
                desc,
                target,
                generation,
                in_use: true,
                idle_frames: 0,
            },
        );
        TargetHandle {
            camera,
            slot,
            generation,
        }
    }

    /// Return a target to the pool. Stale or double releases are ignored.
    pub fn release(&mut self, handle: TargetHandle) -> bool {
        match self.entries.get_mut(&(handle.camera, handle.slot)) {
            Some(entry) if entry.generation == handle.generation && entry.in_use => {
                entry.in_use = false;
                true
            }
            _ => {
                log::warn!(
                    "Ignoring release of stale or free {} of camera {}",
                    handle.slot,
                    handle.camera.0
                );
                false
            }
        }
    }

    /// Target behind `handle`, valid until `end_frame` even after release.
    pub fn get(&self, handle: TargetHandle) -> Option<&A::Target> {
        self.entry(handle).map(|e| &e.target)
    }

    pub fn desc(&self, handle: TargetHandle) -> Option<TargetDesc> {
        self.entry(handle).map(|e| e.desc)
    }

    fn entry(&self, handle: TargetHandle) -> Option<&PoolEntry<A::Target>> {
        self.entries
            .get(&(handle.camera, handle.slot))
            .filter(|e| e.generation == handle.generation)
    }

    /// Acquired but not yet released.
    pub fn outstanding(&self) -> usize {
        self.entries.values().filter(|e| e.in_use).count()
    }

    /// Targets currently held, in use or cached.
    pub fn held(&self) -> usize {
        self.entries.len()
    }

    /// Apply the retention policy to released targets.
    pub fn end_frame(&mut self) {
        let retention = self.retention;
        let expired: Vec<(CameraId, TargetSlot)> = self
            .entries
            .iter_mut()
            .filter(|(_, e)| !e.in_use)
            .filter_map(|(key, e)| match retention {
                RetentionPolicy::ReleaseEachFrame => Some(*key),
                RetentionPolicy::KeepAcrossFrames { max_idle_frames } => {
                    e.idle_frames += 1;
                    (e.idle_frames > max_idle_frames).then_some(*key)
                }
            })
            .collect();

        for key in expired {
            if let Some(entry) = self.entries.remove(&key) {
                self.allocator.free(entry.target);
                self.stats.frees += 1;
            }
        }
    }

    /// Free every target held for `camera`. Returns how many were freed.
    pub fn release_camera(&mut self, camera: CameraId) -> usize {
        let keys: Vec<_> = self.entries.keys().filter(|(c, _)| *c == camera).copied().collect();
        for key in &keys {
            if let Some(entry) = self.entries.remove(key) {
                if entry.in_use {
                    log::warn!("Freeing {} of camera {} while still in use", key.1, camera.0);
                }
                self.allocator.free(entry.target);
                self.stats.frees += 1;
            }
        }
        keys.len()
    }

    /// Targets held for `camera`, in use or cached.
    pub fn held_by(&self, camera: CameraId) -> usize {
        self.entries.keys().filter(|(c, _)| *c == camera).count()
    }

    /// Free everything, including targets still marked in use.
    pub fn clear(&mut self) {
        for (_, entry) in self.entries.drain() {
            self.allocator.free(entry.target);
            self.stats.frees += 1;
        }
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }
}

impl<A: TargetAllocator> Drop for ResourcePool<A> {
    fn drop(&mut self) {
        self.clear();
    }
}
