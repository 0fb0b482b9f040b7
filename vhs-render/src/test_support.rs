//! Fakes for testing the recording core without a GPU.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::pool::{TargetAllocator, TargetDesc};
use crate::resources::{AssetInfo, AssetKind, ResourceResolver, ShaderId};

/// Shared live-target count, readable after the allocator moved into a pool.
#[derive(Debug, Clone, Default)]
pub struct LiveCounter(Rc<Cell<i64>>);

impl LiveCounter {
    pub fn live(&self) -> i64 {
        self.0.get()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeTarget {
    pub id: u64,
    pub label: String,
    pub desc: TargetDesc,
}

#[derive(Debug, Default)]
pub struct CountingAllocator {
    next_id: u64,
    live: LiveCounter,
}

impl CountingAllocator {
    pub fn live(&self) -> i64 {
        self.live.live()
    }

    pub fn counter(&self) -> LiveCounter {
        self.live.clone()
    }
}

impl TargetAllocator for CountingAllocator {
    type Target = FakeTarget;

    fn allocate(&mut self, label: &str, desc: &TargetDesc) -> FakeTarget {
        assert!(desc.width > 0 && desc.height > 0, "{label} allocated with zero size");
        self.next_id += 1;
        self.live.0.set(self.live.0.get() + 1);
        FakeTarget {
            id: self.next_id,
            label: label.to_string(),
            desc: *desc,
        }
    }

    fn free(&mut self, _target: FakeTarget) {
        self.live.0.set(self.live.0.get() - 1);
    }
}

#[derive(Debug, Clone)]
pub struct StaticResolver {
    missing_shaders: HashSet<ShaderId>,
    missing_assets: HashSet<AssetKind>,
}

impl StaticResolver {
    /// Every shader present, every asset 256x256.
    pub fn complete() -> Self {
        Self {
            missing_shaders: HashSet::new(),
            missing_assets: HashSet::new(),
        }
    }

    pub fn without_shader(mut self, shader: ShaderId) -> Self {
        self.missing_shaders.insert(shader);
        self
    }

    pub fn without_asset(mut self, asset: AssetKind) -> Self {
        self.missing_assets.insert(asset);
        self
    }
}

impl ResourceResolver for StaticResolver {
    fn has_shader(&self, shader: ShaderId) -> bool {
        !self.missing_shaders.contains(&shader)
    }

    fn asset_info(&self, asset: AssetKind) -> Option<AssetInfo> {
        (!self.missing_assets.contains(&asset)).then_some(AssetInfo {
            width: 256,
            height: 256,
        })
    }
}
