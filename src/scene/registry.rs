//! 可绘制对象注册表
//!
//! 以句柄保存场景中的可绘制对象及其实体位置，供动画驱动器按句柄访问。

use std::collections::HashMap;

use glam::Vec3;

use crate::animation::MeshStore;
use crate::mesh::{Drawable, SkinnedMesh};
use crate::render::MeshHandle;

/// 可绘制对象注册表
#[derive(Debug, Default)]
pub struct DrawableRegistry {
    drawables: HashMap<MeshHandle, Drawable>,
    positions: HashMap<MeshHandle, Vec3>,
    next_handle: u32,
}

impl DrawableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预留一个新句柄
    pub fn reserve(&mut self) -> MeshHandle {
        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// 放入对象，返回该句柄上原有的对象
    pub fn insert(&mut self, handle: MeshHandle, drawable: Drawable) -> Option<Drawable> {
        self.positions.entry(handle).or_insert(Vec3::ZERO);
        self.drawables.insert(handle, drawable)
    }

    /// 预留句柄并放入对象
    pub fn add(&mut self, drawable: Drawable) -> MeshHandle {
        let handle = self.reserve();
        self.insert(handle, drawable);
        handle
    }

    /// 移除对象（调用方负责先从驱动器注销）
    pub fn remove(&mut self, handle: MeshHandle) -> Option<Drawable> {
        self.positions.remove(&handle);
        self.drawables.remove(&handle)
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&Drawable> {
        self.drawables.get(&handle)
    }

    pub fn get_mut(&mut self, handle: MeshHandle) -> Option<&mut Drawable> {
        self.drawables.get_mut(&handle)
    }

    pub fn entity_position(&self, handle: MeshHandle) -> Option<Vec3> {
        self.positions.get(&handle).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshHandle, &Drawable)> {
        self.drawables.iter().map(|(&handle, drawable)| (handle, drawable))
    }
}

impl MeshStore for DrawableRegistry {
    fn skinned_mesh_mut(&mut self, handle: MeshHandle) -> Option<&mut SkinnedMesh> {
        self.drawables.get_mut(&handle).and_then(Drawable::as_skinned_mut)
    }

    fn set_entity_position(&mut self, handle: MeshHandle, position: Vec3) {
        if self.drawables.contains_key(&handle) {
            self.positions.insert(handle, position);
        }
    }
}
