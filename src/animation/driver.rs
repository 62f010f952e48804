//! 动画驱动
//!
//! 每帧为所有已注册的蒙皮网格推进播放时间、求值姿态，并把蒙皮矩阵交给渲染后端。
//! 驱动器只保存句柄，网格本身由场景持有。

use glam::Vec3;

use crate::mesh::SkinnedMesh;
use crate::render::{MeshHandle, RenderBackend};

use super::pose::calculate_bone_transform;

/// 驱动器需要的场景能力
pub trait MeshStore {
    /// 句柄对应的蒙皮网格（句柄失效或不是蒙皮网格时为 None）
    fn skinned_mesh_mut(&mut self, handle: MeshHandle) -> Option<&mut SkinnedMesh>;

    /// 写入根运动提取出的实体位置
    fn set_entity_position(&mut self, handle: MeshHandle, position: Vec3);
}

/// 动画驱动器
#[derive(Debug, Default)]
pub struct AnimationDriver {
    skinned_meshes: Vec<MeshHandle>,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册蒙皮网格
    ///
    /// 片段为空（加载失败）或句柄已注册时返回 false。
    pub fn register(&mut self, handle: MeshHandle, mesh: &SkinnedMesh) -> bool {
        if !mesh.is_animated() {
            log::warn!(
                "[Animation] 网格 {} 没有可用的动画片段（{}），不注册",
                handle,
                mesh.skinning.anim_path.display()
            );
            return false;
        }
        if self.is_registered(handle) {
            log::warn!("[Animation] 网格 {} 已注册", handle);
            return false;
        }

        self.skinned_meshes.push(handle);
        true
    }

    /// 注销蒙皮网格
    pub fn unregister(&mut self, handle: MeshHandle) -> bool {
        match self.skinned_meshes.iter().position(|&h| h == handle) {
            Some(index) => {
                self.skinned_meshes.swap_remove(index);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn registered_count(&self) -> usize {
        self.skinned_meshes.len()
    }

    #[inline]
    pub fn is_registered(&self, handle: MeshHandle) -> bool {
        self.skinned_meshes.contains(&handle)
    }

    pub fn handles(&self) -> &[MeshHandle] {
        &self.skinned_meshes
    }

    /// 推进一帧，返回求值的网格数
    ///
    /// 后端未就绪时整帧跳过。网格已被销毁的句柄在本帧注销。
    pub fn update_animations<S, B>(&mut self, delta_seconds: f32, store: &mut S, backend: &mut B) -> usize
    where
        S: MeshStore + ?Sized,
        B: RenderBackend + ?Sized,
    {
        if !backend.is_ready() {
            return 0;
        }

        let mut evaluated = 0;
        let mut stale = Vec::new();
        for &handle in &self.skinned_meshes {
            let root_motion = {
                let Some(mesh) = store.skinned_mesh_mut(handle) else {
                    stale.push(handle);
                    continue;
                };

                let skinning = &mut mesh.skinning;
                let time = skinning.clip.advance(delta_seconds);
                let pose = calculate_bone_transform(
                    &mut skinning.clip,
                    time,
                    &skinning.root_motion,
                    &mut skinning.matrices,
                );
                backend.set_skinning_buffer(handle, &skinning.matrices);
                pose.root_motion
            };

            if let Some(position) = root_motion {
                store.set_entity_position(handle, position);
            }
            evaluated += 1;
        }

        if !stale.is_empty() {
            log::warn!("[Animation] 注销 {} 个已销毁的网格: {:?}", stale.len(), stale);
            self.skinned_meshes.retain(|handle| !stale.contains(handle));
        }

        evaluated
    }
}
