//! 蒙皮网格加载器
//!
//! 两个阶段：
//! 1. 模型：遍历节点树收集网格，转换顶点与索引，把骨骼权重写入顶点，建立骨骼索引表
//! 2. 动画：取动画文件中的第一个片段，以模型的骨骼索引表为基础构建 AnimationClip

use std::path::Path;

use crate::animation::AnimationClip;
use crate::config::AnimationConfig;
use crate::scene::{ImportedMesh, ImportedNode, ImportedScene, MatrixLayout, SceneImporter};
use crate::skeleton::BoneIndexMap;
use crate::{AnimError, Result};

use super::{Mesh, SkinnedMesh, Skinning, SkinningMatrices, SubMesh, Vertex, MAX_SKINNING_MATRICES};

/// 蒙皮网格加载器
pub struct SkinnedMeshLoader<'a, I: SceneImporter + ?Sized> {
    importer: &'a I,
    config: &'a AnimationConfig,
}

impl<'a, I: SceneImporter + ?Sized> SkinnedMeshLoader<'a, I> {
    pub fn new(importer: &'a I, config: &'a AnimationConfig) -> Self {
        Self { importer, config }
    }

    /// 加载模型与动画，任一阶段失败即返回错误
    pub fn try_load(&self, model_path: impl AsRef<Path>, anim_path: impl AsRef<Path>) -> Result<SkinnedMesh> {
        let model_path = model_path.as_ref();
        let anim_path = anim_path.as_ref();

        let (mesh, bone_map) = self.load_model(model_path)?;
        let clip = self.load_clip(anim_path, &bone_map)?;

        Ok(SkinnedMesh {
            mesh,
            skinning: self.skinning(clip, model_path, anim_path),
        })
    }

    /// 加载模型与动画，不会失败
    ///
    /// 模型失败时得到空网格；动画失败时保留几何，片段为空（不会被驱动器注册）。
    pub fn load(&self, model_path: impl AsRef<Path>, anim_path: impl AsRef<Path>) -> SkinnedMesh {
        let model_path = model_path.as_ref();
        let anim_path = anim_path.as_ref();

        let (mesh, bone_map) = match self.load_model(model_path) {
            Ok(loaded) => loaded,
            Err(e) => {
                log::error!("[Import] 模型 '{}' 加载失败: {}", model_path.display(), e);
                return SkinnedMesh {
                    mesh: Mesh::default(),
                    skinning: self.skinning(AnimationClip::default(), model_path, anim_path),
                };
            }
        };

        let clip = match self.load_clip(anim_path, &bone_map) {
            Ok(clip) => clip,
            Err(e) => {
                log::error!("[Import] 动画 '{}' 加载失败: {}", anim_path.display(), e);
                AnimationClip::default()
            }
        };

        SkinnedMesh {
            mesh,
            skinning: self.skinning(clip, model_path, anim_path),
        }
    }

    fn skinning(&self, clip: AnimationClip, model_path: &Path, anim_path: &Path) -> Skinning {
        Skinning {
            clip,
            matrices: SkinningMatrices::new(),
            root_motion: self.config.root_motion.clone(),
            model_path: model_path.to_path_buf(),
            anim_path: anim_path.to_path_buf(),
        }
    }

    // ========================================
    // 模型阶段
    // ========================================

    /// 导入模型，返回几何与网格骨骼索引表
    pub fn load_model(&self, path: &Path) -> Result<(Mesh, BoneIndexMap)> {
        let scene = self.importer.import(path)?;
        let root = scene
            .root
            .as_ref()
            .ok_or_else(|| AnimError::NoRootNode(path.to_path_buf()))?;

        let mut bone_map = BoneIndexMap::new();
        let mut mesh = Mesh::default();
        self.process_node(root, &scene, &mut mesh, &mut bone_map);

        if bone_map.len() > MAX_SKINNING_MATRICES {
            return Err(AnimError::TooManyBones {
                count: bone_map.len(),
                capacity: MAX_SKINNING_MATRICES,
            });
        }

        if self.config.debug_log {
            log::info!(
                "[Import] 模型 '{}': {} 个子网格, {} 个顶点, {} 根骨骼",
                path.display(),
                mesh.submeshes.len(),
                mesh.vertex_count(),
                bone_map.len()
            );
        }

        Ok((mesh, bone_map))
    }

    /// 先处理节点自身的网格，再按顺序处理子节点
    fn process_node(&self, root: &ImportedNode, scene: &ImportedScene, mesh: &mut Mesh, bone_map: &mut BoneIndexMap) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            for &mesh_index in &node.meshes {
                match scene.meshes.get(mesh_index) {
                    Some(imported) => {
                        let submesh = self.process_mesh(imported, scene.matrix_layout, bone_map);
                        mesh.submeshes.push(submesh);
                    }
                    None => log::warn!(
                        "[Import] 节点 '{}' 引用了不存在的网格 {}",
                        node.name,
                        mesh_index
                    ),
                }
            }
            stack.extend(node.children.iter().rev());
        }
    }

    fn process_mesh(&self, imported: &ImportedMesh, layout: MatrixLayout, bone_map: &mut BoneIndexMap) -> SubMesh {
        let mut vertices: Vec<Vertex> = imported
            .positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let normal = imported
                    .normals
                    .as_ref()
                    .and_then(|normals| normals.get(i).copied())
                    .unwrap_or_default();
                let tex_coords = imported
                    .tex_coords
                    .as_ref()
                    .and_then(|uvs| uvs.get(i).copied())
                    .unwrap_or_default();
                Vertex::new(position, normal, tex_coords)
            })
            .collect();

        Self::extract_bone_weights(&mut vertices, imported, layout, bone_map);

        SubMesh::new(imported.name.clone(), vertices, imported.indices.clone())
    }

    /// 把每根骨骼的权重写入顶点，同时登记骨骼（已有的不覆盖 offset）
    fn extract_bone_weights(
        vertices: &mut [Vertex],
        imported: &ImportedMesh,
        layout: MatrixLayout,
        bone_map: &mut BoneIndexMap,
    ) {
        let mut dropped = 0usize;

        for bone in &imported.bones {
            let bone_id = bone_map.get_or_insert(&bone.name, layout.to_mat4(&bone.offset));

            for weight in &bone.weights {
                match vertices.get_mut(weight.vertex_id as usize) {
                    Some(vertex) => {
                        if !vertex.set_bone_data(bone_id, weight.weight) {
                            dropped += 1;
                        }
                    }
                    None => log::warn!(
                        "[Import] 骨骼 '{}' 的权重指向不存在的顶点 {}（网格 '{}' 共 {} 个顶点）",
                        bone.name,
                        weight.vertex_id,
                        imported.name,
                        vertices.len()
                    ),
                }
            }
        }

        if dropped > 0 {
            log::warn!("[Import] 网格 '{}' 有 {} 个骨骼影响超出每顶点上限被丢弃", imported.name, dropped);
        }
    }

    // ========================================
    // 动画阶段
    // ========================================

    /// 导入动画文件中的第一个片段
    pub fn load_clip(&self, path: &Path, mesh_bones: &BoneIndexMap) -> Result<AnimationClip> {
        let scene = self.importer.import(path)?;
        let root = scene
            .root
            .as_ref()
            .ok_or_else(|| AnimError::NoRootNode(path.to_path_buf()))?;
        let animation = scene
            .animations
            .first()
            .ok_or_else(|| AnimError::NoAnimation(path.to_path_buf()))?;

        let clip = AnimationClip::from_imported(animation, root, scene.matrix_layout, mesh_bones)?;

        if self.config.debug_log {
            log::info!(
                "[Import] 动画 '{}': 片段 '{}', 时长 {} tick, {} tick/s, {} 条轨道, {} 根骨骼",
                path.display(),
                clip.name,
                clip.duration,
                clip.ticks_per_second,
                clip.track_count(),
                clip.bone_info_map.len()
            );
        }

        Ok(clip)
    }
}
