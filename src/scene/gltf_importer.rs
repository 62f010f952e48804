//! glTF 场景导入器
//!
//! 把 glTF 文档转换为 ImportedScene：
//! - 默认场景的根节点挂在一个合成根节点下
//! - 每个三角形图元成为一个网格，蒙皮转换为按骨骼的顶点权重列表
//! - 动画通道按目标节点合并，时间换算为 tick

use std::collections::HashMap;
use std::path::Path;

use glam::{Mat4, Quat, Vec2, Vec3};
use gltf::animation::util::ReadOutputs;
use gltf::animation::Interpolation;
use gltf::mesh::Mode;

use crate::config::AnimationConfig;
use crate::Result;

use super::{
    ImportFlags, ImportedAnimation, ImportedBone, ImportedChannel, ImportedKey, ImportedMesh,
    ImportedNode, ImportedScene, MatrixLayout, SceneImporter, VertexWeight, IDENTITY_MATRIX,
};

/// 合成根节点的默认名称
const ROOT_NODE_NAME: &str = "RootNode";

/// glTF 导入器
#[derive(Clone, Debug)]
pub struct GltfImporter {
    /// 后处理标志
    pub flags: ImportFlags,
    /// 秒 -> tick 的换算速率
    pub ticks_per_second: f32,
}

impl Default for GltfImporter {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}

impl GltfImporter {
    pub fn new(flags: ImportFlags, ticks_per_second: f32) -> Self {
        Self { flags, ticks_per_second }
    }

    pub fn from_config(config: &AnimationConfig) -> Self {
        Self::new(config.import_flags, config.gltf_ticks_per_second)
    }

    /// 从内存数据导入（.glb 或内嵌缓冲的 .gltf）
    pub fn import_slice(&self, bytes: &[u8]) -> Result<ImportedScene> {
        let (document, buffers, _images) = gltf::import_slice(bytes)?;
        Ok(self.convert(&document, &buffers))
    }

    fn convert(&self, document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> ImportedScene {
        let mut meshes = Vec::new();

        let root = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .map(|scene| {
                let mut root = ImportedNode::new(scene.name().unwrap_or(ROOT_NODE_NAME));
                for node in scene.nodes() {
                    root.children.push(self.read_node(&node, buffers, &mut meshes));
                }
                root
            });

        let animations = document
            .animations()
            .map(|animation| self.read_animation(&animation, buffers))
            .collect();

        ImportedScene {
            matrix_layout: MatrixLayout::ColumnMajor,
            root,
            meshes,
            animations,
        }
    }

    // ========================================
    // 节点与网格
    // ========================================

    fn read_node(
        &self,
        node: &gltf::Node,
        buffers: &[gltf::buffer::Data],
        meshes: &mut Vec<ImportedMesh>,
    ) -> ImportedNode {
        let mut imported = ImportedNode::new(node_name(node));
        imported.transform = Mat4::from_cols_array_2d(&node.transform().matrix()).to_cols_array();

        if let Some(mesh) = node.mesh() {
            let skin = node.skin();
            for primitive in mesh.primitives() {
                if let Some(data) = self.read_primitive(&mesh, &primitive, skin.as_ref(), buffers) {
                    imported.meshes.push(meshes.len());
                    meshes.push(data);
                }
            }
        }

        for child in node.children() {
            imported.children.push(self.read_node(&child, buffers, meshes));
        }

        imported
    }

    fn read_primitive(
        &self,
        mesh: &gltf::Mesh,
        primitive: &gltf::Primitive,
        skin: Option<&gltf::Skin>,
        buffers: &[gltf::buffer::Data],
    ) -> Option<ImportedMesh> {
        let name = mesh
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

        if primitive.mode() != Mode::Triangles {
            log::warn!("[Import] 网格 '{}' 的图元不是三角形 ({:?})，跳过", name, primitive.mode());
            return None;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

        let Some(positions) = reader.read_positions() else {
            log::warn!("[Import] 网格 '{}' 缺少顶点位置，跳过", name);
            return None;
        };
        let positions: Vec<Vec3> = positions.map(Vec3::from).collect();

        let normals: Option<Vec<Vec3>> = reader.read_normals().map(|it| it.map(Vec3::from).collect());

        let flip_uvs = self.flags.contains(ImportFlags::FLIP_UVS);
        let tex_coords: Option<Vec<Vec2>> = reader.read_tex_coords(0).map(|it| {
            it.into_f32()
                .map(|[u, v]| if flip_uvs { Vec2::new(u, 1.0 - v) } else { Vec2::new(u, v) })
                .collect()
        });

        let indices: Vec<u32> = reader
            .read_indices()
            .map(|it| it.into_u32().collect())
            .unwrap_or_else(|| (0..positions.len() as u32).collect());

        let joints: Option<Vec<[u16; 4]>> = reader.read_joints(0).map(|it| it.into_u16().collect());
        let weights: Option<Vec<[f32; 4]>> = reader.read_weights(0).map(|it| it.into_f32().collect());

        let bones = match (skin, joints, weights) {
            (Some(skin), Some(joints), Some(weights)) => read_skin_bones(skin, &joints, &weights, buffers),
            _ => Vec::new(),
        };

        Some(ImportedMesh {
            name,
            positions,
            normals,
            tex_coords,
            indices,
            bones,
        })
    }

    // ========================================
    // 动画
    // ========================================

    fn read_animation(&self, animation: &gltf::Animation, buffers: &[gltf::buffer::Data]) -> ImportedAnimation {
        let name = animation
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("animation_{}", animation.index()));

        let mut channels: Vec<ImportedChannel> = Vec::new();
        let mut rest_poses: Vec<(Vec3, Quat)> = Vec::new();
        let mut lookup: HashMap<String, usize> = HashMap::new();
        let mut max_time = 0.0f32;

        for channel in animation.channels() {
            let target = channel.target().node();
            let node_name = node_name(&target);

            let index = *lookup.entry(node_name.clone()).or_insert_with(|| {
                let (translation, rotation, _) = target.transform().decomposed();
                rest_poses.push((Vec3::from(translation), Quat::from_array(rotation)));
                channels.push(ImportedChannel {
                    node_name: node_name.clone(),
                    ..Default::default()
                });
                channels.len() - 1
            });

            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
            let Some(inputs) = reader.read_inputs() else {
                log::warn!("[Import] 通道 '{}' 缺少时间输入，跳过", node_name);
                continue;
            };
            let times: Vec<f32> = inputs.map(|t| t * self.ticks_per_second).collect();
            if let Some(&last) = times.last() {
                max_time = max_time.max(last);
            }

            let interpolation = channel.sampler().interpolation();
            let cubic = matches!(interpolation, Interpolation::CubicSpline);
            let step = matches!(interpolation, Interpolation::Step);

            match reader.read_outputs() {
                Some(ReadOutputs::Translations(values)) => {
                    let values = spline_values(values.map(Vec3::from).collect(), cubic);
                    let keys = zip_keys(&times, &values);
                    channels[index].position_keys = if step { step_keys(keys) } else { keys };
                }
                Some(ReadOutputs::Rotations(values)) => {
                    let values: Vec<Quat> = values
                        .into_f32()
                        .map(|q| Quat::from_array(q).normalize())
                        .collect();
                    let keys = zip_keys(&times, &spline_values(values, cubic));
                    channels[index].rotation_keys = if step { step_keys(keys) } else { keys };
                }
                Some(_) => {
                    log::debug!("[Import] 忽略通道 '{}' 的缩放/形变数据", node_name);
                }
                None => {
                    log::warn!("[Import] 通道 '{}' 缺少输出数据", node_name);
                }
            }
        }

        let hold_ends = self.flags.contains(ImportFlags::HOLD_TRACK_ENDS);
        for (channel, (rest_translation, rest_rotation)) in channels.iter_mut().zip(rest_poses) {
            // 缺失的序列用节点静止姿态补一个关键帧
            if channel.position_keys.is_empty() {
                channel.position_keys.push(ImportedKey { time: 0.0, value: rest_translation });
            }
            if channel.rotation_keys.is_empty() {
                channel.rotation_keys.push(ImportedKey { time: 0.0, value: rest_rotation });
            }
            if hold_ends {
                hold_track_ends(&mut channel.position_keys, max_time);
                hold_track_ends(&mut channel.rotation_keys, max_time);
            }
        }

        ImportedAnimation {
            name,
            duration: max_time,
            ticks_per_second: self.ticks_per_second,
            channels,
        }
    }
}

impl SceneImporter for GltfImporter {
    fn import(&self, path: &Path) -> Result<ImportedScene> {
        let (document, buffers, _images) = gltf::import(path)?;
        Ok(self.convert(&document, &buffers))
    }
}

// ============================================================================
// 辅助函数
// ============================================================================

/// 节点名称，匿名节点使用 `node_<index>`
fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

/// 把逐顶点 (joint, weight) 转换为逐骨骼的权重列表
///
/// 只保留实际带权重的关节。
fn read_skin_bones(
    skin: &gltf::Skin,
    joints: &[[u16; 4]],
    weights: &[[f32; 4]],
    buffers: &[gltf::buffer::Data],
) -> Vec<ImportedBone> {
    let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
    let inverse_binds: Vec<[[f32; 4]; 4]> = reader
        .read_inverse_bind_matrices()
        .map(|it| it.collect())
        .unwrap_or_default();

    let mut bones: Vec<ImportedBone> = skin
        .joints()
        .enumerate()
        .map(|(i, joint)| ImportedBone {
            name: node_name(&joint),
            offset: inverse_binds
                .get(i)
                .map(|m| Mat4::from_cols_array_2d(m).to_cols_array())
                .unwrap_or(IDENTITY_MATRIX),
            weights: Vec::new(),
        })
        .collect();

    for (vertex_id, (vertex_joints, vertex_weights)) in joints.iter().zip(weights).enumerate() {
        for (&joint, &weight) in vertex_joints.iter().zip(vertex_weights) {
            if weight <= 0.0 {
                continue;
            }
            match bones.get_mut(joint as usize) {
                Some(bone) => bone.weights.push(VertexWeight {
                    vertex_id: vertex_id as u32,
                    weight,
                }),
                None => log::warn!("[Import] 顶点 {} 引用了不存在的关节 {}", vertex_id, joint),
            }
        }
    }

    bones.retain(|bone| !bone.weights.is_empty());
    bones
}

/// 三次样条输出为 (入切线, 值, 出切线) 三元组，只取值
fn spline_values<T>(values: Vec<T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.into_iter().skip(1).step_by(3).collect()
    } else {
        values
    }
}

fn zip_keys<T: Copy>(times: &[f32], values: &[T]) -> Vec<ImportedKey<T>> {
    times
        .iter()
        .zip(values)
        .map(|(&time, &value)| ImportedKey { time, value })
        .collect()
}

/// 阶梯插值：在每个关键帧前补一个保持上一帧值的同时刻关键帧
///
/// 段查找选第一个右端点晚于查询时间的段，零长度段永远不会被选中，
/// 因此线性插值在两帧之间保持常量，到达下一帧时刻才跳变。
fn step_keys<T: Copy>(keys: Vec<ImportedKey<T>>) -> Vec<ImportedKey<T>> {
    let mut stepped: Vec<ImportedKey<T>> = Vec::with_capacity(keys.len() * 2);
    for key in keys {
        if let Some(previous) = stepped.last().copied() {
            stepped.push(ImportedKey { time: key.time, value: previous.value });
        }
        stepped.push(key);
    }
    stepped
}

/// 在序列首尾补保持帧，使 [0, duration] 全部被关键帧段覆盖
///
/// 单帧序列保持不变（单帧本身就是常量）。
pub(crate) fn hold_track_ends<T: Copy>(keys: &mut Vec<ImportedKey<T>>, duration: f32) {
    if keys.len() < 2 {
        return;
    }
    if let Some(first) = keys.first().copied() {
        if first.time > 0.0 {
            keys.insert(0, ImportedKey { time: 0.0, value: first.value });
        }
    }
    if let Some(last) = keys.last().copied() {
        if last.time < duration {
            keys.push(ImportedKey { time: duration, value: last.value });
        }
    }
}
