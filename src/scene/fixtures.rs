//! 测试用内存场景

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use glam::{Mat4, Quat, Vec3};

use crate::{AnimError, Result};

use super::{
    ImportedAnimation, ImportedBone, ImportedChannel, ImportedKey, ImportedMesh, ImportedNode,
    ImportedScene, MatrixLayout, SceneImporter, VertexWeight,
};

pub(crate) const MODEL_PATH: &str = "models/rig.glb";
pub(crate) const ANIM_PATH: &str = "anims/turn.glb";

/// 按路径返回预先放入的场景
#[derive(Default)]
pub(crate) struct MemoryImporter {
    scenes: HashMap<PathBuf, ImportedScene>,
}

impl MemoryImporter {
    pub(crate) fn with(mut self, path: &str, scene: ImportedScene) -> Self {
        self.scenes.insert(PathBuf::from(path), scene);
        self
    }

    /// 模型 + 动画都齐全
    pub(crate) fn rigged() -> Self {
        Self::default()
            .with(MODEL_PATH, rigged_model())
            .with(ANIM_PATH, turn_animation())
    }
}

impl SceneImporter for MemoryImporter {
    fn import(&self, path: &Path) -> Result<ImportedScene> {
        self.scenes.get(path).cloned().ok_or_else(|| {
            AnimError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ))
        })
    }
}

fn node(name: &str, transform: Mat4, children: Vec<ImportedNode>) -> ImportedNode {
    let mut node = ImportedNode::new(name);
    node.transform = transform.to_cols_array();
    node.children = children;
    node
}

/// RootNode -> [body(mesh 0), hip -> spine]
pub(crate) fn rig_hierarchy() -> ImportedNode {
    let mut body = ImportedNode::new("body");
    body.meshes.push(0);
    node(
        "RootNode",
        Mat4::IDENTITY,
        vec![
            body,
            node(
                "hip",
                Mat4::IDENTITY,
                vec![node("spine", Mat4::from_translation(Vec3::Y), vec![])],
            ),
        ],
    )
}

fn weights(pairs: &[(u32, f32)]) -> Vec<VertexWeight> {
    pairs
        .iter()
        .map(|&(vertex_id, weight)| VertexWeight { vertex_id, weight })
        .collect()
}

/// 三角形网格，spine 先于 hip 出现，最后一个权重指向不存在的顶点
pub(crate) fn rigged_model() -> ImportedScene {
    let mesh = ImportedMesh {
        name: "body".to_string(),
        positions: vec![Vec3::ZERO, Vec3::X, Vec3::new(0.0, 2.0, 0.0)],
        normals: Some(vec![Vec3::Z; 3]),
        tex_coords: None,
        indices: vec![0, 1, 2],
        bones: vec![
            ImportedBone {
                name: "spine".to_string(),
                offset: Mat4::from_translation(Vec3::NEG_Y).to_cols_array(),
                weights: weights(&[(2, 1.0), (1, 0.5)]),
            },
            ImportedBone {
                name: "hip".to_string(),
                offset: Mat4::IDENTITY.to_cols_array(),
                weights: weights(&[(0, 1.0), (1, 0.5), (7, 0.3)]),
            },
        ],
    };

    ImportedScene {
        matrix_layout: MatrixLayout::ColumnMajor,
        root: Some(rig_hierarchy()),
        meshes: vec![mesh],
        animations: Vec::new(),
    }
}

fn keys<T: Copy>(pairs: &[(f32, T)]) -> Vec<ImportedKey<T>> {
    pairs.iter().map(|&(time, value)| ImportedKey { time, value }).collect()
}

/// 1 tick、30 tick/s：hip 绕 Y 轴从 0° 转到 180° 并平移到 x = 2
pub(crate) fn turn_animation() -> ImportedScene {
    let animation = ImportedAnimation {
        name: "turn".to_string(),
        duration: 1.0,
        ticks_per_second: 30.0,
        channels: vec![
            ImportedChannel {
                node_name: "hip".to_string(),
                position_keys: keys(&[(0.0, Vec3::ZERO), (1.0, Vec3::new(2.0, 0.0, 0.0))]),
                // w 精确为 0 的 180° 旋转
                rotation_keys: keys(&[(0.0, Quat::IDENTITY), (1.0, Quat::from_xyzw(0.0, 1.0, 0.0, 0.0))]),
            },
            ImportedChannel {
                node_name: "spine".to_string(),
                position_keys: keys(&[(0.0, Vec3::Y)]),
                rotation_keys: keys(&[(0.0, Quat::IDENTITY)]),
            },
            ImportedChannel {
                node_name: "tail".to_string(),
                position_keys: keys(&[(0.0, Vec3::ZERO)]),
                rotation_keys: keys(&[(0.0, Quat::IDENTITY)]),
            },
        ],
    };

    ImportedScene {
        matrix_layout: MatrixLayout::ColumnMajor,
        root: Some(rig_hierarchy()),
        meshes: Vec::new(),
        animations: vec![animation],
    }
}
