//! 场景导入边界
//!
//! 第三方场景解析器与动画核心之间的数据契约：
//! 节点树、网格（顶点 + 骨骼权重）、动画片段（通道 + 关键帧）。

mod gltf_importer;
mod registry;

#[cfg(test)]
pub(crate) mod fixtures;

pub use gltf_importer::GltfImporter;
pub use registry::DrawableRegistry;

use std::path::Path;

use bitflags::bitflags;
use glam::{Mat4, Quat, Vec2, Vec3};

use crate::Result;

// ============================================================================
// 导入标志
// ============================================================================

bitflags! {
    /// 导入后处理标志位
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ImportFlags: u32 {
        /// 翻转纹理 V 坐标
        const FLIP_UVS = 1 << 0;
        /// 在每条关键帧序列首尾补保持帧（覆盖 [0, duration]）
        const HOLD_TRACK_ENDS = 1 << 1;
    }
}

// ============================================================================
// 矩阵布局
// ============================================================================

/// 源数据的矩阵存储布局
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatrixLayout {
    /// 行主序（平移位于第 3、7、11 个元素）
    RowMajor,
    /// 列主序（与 glam 一致）
    #[default]
    ColumnMajor,
}

impl MatrixLayout {
    /// 转换为列主序 Mat4
    #[inline]
    pub fn to_mat4(self, m: &[f32; 16]) -> Mat4 {
        match self {
            MatrixLayout::ColumnMajor => Mat4::from_cols_array(m),
            MatrixLayout::RowMajor => Mat4::from_cols_array(m).transpose(),
        }
    }
}

/// 单位矩阵的平铺形式
pub const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

// ============================================================================
// 导入数据
// ============================================================================

/// 导入节点
#[derive(Clone, Debug, PartialEq)]
pub struct ImportedNode {
    pub name: String,
    /// 本地变换（布局见 ImportedScene::matrix_layout）
    pub transform: [f32; 16],
    /// 引用的网格下标（ImportedScene::meshes）
    pub meshes: Vec<usize>,
    pub children: Vec<ImportedNode>,
}

impl ImportedNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: IDENTITY_MATRIX,
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// 单个顶点权重
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexWeight {
    pub vertex_id: u32,
    pub weight: f32,
}

/// 网格引用的骨骼
#[derive(Clone, Debug, PartialEq)]
pub struct ImportedBone {
    pub name: String,
    /// 逆绑定矩阵
    pub offset: [f32; 16],
    pub weights: Vec<VertexWeight>,
}

/// 导入网格（已三角化）
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub tex_coords: Option<Vec<Vec2>>,
    pub indices: Vec<u32>,
    pub bones: Vec<ImportedBone>,
}

/// 关键帧（时间单位为 tick）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImportedKey<T> {
    pub time: f32,
    pub value: T,
}

/// 单个节点的动画通道
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedChannel {
    pub node_name: String,
    pub position_keys: Vec<ImportedKey<Vec3>>,
    pub rotation_keys: Vec<ImportedKey<Quat>>,
}

/// 动画片段
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedAnimation {
    pub name: String,
    /// 时长（tick）
    pub duration: f32,
    pub ticks_per_second: f32,
    pub channels: Vec<ImportedChannel>,
}

/// 导入场景
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedScene {
    pub matrix_layout: MatrixLayout,
    pub root: Option<ImportedNode>,
    pub meshes: Vec<ImportedMesh>,
    pub animations: Vec<ImportedAnimation>,
}

/// 场景导入器
pub trait SceneImporter {
    /// 路径无效或格式不支持时返回错误
    fn import(&self, path: &Path) -> Result<ImportedScene>;
}
