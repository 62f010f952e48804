//! 骨骼动画运行时
//!
//! 模块划分：
//! - skeleton: 节点层级、骨骼索引表
//! - animation: 骨骼轨道、动画片段、姿态求值、动画驱动
//! - mesh: 顶点蒙皮数据、蒙皮矩阵缓冲、可绘制对象
//! - scene: 场景导入边界（glTF 导入器）
//! - render: 渲染后端边界

pub mod animation;
pub mod config;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod skeleton;

use std::path::PathBuf;

use thiserror::Error;

pub use animation::{AnimationClip, AnimationDriver, BoneTrack, MeshStore, RootMotion};
pub use config::AnimationConfig;
pub use mesh::{Drawable, SkinnedMesh, SkinnedMeshLoader, SkinningMatrices, MAX_SKINNING_MATRICES};
pub use render::{MeshHandle, RenderBackend};
pub use scene::{GltfImporter, ImportFlags, SceneImporter};
pub use skeleton::{BoneIndexMap, BoneInfo, SkeletonNode};

/// 动画运行时错误
#[derive(Error, Debug)]
pub enum AnimError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("failed to import '{path}': {reason}")]
    Import { path: PathBuf, reason: String },

    #[error("scene '{0}' has no root node")]
    NoRootNode(PathBuf),

    #[error("scene '{0}' contains no animation")]
    NoAnimation(PathBuf),

    #[error("invalid clip duration: {0}")]
    InvalidDuration(f32),

    #[error("bone '{bone}' has no {kind} keyframes")]
    EmptyTrack { bone: String, kind: &'static str },

    #[error("{count} bones exceed skinning buffer capacity {capacity}")]
    TooManyBones { count: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, AnimError>;
