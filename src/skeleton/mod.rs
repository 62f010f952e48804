//! 骨骼系统
//!
//! 核心设计思想：
//! - SkeletonNode: 导入场景的节点层级（不仅是骨骼，也包含中间变换节点）
//! - BoneIndexMap: 骨骼名称 -> (稠密索引, 逆绑定矩阵)
//! - 骨骼只通过名称与动画通道、索引表关联

mod bone_map;
mod node;

pub use bone_map::{BoneIndexMap, BoneInfo};
pub use node::{SkeletonIter, SkeletonNode};

use glam::{Mat4, Vec3, Vec4};

/// 取出矩阵的平移分量，并把矩阵的平移清零
///
/// 旋转与缩放部分保持不变。
#[inline]
pub fn split_translation(m: &mut Mat4) -> Vec3 {
    let translation = m.w_axis.truncate();
    m.w_axis = Vec4::W;
    translation
}
