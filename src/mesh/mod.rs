//! 网格数据
//!
//! 静态几何 + 可选的蒙皮能力（动画片段、蒙皮矩阵缓冲、根运动策略）。

mod drawable;
mod loader;
mod skinning_buffer;
mod vertex;

pub use drawable::{Drawable, ParticleHandle};
pub use loader::SkinnedMeshLoader;
pub use skinning_buffer::{
    SkinningMatrices, MAX_SKINNING_MATRICES, SKINNING_BUFFER_BYTES, SKINNING_MATRIX_BYTES,
};
pub use vertex::{Vertex, MAX_BONE_INFLUENCE};

use std::path::PathBuf;

use glam::{Mat4, Vec3};

use crate::animation::{AnimationClip, RootMotion};

// ============================================================================
// 包围盒
// ============================================================================

/// 轴对齐包围盒
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    /// 空盒（min > max），与任意盒合并得到对方
    fn default() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        points.into_iter().fold(Self::default(), |bounds, &p| Self {
            min: bounds.min.min(p),
            max: bounds.max.max(p),
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn merge(&self, other: &BoundingBox) -> BoundingBox {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// 八个角点
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// 变换到世界空间后重新求轴对齐盒
    pub fn transformed(&self, model: &Mat4) -> BoundingBox {
        if self.is_empty() {
            return *self;
        }
        let corners = self.corners().map(|c| model.transform_point3(c));
        Self::from_points(corners.iter())
    }
}

// ============================================================================
// 几何
// ============================================================================

/// 子网格
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubMesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub bounds: BoundingBox,
}

impl SubMesh {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let bounds = BoundingBox::from_points(vertices.iter().map(|v| &v.position));
        Self {
            name: name.into(),
            vertices,
            indices,
            bounds,
        }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// 网格
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub submeshes: Vec<SubMesh>,
}

impl Mesh {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.submeshes.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.vertices.len()).sum()
    }

    /// 全部子网格的合并包围盒
    pub fn bounds(&self) -> BoundingBox {
        self.submeshes
            .iter()
            .fold(BoundingBox::default(), |acc, s| acc.merge(&s.bounds))
    }
}

// ============================================================================
// 蒙皮
// ============================================================================

/// 蒙皮能力
#[derive(Clone, Debug, Default)]
pub struct Skinning {
    pub clip: AnimationClip,
    pub matrices: SkinningMatrices,
    pub root_motion: RootMotion,
    pub model_path: PathBuf,
    pub anim_path: PathBuf,
}

impl Skinning {
    /// 片段加载成功才需要逐帧求值
    #[inline]
    pub fn is_animated(&self) -> bool {
        !self.clip.is_empty()
    }
}

/// 蒙皮网格
#[derive(Clone, Debug, Default)]
pub struct SkinnedMesh {
    pub mesh: Mesh,
    pub skinning: Skinning,
}

impl SkinnedMesh {
    #[inline]
    pub fn is_animated(&self) -> bool {
        self.skinning.is_animated()
    }

    #[inline]
    pub fn clip(&self) -> &AnimationClip {
        &self.skinning.clip
    }

    #[inline]
    pub fn matrices(&self) -> &SkinningMatrices {
        &self.skinning.matrices
    }
}
