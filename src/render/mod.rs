//! 渲染后端边界
//!
//! 动画核心不直接接触 GPU 资源，只把每个网格的蒙皮矩阵交给后端。

mod staging;

pub use staging::StagingBackend;

use crate::mesh::SkinningMatrices;

/// 可绘制对象句柄
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u32);

impl MeshHandle {
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for MeshHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 渲染后端
pub trait RenderBackend {
    /// 后端是否已初始化（未就绪时整帧跳过动画求值）
    fn is_ready(&self) -> bool;

    /// 设置可绘制对象的蒙皮矩阵常量缓冲
    fn set_skinning_buffer(&mut self, handle: MeshHandle, matrices: &SkinningMatrices);
}
