//! 可绘制对象
//!
//! 静态网格、蒙皮网格、粒子三类，按判别值分派。

use super::{BoundingBox, Mesh, SkinnedMesh, Skinning};

/// 外部粒子系统中的实例句柄
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParticleHandle(pub u32);

/// 可绘制对象
#[derive(Clone, Debug)]
pub enum Drawable {
    Static(Mesh),
    Skinned(SkinnedMesh),
    Particle(ParticleHandle),
}

impl Drawable {
    /// 几何数据（粒子没有）
    pub fn mesh(&self) -> Option<&Mesh> {
        match self {
            Drawable::Static(mesh) => Some(mesh),
            Drawable::Skinned(skinned) => Some(&skinned.mesh),
            Drawable::Particle(_) => None,
        }
    }

    pub fn skinning(&self) -> Option<&Skinning> {
        match self {
            Drawable::Skinned(skinned) => Some(&skinned.skinning),
            _ => None,
        }
    }

    pub fn skinning_mut(&mut self) -> Option<&mut Skinning> {
        match self {
            Drawable::Skinned(skinned) => Some(&mut skinned.skinning),
            _ => None,
        }
    }

    pub fn as_skinned_mut(&mut self) -> Option<&mut SkinnedMesh> {
        match self {
            Drawable::Skinned(skinned) => Some(skinned),
            _ => None,
        }
    }

    /// 本地空间包围盒
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.mesh().map(Mesh::bounds)
    }

    #[inline]
    pub fn is_skinned(&self) -> bool {
        matches!(self, Drawable::Skinned(_))
    }
}

impl From<Mesh> for Drawable {
    fn from(mesh: Mesh) -> Self {
        Drawable::Static(mesh)
    }
}

impl From<SkinnedMesh> for Drawable {
    fn from(mesh: SkinnedMesh) -> Self {
        Drawable::Skinned(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_variant() {
        let mut skinned = Drawable::from(SkinnedMesh::default());
        assert!(skinned.is_skinned());
        assert!(skinned.skinning().is_some());
        assert!(skinned.as_skinned_mut().is_some());

        let mut particle = Drawable::Particle(ParticleHandle(3));
        assert!(particle.mesh().is_none());
        assert!(particle.skinning_mut().is_none());
        assert!(particle.bounds().is_none());

        let static_mesh = Drawable::from(Mesh::default());
        assert!(!static_mesh.is_skinned());
        assert!(static_mesh.mesh().is_some());
    }
}
