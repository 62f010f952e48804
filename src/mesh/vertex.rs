//! 蒙皮顶点

use glam::{Vec2, Vec3};

/// 每个顶点最多受影响的骨骼数
pub const MAX_BONE_INFLUENCE: usize = 4;

/// 小于该值的权重视为空槽
const WEIGHT_EPSILON: f32 = 1e-6;

/// 蒙皮顶点
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    /// 骨骼 id，-1 表示空槽
    pub skin_indices: [i32; MAX_BONE_INFLUENCE],
    pub skin_weights: [f32; MAX_BONE_INFLUENCE],
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            normal: Vec3::ZERO,
            tex_coords: Vec2::ZERO,
            skin_indices: [-1; MAX_BONE_INFLUENCE],
            skin_weights: [0.0; MAX_BONE_INFLUENCE],
        }
    }
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coords: Vec2) -> Self {
        Self {
            position,
            normal,
            tex_coords,
            ..Default::default()
        }
    }

    /// 写入一个骨骼影响，槽位已满时丢弃并返回 false
    pub fn set_bone_data(&mut self, bone_id: usize, weight: f32) -> bool {
        let slot = (0..MAX_BONE_INFLUENCE)
            .find(|&i| self.skin_indices[i] < 0 || self.skin_weights[i] < WEIGHT_EPSILON);

        match slot {
            Some(i) => {
                self.skin_indices[i] = bone_id as i32;
                self.skin_weights[i] = weight;
                true
            }
            None => false,
        }
    }

    /// 已占用的影响数
    pub fn influence_count(&self) -> usize {
        self.skin_indices.iter().filter(|&&id| id >= 0).count()
    }

    /// 权重之和
    pub fn total_weight(&self) -> f32 {
        self.skin_indices
            .iter()
            .zip(&self.skin_weights)
            .filter(|(&id, _)| id >= 0)
            .map(|(_, &w)| w)
            .sum()
    }
}
