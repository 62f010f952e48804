//! 骨骼轨道
//!
//! 存储单个骨骼的位置、旋转关键帧，并在给定时间（tick）求出插值后的本地变换。

use glam::{Mat4, Quat, Vec3};

use crate::scene::ImportedChannel;
use crate::{AnimError, Result};

use super::keyframe::{scale_factor, KeyPosition, KeyRotation};

/// 带时间戳的关键帧
pub trait Keyframe {
    fn time_stamp(&self) -> f32;
}

impl Keyframe for KeyPosition {
    #[inline]
    fn time_stamp(&self) -> f32 {
        self.time_stamp
    }
}

impl Keyframe for KeyRotation {
    #[inline]
    fn time_stamp(&self) -> f32 {
        self.time_stamp
    }
}

/// 线性向前扫描，返回第一个右端点晚于 `time` 的关键帧段的左端下标
///
/// `time` 不早于最后一帧时返回 None。
fn segment_index<K: Keyframe>(keys: &[K], time: f32) -> Option<usize> {
    keys.windows(2).position(|pair| time < pair[1].time_stamp())
}

/// 骨骼动画轨道
///
/// 位置与旋转序列各自按时间升序排列，数量和时间戳不必一致。
/// 每个序列至少一帧；只有一帧时整个片段都使用该值。
#[derive(Debug, Clone)]
pub struct BoneTrack {
    /// 骨骼名称
    pub name: String,
    /// 骨骼 id（与骨骼索引表一致）
    pub id: usize,
    positions: Vec<KeyPosition>,
    rotations: Vec<KeyRotation>,
    /// 最近一次 update 的本地变换，首次 update 前为单位矩阵
    pub local_transform: Mat4,
}

impl BoneTrack {
    /// 创建轨道，任一序列为空时返回错误
    pub fn new(
        name: impl Into<String>,
        id: usize,
        positions: Vec<KeyPosition>,
        rotations: Vec<KeyRotation>,
    ) -> Result<Self> {
        let name = name.into();
        if positions.is_empty() {
            return Err(AnimError::EmptyTrack { bone: name, kind: "position" });
        }
        if rotations.is_empty() {
            return Err(AnimError::EmptyTrack { bone: name, kind: "rotation" });
        }

        Ok(Self {
            name,
            id,
            positions,
            rotations,
            local_transform: Mat4::IDENTITY,
        })
    }

    /// 从导入通道创建
    pub fn from_channel(channel: &ImportedChannel, id: usize) -> Result<Self> {
        Self::new(
            channel.node_name.clone(),
            id,
            channel.position_keys.iter().map(KeyPosition::from).collect(),
            channel.rotation_keys.iter().map(KeyRotation::from).collect(),
        )
    }

    #[inline]
    pub fn positions(&self) -> &[KeyPosition] {
        &self.positions
    }

    #[inline]
    pub fn rotations(&self) -> &[KeyRotation] {
        &self.rotations
    }

    #[inline]
    pub fn num_positions(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn num_rotations(&self) -> usize {
        self.rotations.len()
    }

    /// 两条序列中最晚的时间戳
    pub fn last_time_stamp(&self) -> f32 {
        let last_position = self.positions.last().map_or(0.0, |k| k.time_stamp);
        let last_rotation = self.rotations.last().map_or(0.0, |k| k.time_stamp);
        last_position.max(last_rotation)
    }

    // ========================================
    // 求值
    // ========================================

    /// 计算 `time` 处的本地变换：translation * rotation
    pub fn update(&mut self, time: f32) {
        let translation = self.interpolate_position(time);
        let rotation = self.interpolate_rotation(time);
        self.local_transform = translation * rotation;
    }

    /// 位置关键帧段下标
    ///
    /// # Panics
    /// `time` 不早于最后一个位置关键帧时 panic：
    /// 上游的时间回绕必须保证 `time` 落在关键帧范围内，这里不做钳制。
    pub fn position_index(&self, time: f32) -> usize {
        match segment_index(&self.positions, time) {
            Some(index) => index,
            None => panic!(
                "[Animation] 骨骼 '{}' 的时间 {} 超出位置关键帧范围（最后一帧 {}）",
                self.name,
                time,
                self.positions.last().map_or(0.0, |k| k.time_stamp),
            ),
        }
    }

    /// 旋转关键帧段下标
    ///
    /// # Panics
    /// 与 [`position_index`](Self::position_index) 相同的契约。
    pub fn rotation_index(&self, time: f32) -> usize {
        match segment_index(&self.rotations, time) {
            Some(index) => index,
            None => panic!(
                "[Animation] 骨骼 '{}' 的时间 {} 超出旋转关键帧范围（最后一帧 {}）",
                self.name,
                time,
                self.rotations.last().map_or(0.0, |k| k.time_stamp),
            ),
        }
    }

    /// 插值后的平移向量
    pub fn interpolated_translation(&self, time: f32) -> Vec3 {
        if let [only] = self.positions.as_slice() {
            return only.position;
        }

        let index = self.position_index(time);
        let p0 = &self.positions[index];
        let p1 = &self.positions[index + 1];
        let factor = scale_factor(p0.time_stamp, p1.time_stamp, time);
        p0.position.lerp(p1.position, factor)
    }

    /// 插值后的旋转（已归一化）
    pub fn interpolated_orientation(&self, time: f32) -> Quat {
        if let [only] = self.rotations.as_slice() {
            return only.orientation.normalize();
        }

        let index = self.rotation_index(time);
        let r0 = &self.rotations[index];
        let r1 = &self.rotations[index + 1];
        let factor = scale_factor(r0.time_stamp, r1.time_stamp, time);
        r0.orientation.slerp(r1.orientation, factor).normalize()
    }

    /// 平移矩阵
    #[inline]
    pub fn interpolate_position(&self, time: f32) -> Mat4 {
        Mat4::from_translation(self.interpolated_translation(time))
    }

    /// 旋转矩阵
    #[inline]
    pub fn interpolate_rotation(&self, time: f32) -> Mat4 {
        Mat4::from_quat(self.interpolated_orientation(time))
    }
}
