//! 关键帧定义

use glam::{Quat, Vec3};

use crate::scene::ImportedKey;

/// 位置关键帧
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyPosition {
    pub position: Vec3,
    /// 时间戳（tick）
    pub time_stamp: f32,
}

impl KeyPosition {
    pub fn new(position: Vec3, time_stamp: f32) -> Self {
        Self { position, time_stamp }
    }
}

impl From<&ImportedKey<Vec3>> for KeyPosition {
    fn from(key: &ImportedKey<Vec3>) -> Self {
        Self::new(key.value, key.time)
    }
}

/// 旋转关键帧
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyRotation {
    pub orientation: Quat,
    /// 时间戳（tick）
    pub time_stamp: f32,
}

impl KeyRotation {
    pub fn new(orientation: Quat, time_stamp: f32) -> Self {
        Self { orientation, time_stamp }
    }
}

impl From<&ImportedKey<Quat>> for KeyRotation {
    fn from(key: &ImportedKey<Quat>) -> Self {
        Self::new(key.value, key.time)
    }
}

/// 求两帧之间的插值系数
#[inline]
pub fn scale_factor(last_time_stamp: f32, next_time_stamp: f32, animation_time: f32) -> f32 {
    let mid_way_length = animation_time - last_time_stamp;
    let frames_diff = next_time_stamp - last_time_stamp;
    mid_way_length / frames_diff
}
