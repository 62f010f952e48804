//! 动画片段
//!
//! 一个已加载片段的全部数据：时长、tick 速率、骨骼轨道、
//! 层级快照以及与网格对齐后的骨骼索引表。

use std::collections::HashMap;

use glam::Mat4;

use crate::mesh::MAX_SKINNING_MATRICES;
use crate::scene::{ImportedAnimation, ImportedNode, MatrixLayout};
use crate::skeleton::{BoneIndexMap, SkeletonNode};
use crate::{AnimError, Result};

use super::bone_track::BoneTrack;

/// 源数据未给出 tick 速率时使用的默认值
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// 动画片段
#[derive(Debug, Clone, Default)]
pub struct AnimationClip {
    pub name: String,
    /// 时长（tick）
    pub duration: f32,
    pub ticks_per_second: f32,
    /// 当前播放时间（tick），始终位于 [0, duration)
    pub current_time: f32,
    /// 骨骼轨道
    pub bones: Vec<BoneTrack>,
    /// 层级快照
    pub root_node: SkeletonNode,
    /// 网格骨骼 + 通道骨骼的并集
    pub bone_info_map: BoneIndexMap,
    /// 骨骼名称 -> bones 下标
    pub(crate) track_lookup: HashMap<String, usize>,
}

impl AnimationClip {
    /// 从导入片段构建
    ///
    /// `mesh_bones` 是处理网格蒙皮数据时建立的索引表；
    /// 通道里出现而网格未引用的骨骼在其副本上补齐（单位 offset）。
    pub fn from_imported(
        animation: &ImportedAnimation,
        root: &ImportedNode,
        layout: MatrixLayout,
        mesh_bones: &BoneIndexMap,
    ) -> Result<Self> {
        if !animation.duration.is_finite() || animation.duration <= 0.0 {
            return Err(AnimError::InvalidDuration(animation.duration));
        }

        let ticks_per_second = if animation.ticks_per_second > 0.0 {
            animation.ticks_per_second
        } else {
            log::warn!(
                "[Animation] 片段 '{}' 未指定 tick 速率，使用默认值 {}",
                animation.name,
                DEFAULT_TICKS_PER_SECOND
            );
            DEFAULT_TICKS_PER_SECOND
        };

        let root_node = SkeletonNode::from_imported(root, layout);

        let mut bone_info_map = mesh_bones.clone();
        let mut bones = Vec::with_capacity(animation.channels.len());
        let mut track_lookup = HashMap::with_capacity(animation.channels.len());

        for channel in &animation.channels {
            let id = bone_info_map.get_or_insert(&channel.node_name, Mat4::IDENTITY);
            if track_lookup.contains_key(&channel.node_name) {
                log::warn!("[Animation] 骨骼 '{}' 有重复通道，只使用第一个", channel.node_name);
                continue;
            }
            track_lookup.insert(channel.node_name.clone(), bones.len());
            bones.push(BoneTrack::from_channel(channel, id)?);
        }

        if bone_info_map.len() > MAX_SKINNING_MATRICES {
            return Err(AnimError::TooManyBones {
                count: bone_info_map.len(),
                capacity: MAX_SKINNING_MATRICES,
            });
        }

        Ok(Self {
            name: animation.name.clone(),
            duration: animation.duration,
            ticks_per_second,
            current_time: 0.0,
            bones,
            root_node,
            bone_info_map,
            track_lookup,
        })
    }

    /// 是否为空片段（未加载或加载失败）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty() || self.duration <= 0.0
    }

    #[inline]
    pub fn track_count(&self) -> usize {
        self.bones.len()
    }

    pub fn find_bone(&self, name: &str) -> Option<&BoneTrack> {
        self.track_lookup.get(name).map(|&index| &self.bones[index])
    }

    pub fn find_bone_mut(&mut self, name: &str) -> Option<&mut BoneTrack> {
        self.track_lookup.get(name).map(|&index| &mut self.bones[index])
    }

    /// 片段时长（秒）
    pub fn duration_seconds(&self) -> f32 {
        if self.ticks_per_second > 0.0 {
            self.duration / self.ticks_per_second
        } else {
            0.0
        }
    }

    /// 推进播放时间并回绕
    ///
    /// current_time = (current_time + ticks_per_second * delta_seconds) mod duration，
    /// 结果始终位于 [0, duration)。空片段停在 0。
    pub fn advance(&mut self, delta_seconds: f32) -> f32 {
        if self.duration <= 0.0 {
            self.current_time = 0.0;
            return self.current_time;
        }
        if !delta_seconds.is_finite() {
            log::warn!("[Animation] 忽略非法帧间隔 {}", delta_seconds);
            return self.current_time;
        }

        let mut time = (self.current_time + self.ticks_per_second * delta_seconds) % self.duration;
        if time < 0.0 {
            time += self.duration;
        }
        // 浮点舍入可能恰好落在 duration 上
        if time >= self.duration {
            time = 0.0;
        }
        self.current_time = time;
        time
    }

    /// 重置播放时间
    pub fn rewind(&mut self) {
        self.current_time = 0.0;
    }
}
