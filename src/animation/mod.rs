//! 骨骼动画模块
//!
//! - keyframe: 位置、旋转关键帧
//! - bone_track: 单骨骼轨道与插值
//! - clip: 动画片段（轨道 + 层级 + 骨骼索引表 + 播放时间）
//! - pose: 层级遍历，输出蒙皮矩阵
//! - driver: 逐帧驱动已注册的蒙皮网格

mod bone_track;
mod clip;
mod driver;
mod keyframe;
mod pose;

pub use bone_track::{BoneTrack, Keyframe};
pub use clip::{AnimationClip, DEFAULT_TICKS_PER_SECOND};
pub use driver::{AnimationDriver, MeshStore};
pub use keyframe::{scale_factor, KeyPosition, KeyRotation};
pub use pose::{calculate_bone_transform, EvaluatedPose, RootMotion};
