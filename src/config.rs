//! 动画运行时配置
//!
//! 所有参数扁平化，由调用方显式构造并传入加载器，不使用全局实例。

use crate::animation::RootMotion;
use crate::scene::ImportFlags;

/// 动画配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct AnimationConfig {
    // ========== 根运动 ==========
    /// 根运动提取策略，默认关闭
    pub root_motion: RootMotion,

    // ========== 导入 ==========
    /// 导入后处理标志，默认 FLIP_UVS | HOLD_TRACK_ENDS
    pub import_flags: ImportFlags,
    /// glTF 动画的 tick 速率，默认 1000.0
    /// glTF 以秒存储时间，导入时换算为 tick
    pub gltf_ticks_per_second: f32,

    // ========== 调试 ==========
    /// 是否输出加载摘要日志，默认 false
    pub debug_log: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            // ====== 根运动 ======
            // 关闭时根骨骼的平移留在蒙皮矩阵里（原地播放整段位移）
            root_motion: RootMotion::Disabled,

            // ====== 导入 ======
            // 翻转 V 坐标以匹配渲染器纹理原点；
            // 在片段首尾补保持帧，保证 [0, duration) 内任意时间都落在某一段关键帧之间
            import_flags: ImportFlags::FLIP_UVS | ImportFlags::HOLD_TRACK_ENDS,
            // 毫秒精度
            gltf_ticks_per_second: 1000.0,

            // ====== 调试 ======
            debug_log: false,
        }
    }
}

impl AnimationConfig {
    /// 以指定骨骼启用根运动提取
    pub fn with_root_motion(mut self, bone_name: impl Into<String>) -> Self {
        self.root_motion = RootMotion::ExtractFrom(bone_name.into());
        self
    }
}
