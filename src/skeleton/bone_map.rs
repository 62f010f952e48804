//! 骨骼索引表
//!
//! 为网格蒙皮数据与动画通道中出现的每个骨骼名称分配稠密、稳定的整数 id，
//! 并记录其逆绑定矩阵（offset）。

use std::collections::HashMap;

use glam::Mat4;

/// 单个骨骼的索引信息
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneInfo {
    /// 蒙皮矩阵缓冲中的下标
    pub id: usize,
    /// 逆绑定矩阵
    pub offset: Mat4,
}

/// 骨骼名称 -> BoneInfo
///
/// id 从 0 开始单调递增；已有条目只复用，从不覆盖。
#[derive(Clone, Debug, Default)]
pub struct BoneIndexMap {
    infos: HashMap<String, BoneInfo>,
    counter: usize,
}

impl BoneIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 名称不存在时分配下一个 id 并记录 offset，存在时返回已有 id
    pub fn get_or_insert(&mut self, name: &str, offset: Mat4) -> usize {
        if let Some(info) = self.infos.get(name) {
            return info.id;
        }

        let id = self.counter;
        self.infos.insert(name.to_string(), BoneInfo { id, offset });
        self.counter += 1;
        id
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&BoneInfo> {
        self.infos.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.infos.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// 下一个待分配的 id
    #[inline]
    pub fn next_id(&self) -> usize {
        self.counter
    }

    /// 最大 id（空表为 None）
    pub fn max_id(&self) -> Option<usize> {
        self.counter.checked_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoneInfo)> {
        self.infos.iter().map(|(name, info)| (name.as_str(), info))
    }

    /// 按 id 排列的骨骼名称
    pub fn names_by_id(&self) -> Vec<&str> {
        let mut names = vec![""; self.counter];
        for (name, info) in &self.infos {
            names[info.id] = name.as_str();
        }
        names
    }
}
