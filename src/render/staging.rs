//! CPU 端常量缓冲暂存
//!
//! 为每个句柄保留一份小端字节布局的蒙皮矩阵，供真正的图形 API 拷贝上传。

use std::collections::HashMap;

use crate::mesh::{SkinningMatrices, SKINNING_BUFFER_BYTES};

use super::{MeshHandle, RenderBackend};

/// 暂存后端
#[derive(Debug, Default)]
pub struct StagingBackend {
    ready: bool,
    buffers: HashMap<MeshHandle, Vec<u8>>,
    upload_count: u64,
}

impl StagingBackend {
    /// 创建已就绪的后端
    pub fn new() -> Self {
        Self {
            ready: true,
            ..Default::default()
        }
    }

    /// 创建未就绪的后端
    pub fn uninitialized() -> Self {
        Self::default()
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// 句柄最近一次上传的字节
    pub fn buffer(&self, handle: MeshHandle) -> Option<&[u8]> {
        self.buffers.get(&handle).map(Vec::as_slice)
    }

    /// 释放句柄的暂存缓冲
    pub fn release(&mut self, handle: MeshHandle) -> bool {
        self.buffers.remove(&handle).is_some()
    }

    /// 累计上传次数
    #[inline]
    pub fn upload_count(&self) -> u64 {
        self.upload_count
    }

    #[inline]
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }
}

impl RenderBackend for StagingBackend {
    #[inline]
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn set_skinning_buffer(&mut self, handle: MeshHandle, matrices: &SkinningMatrices) {
        let buffer = self
            .buffers
            .entry(handle)
            .or_insert_with(|| Vec::with_capacity(SKINNING_BUFFER_BYTES));
        buffer.clear();
        if let Err(e) = matrices.write_le_bytes(buffer) {
            log::error!("[Skinning] 句柄 {} 的蒙皮缓冲写入失败: {}", handle, e);
            return;
        }
        self.upload_count += 1;
    }
}
