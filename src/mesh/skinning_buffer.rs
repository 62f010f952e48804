//! 蒙皮矩阵缓冲
//!
//! 固定容量，按骨骼 id 直接索引，未写入的槽位保持单位矩阵。

use std::io::{self, Write};

use byteorder::{ByteOrder, LittleEndian};
use glam::Mat4;

/// 蒙皮矩阵缓冲容量（与着色器常量缓冲的数组长度一致）
pub const MAX_SKINNING_MATRICES: usize = 512;

/// 单个矩阵的字节数（16 个 f32）
pub const SKINNING_MATRIX_BYTES: usize = 16 * 4;

/// 整个缓冲的字节数
pub const SKINNING_BUFFER_BYTES: usize = MAX_SKINNING_MATRICES * SKINNING_MATRIX_BYTES;

/// 蒙皮矩阵缓冲
#[derive(Clone, Debug, PartialEq)]
pub struct SkinningMatrices {
    matrices: Box<[Mat4; MAX_SKINNING_MATRICES]>,
}

impl Default for SkinningMatrices {
    fn default() -> Self {
        Self::new()
    }
}

impl SkinningMatrices {
    pub fn new() -> Self {
        Self {
            matrices: Box::new([Mat4::IDENTITY; MAX_SKINNING_MATRICES]),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        MAX_SKINNING_MATRICES
    }

    /// 写入槽位，id 超出容量时返回 false
    #[inline]
    pub fn set(&mut self, id: usize, matrix: Mat4) -> bool {
        match self.matrices.get_mut(id) {
            Some(slot) => {
                *slot = matrix;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn get(&self, id: usize) -> Option<&Mat4> {
        self.matrices.get(id)
    }

    #[inline]
    pub fn as_slice(&self) -> &[Mat4] {
        self.matrices.as_slice()
    }

    /// 全部恢复为单位矩阵
    pub fn reset(&mut self) {
        self.matrices.fill(Mat4::IDENTITY);
    }

    /// 以小端列主序写出全部矩阵
    pub fn write_le_bytes<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_le_bytes())
    }

    /// 小端字节形式：每个矩阵 16 个 f32，按列主序排列
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; SKINNING_BUFFER_BYTES];
        for (matrix, chunk) in self
            .matrices
            .iter()
            .zip(bytes.chunks_exact_mut(SKINNING_MATRIX_BYTES))
        {
            LittleEndian::write_f32_into(&matrix.to_cols_array(), chunk);
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_starts_as_identity() {
        let matrices = SkinningMatrices::new();
        assert_eq!(matrices.as_slice().len(), MAX_SKINNING_MATRICES);
        assert!(matrices.as_slice().iter().all(|m| *m == Mat4::IDENTITY));
    }

    #[test]
    fn test_set_respects_capacity() {
        let mut matrices = SkinningMatrices::new();
        let m = Mat4::from_scale(Vec3::splat(2.0));
        assert!(matrices.set(MAX_SKINNING_MATRICES - 1, m));
        assert!(!matrices.set(MAX_SKINNING_MATRICES, m));
        assert_eq!(matrices.get(MAX_SKINNING_MATRICES - 1), Some(&m));
        assert_eq!(matrices.get(MAX_SKINNING_MATRICES), None);

        matrices.reset();
        assert_eq!(matrices.get(MAX_SKINNING_MATRICES - 1), Some(&Mat4::IDENTITY));
    }

    #[test]
    fn test_byte_layout_is_column_major() {
        let mut matrices = SkinningMatrices::new();
        matrices.set(1, Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));

        let bytes = matrices.to_le_bytes();
        assert_eq!(bytes.len(), SKINNING_BUFFER_BYTES);

        let second = &bytes[SKINNING_MATRIX_BYTES..SKINNING_MATRIX_BYTES * 2];
        let mut values = [0.0f32; 16];
        LittleEndian::read_f32_into(second, &mut values);
        assert_eq!(&values[12..15], &[1.0, 2.0, 3.0]);

        let mut written = Vec::new();
        matrices.write_le_bytes(&mut written).unwrap();
        assert_eq!(written, bytes);
    }

    #[test]
    fn test_writer_appends_after_existing_bytes() {
        let mut matrices = SkinningMatrices::new();
        matrices.set(MAX_SKINNING_MATRICES - 1, Mat4::from_scale(Vec3::splat(3.0)));

        let mut written = vec![0xABu8; 4];
        matrices.write_le_bytes(&mut written).unwrap();
        assert_eq!(written.len(), 4 + SKINNING_BUFFER_BYTES);
        assert_eq!(&written[..4], &[0xABu8; 4]);

        // 最后一个矩阵的第一个元素是 x 缩放
        let last = 4 + SKINNING_BUFFER_BYTES - SKINNING_MATRIX_BYTES;
        assert_eq!(LittleEndian::read_f32(&written[last..last + 4]), 3.0);
        // 单位矩阵槽位的右下角
        assert_eq!(LittleEndian::read_f32(&written[4 + 60..4 + 64]), 1.0);
    }
}
