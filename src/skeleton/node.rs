//! 骨骼层级节点
//!
//! SkeletonNode 镜像导入场景的节点树，包含中间辅助节点。
//! 加载动画时构建一次，之后只读。

use glam::Mat4;

use crate::scene::{ImportedNode, MatrixLayout};

/// 层级节点
///
/// 节点是否为骨骼由名称决定：能在骨骼索引表里找到的节点输出蒙皮矩阵，
/// 能在动画轨道里找到的节点使用动画变换，其余节点只传递静态变换。
#[derive(Clone, Debug, PartialEq)]
pub struct SkeletonNode {
    /// 节点名称（与骨骼轨道、骨骼索引表连接的键）
    pub name: String,
    /// 导入时的静态本地变换（列主序）
    pub local_transformation: Mat4,
    /// 子节点，保持导入顺序
    pub children: Vec<SkeletonNode>,
}

impl Default for SkeletonNode {
    fn default() -> Self {
        Self::new(String::new(), Mat4::IDENTITY)
    }
}

impl SkeletonNode {
    pub fn new(name: impl Into<String>, local_transformation: Mat4) -> Self {
        Self {
            name: name.into(),
            local_transformation,
            children: Vec::new(),
        }
    }

    /// 追加子节点（构建测试层级用）
    pub fn with_child(mut self, child: SkeletonNode) -> Self {
        self.children.push(child);
        self
    }

    /// 从导入节点递归复制
    ///
    /// 纯结构复制：保留名称、子节点顺序，矩阵按源布局转换为列主序。
    pub fn from_imported(src: &ImportedNode, layout: MatrixLayout) -> Self {
        Self {
            name: src.name.clone(),
            local_transformation: layout.to_mat4(&src.transform),
            children: src
                .children
                .iter()
                .map(|child| Self::from_imported(child, layout))
                .collect(),
        }
    }

    /// 按名称查找节点（先序）
    pub fn find(&self, name: &str) -> Option<&SkeletonNode> {
        self.iter().find(|node| node.name == name)
    }

    /// 节点总数（含自身）
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// 层级深度（单节点为 1）
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for child in &node.children {
                stack.push((child, depth + 1));
            }
        }
        max_depth
    }

    /// 先序遍历
    pub fn iter(&self) -> SkeletonIter<'_> {
        SkeletonIter { stack: vec![self] }
    }
}

/// 先序遍历迭代器（显式栈，不递归）
pub struct SkeletonIter<'a> {
    stack: Vec<&'a SkeletonNode>,
}

impl<'a> Iterator for SkeletonIter<'a> {
    type Item = &'a SkeletonNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // 逆序压栈，保证第一个子节点先出栈
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn imported(name: &str, transform: [f32; 16], children: Vec<ImportedNode>) -> ImportedNode {
        ImportedNode {
            name: name.to_string(),
            transform,
            meshes: Vec::new(),
            children,
        }
    }

    const IDENTITY: [f32; 16] = [
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ];

    #[test]
    fn test_from_imported_preserves_names_and_order() {
        let src = imported(
            "Root",
            IDENTITY,
            vec![
                imported("A", IDENTITY, vec![imported("A1", IDENTITY, vec![])]),
                imported("B", IDENTITY, vec![]),
            ],
        );
        let node = SkeletonNode::from_imported(&src, MatrixLayout::ColumnMajor);

        let names: Vec<&str> = node.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["Root", "A", "A1", "B"]);
        assert_eq!(node.node_count(), 4);
        assert_eq!(node.depth(), 3);
    }

    #[test]
    fn test_row_major_translation_is_converted() {
        // 行主序：平移位于每行最后一列
        let row_major = [
            1.0, 0.0, 0.0, 5.0,
            0.0, 1.0, 0.0, 6.0,
            0.0, 0.0, 1.0, 7.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        let node = SkeletonNode::from_imported(&imported("Hip", row_major, vec![]), MatrixLayout::RowMajor);
        assert_eq!(node.local_transformation, Mat4::from_translation(Vec3::new(5.0, 6.0, 7.0)));
    }

    #[test]
    fn test_find() {
        let root = SkeletonNode::new("root", Mat4::IDENTITY)
            .with_child(SkeletonNode::new("spine", Mat4::IDENTITY)
                .with_child(SkeletonNode::new("head", Mat4::IDENTITY)));
        assert!(root.find("head").is_some());
        assert!(root.find("tail").is_none());
    }
}
