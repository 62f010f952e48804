//! 姿态求值
//!
//! 深度优先（先序）遍历层级，对每个节点：
//! 1. 取静态本地变换
//! 2. 有同名骨骼轨道时用轨道在当前时间的变换替换
//! 3. global = parent * local
//! 4. 在骨骼索引表中时写入 skinning[id] = global * offset
//! 5. 以 global 作为父变换继续处理子节点
//!
//! 使用显式栈而不是递归，输出写入按骨骼 id 索引的蒙皮矩阵缓冲。

use glam::{Mat4, Vec3};

use crate::mesh::SkinningMatrices;
use crate::skeleton::{split_translation, SkeletonNode};

use super::clip::AnimationClip;

/// 根运动提取策略
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RootMotion {
    /// 根骨骼平移保留在姿态中
    #[default]
    Disabled,
    /// 从指定骨骼的本地变换中取出平移，交给所属实体
    ExtractFrom(String),
}

impl RootMotion {
    #[inline]
    pub fn extracts(&self, bone_name: &str) -> bool {
        matches!(self, RootMotion::ExtractFrom(name) if name == bone_name)
    }
}

/// 单次求值结果
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EvaluatedPose {
    /// 提取出的根运动平移（策略关闭或骨骼未出现时为 None）
    pub root_motion: Option<Vec3>,
    /// 写入的蒙皮矩阵数量
    pub matrices_written: usize,
}

/// 在 `time`（tick）处求值整条层级并写入蒙皮矩阵
///
/// 同样的时间、层级与轨道总是得到逐位相同的输出。
pub fn calculate_bone_transform(
    clip: &mut AnimationClip,
    time: f32,
    root_motion: &RootMotion,
    output: &mut SkinningMatrices,
) -> EvaluatedPose {
    let mut pose = EvaluatedPose::default();

    // 分别借用各字段：层级只读，轨道可变
    let AnimationClip {
        root_node,
        bones,
        bone_info_map,
        track_lookup,
        ..
    } = clip;

    let mut stack: Vec<(&SkeletonNode, Mat4)> = vec![(&*root_node, Mat4::IDENTITY)];

    while let Some((node, parent_transform)) = stack.pop() {
        let mut node_transform = node.local_transformation;

        if let Some(&track_index) = track_lookup.get(&node.name) {
            let track = &mut bones[track_index];
            track.update(time);

            if root_motion.extracts(&track.name) {
                pose.root_motion = Some(split_translation(&mut track.local_transform));
            }

            node_transform = track.local_transform;
        }

        let global_transformation = parent_transform * node_transform;

        if let Some(info) = bone_info_map.get(&node.name) {
            if output.set(info.id, global_transformation * info.offset) {
                pose.matrices_written += 1;
            } else {
                log::warn!("[Skinning] 骨骼 '{}' 的 id {} 超出蒙皮缓冲容量", node.name, info.id);
            }
        }

        // 逆序压栈，第一个子节点先处理
        for child in node.children.iter().rev() {
            stack.push((child, global_transformation));
        }
    }

    pose
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{BoneTrack, KeyPosition, KeyRotation};
    use crate::scene::{ImportedAnimation, ImportedChannel, ImportedKey, ImportedNode, MatrixLayout};
    use crate::skeleton::BoneIndexMap;
    use glam::Quat;
    use std::f32::consts::PI;

    fn translated(name: &str, offset: Vec3, children: Vec<ImportedNode>) -> ImportedNode {
        let mut node = ImportedNode::new(name);
        node.transform = Mat4::from_translation(offset).to_cols_array();
        node.children = children;
        node
    }

    fn keyed(name: &str, positions: &[(f32, Vec3)], rotations: &[(f32, Quat)]) -> ImportedChannel {
        ImportedChannel {
            node_name: name.to_string(),
            position_keys: positions
                .iter()
                .map(|&(time, value)| ImportedKey { time, value })
                .collect(),
            rotation_keys: rotations
                .iter()
                .map(|&(time, value)| ImportedKey { time, value })
                .collect(),
        }
    }

    /// root -> spine -> head，root 与 spine 有轨道，head 没有
    fn chain_clip() -> AnimationClip {
        let hierarchy = translated(
            "root",
            Vec3::ZERO,
            vec![translated(
                "spine",
                Vec3::new(0.0, 1.0, 0.0),
                vec![translated("head", Vec3::new(0.0, 0.5, 0.0), vec![])],
            )],
        );

        let mut mesh_bones = BoneIndexMap::new();
        mesh_bones.get_or_insert("root", Mat4::IDENTITY);
        mesh_bones.get_or_insert("spine", Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)));
        mesh_bones.get_or_insert("head", Mat4::from_translation(Vec3::new(0.0, -1.5, 0.0)));

        let animation = ImportedAnimation {
            name: "nod".to_string(),
            duration: 10.0,
            ticks_per_second: 10.0,
            channels: vec![
                keyed(
                    "root",
                    &[(0.0, Vec3::ZERO), (10.0, Vec3::new(4.0, 0.0, 0.0))],
                    &[(0.0, Quat::IDENTITY)],
                ),
                keyed(
                    "spine",
                    &[(0.0, Vec3::new(0.0, 1.0, 0.0))],
                    &[(0.0, Quat::IDENTITY), (10.0, Quat::from_rotation_z(PI * 0.5))],
                ),
            ],
        };

        AnimationClip::from_imported(&animation, &hierarchy, MatrixLayout::ColumnMajor, &mesh_bones)
            .expect("valid clip")
    }

    #[test]
    fn test_untracked_node_inherits_parent_motion() {
        let mut clip = chain_clip();
        let mut output = SkinningMatrices::new();
        let pose = calculate_bone_transform(&mut clip, 5.0, &RootMotion::Disabled, &mut output);
        assert_eq!(pose.matrices_written, 3);
        assert_eq!(pose.root_motion, None);

        let root = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));
        let spine = root * Mat4::from_translation(Vec3::Y) * Mat4::from_quat(Quat::from_rotation_z(PI * 0.25));
        // head 没有轨道，使用静态本地变换
        let head = spine * Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0));

        let head_info = *clip.bone_info_map.get("head").unwrap();
        let expected = head * head_info.offset;
        assert!(output.get(head_info.id).unwrap().abs_diff_eq(expected, 1e-5));

        let spine_info = *clip.bone_info_map.get("spine").unwrap();
        assert!(output
            .get(spine_info.id)
            .unwrap()
            .abs_diff_eq(spine * spine_info.offset, 1e-5));
    }

    #[test]
    fn test_bind_pose_yields_identity_skinning() {
        // 时间 0 时姿态与绑定姿态一致，蒙皮矩阵应为单位矩阵
        let mut clip = chain_clip();
        let mut output = SkinningMatrices::new();
        calculate_bone_transform(&mut clip, 0.0, &RootMotion::Disabled, &mut output);

        for name in ["root", "spine", "head"] {
            let id = clip.bone_info_map.get(name).unwrap().id;
            assert!(output.get(id).unwrap().abs_diff_eq(Mat4::IDENTITY, 1e-6), "bone {name}");
        }
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let mut clip = chain_clip();
        let mut first = SkinningMatrices::new();
        let mut second = SkinningMatrices::new();

        calculate_bone_transform(&mut clip, 3.7, &RootMotion::Disabled, &mut first);
        calculate_bone_transform(&mut clip, 3.7, &RootMotion::Disabled, &mut second);
        assert_eq!(first.as_slice(), second.as_slice());

        // 中间插入其他时间的求值也不影响结果
        calculate_bone_transform(&mut clip, 8.1, &RootMotion::Disabled, &mut second);
        calculate_bone_transform(&mut clip, 3.7, &RootMotion::Disabled, &mut second);
        assert_eq!(first.as_slice(), second.as_slice());
    }

    #[test]
    fn test_root_motion_is_extracted() {
        let mut clip = chain_clip();
        let mut output = SkinningMatrices::new();
        let policy = RootMotion::ExtractFrom("root".to_string());
        let pose = calculate_bone_transform(&mut clip, 5.0, &policy, &mut output);

        let motion = pose.root_motion.expect("root motion");
        assert!(motion.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));

        // 根骨骼原地：蒙皮矩阵不含平移
        let root_id = clip.bone_info_map.get("root").unwrap().id;
        assert!(output.get(root_id).unwrap().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn test_unknown_root_motion_bone_is_ignored() {
        let mut clip = chain_clip();
        let mut output = SkinningMatrices::new();
        let policy = RootMotion::ExtractFrom("pelvis".to_string());
        let pose = calculate_bone_transform(&mut clip, 5.0, &policy, &mut output);
        assert_eq!(pose.root_motion, None);
    }

    #[test]
    fn test_mid_slerp_scenario() {
        let hierarchy = ImportedNode::new("root");
        let mut bones = BoneIndexMap::new();
        bones.get_or_insert("root", Mat4::IDENTITY);

        let animation = ImportedAnimation {
            name: "turn".to_string(),
            duration: 1.0,
            ticks_per_second: 30.0,
            channels: vec![keyed(
                "root",
                &[(0.0, Vec3::ZERO)],
                &[(0.0, Quat::IDENTITY), (1.0, Quat::from_xyzw(0.0, 1.0, 0.0, 0.0))],
            )],
        };
        let mut clip =
            AnimationClip::from_imported(&animation, &hierarchy, MatrixLayout::ColumnMajor, &bones).unwrap();

        let time = clip.advance(0.5 / 30.0);
        assert!((time - 0.5).abs() < 1e-6);

        let mut output = SkinningMatrices::new();
        calculate_bone_transform(&mut clip, time, &RootMotion::Disabled, &mut output);
        assert!(output.get(0).unwrap().abs_diff_eq(Mat4::from_rotation_y(PI * 0.5), 1e-5));
    }

    #[test]
    fn test_hand_built_track_drives_node() {
        let mut clip = chain_clip();
        // 直接替换 root 轨道
        let track = clip.find_bone_mut("root").unwrap();
        *track = BoneTrack::new(
            "root",
            track.id,
            vec![KeyPosition::new(Vec3::new(0.0, 0.0, 3.0), 0.0)],
            vec![KeyRotation::new(Quat::IDENTITY, 0.0)],
        )
        .unwrap();

        let mut output = SkinningMatrices::new();
        calculate_bone_transform(&mut clip, 1.0, &RootMotion::Disabled, &mut output);
        let root_id = clip.bone_info_map.get("root").unwrap().id;
        assert_eq!(
            output.get(root_id).unwrap().w_axis.truncate(),
            Vec3::new(0.0, 0.0, 3.0)
        );
    }
}
