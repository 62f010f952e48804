//! 动画片段检查工具
//!
//! 用法: clip_inspect <模型> <动画> [秒数] [帧率]
//!
//! 加载模型与动画，按固定帧间隔驱动若干帧，输出片段与蒙皮结果摘要。

use std::process::ExitCode;

use skin_anim::render::StagingBackend;
use skin_anim::scene::DrawableRegistry;
use skin_anim::{
    AnimationConfig, AnimationDriver, Drawable, GltfImporter, MeshStore, SkinnedMeshLoader,
};

const DEFAULT_SECONDS: f32 = 2.0;
const DEFAULT_FPS: f32 = 60.0;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("用法: {} <模型> <动画> [秒数] [帧率]", args[0]);
        return ExitCode::from(2);
    }

    let seconds = parse_arg(&args, 3, DEFAULT_SECONDS);
    let fps = parse_arg(&args, 4, DEFAULT_FPS);

    let config = AnimationConfig {
        debug_log: true,
        ..Default::default()
    };
    let importer = GltfImporter::from_config(&config);
    let mesh = SkinnedMeshLoader::new(&importer, &config).load(&args[1], &args[2]);

    log::info!(
        "[Inspect] 网格: {} 个子网格, {} 个顶点, 包围盒 {:?}",
        mesh.mesh.submeshes.len(),
        mesh.mesh.vertex_count(),
        mesh.mesh.bounds()
    );

    let mut registry = DrawableRegistry::new();
    let mut driver = AnimationDriver::new();
    let mut backend = StagingBackend::new();

    let handle = registry.reserve();
    let registered = driver.register(handle, &mesh);
    registry.insert(handle, Drawable::Skinned(mesh));

    if !registered {
        log::error!("[Inspect] 动画片段加载失败，未注册到驱动器");
        return ExitCode::FAILURE;
    }

    let frames = (seconds * fps).round().max(1.0) as usize;
    let delta = 1.0 / fps;
    for _ in 0..frames {
        driver.update_animations(delta, &mut registry, &mut backend);
    }

    let position = registry.entity_position(handle);
    let Some(mesh) = registry.skinned_mesh_mut(handle) else {
        return ExitCode::FAILURE;
    };
    let clip = mesh.clip();
    log::info!(
        "[Inspect] 片段 '{}': 时长 {} tick ({:.3} 秒), {} tick/s, {} 条轨道, {} 根骨骼, 层级 {} 个节点（深度 {}）",
        clip.name,
        clip.duration,
        clip.duration_seconds(),
        clip.ticks_per_second,
        clip.track_count(),
        clip.bone_info_map.len(),
        clip.root_node.node_count(),
        clip.root_node.depth()
    );
    log::info!(
        "[Inspect] {} 帧后时间 {:.3} tick, 上传 {} 次, 实体位置 {:?}",
        frames,
        clip.current_time,
        backend.upload_count(),
        position
    );

    for (id, name) in clip.bone_info_map.names_by_id().iter().enumerate().take(8) {
        if let Some(matrix) = mesh.matrices().get(id) {
            let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
            log::info!(
                "[Inspect] 骨骼 {:>3} '{}': T={:?} R={:?} S={:?}",
                id,
                name,
                translation,
                rotation,
                scale
            );
        }
    }

    ExitCode::SUCCESS
}

fn parse_arg(args: &[String], index: usize, default: f32) -> f32 {
    match args.get(index).map(|s| s.parse::<f32>()) {
        Some(Ok(value)) if value > 0.0 => value,
        Some(_) => {
            log::warn!("[Inspect] 参数 '{}' 无效，使用默认值 {}", args[index], default);
            default
        }
        None => default,
    }
}
