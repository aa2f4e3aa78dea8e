pub mod mesh_instance;
pub mod scene_object;

use crate::io::model_loader::load_model;
use crate::io::render_settings::RenderSettings;
use log::info;
use scene_object::SceneObject;

/// 场景：按加载顺序排列的对象集合，绘制顺序与之相同
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new(objects: Vec<SceneObject>) -> Self {
        Self { objects }
    }

    /// 按设置加载全部模型，每个文件对应一个场景对象
    pub fn from_settings(settings: &RenderSettings) -> Result<Self, String> {
        let mut scene = Scene::default();
        for path in &settings.models {
            let mesh = load_model(path, settings.normalize_model)
                .map_err(|e| format!("加载模型 {} 失败: {}", path, e))?;
            scene.add_object(SceneObject::new(mesh, settings.angular_speed, settings.base_yaw));
        }
        info!(
            "场景包含 {} 个对象, 共 {} 个三角形",
            scene.objects.len(),
            scene.total_triangles()
        );
        Ok(scene)
    }

    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    /// 所有对象推进同一时间步
    pub fn advance_animation(&mut self, dt: f32) {
        for object in &mut self.objects {
            object.advance(dt);
        }
    }

    /// 场景中三角形总数
    pub fn total_triangles(&self) -> usize {
        self.objects.iter().map(|o| o.mesh.triangle_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::mesh_instance::MeshInstance;
    use nalgebra::Vector4;

    fn object(triangles: usize, speed: f32) -> SceneObject {
        let tri = [
            Vector4::new(0.0, 0.0, 0.0, 1.0),
            Vector4::new(1.0, 0.0, 0.0, 1.0),
            Vector4::new(0.0, 1.0, 0.0, 1.0),
        ];
        let mesh = MeshInstance::from_triangles("obj", vec![tri; triangles]);
        SceneObject::new(mesh, speed, 180.0)
    }

    #[test]
    fn counts_triangles_across_objects() {
        let scene = Scene::new(vec![object(3, 0.0), object(5, 0.0)]);
        assert_eq!(scene.total_triangles(), 8);
        assert!(Scene::default().is_empty());
    }

    #[test]
    fn animation_advances_every_object() {
        let mut scene = Scene::new(vec![object(1, 90.0), object(1, -90.0)]);
        scene.advance_animation(1.0);
        assert!((scene.objects[0].angular_position - 90.0).abs() < 1e-4);
        assert!((scene.objects[1].angular_position - 270.0).abs() < 1e-4);
    }

    #[test]
    fn missing_model_fails_to_load() {
        let settings = RenderSettings {
            models: vec!["/nonexistent/model.stl".to_string()],
            ..Default::default()
        };
        assert!(Scene::from_settings(&settings).is_err());
    }
}
