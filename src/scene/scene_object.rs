use crate::geometry::transform::TransformFactory;
use crate::scene::mesh_instance::MeshInstance;
use crate::utils::animation_utils::advance_angle;
use nalgebra::Matrix4;

/// 场景对象：不可变网格 + 每帧变化的动画状态
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub mesh: MeshInstance,
    /// 当前角位置（度），始终位于 [0, 360)
    pub angular_position: f32,
    /// 角速度（度/秒）
    pub angular_speed: f32,
    /// 固定偏航角（度）
    pub base_yaw: f32,
}

impl SceneObject {
    pub fn new(mesh: MeshInstance, angular_speed: f32, base_yaw: f32) -> Self {
        Self {
            mesh,
            angular_position: 0.0,
            angular_speed,
            base_yaw,
        }
    }

    /// 推进 `dt` 秒的动画
    pub fn advance(&mut self, dt: f32) {
        self.angular_position = advance_angle(self.angular_position, self.angular_speed, dt);
    }

    /// 本帧旋转矩阵：固定偏航，俯仰与滚转都取当前角位置
    pub fn rotation(&self) -> Matrix4<f32> {
        TransformFactory::rotation(self.base_yaw, self.angular_position, self.angular_position)
    }
}
