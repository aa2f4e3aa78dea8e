use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

/// 变换矩阵工厂，提供创建各种变换矩阵的静态方法
///
/// 所有矩阵都作用于列向量，组合顺序为从右到左：
/// `screen_transform = ScreenProjection · Rotation · CentroidShift`
pub struct TransformFactory;

impl TransformFactory {
    /// 创建偏航-俯仰-滚转旋转矩阵（输入为角度制）
    ///
    /// 偏航绕Z轴，俯仰绕Y轴，滚转绕X轴，返回 `Yaw · Pitch · Roll`。
    /// 左上角3×3子块对任意输入都是正交矩阵且行列式为1。
    pub fn rotation(yaw_deg: f32, pitch_deg: f32, roll_deg: f32) -> Matrix4<f32> {
        let (sa, ca) = yaw_deg.to_radians().sin_cos();
        let (sb, cb) = pitch_deg.to_radians().sin_cos();
        let (sg, cg) = roll_deg.to_radians().sin_cos();

        #[rustfmt::skip]
        let yaw = Matrix4::new(
            ca, -sa, 0.0, 0.0,
            sa,  ca, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        #[rustfmt::skip]
        let pitch = Matrix4::new(
             cb, 0.0,  sb, 0.0,
            0.0, 1.0, 0.0, 0.0,
            -sb, 0.0,  cb, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        #[rustfmt::skip]
        let roll = Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0,  cg, -sg, 0.0,
            0.0,  sg,  cg, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        yaw * pitch * roll
    }

    /// 创建平移矩阵
    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(translation)
    }

    /// 创建正交投影到屏幕的矩阵
    ///
    /// 先按相机位置反向平移，再把正交盒尺寸缩放到画布像素尺寸。
    /// `box_dims` 的任一分量为0时结果未定义，由调用方保证。
    pub fn orthographic_to_screen(
        box_dims: &Vector3<f32>,
        canvas_dims: &Vector3<f32>,
        camera_pos: &Vector3<f32>,
    ) -> Matrix4<f32> {
        let scale = Matrix4::new_nonuniform_scaling(&canvas_dims.component_div(box_dims));
        scale * Self::translation(&-camera_pos)
    }

    /// NDC到屏幕的视口矩阵：x、y 从 [-1,1] 映射到 [0,width]、[0,height]，z不变
    pub fn ndc_to_screen(width: f32, height: f32) -> Matrix4<f32> {
        let half_w = width * 0.5;
        let half_h = height * 0.5;

        #[rustfmt::skip]
        let viewport = Matrix4::new(
            half_w, 0.0, 0.0, half_w,
            0.0, half_h, 0.0, half_h,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        viewport
    }

    /// 透视到NDC的矩阵
    ///
    /// `f = 1/tan(fov/2)` 同时作为近平面距离，`l = z_far/(z_far - f)`。
    /// 变换后 w 分量等于相机空间的 z。
    pub fn perspective_to_ndc(aspect_ratio: f32, fov_rad: f32, z_far: f32) -> Matrix4<f32> {
        let f = Self::focal_length(fov_rad);
        let l = z_far / (z_far - f);

        #[rustfmt::skip]
        let projection = Matrix4::new(
            f / aspect_ratio, 0.0, 0.0, 0.0,
            0.0, f, 0.0, 0.0,
            0.0, 0.0, l, -l * f,
            0.0, 0.0, 1.0, 0.0,
        );
        projection
    }

    /// 创建透视投影到屏幕的矩阵：`Viewport · PerspToNdc · Translate(-camera)`
    ///
    /// 前置条件（不做运行时检查）：`fov_rad` 在 (0, π) 内，且 `z_far` 大于焦距 f。
    pub fn perspective_to_screen(
        canvas_dims: &Vector2<f32>,
        fov_rad: f32,
        z_far: f32,
        camera_pos: &Vector3<f32>,
    ) -> Matrix4<f32> {
        let aspect_ratio = canvas_dims.x / canvas_dims.y;
        Self::ndc_to_screen(canvas_dims.x, canvas_dims.y)
            * Self::perspective_to_ndc(aspect_ratio, fov_rad, z_far)
            * Self::translation(&-camera_pos)
    }

    /// 由视场角计算焦距 `1/tan(fov/2)`
    pub fn focal_length(fov_rad: f32) -> f32 {
        1.0 / (fov_rad * 0.5).tan()
    }
}

/// 透视除法；w 恰好为0时保持顶点不变（无穷远点，不视为错误）
pub fn perspective_divide(v: &Vector4<f32>) -> Vector4<f32> {
    if v.w != 0.0 { v / v.w } else { *v }
}
