/// RGB颜色，三个通道均为 [0, 255]
pub type Rgb = [u8; 3];

/// 帧缓冲区实现，存储渲染结果
///
/// 颜色缓冲与深度缓冲尺寸相同，按 `y * width + x` 索引。
/// 每帧开始时整体重置，不跨帧保留任何状态。
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    /// 存储深度值，数值越小表示越近，未写入的像素为正无穷
    pub depth_buffer: Vec<f32>,
    /// 存储RGB颜色值，每像素3字节
    pub color_buffer: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        let num_pixels = width * height;

        let color_buffer = std::iter::repeat_n(background, num_pixels)
            .flatten()
            .collect();

        FrameBuffer {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; num_pixels],
            color_buffer,
        }
    }

    /// 重置颜色缓冲为背景色，深度缓冲为正无穷
    pub fn clear(&mut self, background: Rgb) {
        self.depth_buffer.fill(f32::INFINITY);
        for pixel in self.color_buffer.chunks_exact_mut(3) {
            pixel.copy_from_slice(&background);
        }
    }

    /// 尺寸变化时重新分配缓冲区
    pub fn resize(&mut self, width: usize, height: usize, background: Rgb) {
        if self.width != width || self.height != height {
            *self = FrameBuffer::new(width, height, background);
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[cfg(test)]
    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        self.depth_buffer[self.index(x, y)]
    }

    #[cfg(test)]
    pub fn color_at(&self, x: usize, y: usize) -> Rgb {
        let i = self.index(x, y) * 3;
        [
            self.color_buffer[i],
            self.color_buffer[i + 1],
            self.color_buffer[i + 2],
        ]
    }

    /// 深度测试并写入像素
    ///
    /// 启用深度测试时仅当 `z` 严格小于已存深度才写入（相等时保留先绘制的三角形）；
    /// 关闭时按绘制顺序覆盖。越界坐标直接忽略。返回是否写入。
    #[inline]
    pub fn write_if_closer(&mut self, x: usize, y: usize, z: f32, color: Rgb, depth_test: bool) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = self.index(x, y);
        if depth_test && z >= self.depth_buffer[idx] {
            return false;
        }
        self.depth_buffer[idx] = z;
        self.color_buffer[idx * 3..idx * 3 + 3].copy_from_slice(&color);
        true
    }

    /// 不做深度测试直接写颜色（线框模式使用）
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = self.index(x as usize, y as usize) * 3;
        self.color_buffer[idx..idx + 3].copy_from_slice(&color);
    }

    /// Bresenham画线，超出缓冲区的部分被丢弃
    pub fn draw_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// 获取颜色缓冲区的字节数据
    pub fn get_color_buffer_bytes(&self) -> &[u8] {
        &self.color_buffer
    }

    /// 获取深度缓冲区的浮点数据
    pub fn get_depth_buffer_f32(&self) -> &[f32] {
        &self.depth_buffer
    }

    /// 统计被三角形覆盖过的像素数
    pub fn covered_pixels(&self) -> usize {
        self.depth_buffer.iter().filter(|d| d.is_finite()).count()
    }
}
