use crate::core::frame_buffer::{FrameBuffer, Rgb};
use nalgebra::{Point3, Vector3};

// ===== 扫描线填充 =====

/// 边的逐行增量 `(dx/dy, 1, dz/dy)`；水平边增量为零
fn edge_delta(from: &Point3<f32>, to: &Point3<f32>) -> Vector3<f32> {
    let dy = to.y - from.y;
    if dy != 0.0 {
        Vector3::new((to.x - from.x) / dy, 1.0, (to.z - from.z) / dy)
    } else {
        Vector3::zeros()
    }
}

/// 扫描线填充一个屏幕空间三角形
///
/// 顶点为 (x, y, depth)。按y排序后分上下两半逐行填充，
/// 每个像素执行深度测试。返回实际写入的像素数。
pub fn fill_triangle(
    frame_buffer: &mut FrameBuffer,
    triangle: &[Point3<f32>; 3],
    color: Rgb,
    depth_test: bool,
) -> usize {
    if triangle.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
        return 0;
    }

    let mut sorted = *triangle;
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y));
    let [a, b, c] = sorted;

    let ab = edge_delta(&a, &b);
    let bc = edge_delta(&b, &c);
    let ac = edge_delta(&a, &c);

    // 每个整数行只属于一半：B所在行归上半部分
    let mut written = 0;
    let mut next_row = pixel_row(a.y);
    if b.y > a.y {
        let last = pixel_row(b.y);
        written += fill_half(
            frame_buffer,
            next_row,
            last,
            (&a, &ab),
            (&a, &ac),
            (a.y, b.y),
            color,
            depth_test,
        );
        next_row = last + 1;
    }
    if c.y > b.y {
        let last = pixel_row(c.y);
        written += fill_half(
            frame_buffer,
            next_row,
            last,
            (&b, &bc),
            (&a, &ac),
            (b.y, c.y),
            color,
            depth_test,
        );
    }
    written
}

/// 坐标y所在的像素行（行r覆盖 (r-0.5, r+0.5]）
fn pixel_row(y: f32) -> i64 {
    // 先钳制再转整数，远离屏幕的顶点不会溢出
    (y - 0.5).ceil().clamp(-1.0e9, 1.0e9) as i64
}

/// 按整数行 `first..=last` 填充半个三角形
///
/// 两条边各由起点和逐行增量给出，每行在 `y = row` 处直接求交点
/// （钳制到本半部分的y范围），不累加浮点步长。
#[allow(clippy::too_many_arguments)]
fn fill_half(
    frame_buffer: &mut FrameBuffer,
    first: i64,
    last: i64,
    (p0, dp): (&Point3<f32>, &Vector3<f32>),
    (q0, dq): (&Point3<f32>, &Vector3<f32>),
    (y_min, y_max): (f32, f32),
    color: Rgb,
    depth_test: bool,
) -> usize {
    // 直接跳过屏幕外的行
    let first = first.max(0);
    let last = last.min(frame_buffer.height as i64 - 1);
    let mut written = 0;

    for row in first..=last {
        let y = (row as f32).clamp(y_min, y_max);
        let on_p = p0 + dp * (y - p0.y);
        let on_q = q0 + dq * (y - q0.y);
        written += fill_row(frame_buffer, row as usize, &on_p, &on_q, color, depth_test);
    }
    written
}

fn fill_row(
    frame_buffer: &mut FrameBuffer,
    row: usize,
    p: &Point3<f32>,
    q: &Point3<f32>,
    color: Rgb,
    depth_test: bool,
) -> usize {
    let (left, right) = if p.x <= q.x { (p, q) } else { (q, p) };
    if left.x.round() == right.x.round() {
        return 0;
    }
    fill_span(frame_buffer, row, left, right, color, depth_test)
}

/// 填充水平跨度 [left, right)，深度沿x线性插值
fn fill_span(
    frame_buffer: &mut FrameBuffer,
    row: usize,
    left: &Point3<f32>,
    right: &Point3<f32>,
    color: Rgb,
    depth_test: bool,
) -> usize {
    let width = right.x - left.x;
    let dz = if width != 0.0 {
        (right.z - left.z) / width
    } else {
        0.0
    };

    let x_start = left.x.round().max(0.0);
    let x_end = right.x.round().min(frame_buffer.width as f32);
    if x_start >= x_end {
        return 0;
    }

    let mut z = left.z + dz * (x_start - left.x);
    let mut written = 0;
    for x in x_start as usize..x_end as usize {
        if frame_buffer.write_if_closer(x, row, z, color, depth_test) {
            written += 1;
        }
        z += dz;
    }
    written
}

// ===== 线框 =====

/// 绘制三角形轮廓（线框模式），不做深度测试
pub fn draw_triangle_outline(frame_buffer: &mut FrameBuffer, triangle: &[Point3<f32>; 3], color: Rgb) {
    for i in 0..3 {
        let from = &triangle[i];
        let to = &triangle[(i + 1) % 3];
        if let Some((x0, y0, x1, y1)) = clip_segment(frame_buffer, from, to) {
            frame_buffer.draw_line(x0, y0, x1, y1, color);
        }
    }
}

/// Liang-Barsky 裁剪到缓冲区范围内，避免在屏幕外逐点画线
fn clip_segment(
    frame_buffer: &FrameBuffer,
    from: &Point3<f32>,
    to: &Point3<f32>,
) -> Option<(i64, i64, i64, i64)> {
    if frame_buffer.width == 0 || frame_buffer.height == 0 {
        return None;
    }
    if ![from.x, from.y, to.x, to.y].iter().all(|c| c.is_finite()) {
        return None;
    }

    let max_x = (frame_buffer.width - 1) as f32;
    let max_y = (frame_buffer.height - 1) as f32;
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    let mut t0: f32 = 0.0;
    let mut t1: f32 = 1.0;
    let edges = [
        (-dx, from.x),
        (dx, max_x - from.x),
        (-dy, from.y),
        (dy, max_y - from.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((
        (from.x + dx * t0).round() as i64,
        (from.y + dy * t0).round() as i64,
        (from.x + dx * t1).round() as i64,
        (from.y + dy * t1).round() as i64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = [0, 0, 0];
    const RED: Rgb = [200, 0, 0];
    const BLUE: Rgb = [0, 0, 200];

    fn p(x: f32, y: f32, z: f32) -> Point3<f32> {
        Point3::new(x, y, z)
    }

    #[test]
    fn right_triangle_fills_top_left_quadrant() {
        let mut fb = FrameBuffer::new(100, 100, BG);
        let tri = [p(0.0, 0.0, -50.0), p(50.0, 0.0, -50.0), p(0.0, 50.0, -50.0)];
        let written = fill_triangle(&mut fb, &tri, RED, true);
        assert!(written > 1000);

        assert_eq!(fb.color_at(10, 10), RED);
        assert_eq!(fb.depth_at(10, 10), -50.0);
        assert_eq!(fb.color_at(0, 0), RED);
        // 斜边外侧与其余象限保持背景
        assert_eq!(fb.color_at(45, 45), BG);
        assert_eq!(fb.color_at(60, 60), BG);
        assert_eq!(fb.color_at(10, 80), BG);
        for y in 0..100 {
            for x in 0..100 {
                if x >= 51 || y >= 51 {
                    assert!(fb.depth_at(x, y).is_infinite(), "({x},{y}) 不应被覆盖");
                }
            }
        }
    }

    #[test]
    fn vertex_order_does_not_matter() {
        let tri = [p(5.0, 2.0, 1.0), p(30.0, 18.0, 1.0), p(12.0, 35.0, 1.0)];
        let mut reference = FrameBuffer::new(40, 40, BG);
        fill_triangle(&mut reference, &tri, RED, true);

        let permutations = [[0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for perm in permutations {
            let mut fb = FrameBuffer::new(40, 40, BG);
            let shuffled = [tri[perm[0]], tri[perm[1]], tri[perm[2]]];
            fill_triangle(&mut fb, &shuffled, RED, true);
            assert_eq!(fb.color_buffer, reference.color_buffer);
        }
    }

    #[test]
    fn nearer_triangle_wins_in_any_order() {
        let far = [p(2.0, 2.0, 1.0), p(38.0, 4.0, 1.0), p(10.0, 36.0, 1.0)];
        let near = [p(2.0, 2.0, 0.0), p(38.0, 4.0, 0.0), p(10.0, 36.0, 0.0)];

        let mut far_first = FrameBuffer::new(40, 40, BG);
        fill_triangle(&mut far_first, &far, RED, true);
        fill_triangle(&mut far_first, &near, BLUE, true);

        let mut near_first = FrameBuffer::new(40, 40, BG);
        fill_triangle(&mut near_first, &near, BLUE, true);
        fill_triangle(&mut near_first, &far, RED, true);

        assert_eq!(far_first.color_buffer, near_first.color_buffer);
        assert!(far_first.covered_pixels() > 0);
        for y in 0..40 {
            for x in 0..40 {
                if far_first.depth_at(x, y).is_finite() {
                    assert_eq!(far_first.color_at(x, y), BLUE);
                    assert_eq!(far_first.depth_at(x, y), 0.0);
                }
            }
        }
    }

    #[test]
    fn intersecting_triangles_resolve_per_pixel() {
        // 左侧RED更近，右侧BLUE更近
        let red = [p(0.0, 0.0, 0.0), p(40.0, 0.0, 10.5), p(0.0, 40.0, 0.0)];
        let blue = [p(0.0, 0.0, 5.0), p(40.0, 0.0, 5.0), p(0.0, 40.0, 5.0)];
        let mut a = FrameBuffer::new(40, 40, BG);
        fill_triangle(&mut a, &red, RED, true);
        fill_triangle(&mut a, &blue, BLUE, true);
        let mut b = FrameBuffer::new(40, 40, BG);
        fill_triangle(&mut b, &blue, BLUE, true);
        fill_triangle(&mut b, &red, RED, true);

        assert_eq!(a.color_buffer, b.color_buffer);
        assert_eq!(a.color_at(3, 5), RED);
        assert_eq!(a.color_at(30, 2), BLUE);
    }

    #[test]
    fn depth_is_interpolated_across_span() {
        let mut fb = FrameBuffer::new(20, 20, BG);
        let tri = [p(0.0, 0.0, 0.0), p(20.0, 0.0, 20.0), p(0.0, 20.0, 0.0)];
        fill_triangle(&mut fb, &tri, RED, true);
        let d0 = fb.depth_at(0, 2);
        let d5 = fb.depth_at(5, 2);
        let d10 = fb.depth_at(10, 2);
        assert!(d0 < d5 && d5 < d10);
        assert!((d5 - 5.0).abs() < 1e-3);
    }

    fn row_coverage(fb: &FrameBuffer) -> Vec<usize> {
        (0..fb.height)
            .map(|y| (0..fb.width).filter(|&x| fb.depth_at(x, y).is_finite()).count())
            .collect()
    }

    #[test]
    fn fractional_vertices_leave_no_gap_at_middle_row() {
        // A、C的小数部分向相反方向舍入，B恰好落在整数行
        let mut fb = FrameBuffer::new(40, 40, BG);
        let tri = [p(20.0, 0.45, 0.0), p(0.0, 10.0, 0.0), p(39.0, 20.55, 0.0)];
        fill_triangle(&mut fb, &tri, RED, true);

        let rows = row_coverage(&fb);
        for (y, &count) in rows.iter().enumerate().take(21).skip(1) {
            assert!(count > 0, "第 {y} 行为空: {rows:?}");
        }
        assert!(rows[10] >= rows[9].min(rows[11]), "{rows:?}");
        assert!(rows[22..].iter().all(|&c| c == 0), "{rows:?}");
    }

    #[test]
    fn middle_row_is_written_once_without_depth_test() {
        let mut fb = FrameBuffer::new(40, 40, BG);
        let tri = [p(20.0, 0.45, 0.0), p(0.0, 10.0, 0.0), p(39.0, 20.55, 0.0)];
        let written = fill_triangle(&mut fb, &tri, RED, false);
        assert_eq!(written, fb.covered_pixels());

        let mut integer = FrameBuffer::new(40, 40, BG);
        let tri = [p(5.0, 2.0, 1.0), p(30.0, 18.0, 1.0), p(12.0, 35.0, 1.0)];
        let written = fill_triangle(&mut integer, &tri, RED, false);
        assert_eq!(written, integer.covered_pixels());
    }

    #[test]
    fn far_offscreen_vertex_still_reaches_visible_rows() {
        let mut fb = FrameBuffer::new(10, 10, BG);
        let tri = [p(0.0, -1e8, 0.0), p(0.0, 9.0, 0.0), p(10.0, 9.0, 0.0)];
        fill_triangle(&mut fb, &tri, RED, true);
        for y in 0..10 {
            assert_eq!(fb.color_at(5, y), RED, "第 {y} 行未被填充: {:?}", row_coverage(&fb));
        }
    }

    #[test]
    fn horizontal_sliver_draws_nothing() {
        let mut fb = FrameBuffer::new(10, 10, BG);
        let tri = [p(1.0, 4.0, 0.0), p(8.0, 4.0, 0.0), p(5.0, 4.0, 0.0)];
        assert_eq!(fill_triangle(&mut fb, &tri, RED, true), 0);
        assert_eq!(fb.covered_pixels(), 0);
    }

    #[test]
    fn offscreen_and_partially_visible_triangles_are_clipped() {
        let mut fb = FrameBuffer::new(10, 10, BG);
        let tri = [p(-50.0, -50.0, 0.0), p(60.0, -40.0, 0.0), p(5.0, 80.0, 0.0)];
        fill_triangle(&mut fb, &tri, RED, true);
        assert!(fb.covered_pixels() > 0);

        let mut untouched = FrameBuffer::new(10, 10, BG);
        let away = [p(100.0, 100.0, 0.0), p(200.0, 120.0, 0.0), p(150.0, 300.0, 0.0)];
        assert_eq!(fill_triangle(&mut untouched, &away, RED, true), 0);
    }

    #[test]
    fn huge_and_non_finite_coordinates_terminate() {
        let mut fb = FrameBuffer::new(16, 16, BG);
        let huge = [p(-1e30, -1e30, 0.0), p(1e30, 0.0, 0.0), p(0.0, 1e30, 0.0)];
        fill_triangle(&mut fb, &huge, RED, true);
        let nan = [p(f32::NAN, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 5.0, 0.0)];
        assert_eq!(fill_triangle(&mut fb, &nan, RED, true), 0);
        draw_triangle_outline(&mut fb, &huge, BLUE);
    }

    #[test]
    fn outline_stays_inside_buffer() {
        let mut fb = FrameBuffer::new(10, 10, BG);
        let tri = [p(1.0, 1.0, 0.0), p(8.0, 1.0, 0.0), p(1.0, 8.0, 0.0)];
        draw_triangle_outline(&mut fb, &tri, [255, 255, 255]);
        assert_eq!(fb.color_at(1, 1), [255, 255, 255]);
        assert_eq!(fb.color_at(8, 1), [255, 255, 255]);
        assert_eq!(fb.color_at(4, 1), [255, 255, 255]);
        // 内部保持空
        assert_eq!(fb.color_at(3, 3), BG);

        let mut clipped = FrameBuffer::new(10, 10, BG);
        let crossing = [p(-20.0, 5.0, 0.0), p(30.0, 5.0, 0.0), p(5.0, 5.0, 0.0)];
        draw_triangle_outline(&mut clipped, &crossing, [255, 255, 255]);
        assert_eq!(clipped.color_at(0, 5), [255, 255, 255]);
        assert_eq!(clipped.color_at(9, 5), [255, 255, 255]);
    }
}
