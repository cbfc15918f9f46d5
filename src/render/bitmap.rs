use crate::core::types::SceneRect;
use crate::render::primitives::{BrushStyle, Color, ColorStyle, FillKind};

/// Resolved paint inputs for one filled region.
///
/// `FillKind::Image` has no decoder in this backend-free stage and paints
/// the first color; the file path only travels through the style document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillPaint {
    pub kind: FillKind,
    pub color_style: ColorStyle,
    pub brush_style: BrushStyle,
    pub first_color: Color,
    pub second_color: Color,
    pub opacity: f64,
}

impl FillPaint {
    #[must_use]
    pub fn solid(color: Color) -> Self {
        Self {
            kind: FillKind::Color,
            color_style: ColorStyle::SingleColor,
            brush_style: BrushStyle::Solid,
            first_color: color,
            second_color: Color::BLACK,
            opacity: 1.0,
        }
    }

    /// Color of the pixel at `(x, y)` relative to the region's bounding
    /// rectangle; `None` leaves the pixel untouched (pattern gaps).
    #[must_use]
    pub fn color_at(&self, rect: SceneRect, x: f64, y: f64) -> Option<Color> {
        let base = match self.kind {
            FillKind::Color => self.gradient_at(rect, x, y),
            FillKind::Image => self.first_color,
            FillKind::Pattern => self.pattern_at(x, y)?,
        };
        Some(base.with_alpha(base.alpha * self.opacity.clamp(0.0, 1.0)))
    }

    fn gradient_at(&self, rect: SceneRect, x: f64, y: f64) -> Color {
        if rect.is_empty() {
            return self.first_color;
        }
        let t = match self.color_style {
            ColorStyle::SingleColor => return self.first_color,
            ColorStyle::HorizontalLinearGradient => (x - rect.x) / rect.width,
            ColorStyle::VerticalLinearGradient => (y - rect.y) / rect.height,
            ColorStyle::TopLeftDiagonalLinearGradient => {
                ((x - rect.x) + (y - rect.y)) / (rect.width + rect.height)
            }
            ColorStyle::BottomLeftDiagonalLinearGradient => {
                ((x - rect.x) + (rect.y + rect.height - y)) / (rect.width + rect.height)
            }
            ColorStyle::RadialGradient => {
                let cx = rect.x + rect.width / 2.0;
                let cy = rect.y + rect.height / 2.0;
                let dx = x - cx;
                let dy = y - cy;
                (dx * dx + dy * dy).sqrt() / (rect.width / 2.0)
            }
        };
        self.first_color.lerp(self.second_color, t)
    }

    fn pattern_at(&self, x: f64, y: f64) -> Option<Color> {
        let xi = x.floor() as i64;
        let yi = y.floor() as i64;
        match self.brush_style {
            BrushStyle::Solid => Some(self.first_color),
            BrushStyle::Dense => Some(
                self.first_color
                    .with_alpha(self.first_color.alpha * 0.5),
            ),
            BrushStyle::Horizontal => (yi.rem_euclid(4) == 0).then_some(self.first_color),
            BrushStyle::Vertical => (xi.rem_euclid(4) == 0).then_some(self.first_color),
            BrushStyle::Cross => {
                (xi.rem_euclid(4) == 0 || yi.rem_euclid(4) == 0).then_some(self.first_color)
            }
            BrushStyle::Diagonal => ((xi + yi).rem_euclid(4) == 0).then_some(self.first_color),
        }
    }
}

/// RGBA8 pixel buffer. A zero-size bitmap is a valid, defined empty render
/// state, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn is_zero_sized(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let index = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[index],
            self.pixels[index + 1],
            self.pixels[index + 2],
            self.pixels[index + 3],
        ]
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize * self.width as usize + x as usize) * 4;
        let src_alpha = color.alpha.clamp(0.0, 1.0);
        let to_byte = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        // Source-over blend against whatever was rasterized earlier.
        for (offset, channel) in [color.red, color.green, color.blue].into_iter().enumerate() {
            let dst = f64::from(self.pixels[index + offset]) / 255.0;
            self.pixels[index + offset] = to_byte(channel * src_alpha + dst * (1.0 - src_alpha));
        }
        let dst_alpha = f64::from(self.pixels[index + 3]) / 255.0;
        self.pixels[index + 3] = to_byte(src_alpha + dst_alpha * (1.0 - src_alpha));
    }

    /// Even-odd scanline fill of one polygon given in bitmap coordinates.
    pub fn fill_polygon(&mut self, vertices: &[(f64, f64)], paint: &FillPaint) {
        if vertices.len() < 3 || self.is_zero_sized() {
            return;
        }

        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for (x, y) in vertices {
            x_min = x_min.min(*x);
            x_max = x_max.max(*x);
            y_min = y_min.min(*y);
            y_max = y_max.max(*y);
        }
        let paint_rect = SceneRect::new(x_min, y_min, x_max - x_min, y_max - y_min);

        let row_start = y_min.floor().max(0.0) as u32;
        let row_end = (y_max.ceil() as i64).clamp(0, i64::from(self.height)) as u32;

        let mut crossings: Vec<f64> = Vec::new();
        for row in row_start..row_end {
            let scan_y = f64::from(row) + 0.5;
            crossings.clear();
            for i in 0..vertices.len() {
                let (x1, y1) = vertices[i];
                let (x2, y2) = vertices[(i + 1) % vertices.len()];
                if (y1 <= scan_y && scan_y < y2) || (y2 <= scan_y && scan_y < y1) {
                    crossings.push(x1 + (scan_y - y1) * (x2 - x1) / (y2 - y1));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let col_start = (pair[0] - 0.5).ceil().max(0.0) as u32;
                let col_end = ((pair[1] - 0.5).floor() as i64).min(i64::from(self.width) - 1);
                if col_end < 0 {
                    continue;
                }
                for col in col_start..=col_end as u32 {
                    let px = f64::from(col) + 0.5;
                    if let Some(color) = paint.color_at(paint_rect, px, scan_y) {
                        self.blend_pixel(col, row, color);
                    }
                }
            }
        }
    }

    /// Fills an axis-aligned rectangle given in bitmap coordinates.
    pub fn fill_rect(&mut self, rect: SceneRect, color: Color) {
        if rect.is_empty() || self.is_zero_sized() {
            return;
        }
        let row_start = rect.y.floor().max(0.0) as u32;
        let row_end = ((rect.y + rect.height).ceil() as i64).min(i64::from(self.height));
        let col_start = rect.x.floor().max(0.0) as u32;
        let col_end = ((rect.x + rect.width).ceil() as i64).min(i64::from(self.width));
        for row in row_start..row_end.max(0) as u32 {
            for col in col_start..col_end.max(0) as u32 {
                self.blend_pixel(col, row, color);
            }
        }
    }

    /// Blits `source` onto this bitmap with its top-left corner at
    /// `(origin_x, origin_y)`, source-over blended.
    pub fn draw_bitmap(&mut self, source: &Bitmap, origin_x: f64, origin_y: f64) {
        let base_x = origin_x.round() as i64;
        let base_y = origin_y.round() as i64;
        for row in 0..source.height {
            let target_y = base_y + i64::from(row);
            if target_y < 0 || target_y >= i64::from(self.height) {
                continue;
            }
            for col in 0..source.width {
                let target_x = base_x + i64::from(col);
                if target_x < 0 || target_x >= i64::from(self.width) {
                    continue;
                }
                let [r, g, b, a] = source.pixel(col, row);
                if a == 0 {
                    continue;
                }
                self.blend_pixel(
                    target_x as u32,
                    target_y as u32,
                    Color::rgba(
                        f64::from(r) / 255.0,
                        f64::from(g) / 255.0,
                        f64::from(b) / 255.0,
                        f64::from(a) / 255.0,
                    ),
                );
            }
        }
    }

    /// Deterministic exponential box blur over the whole bitmap.
    ///
    /// `alpha_only` restricts the passes to the alpha channel, which the
    /// selection/hover effect images use. Four directional passes with a
    /// radius-indexed decay table.
    #[must_use]
    pub fn blurred(&self, radius: i32, alpha_only: bool) -> Bitmap {
        const TAB: [i32; 17] = [14, 10, 8, 6, 5, 5, 4, 3, 3, 3, 3, 2, 2, 2, 2, 2, 2];
        if self.is_zero_sized() {
            return self.clone();
        }
        let alpha: i32 = if radius < 1 {
            16
        } else if radius > 17 {
            1
        } else {
            TAB[(radius - 1) as usize]
        };

        let mut result = self.clone();
        let width = self.width as usize;
        let height = self.height as usize;
        let bpl = width * 4;
        let (i1, i2) = if alpha_only { (3_usize, 3_usize) } else { (0_usize, 3_usize) };
        let mut rgba = [0_i32; 4];

        let decay = |accumulator: &mut i32, sample: u8| -> u8 {
            *accumulator += ((i32::from(sample) << 4) - *accumulator) * alpha / 16;
            (*accumulator >> 4) as u8
        };

        // Top to bottom.
        for col in 0..width {
            let mut p = col * 4;
            for i in i1..=i2 {
                rgba[i] = i32::from(result.pixels[p + i]) << 4;
            }
            p += bpl;
            for _ in 1..height {
                for i in i1..=i2 {
                    result.pixels[p + i] = decay(&mut rgba[i], result.pixels[p + i]);
                }
                p += bpl;
            }
        }

        // Left to right.
        for row in 0..height {
            let mut p = row * bpl;
            for i in i1..=i2 {
                rgba[i] = i32::from(result.pixels[p + i]) << 4;
            }
            p += 4;
            for _ in 1..width {
                for i in i1..=i2 {
                    result.pixels[p + i] = decay(&mut rgba[i], result.pixels[p + i]);
                }
                p += 4;
            }
        }

        // Bottom to top.
        for col in 0..width {
            let mut p = (height - 1) * bpl + col * 4;
            for i in i1..=i2 {
                rgba[i] = i32::from(result.pixels[p + i]) << 4;
            }
            for _ in 1..height {
                p -= bpl;
                for i in i1..=i2 {
                    result.pixels[p + i] = decay(&mut rgba[i], result.pixels[p + i]);
                }
            }
        }

        // Right to left.
        for row in 0..height {
            let mut p = row * bpl + (width - 1) * 4;
            for i in i1..=i2 {
                rgba[i] = i32::from(result.pixels[p + i]) << 4;
            }
            for _ in 1..width {
                p -= 4;
                for i in i1..=i2 {
                    result.pixels[p + i] = decay(&mut rgba[i], result.pixels[p + i]);
                }
            }
        }

        result
    }
}
