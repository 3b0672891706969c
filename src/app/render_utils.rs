use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::data::EntityKind;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(15, 20, 30));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(51, 65, 85, 60)),
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(51, 65, 85, 60)),
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// World-space node radius from the dataset size metric.
pub(super) fn node_radius(size: f32) -> f32 {
    4.0 + size * 2.6
}

/// Screen-space radius under the current zoom, kept hittable at far-out
/// zoom levels.
pub(super) fn screen_radius(size: f32, zoom: f32) -> f32 {
    (node_radius(size) * zoom).clamp(2.0, 60.0)
}

/// Fixed entity-kind palette; the legend and every node circle use this.
pub(super) fn kind_color(kind: EntityKind) -> Color32 {
    match kind {
        EntityKind::Person => Color32::from_rgb(0x3b, 0x82, 0xf6),
        EntityKind::Concept => Color32::from_rgb(0xa8, 0x55, 0xf7),
        EntityKind::Organisation => Color32::from_rgb(0xf9, 0x73, 0x16),
        EntityKind::Event => Color32::from_rgb(0xef, 0x44, 0x44),
        EntityKind::Document => Color32::from_rgb(0x10, 0xb9, 0x81),
    }
}
