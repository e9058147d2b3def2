use crate::backend::LossPoint;
use eframe::egui::{self, Align2, FontId, Pos2, Rect, Sense, Shape};

use super::style;

const CHART_HEIGHT: f32 = 180.0;
const CHART_MARGIN: f32 = 8.0;

/// Loss per epoch as a polyline.
pub(super) fn render(ui: &mut egui::Ui, points: &[LossPoint], total_epochs: u32) {
    let palette = style::palette();
    let width = ui.available_width().max(120.0);
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, CHART_HEIGHT), Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, palette.surface);
    let plot = rect.shrink(CHART_MARGIN);
    let positions = chart_positions(points, total_epochs, plot);
    if positions.len() < 2 {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "Waiting for loss values…",
            FontId::proportional(13.0),
            palette.text_muted,
        );
        return;
    }
    painter.add(Shape::line(positions, style::chart_line()));
    if let Some((min, max)) = loss_range(points) {
        let font = FontId::monospace(11.0);
        painter.text(
            plot.left_top(),
            Align2::LEFT_TOP,
            format!("{max:.4}"),
            font.clone(),
            palette.text_muted,
        );
        painter.text(
            plot.left_bottom(),
            Align2::LEFT_BOTTOM,
            format!("{min:.4}"),
            font,
            palette.text_muted,
        );
    }
}

fn loss_range(points: &[LossPoint]) -> Option<(f64, f64)> {
    let mut finite = points.iter().map(|point| point.loss).filter(|loss| loss.is_finite());
    let first = finite.next()?;
    Some(finite.fold((first, first), |(min, max), loss| (min.min(loss), max.max(loss))))
}

/// Map `(epoch, loss)` pairs into `plot`, epochs left to right and lower loss lower down.
fn chart_positions(points: &[LossPoint], total_epochs: u32, plot: Rect) -> Vec<Pos2> {
    let Some((min, max)) = loss_range(points) else {
        return Vec::new();
    };
    let first_epoch = points.first().map(|point| point.epoch).unwrap_or(0);
    let last_epoch = points
        .iter()
        .map(|point| point.epoch)
        .max()
        .unwrap_or(0)
        .max(total_epochs);
    let epoch_span = last_epoch.saturating_sub(first_epoch).max(1) as f32;
    let loss_span = (max - min).max(f64::EPSILON);
    points
        .iter()
        .filter(|point| point.loss.is_finite())
        .map(|point| {
            let x = (point.epoch.saturating_sub(first_epoch)) as f32 / epoch_span;
            let y = ((point.loss - min) / loss_span) as f32;
            Pos2::new(
                plot.left() + x * plot.width(),
                plot.bottom() - y * plot.height(),
            )
        })
        .collect()
}
