use crate::egui_app::state::StatusTone;
use eframe::egui::{
    Color32, Stroke, Visuals,
    epaint::{CornerRadius, Shadow},
    style::WidgetVisuals,
};

const WIDGET_RADIUS: u8 = 3;

/// Dashboard colors. One dark theme; there is no light variant.
#[derive(Clone, Copy)]
pub struct Palette {
    pub surface: Color32,
    pub panel: Color32,
    pub widget: Color32,
    pub widget_hover: Color32,
    pub outline: Color32,
    pub text: Color32,
    pub text_muted: Color32,
    pub accent: Color32,
    pub link: Color32,
    pub warning: Color32,
    pub danger: Color32,
    pub success: Color32,
}

pub fn palette() -> Palette {
    Palette {
        surface: Color32::from_rgb(14, 16, 22),
        panel: Color32::from_rgb(24, 27, 36),
        widget: Color32::from_rgb(38, 43, 56),
        widget_hover: Color32::from_rgb(50, 57, 74),
        outline: Color32::from_rgb(58, 64, 80),
        text: Color32::from_rgb(210, 214, 224),
        text_muted: Color32::from_rgb(142, 150, 168),
        accent: Color32::from_rgb(118, 168, 255),
        link: Color32::from_rgb(150, 200, 255),
        warning: Color32::from_rgb(230, 180, 90),
        danger: Color32::from_rgb(226, 96, 96),
        success: Color32::from_rgb(96, 196, 140),
    }
}

pub fn apply_visuals(visuals: &mut Visuals) {
    let colors = palette();
    visuals.window_fill = colors.panel;
    visuals.panel_fill = colors.surface;
    visuals.extreme_bg_color = colors.surface;
    visuals.faint_bg_color = colors.panel;
    visuals.override_text_color = Some(colors.text);
    visuals.hyperlink_color = colors.link;
    visuals.warn_fg_color = colors.warning;
    visuals.error_fg_color = colors.danger;
    visuals.selection.bg_fill = colors.accent.gamma_multiply(0.35);
    visuals.selection.stroke = Stroke::new(1.0, colors.accent);
    visuals.window_corner_radius = CornerRadius::same(WIDGET_RADIUS * 2);
    visuals.menu_corner_radius = CornerRadius::same(WIDGET_RADIUS);
    visuals.popup_shadow = Shadow::NONE;

    let widgets = &mut visuals.widgets;
    widgets.noninteractive.bg_fill = colors.panel;
    widgets.noninteractive.fg_stroke = Stroke::new(1.0, colors.text);
    widget_state(&mut widgets.inactive, colors.widget, colors.outline, colors.text);
    widget_state(&mut widgets.hovered, colors.widget_hover, colors.accent, colors.text);
    widget_state(&mut widgets.active, colors.widget_hover, colors.accent, colors.accent);
    widget_state(&mut widgets.open, colors.widget, colors.outline, colors.text);
}

fn widget_state(vis: &mut WidgetVisuals, fill: Color32, outline: Color32, text: Color32) {
    vis.corner_radius = CornerRadius::same(WIDGET_RADIUS);
    vis.bg_fill = fill;
    vis.weak_bg_fill = fill;
    vis.bg_stroke = Stroke::new(1.0, outline);
    vis.fg_stroke = Stroke::new(1.0, text);
}

pub fn tone_color(tone: StatusTone) -> Color32 {
    let colors = palette();
    match tone {
        StatusTone::Info => colors.text,
        StatusTone::Busy => colors.link,
        StatusTone::Success => colors.success,
        StatusTone::Warning => colors.warning,
        StatusTone::Error => colors.danger,
    }
}

/// Color for a backend-reported health string.
pub fn health_color(status: &str) -> Color32 {
    if status.eq_ignore_ascii_case("healthy") {
        palette().success
    } else {
        palette().danger
    }
}

pub fn chart_line() -> Stroke {
    Stroke::new(2.0, palette().accent)
}
