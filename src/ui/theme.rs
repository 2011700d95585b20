use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

pub const BG_BLACK: Color32 = Color32::from_rgb(0, 0, 0);
pub const BG_PANEL: Color32 = Color32::from_rgb(8, 10, 14);
pub const BG_WIDGET: Color32 = Color32::from_rgb(18, 22, 30);
pub const BG_WIDGET_HOVER: Color32 = Color32::from_rgb(28, 34, 46);
pub const BG_WIDGET_ACTIVE: Color32 = Color32::from_rgb(38, 46, 62);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(172, 176, 184);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(104, 110, 120);
pub const TEXT_BRIGHT: Color32 = Color32::from_rgb(224, 228, 234);

pub const ACCENT_BLUE: Color32 = Color32::from_rgb(64, 112, 230);
pub const ACCENT_GREEN: Color32 = Color32::from_rgb(52, 176, 84);
pub const ACCENT_YELLOW: Color32 = Color32::from_rgb(214, 190, 48);
pub const ACCENT_ORANGE: Color32 = Color32::from_rgb(200, 128, 40);
pub const ACCENT_RED: Color32 = Color32::from_rgb(190, 48, 48);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgba_premultiplied(40, 52, 90, 80);

fn widget(bg: Color32, stroke: Stroke, fg: Color32, expansion: f32) -> egui::style::WidgetVisuals {
    egui::style::WidgetVisuals {
        bg_fill: bg,
        weak_bg_fill: bg,
        bg_stroke: stroke,
        rounding: Rounding::same(3.0),
        fg_stroke: Stroke::new(1.0, fg),
        expansion,
    }
}

pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.widgets.noninteractive = widget(BG_PANEL, Stroke::new(1.0, BORDER_SUBTLE), TEXT_MUTED, 0.0);
    visuals.widgets.inactive = widget(BG_WIDGET, Stroke::new(1.0, BORDER_SUBTLE), TEXT_PRIMARY, 0.0);
    visuals.widgets.hovered = widget(BG_WIDGET_HOVER, Stroke::new(1.0, ACCENT_BLUE), TEXT_BRIGHT, 1.0);
    visuals.widgets.active = widget(BG_WIDGET_ACTIVE, Stroke::new(2.0, ACCENT_BLUE), TEXT_BRIGHT, 1.0);
    visuals.widgets.open = widget(BG_WIDGET_ACTIVE, Stroke::new(1.0, ACCENT_BLUE), TEXT_BRIGHT, 0.0);
    visuals.selection = egui::style::Selection {
        bg_fill: ACCENT_BLUE.gamma_multiply(0.4),
        stroke: Stroke::new(1.0, ACCENT_BLUE),
    };
    visuals.extreme_bg_color = BG_BLACK;
    visuals.warn_fg_color = ACCENT_ORANGE;
    visuals.error_fg_color = ACCENT_RED;
    visuals.window_fill = BG_PANEL;
    visuals.panel_fill = BG_PANEL;
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.slider_trailing_fill = true;
    style.visuals = visuals;

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    style.spacing.slider_width = 190.0;

    style.text_styles = [
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(18.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace)),
    ]
    .into();

    ctx.set_style(style);
}
