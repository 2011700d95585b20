use egui::{Color32, Context, RichText, ScrollArea, Ui};
use glam::Vec2;

use crate::math::MAX_STEPS;
use crate::scene::ViewMode;
use crate::texture::{TextureKind, TextureSet, TextureStatus};
use crate::ui::state::{FrameStats, UiState};
use crate::ui::theme::*;

#[derive(Default)]
pub struct UiActions {
    pub zoom_in: bool,
    pub zoom_out: bool,
    pub reset_view: bool,
    pub reload_textures: bool,
}

pub fn draw_side_panel(
    ctx: &Context,
    state: &mut UiState,
    stats: &FrameStats,
    textures: &TextureSet,
    last_error: &Option<String>,
) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("control_panel")
        .min_width(300.0)
        .max_width(400.0)
        .default_width(320.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(16.0))
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading(RichText::new("RIPPLE 3D").strong());
                ui.add_space(4.0);
                ui.label(RichText::new("Rippled disk with textured lighting").color(TEXT_MUTED).size(11.0));
                ui.add_space(16.0);

                section_header(ui, "SURFACE");
                egui::Grid::new("surface_params").num_columns(2).spacing([8.0, 6.0]).show(ui, |ui| {
                    ui.label("Circles");
                    ui.add(egui::Slider::new(&mut state.params.circle_count, 1..=MAX_STEPS));
                    ui.end_row();

                    ui.label("Segments");
                    ui.add(egui::Slider::new(&mut state.params.segments_count, 1..=MAX_STEPS));
                    ui.end_row();
                });
                ui.checkbox(&mut state.params.show_wireframe, "Wireframe");
                ui.add_space(16.0);

                section_header(ui, "TEXTURE");
                ui.horizontal(|ui| {
                    ui.label("Angle");
                    ui.add(egui::Slider::new(&mut state.params.angle_deg, 0.0..=360.0).suffix("°"));
                });
                ui.label(
                    RichText::new(format!(
                        "Center: ({:.2}, {:.2})",
                        state.params.uv_center.x, state.params.uv_center.y
                    ))
                    .color(TEXT_MUTED)
                    .size(11.0),
                );
                texture_status(ui, textures);
                if ui.button("Reload textures").clicked() {
                    actions.reload_textures = true;
                }
                ui.add_space(16.0);

                section_header(ui, "LIGHT");
                egui::Grid::new("light_params").num_columns(2).spacing([8.0, 6.0]).show(ui, |ui| {
                    ui.label("U");
                    ui.add(egui::Slider::new(&mut state.params.light_u, 0.0..=360.0).suffix("°"));
                    ui.end_row();

                    ui.label("V");
                    ui.add(egui::Slider::new(&mut state.params.light_v, 0.0..=180.0).suffix("°"));
                    ui.end_row();
                });
                ui.add_space(16.0);

                ui.separator();
                ui.add_space(12.0);

                section_header(ui, "VIEW");
                ui.horizontal(|ui| {
                    view_button(ui, &mut state.params.view_mode, ViewMode::Surface, "Surface");
                    view_button(ui, &mut state.params.view_mode, ViewMode::Uv, "UV");
                });
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    if ui.button("Zoom +").clicked() {
                        actions.zoom_in = true;
                    }
                    if ui.button("Zoom -").clicked() {
                        actions.zoom_out = true;
                    }
                    if ui.button("Reset").clicked() {
                        actions.reset_view = true;
                    }
                });
                ui.horizontal(|ui| {
                    ui.checkbox(&mut state.vsync_enabled, "VSync");
                    ui.checkbox(&mut state.show_stats, "Stats");
                    ui.checkbox(&mut state.show_help, "Help");
                });
                ui.add_space(16.0);

                if state.show_stats {
                    stats_panel(ui, stats, state.hover_uv.zip(state.hover_mesh_uv()));
                }

                if let Some(err) = last_error {
                    ui.add_space(12.0);
                    error_box(ui, err);
                }
            });
        });

    actions
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

fn view_button(ui: &mut Ui, current: &mut ViewMode, mode: ViewMode, label: &str) {
    let selected = *current == mode;
    let button = egui::Button::new(RichText::new(label).color(if selected { BG_BLACK } else { TEXT_PRIMARY }))
        .fill(if selected { ACCENT_BLUE } else { BG_WIDGET })
        .min_size(egui::vec2(80.0, 28.0));
    if ui.add(button).clicked() {
        *current = mode;
    }
}

fn texture_status(ui: &mut Ui, textures: &TextureSet) {
    let pending = textures.pending();
    if pending > 0 {
        ui.label(RichText::new(format!("Loading {} of {}", pending, TextureKind::ALL.len())).color(ACCENT_YELLOW).size(11.0));
    }
    egui::Grid::new("texture_status").num_columns(2).spacing([20.0, 2.0]).show(ui, |ui| {
        for kind in TextureKind::ALL {
            let status = textures.status(kind);
            let color = match status {
                TextureStatus::Loaded { .. } => ACCENT_GREEN,
                TextureStatus::Loading => ACCENT_YELLOW,
                TextureStatus::Placeholder => TEXT_MUTED,
                TextureStatus::Failed(_) => ACCENT_RED,
            };
            ui.label(RichText::new(kind.to_string()).color(TEXT_MUTED).size(11.0));
            ui.label(RichText::new(status.label()).color(color).size(11.0));
            ui.end_row();
        }
    });
}

fn stats_panel(ui: &mut Ui, stats: &FrameStats, hover: Option<(Vec2, Vec2)>) {
    section_header(ui, "STATISTICS");
    egui::Frame::default()
        .fill(BG_WIDGET)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));

            let fps_color = if stats.fps >= 60.0 {
                ACCENT_GREEN
            } else if stats.fps >= 30.0 {
                ACCENT_ORANGE
            } else {
                ACCENT_RED
            };

            egui::Grid::new("stats").num_columns(2).spacing([20.0, 4.0]).show(ui, |ui| {
                ui.label(RichText::new("FPS").color(TEXT_MUTED));
                ui.label(RichText::new(format!("{:.0}", stats.fps)).color(fps_color));
                ui.end_row();

                ui.label(RichText::new("Vertices").color(TEXT_MUTED));
                ui.label(RichText::new(fmt_num(stats.vertices as usize)).color(ACCENT_BLUE));
                ui.end_row();

                ui.label(RichText::new("Indices").color(TEXT_MUTED));
                ui.label(RichText::new(fmt_num(stats.indices as usize)).color(ACCENT_BLUE));
                ui.end_row();

                if let Some((circles, segments)) = stats.grid {
                    ui.label(RichText::new("Grid").color(TEXT_MUTED));
                    ui.label(RichText::new(format!("{} x {}", circles, segments)).color(TEXT_PRIMARY));
                    ui.end_row();
                }

                ui.label(RichText::new("Zoom").color(TEXT_MUTED));
                ui.label(RichText::new(format!("{:.0}", stats.zoom)).color(TEXT_PRIMARY));
                ui.end_row();

                if let Some((cursor, mesh_uv)) = hover {
                    ui.label(RichText::new("Cursor").color(TEXT_MUTED));
                    ui.label(RichText::new(format!("({:.2}, {:.2})", cursor.x, cursor.y)).color(TEXT_PRIMARY));
                    ui.end_row();

                    ui.label(RichText::new("Mesh UV").color(TEXT_MUTED));
                    ui.label(RichText::new(format!("({:.2}, {:.2})", mesh_uv.x, mesh_uv.y)).color(TEXT_PRIMARY));
                    ui.end_row();
                }
            });
        });
}

fn error_box(ui: &mut Ui, err: &str) {
    egui::Frame::default()
        .fill(Color32::from_rgb(40, 15, 15))
        .stroke(egui::Stroke::new(1.0, ACCENT_RED))
        .rounding(4.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.label(RichText::new(err).color(ACCENT_RED).size(11.0));
        });
}

pub fn draw_help_overlay(ctx: &Context, view_mode: ViewMode) {
    let controls = match view_mode {
        ViewMode::Surface => "LMB+Drag - Rotate | Scroll - Zoom",
        ViewMode::Uv => "LMB - Set rotation center | Angle slider - Rotate UVs",
    };

    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_black_alpha(180))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(RichText::new(controls).color(TEXT_MUTED));
                });
        });
}

fn fmt_num(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_abbreviated() {
        assert_eq!(fmt_num(999), "999");
        assert_eq!(fmt_num(66_049), "66.0K");
        assert_eq!(fmt_num(2_500_000), "2.50M");
    }
}
