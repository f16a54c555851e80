use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::app::MapTextures;
use crate::report::sci;
use crate::state::ViewerState;

/// On-screen height of one map panel, in points.
const MAP_HEIGHT: f32 = 180.0;

// ---------------------------------------------------------------------------
// Left side panel – entry visibility
// ---------------------------------------------------------------------------

/// Render the left panel listing every analysed entry.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    let n_total = state.visible.len();
    ui.heading(format!("Entries  ({}/{n_total})", state.visible_indices.len()));
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });

    let mut toggled = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, entry) in state.outcome.analysis.entries.iter().enumerate() {
                let label = format!("{}  ({}°)", entry.display_name(), entry.rotation);
                let text = RichText::new(label).color(state.entry_colors[i]);
                let mut checked = state.visible[i];
                if ui.checkbox(&mut checked, text).changed() {
                    toggled = Some(i);
                }
            }

            if !state.outcome.analysis.skipped.is_empty() {
                ui.separator();
                ui.strong("Skipped");
                for (entry, reason) in &state.outcome.analysis.skipped {
                    ui.label(RichText::new(entry.display_name()).color(Color32::RED))
                        .on_hover_text(reason);
                }
            }
        });

    if let Some(i) = toggled {
        state.toggle(i);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the tab strip and run summary.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        for tab in state.available_tabs() {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }

        ui.separator();
        ui.label(format!(
            "{} entries analysed, {} visible",
            state.outcome.analysis.len(),
            state.visible_indices.len()
        ));

        if let Some(mse) = state.outcome.mse {
            ui.separator();
            ui.label(format!("MSE vs cos²: {}", sci(mse, 3)));
        }

        if let Some(path) = state.outcome.written.first() {
            ui.separator();
            let dir = path.parent().unwrap_or(path);
            ui.label(RichText::new(format!("figures in {}", dir.display())).weak());
        }
    });
}

// ---------------------------------------------------------------------------
// Results table
// ---------------------------------------------------------------------------

/// One row per visible entry: rotation, raw intensity and relative intensity.
pub fn results_table(ui: &mut Ui, state: &ViewerState) {
    let relative = &state.outcome.analysis.relative;
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(140.0))
        .columns(Column::auto().at_least(110.0), 3)
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Entry", "Rotation [°]", "Intensity", "Relative", "Extremum"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for &i in &state.visible_indices {
                let entry = &state.outcome.analysis.entries[i];
                let intensity = state.intensity(i);
                let rel = relative.values[i];
                let extremum = if i == relative.argmax {
                    "max"
                } else if relative.argmin == Some(i) {
                    "min"
                } else {
                    ""
                };
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        let text = RichText::new(entry.display_name());
                        ui.label(text.color(state.entry_colors[i]));
                    });
                    row.col(|ui| {
                        ui.label(format!("{}±{}", entry.rotation, entry.rotation_err));
                    });
                    row.col(|ui| {
                        ui.label(format!(
                            "{}±{}",
                            sci(intensity.value, 2),
                            sci(intensity.error, 2)
                        ));
                    });
                    row.col(|ui| {
                        ui.label(format!("{}±{}", sci(rel.value, 2), sci(rel.error, 2)));
                    });
                    row.col(|ui| {
                        ui.label(extremum);
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

/// Raw frame and intensity map side by side for each visible entry.
pub fn maps_view(ui: &mut Ui, state: &ViewerState, textures: Option<&[MapTextures]>) {
    let Some(textures) = textures else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No maps were rendered for this run (use --create-map)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for &i in &state.visible_indices {
                let Some(tex) = textures.get(i) else {
                    continue;
                };
                let name = state.outcome.analysis.entries[i].display_name();
                ui.horizontal(|ui: &mut Ui| {
                    let panels = [
                        (name.clone(), &tex.raw),
                        (format!("{name} intensity"), &tex.intensity),
                    ];
                    for (title, handle) in panels {
                        ui.vertical(|ui: &mut Ui| {
                            ui.label(title);
                            let size = handle.size_vec2();
                            let scale = MAP_HEIGHT / size.y.max(1.0);
                            ui.image((handle.id(), size * scale));
                        });
                    }
                });
                ui.separator();
            }
        });
}
