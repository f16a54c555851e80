use eframe::egui::{Color32, Ui};
use egui_plot::{HLine, Legend, Line, Plot, PlotUi, Points};

use crate::color::{ui_color, MEASURED_HUE, THEORY_HUE};
use crate::render::ErrorPoint;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// Points with a vertical and a horizontal whisker each.
fn error_bars(plot_ui: &mut PlotUi, points: &[ErrorPoint], name: &str, color: Color32) {
    for p in points {
        plot_ui.line(
            Line::new(vec![[p.x, p.y - p.y_err], [p.x, p.y + p.y_err]])
                .color(color)
                .width(1.0),
        );
        plot_ui.line(
            Line::new(vec![[p.x - p.x_err, p.y], [p.x + p.x_err, p.y]])
                .color(color)
                .width(1.0),
        );
    }
    let centres: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
    plot_ui.points(Points::new(centres).name(name).color(color).radius(3.0));
}

fn empty_hint(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("No entries selected");
    });
}

// ---------------------------------------------------------------------------
// Curve (central panel)
// ---------------------------------------------------------------------------

/// Relative intensity against rotation, with the prediction when comparing.
pub fn curve_plot(ui: &mut Ui, state: &ViewerState) {
    let points = state.visible_curve_points();
    if points.is_empty() {
        empty_hint(ui);
        return;
    }
    let figure = &state.outcome.figures.curve;
    let measured = ui_color(MEASURED_HUE);

    Plot::new("curve_plot")
        .legend(Legend::default())
        .x_axis_label(figure.x_label.as_str())
        .y_axis_label(figure.y_label.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let line: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
            plot_ui.line(Line::new(line).color(measured).width(1.5));
            error_bars(plot_ui, &points, "measured", measured);

            if let Some(theory) = &figure.theory {
                let curve: Vec<[f64; 2]> = theory.iter().map(|&(x, y)| [x, y]).collect();
                plot_ui.line(
                    Line::new(curve)
                        .name("cos²(θ)")
                        .color(ui_color(THEORY_HUE))
                        .width(1.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Deviation
// ---------------------------------------------------------------------------

/// Measured minus predicted, around a zero line.
pub fn deviation_plot(ui: &mut Ui, state: &ViewerState) {
    let (Some(figure), Some(points)) = (
        state.outcome.figures.deviation.as_ref(),
        state.visible_deviation_points(),
    ) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Run with --compare to see the deviation");
        });
        return;
    };
    if points.is_empty() {
        empty_hint(ui);
        return;
    }

    Plot::new("deviation_plot")
        .legend(Legend::default())
        .x_axis_label(figure.x_label.as_str())
        .y_axis_label(figure.y_label.as_str())
        .show(ui, |plot_ui| {
            plot_ui.hline(HLine::new(0.0).color(ui_color(THEORY_HUE)).width(1.0));
            error_bars(plot_ui, &points, "measured − cos²(θ)", ui_color(MEASURED_HUE));
        });
}
