use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};

use crate::pipeline::AnalysisOutcome;
use crate::render::MapFigure;
use crate::state::{Tab, ViewerState};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// Map textures
// ---------------------------------------------------------------------------

/// GPU copies of one map row, uploaded the first time the maps tab is shown.
pub struct MapTextures {
    pub raw: TextureHandle,
    pub intensity: TextureHandle,
}

fn upload_maps(ctx: &egui::Context, maps: &MapFigure) -> Vec<MapTextures> {
    maps.rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let (w, h) = row.raw.dimensions();
            let raw = ColorImage::from_rgb([w as usize, h as usize], row.raw.as_raw());
            let (w, h) = row.intensity.dimensions();
            let intensity = ColorImage::from_gray([w as usize, h as usize], row.intensity.as_raw());
            MapTextures {
                raw: ctx.load_texture(format!("raw-{i}"), raw, TextureOptions::NEAREST),
                intensity: ctx.load_texture(
                    format!("intensity-{i}"),
                    intensity,
                    TextureOptions::NEAREST,
                ),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ResultsApp {
    pub state: ViewerState,
    textures: Option<Vec<MapTextures>>,
}

impl ResultsApp {
    pub fn new(outcome: AnalysisOutcome) -> Self {
        Self {
            state: ViewerState::new(outcome),
            textures: None,
        }
    }
}

impl eframe::App for ResultsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: tabs and summary ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: entry visibility ----
        egui::SidePanel::left("entry_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        if self.state.tab == Tab::Maps && self.textures.is_none() {
            if let Some(maps) = &self.state.outcome.figures.maps {
                self.textures = Some(upload_maps(ctx, maps));
            }
        }

        // ---- Central panel: selected view ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.tab {
            Tab::Curve => plot::curve_plot(ui, &self.state),
            Tab::Deviation => plot::deviation_plot(ui, &self.state),
            Tab::Maps => panels::maps_view(ui, &self.state, self.textures.as_deref()),
            Tab::Table => panels::results_table(ui, &self.state),
        });
    }
}

/// Open the result viewer and block until its window is closed.
pub fn show(outcome: AnalysisOutcome) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    log::info!("Opening viewer for {} entries", outcome.analysis.len());
    eframe::run_native(
        "Rusty Malus – Results",
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(ResultsApp::new(outcome)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
