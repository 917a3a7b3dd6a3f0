use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use aqi_dashboard::analysis::{paired, CorrelationMatrix, CovarianceReport};
use aqi_dashboard::chem::{pollutant_info, POLLUTANT_INFO};
use aqi_dashboard::data::model::AQI;
use aqi_dashboard::data::DataError;

use crate::color::correlation_color;
use crate::state::AppState;
use crate::ui::plot;

/// Yellow notice shown in place of a feature that cannot run.
fn notice(ui: &mut Ui, err: &DataError) {
    ui.label(RichText::new(err.to_string()).color(Color32::YELLOW));
}

fn metric(ui: &mut Ui, label: &str, value: Option<f64>, decimals: usize) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        let text = value.map_or_else(|| "–".to_string(), |v| format!("{v:.decimals$}"));
        ui.heading(text);
    });
}

// ---------------------------------------------------------------------------
// Data view
// ---------------------------------------------------------------------------

pub fn data_tab(ui: &mut Ui, state: &AppState) {
    ui.heading("Dataset overview");

    let (Some(table), Some(report)) = (&state.table, &state.dataset_report) else {
        notice(ui, &DataError::NoData);
        return;
    };
    let o = &report.overview;

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Total rows: {}", o.rows));
        if let Some(cities) = &o.cities {
            ui.separator();
            ui.label(format!("Cities: {}", cities.join(", ")));
        }
        if let Some((start, end)) = o.date_span {
            ui.separator();
            ui.label(format!("{} → {}", start.date(), end.date()));
        }
    });
    ui.label(format!("Columns: {}", o.columns.join(", ")));
    ui.separator();

    ui.strong(format!("Raw data (first {} rows)", state.config.preview_rows));
    ScrollArea::horizontal()
        .id_salt("preview")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("preview_grid")
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    for col in &table.columns {
                        ui.strong(col);
                    }
                    ui.end_row();
                    for row in table.head(state.config.preview_rows) {
                        for col in &table.columns {
                            ui.label(row.display(col));
                        }
                        ui.end_row();
                    }
                });
        });
    ui.separator();

    ui.strong("AQI distribution");
    match &report.aqi_histogram {
        Ok(bins) => plot::aqi_histogram(ui, bins),
        Err(e) => notice(ui, e),
    }

    ui.strong("Mean AQI by city");
    match &report.city_means {
        Ok(groups) => plot::city_means(ui, groups, &state.city_colors),
        Err(e) => notice(ui, e),
    }
}

// ---------------------------------------------------------------------------
// AQI analysis
// ---------------------------------------------------------------------------

pub fn analysis_tab(ui: &mut Ui, state: &mut AppState) {
    let city = state.selected_city.clone().unwrap_or_default();
    ui.heading(format!("AQI analysis – {city}"));

    let (Ok(view), Some(report)) = (&state.view, &state.city_report) else {
        if let Err(e) = &state.view {
            notice(ui, e);
        }
        return;
    };

    match &report.summary {
        Ok(s) => {
            ui.horizontal(|ui: &mut Ui| {
                metric(ui, "Average AQI", s.mean, 1);
                ui.add_space(24.0);
                metric(ui, "Max AQI", s.max, 0);
                ui.add_space(24.0);
                metric(ui, "Min AQI", s.min, 0);
                ui.add_space(24.0);
                ui.vertical(|ui: &mut Ui| {
                    ui.label("Readings");
                    ui.heading(format!("{} / {}", s.valid, s.count));
                });
            });
        }
        Err(e) => notice(ui, e),
    }
    ui.separator();

    match &report.aqi {
        Ok(points) if view.date_span().is_some() => {
            plot::aqi_time_series(ui, &city, points, state.city_colors.color_for(&city));
        }
        Ok(_) => {
            ui.label("No parseable dates: time series skipped.");
        }
        Err(e) => notice(ui, e),
    }
    ui.separator();

    ui.strong("Correlation between AQI and pollutants");
    match &report.correlation {
        Ok(m) if m.columns.len() > 2 => correlation_grid(ui, m),
        Ok(_) => {
            ui.label("Needs at least two pollutant columns besides AQI.");
        }
        Err(e) => notice(ui, e),
    }
    ui.separator();

    ui.strong("Pollutant vs AQI");
    let choices = view.pollutant_columns();
    let Some(selected) = state.scatter_pollutant.filter(|p| choices.contains(p)) else {
        ui.label("No pollutant columns in this dataset.");
        return;
    };
    let mut chosen = selected;
    egui::ComboBox::from_id_salt("scatter_pollutant")
        .selected_text(chosen)
        .show_ui(ui, |ui: &mut Ui| {
            for p in &choices {
                ui.selectable_value(&mut chosen, *p, *p);
            }
        });

    match paired(view, chosen, AQI) {
        Ok(pairs) => {
            if let Some(fit) = plot::pollutant_scatter(ui, chosen, &pairs) {
                let r2 = fit
                    .r_squared
                    .map_or_else(|| "–".to_string(), |r| format!("{r:.3}"));
                ui.label(format!(
                    "AQI ≈ {:.2} + {:.3} × {chosen}   (R² = {r2})",
                    fit.intercept, fit.slope
                ));
            }
        }
        Err(e) => notice(ui, &e),
    }
    state.scatter_pollutant = Some(chosen);
}

fn correlation_grid(ui: &mut Ui, m: &CorrelationMatrix) {
    egui::Grid::new("correlation_grid")
        .spacing([4.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for c in &m.columns {
                ui.strong(c);
            }
            ui.end_row();
            for (name, row) in m.columns.iter().zip(&m.values) {
                ui.strong(name);
                for &r in row {
                    let text = r.map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}"));
                    ui.label(
                        RichText::new(text)
                            .background_color(correlation_color(r))
                            .color(Color32::BLACK),
                    );
                }
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Numerical analysis
// ---------------------------------------------------------------------------

pub fn numerics_tab(ui: &mut Ui, state: &AppState) {
    ui.heading("Numerical analysis");

    let Some(report) = &state.city_report else {
        if let Err(e) = &state.view {
            notice(ui, e);
        }
        return;
    };

    ui.strong("Cumulative exposure (trapezoidal rule, one step per reading)");
    match &report.exposure {
        Ok(total) => {
            ui.heading(format!("{total:.1} AQI·days"));
        }
        Err(e) => notice(ui, e),
    }
    ui.separator();

    ui.strong("Rate of change (first difference)");
    match &report.rate_of_change {
        Ok(rates) => plot::rate_of_change(ui, rates),
        Err(e) => notice(ui, e),
    }
    ui.separator();

    ui.strong("Pollutant covariance & eigen-decomposition");
    match &report.covariance {
        Ok(cov) => covariance_tables(ui, cov),
        Err(e) => notice(ui, e),
    }
}

fn covariance_tables(ui: &mut Ui, cov: &CovarianceReport) {
    ui.label(format!("{} complete readings", cov.samples));

    egui::Grid::new("covariance_grid")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for c in &cov.columns {
                ui.strong(c);
            }
            ui.end_row();
            for (name, row) in cov.columns.iter().zip(&cov.covariance) {
                ui.strong(name);
                for v in row {
                    ui.monospace(format!("{v:.2}"));
                }
                ui.end_row();
            }
        });
    ui.add_space(8.0);

    egui::Grid::new("eigen_grid")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong("#");
            ui.strong("eigenvalue");
            ui.strong("% variance");
            for c in &cov.columns {
                ui.strong(c);
            }
            ui.end_row();
            for (i, comp) in cov.components.iter().enumerate() {
                ui.label(format!("PC{}", i + 1));
                ui.monospace(format!("{:.3}", comp.eigenvalue));
                ui.monospace(format!("{:.1}%", comp.percent));
                for w in &comp.eigenvector {
                    ui.monospace(format!("{w:+.3}"));
                }
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Chemistry reference
// ---------------------------------------------------------------------------

pub fn chemistry_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Chemical nature, sources & health effects");

    let current = pollutant_info(state.reference_key).unwrap_or(&POLLUTANT_INFO[0]);
    egui::ComboBox::from_id_salt("reference_pollutant")
        .selected_text(current.name)
        .show_ui(ui, |ui: &mut Ui| {
            for info in &POLLUTANT_INFO {
                ui.selectable_value(&mut state.reference_key, info.key, info.name);
            }
        });

    let info = pollutant_info(state.reference_key).unwrap_or(&POLLUTANT_INFO[0]);
    ui.add_space(8.0);
    ui.heading(format!("{} ({})", info.name, info.formula));
    ui.label(RichText::new(info.kind.label()).italics());
    ui.add_space(4.0);
    ui.strong("Major sources");
    ui.label(info.sources);
    ui.strong("Atmospheric chemistry / reactions");
    ui.code(info.chemistry);
    ui.strong("Health effects");
    ui.label(info.health);
}
