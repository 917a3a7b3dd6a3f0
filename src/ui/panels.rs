use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use aqi_dashboard::data::model::CITY;

use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: tab switcher, city and date-range filters.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    ui.selectable_value(&mut state.tab, Tab::Data, "📊 Data view");
    ui.selectable_value(&mut state.tab, Tab::Analysis, "📈 AQI analysis");
    ui.selectable_value(&mut state.tab, Tab::Numerics, "∫ Numerical analysis");
    ui.selectable_value(&mut state.tab, Tab::Chemistry, "🧪 Chemistry of pollutants");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };

    if !table.has_column(CITY) {
        ui.colored_label(Color32::RED, "The dataset has no 'city' column.");
        return;
    }

    // ---- City selector ----
    let cities = table.cities();
    ui.strong("City");
    let current = state.selected_city.clone().unwrap_or_default();
    let mut picked = None;
    egui::ComboBox::from_id_salt("city")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for city in &cities {
                let text = RichText::new(city).color(state.city_colors.color_for(city));
                if ui.selectable_label(current == *city, text).clicked() {
                    picked = Some(city.clone());
                }
            }
        });
    if let Some(city) = picked {
        state.select_city(city);
    }

    // ---- Date range ----
    ui.add_space(8.0);
    ui.strong("Date range");
    let Some((mut start, mut end)) = state.date_range else {
        ui.label("No dates for this city.");
        return;
    };
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("From");
        changed |= ui
            .add(DatePickerButton::new(&mut start).id_salt("start_date"))
            .changed();
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("To");
        changed |= ui
            .add(DatePickerButton::new(&mut end).id_salt("end_date"))
            .changed();
    });
    if let Some((lo, hi)) = state.date_bounds {
        if ui.small_button("Full range").clicked() {
            start = lo;
            end = hi;
            changed = true;
        }
    }
    if changed {
        state.set_date_range(start, end);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload default dataset").clicked() {
                state.load_default();
                ui.close_menu();
            }
        });

        ui.separator();

        match &state.table {
            Some(table) => {
                let visible = state.view.as_ref().map_or(0, |v| v.len());
                ui.label(format!("{} rows loaded, {visible} in view", table.len()));
            }
            None => {
                ui.label("No data");
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open AQI data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}
