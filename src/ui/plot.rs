use chrono::{DateTime, NaiveDateTime};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use aqi_dashboard::analysis::{linear_fit, HistogramBin, LinearFit, RatePoint, SeriesPoint};
use aqi_dashboard::data::stats::GroupSummary;

use crate::color::CityColors;

const SECONDS_PER_DAY: f64 = 86_400.0;

// ---------------------------------------------------------------------------
// Date axis helpers
// ---------------------------------------------------------------------------

/// Days since the Unix epoch, or the point index when the date is missing.
fn day_axis(date: Option<NaiveDateTime>, index: usize) -> f64 {
    date.map_or(index as f64, |d| d.and_utc().timestamp() as f64 / SECONDS_PER_DAY)
}

fn format_day(mark: GridMark, _range: &std::ops::RangeInclusive<f64>) -> String {
    DateTime::from_timestamp((mark.value * SECONDS_PER_DAY) as i64, 0)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Data tab
// ---------------------------------------------------------------------------

pub fn aqi_histogram(ui: &mut Ui, bins: &[HistogramBin]) {
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            let width = (b.upper - b.lower).max(1.0);
            Bar::new((b.lower + b.upper) / 2.0, b.count as f64).width(width)
        })
        .collect();

    Plot::new("aqi_histogram")
        .height(320.0)
        .x_axis_label("AQI")
        .y_axis_label("count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("AQI").color(Color32::LIGHT_BLUE));
        });
}

pub fn city_means(ui: &mut Ui, groups: &[GroupSummary], colors: &CityColors) {
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, g)| {
            let mean = g.summary.mean?;
            Some(
                Bar::new(i as f64, mean)
                    .name(&g.key)
                    .fill(colors.color_for(&g.key))
                    .width(0.7),
            )
        })
        .collect();

    Plot::new("city_means")
        .height(260.0)
        .legend(Legend::default())
        .y_axis_label("mean AQI")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("mean AQI by city"));
        });
}

// ---------------------------------------------------------------------------
// Analysis tab
// ---------------------------------------------------------------------------

pub fn aqi_time_series(ui: &mut Ui, city: &str, points: &[SeriesPoint], color: Color32) {
    let xy: Vec<[f64; 2]> = points
        .iter()
        .enumerate()
        .map(|(i, p)| [day_axis(p.date, i), p.value])
        .collect();

    Plot::new("aqi_time_series")
        .height(320.0)
        .legend(Legend::default())
        .x_axis_formatter(format_day)
        .y_axis_label("AQI")
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(xy.clone()))
                    .name(format!("AQI – {city}"))
                    .color(color)
                    .width(1.5),
            );
            plot_ui.points(Points::new(PlotPoints::from(xy)).radius(2.5).color(color));
        });
}

pub fn pollutant_scatter(ui: &mut Ui, pollutant: &str, pairs: &[(f64, f64)]) -> Option<LinearFit> {
    let fit = linear_fit(pairs);
    let xy: Vec<[f64; 2]> = pairs.iter().map(|&(x, y)| [x, y]).collect();

    Plot::new("pollutant_scatter")
        .height(320.0)
        .legend(Legend::default())
        .x_axis_label(pollutant.to_string())
        .y_axis_label("AQI")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(xy))
                    .name(pollutant)
                    .radius(3.0)
                    .color(Color32::LIGHT_BLUE),
            );
            if let Some(fit) = fit {
                let lo = pairs.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
                let hi = pairs.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
                let line = vec![[lo, fit.predict(lo)], [hi, fit.predict(hi)]];
                plot_ui.line(
                    Line::new(PlotPoints::from(line))
                        .name("OLS trendline")
                        .color(Color32::from_rgb(250, 160, 60))
                        .width(2.0),
                );
            }
        });

    fit
}

// ---------------------------------------------------------------------------
// Numerics tab
// ---------------------------------------------------------------------------

pub fn rate_of_change(ui: &mut Ui, rates: &[RatePoint]) {
    let bars: Vec<Bar> = rates
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let fill = if r.delta >= 0.0 {
                Color32::from_rgb(230, 90, 80)
            } else {
                Color32::from_rgb(80, 170, 110)
            };
            Bar::new(day_axis(r.date, i + 1), r.delta).fill(fill).width(0.8)
        })
        .collect();

    Plot::new("rate_of_change")
        .height(280.0)
        .x_axis_formatter(format_day)
        .y_axis_label("ΔAQI / day")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("daily change"));
        });
}
