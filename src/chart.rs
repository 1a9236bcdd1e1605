//! Graf teploty a vlhkosti se dvěma osami.
//!
//! egui_plot kreslí všechny řady proti jedné ose y, proto se vlhkost lineárně
//! přepočítá do rozsahu teploty a popisky pravé osy `%` převod vracejí zpět.
//! Mřížka odpovídá jen levé ose `°C`.

use chrono::{DateTime, Local};
use eframe::egui;
use std::ops::RangeInclusive;

use crate::model::MeasurementSeries;

const TEMP_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 100, 100);
const HUM_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 100, 255);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartSeries {
    pub temps: Vec<[f64; 2]>,
    pub hums: Vec<[f64; 2]>,
}

impl ChartSeries {
    /// Body `[ts, hodnota]`; čas se formátuje až v popiscích grafu.
    pub fn from_series(series: &MeasurementSeries) -> Self {
        let mut chart = Self::default();
        for m in series {
            chart.temps.push([m.ts as f64, m.temp]);
            chart.hums.push([m.ts as f64, m.hum]);
        }
        chart
    }

    pub fn is_empty(&self) -> bool { self.temps.is_empty() }
    pub fn len(&self) -> usize { self.temps.len() }
}

/// Lineární převod rozsahu vlhkosti na rozsah teploty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DualAxis {
    temp: (f64, f64),
    hum: (f64, f64),
}

impl DualAxis {
    pub fn fit(chart: &ChartSeries) -> Self {
        Self {
            temp: padded_range(chart.temps.iter().map(|p| p[1]), 0.5),
            hum: padded_range(chart.hums.iter().map(|p| p[1]), 1.0),
        }
    }

    /// Vlhkost → poloha na ose teploty.
    pub fn hum_to_plot(&self, hum: f64) -> f64 {
        self.temp.0 + (hum - self.hum.0) * (self.temp.1 - self.temp.0) / (self.hum.1 - self.hum.0)
    }

    /// Poloha na ose teploty → vlhkost (popisky pravé osy).
    pub fn plot_to_hum(&self, y: f64) -> f64 {
        self.hum.0 + (y - self.temp.0) * (self.hum.1 - self.hum.0) / (self.temp.1 - self.temp.0)
    }

    pub fn temp_range(&self) -> (f64, f64) { self.temp }
}

/// Min/max hodnot; plochý nebo prázdný rozsah se rozšíří o `pad`.
fn padded_range(values: impl Iterator<Item = f64>, pad: f64) -> (f64, f64) {
    let (min, max) = values.filter(|v| v.is_finite()).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() { return (0.0, 1.0); }
    if (max - min).abs() < f64::EPSILON { (min - pad, max + pad) } else { (min, max) }
}

fn time_label(secs: f64, fmt: &str) -> String {
    DateTime::from_timestamp(secs as i64, 0).unwrap_or_default().with_timezone(&Local).format(fmt).to_string()
}

/// Vykreslování grafu. Drží jen revizi, ke které patří uložená paměť grafu.
#[derive(Default)]
pub struct ChartView {
    seen_revision: u64,
}

impl ChartView {
    pub fn show(&mut self, ui: &mut egui::Ui, chart: Option<&ChartSeries>, revision: u64) {
        use egui_plot::{AxisHints, GridMark, HPlacement, Legend, Line, Plot, PlotPoints};

        let empty = ChartSeries::default();
        let chart = chart.unwrap_or(&empty);
        let axis = DualAxis::fit(chart);

        let hum_points: Vec<[f64; 2]> = chart.hums.iter().map(|p| [p[0], axis.hum_to_plot(p[1])]).collect();
        let temp_line = Line::new(PlotPoints::new(chart.temps.clone())).name("Teplota (°C)").color(TEMP_COLOR).width(2.0);
        let hum_line = Line::new(PlotPoints::new(hum_points)).name("Vlhkost (%)").color(HUM_COLOR).width(2.0);

        let temp_axis = AxisHints::new_y().label("°C").formatter(|mark: GridMark, _, _: &RangeInclusive<f64>| format!("{:.1}", mark.value));
        let hum_axis = AxisHints::new_y().label("%").placement(HPlacement::Right)
            .formatter(move |mark: GridMark, _, _: &RangeInclusive<f64>| format!("{:.0}", axis.plot_to_hum(mark.value)));
        let time_axis = AxisHints::new_x().label("Čas").formatter(|mark: GridMark, _, _: &RangeInclusive<f64>| time_label(mark.value, "%d.%m. %H:%M"));

        let (t_min, t_max) = axis.temp_range();
        let mut plot = Plot::new("week_plot").height(ui.available_height()).width(ui.available_width())
            .legend(Legend::default()).show_background(false).allow_drag(true).allow_zoom(true)
            .auto_bounds(egui::Vec2b::new(true, true)).include_y(t_min).include_y(t_max)
            .custom_x_axes(vec![time_axis]).custom_y_axes(vec![temp_axis, hum_axis])
            .label_formatter(move |name, value| {
                let time = time_label(value.x, "%d.%m.%Y %H:%M:%S");
                if name.starts_with("Vlhkost") { format!("{}\nVlhkost: {:.1} %", time, axis.plot_to_hum(value.y)) }
                else { format!("{}\nTeplota: {:.1} °C", time, value.y) }
            });
        // nová data = nový graf, stará paměť zoomu se zahodí
        if revision != self.seen_revision { plot = plot.reset(); self.seen_revision = revision; }

        plot.show(ui, |plot_ui| {
            plot_ui.line(temp_line);
            plot_ui.line(hum_line);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Measurement;

    fn sample() -> MeasurementSeries {
        vec![
            Measurement { ts: 1_700_000_000, temp: 20.0, hum: 40.0 },
            Measurement { ts: 1_700_000_600, temp: 22.0, hum: 60.0 },
        ]
    }

    #[test]
    fn series_to_chart_keeps_order() {
        let chart = ChartSeries::from_series(&sample());
        assert_eq!(chart.len(), 2);
        assert_eq!(chart.temps, vec![[1_700_000_000.0, 20.0], [1_700_000_600.0, 22.0]]);
        assert_eq!(chart.hums[1], [1_700_000_600.0, 60.0]);
    }

    #[test]
    fn humidity_maps_onto_temperature_range() {
        let axis = DualAxis::fit(&ChartSeries::from_series(&sample()));
        assert_eq!(axis.hum_to_plot(40.0), 20.0);
        assert_eq!(axis.hum_to_plot(60.0), 22.0);
        assert_eq!(axis.hum_to_plot(50.0), 21.0);
        assert!((axis.plot_to_hum(21.5) - 55.0).abs() < 1e-9);
    }

    #[test]
    fn flat_and_empty_series_do_not_divide_by_zero() {
        let flat = vec![Measurement { ts: 1, temp: 21.0, hum: 50.0 }, Measurement { ts: 2, temp: 21.0, hum: 50.0 }];
        let axis = DualAxis::fit(&ChartSeries::from_series(&flat));
        assert_eq!(axis.temp_range(), (20.5, 21.5));
        assert!(axis.hum_to_plot(50.0).is_finite());

        let empty = ChartSeries::default();
        assert!(empty.is_empty());
        let axis = DualAxis::fit(&empty);
        assert_eq!(axis.temp_range(), (0.0, 1.0));
        assert_eq!(axis.plot_to_hum(0.5), 0.5);
    }
}
