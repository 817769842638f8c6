//! Chart construction: pure mappings from aggregated tables to plotly chart
//! specifications. Nothing here computes; it only shapes data for display.

use std::cmp::Ordering;

use chrono::NaiveDate;
use plotly::color::{NamedColor, Rgba};
use plotly::common::{Anchor, Fill, Font, Line, Marker, Mode, Orientation, Title};
use plotly::layout::{
    Annotation, Axis, GridPattern, HoverMode, Layout, LayoutGrid, LayoutScene, Legend,
    RangeSelector, RangeSlider, SelectorButton, SelectorStep, StepMode,
};
use plotly::{Bar, Plot, Scatter, Scatter3D};

use crate::aggregate::{DailySeriesPoint, RegionSummary};
use crate::forecast::ForecastPoint;

const CASES_HOVER: &str = "<b>Date</b>: %{x|%Y-%m-%d}<br><b>Cases</b>: %{y:,}<extra></extra>";
const DEATHS_HOVER: &str = "<b>Date</b>: %{x|%Y-%m-%d}<br><b>Deaths</b>: %{y:,}<extra></extra>";
const CURED_HOVER: &str = "<b>Date</b>: %{x|%Y-%m-%d}<br><b>Cured</b>: %{y:,}<extra></extra>";
const RATE_HOVER: &str = "<b>Date</b>: %{x|%Y-%m-%d}<br><b>Rate</b>: %{y:.1f}%<extra></extra>";

fn dates_of(series: &[DailySeriesPoint]) -> Vec<NaiveDate> {
    series.iter().map(|p| p.date).collect()
}

/// Four linked panels of the national series: confirmed, deaths, cured and
/// recovery rate, with unified hover by date and range presets of
/// 1 week / 1 month / 3 months / all on the bottom row.
pub fn national_trends(series: &[DailySeriesPoint]) -> Plot {
    let dates = dates_of(series);

    let confirmed = Scatter::new(
        dates.clone(),
        series.iter().map(|p| p.confirmed).collect::<Vec<_>>(),
    )
    .name("Confirmed")
    .mode(Mode::Lines)
    .line(Line::new().color(NamedColor::Blue).width(2.5))
    .hover_template(CASES_HOVER);

    let deaths = Scatter::new(
        dates.clone(),
        series.iter().map(|p| p.deaths).collect::<Vec<_>>(),
    )
    .name("Deaths")
    .mode(Mode::Lines)
    .line(Line::new().color(NamedColor::Red).width(2.5))
    .hover_template(DEATHS_HOVER)
    .x_axis("x2")
    .y_axis("y2");

    let cured = Scatter::new(
        dates.clone(),
        series.iter().map(|p| p.cured).collect::<Vec<_>>(),
    )
    .name("Cured")
    .mode(Mode::Lines)
    .line(Line::new().color(NamedColor::Green).width(2.5))
    .hover_template(CURED_HOVER)
    .x_axis("x3")
    .y_axis("y3");

    // Recovery rate carries nulls for zero-confirmed dates; plotly leaves a
    // gap rather than drawing a zero.
    let rate = Scatter::new(
        dates,
        series.iter().map(|p| p.recovery_rate).collect::<Vec<_>>(),
    )
    .name("Recovery Rate")
    .mode(Mode::Lines)
    .line(Line::new().color(NamedColor::Purple).width(2.5))
    .hover_template(RATE_HOVER)
    .x_axis("x4")
    .y_axis("y4");

    let layout = Layout::new()
        .title(Title::with_text("<b>COVID-19 Trends Analysis Dashboard</b>").font(Font::new().size(24)))
        .height(900)
        .grid(
            LayoutGrid::new()
                .rows(2)
                .columns(2)
                .pattern(GridPattern::Independent),
        )
        .hover_mode(HoverMode::XUnified)
        .show_legend(true)
        .legend(
            Legend::new()
                .orientation(Orientation::Horizontal)
                .y_anchor(Anchor::Bottom)
                .y(1.02)
                .x_anchor(Anchor::Right)
                .x(1.0),
        )
        .x_axis(Axis::new().title(Title::with_text("Date")))
        .y_axis(Axis::new().title(Title::with_text("Case Count")))
        .x_axis2(Axis::new().title(Title::with_text("Date")))
        .y_axis2(Axis::new().title(Title::with_text("Death Count")))
        .x_axis3(
            Axis::new()
                .title(Title::with_text("Date"))
                .range_slider(RangeSlider::new().visible(true))
                .range_selector(range_presets()),
        )
        .y_axis3(Axis::new().title(Title::with_text("Cured Count")))
        .x_axis4(
            Axis::new()
                .title(Title::with_text("Date"))
                .range_slider(RangeSlider::new().visible(true)),
        )
        .y_axis4(
            Axis::new()
                .title(Title::with_text("Percentage (%)"))
                .range(vec![0.0, 100.0]),
        )
        .annotations(vec![
            panel_title("<b>Confirmed Cases Over Time</b>", 0.2, 1.0),
            panel_title("<b>Death Cases Over Time</b>", 0.8, 1.0),
            panel_title("<b>Cured/Recovered Cases Over Time</b>", 0.2, 0.425),
            panel_title("<b>Recovery Rate Trend</b>", 0.8, 0.425),
        ]);

    let mut plot = Plot::new();
    plot.add_trace(confirmed);
    plot.add_trace(deaths);
    plot.add_trace(cured);
    plot.add_trace(rate);
    plot.set_layout(layout);
    plot
}

fn panel_title(text: &str, x: f64, y: f64) -> Annotation {
    Annotation::new()
        .text(text)
        .x_ref("paper")
        .y_ref("paper")
        .x(x)
        .y(y)
        .x_anchor(Anchor::Center)
        .y_anchor(Anchor::Bottom)
        .show_arrow(false)
}

fn range_presets() -> RangeSelector {
    RangeSelector::new().buttons(vec![
        SelectorButton::new()
            .count(7)
            .label("1w")
            .step(SelectorStep::Day)
            .step_mode(StepMode::Backward),
        SelectorButton::new()
            .count(1)
            .label("1m")
            .step(SelectorStep::Month)
            .step_mode(StepMode::Backward),
        SelectorButton::new()
            .count(3)
            .label("3m")
            .step(SelectorStep::Month)
            .step_mode(StepMode::Backward),
        SelectorButton::new().label("all").step(SelectorStep::All),
    ])
}

/// 3D scatter/line of date against confirmed cases and deaths.
pub fn overall_3d(series: &[DailySeriesPoint]) -> Plot {
    let trace = Scatter3D::new(
        dates_of(series),
        series.iter().map(|p| p.confirmed).collect::<Vec<_>>(),
        series.iter().map(|p| p.deaths).collect::<Vec<_>>(),
    )
    .mode(Mode::LinesMarkers)
    .marker(Marker::new().size(4))
    .hover_template(
        "<b>Date</b>: %{x|%Y-%m-%d}<br><b>Cases</b>: %{y:,}<br><b>Deaths</b>: %{z:,}<extra></extra>",
    );

    let layout = Layout::new()
        .title(Title::with_text("3D visualization Date vs Confirmed vs Deaths"))
        .scene(
            LayoutScene::new()
                .x_axis(Axis::new().title(Title::with_text("Date")))
                .y_axis(Axis::new().title(Title::with_text("Confirmed")))
                .z_axis(Axis::new().title(Title::with_text("Deaths"))),
        );

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Daily confirmed/cured/deaths lines for the selected region.
pub fn regional_trends(region: &str, series: &[DailySeriesPoint]) -> Plot {
    let dates = dates_of(series);

    let mut plot = Plot::new();
    plot.add_trace(
        Scatter::new(
            dates.clone(),
            series.iter().map(|p| p.confirmed).collect::<Vec<_>>(),
        )
        .name("Confirmed")
        .mode(Mode::LinesMarkers)
        .line(Line::new().color(NamedColor::Blue))
        .hover_template(CASES_HOVER),
    );
    plot.add_trace(
        Scatter::new(
            dates.clone(),
            series.iter().map(|p| p.cured).collect::<Vec<_>>(),
        )
        .name("Cured")
        .mode(Mode::LinesMarkers)
        .line(Line::new().color(NamedColor::Green))
        .hover_template(CURED_HOVER),
    );
    plot.add_trace(
        Scatter::new(
            dates,
            series.iter().map(|p| p.deaths).collect::<Vec<_>>(),
        )
        .name("Deaths")
        .mode(Mode::LinesMarkers)
        .line(Line::new().color(NamedColor::Red))
        .hover_template(DEATHS_HOVER),
    );
    plot.set_layout(
        Layout::new()
            .title(Title::with_text(format!(
                "Daily Confirmed, Cured, and Deaths - {region}"
            )))
            .x_axis(Axis::new().title(Title::with_text("Date")))
            .y_axis(Axis::new().title(Title::with_text("Count"))),
    );
    plot
}

/// The metric a summary bar chart ranks regions by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryMetric {
    Confirmed,
    Cured,
    Deaths,
    RecoveryRate,
}

impl SummaryMetric {
    fn value(self, s: &RegionSummary) -> Option<f64> {
        match self {
            SummaryMetric::Confirmed => Some(s.confirmed as f64),
            SummaryMetric::Cured => Some(s.cured as f64),
            SummaryMetric::Deaths => Some(s.deaths as f64),
            SummaryMetric::RecoveryRate => s.recovery_rate,
        }
    }

    fn chart_title(self) -> &'static str {
        match self {
            SummaryMetric::Confirmed => "Total Confirmed Cases by State",
            SummaryMetric::Cured => "Total Recovered Cases by State",
            SummaryMetric::Deaths => "Total Deaths by State",
            SummaryMetric::RecoveryRate => "Recovery Rate (%) by State",
        }
    }

    fn axis_title(self) -> &'static str {
        match self {
            SummaryMetric::Confirmed => "Confirmed",
            SummaryMetric::Cured => "Cured",
            SummaryMetric::Deaths => "Deaths",
            SummaryMetric::RecoveryRate => "Recovery Rate (%)",
        }
    }

    fn hover(self) -> &'static str {
        match self {
            SummaryMetric::RecoveryRate => "<b>%{x}</b><br>%{y:.1f}%<extra></extra>",
            _ => "<b>%{x}</b><br>%{y:,}<extra></extra>",
        }
    }

    fn color(self) -> NamedColor {
        match self {
            SummaryMetric::Confirmed => NamedColor::Orange,
            SummaryMetric::Cured => NamedColor::Green,
            SummaryMetric::Deaths => NamedColor::Red,
            SummaryMetric::RecoveryRate => NamedColor::Purple,
        }
    }
}

/// Bar chart of all-time totals per region, sorted descending by `metric`.
/// Regions without a defined value (recovery rate with zero confirmed) sort
/// last and plot as gaps.
pub fn summary_bar(summaries: &[RegionSummary], metric: SummaryMetric) -> Plot {
    let mut rows: Vec<&RegionSummary> = summaries.iter().collect();
    rows.sort_by(|a, b| {
        metric
            .value(b)
            .partial_cmp(&metric.value(a))
            .unwrap_or(Ordering::Equal)
    });

    let regions: Vec<String> = rows.iter().map(|s| s.region.clone()).collect();
    let values: Vec<Option<f64>> = rows.iter().map(|s| metric.value(s)).collect();

    let mut plot = Plot::new();
    plot.add_trace(
        Bar::new(regions, values)
            .name(metric.axis_title())
            .marker(Marker::new().color(metric.color()))
            .hover_template(metric.hover()),
    );
    plot.set_layout(
        Layout::new()
            .title(Title::with_text(metric.chart_title()))
            .x_axis(Axis::new().title(Title::with_text("State / Union Territory")))
            .y_axis(Axis::new().title(Title::with_text(metric.axis_title()))),
    );
    plot
}

/// Forecast band chart: central prediction plus shaded uncertainty band.
pub fn forecast_band(region: &str, points: &[ForecastPoint]) -> Plot {
    let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();

    let central = Scatter::new(
        dates.clone(),
        points.iter().map(|p| p.predicted).collect::<Vec<_>>(),
    )
    .name("Forecast")
    .mode(Mode::Lines)
    .line(Line::new().color(NamedColor::Blue));

    let upper = Scatter::new(
        dates.clone(),
        points.iter().map(|p| p.upper).collect::<Vec<_>>(),
    )
    .name("Upper Bound")
    .mode(Mode::Lines)
    .line(Line::new().color(NamedColor::LightBlue))
    .show_legend(false);

    // Added after the upper trace so the fill spans the band.
    let lower = Scatter::new(
        dates,
        points.iter().map(|p| p.lower).collect::<Vec<_>>(),
    )
    .name("Lower Bound")
    .mode(Mode::Lines)
    .line(Line::new().color(NamedColor::LightBlue))
    .fill(Fill::ToNextY)
    .fill_color(Rgba::new(173, 216, 230, 0.2))
    .show_legend(false);

    let mut plot = Plot::new();
    plot.add_trace(central);
    plot.add_trace(upper);
    plot.add_trace(lower);
    plot.set_layout(
        Layout::new()
            .title(Title::with_text(format!(
                "30-Day Forecast of Confirmed Cases in {region}"
            )))
            .x_axis(Axis::new().title(Title::with_text("Date")))
            .y_axis(Axis::new().title(Title::with_text("Forecasted Cases"))),
    );
    plot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap() + chrono::Duration::days(n as i64)
    }

    fn series_point(n: u64, confirmed: u64, cured: u64, deaths: u64) -> DailySeriesPoint {
        DailySeriesPoint {
            date: day(n),
            confirmed,
            cured,
            deaths,
            recovery_rate: crate::aggregate::recovery_rate(cured, confirmed),
        }
    }

    fn summary(region: &str, confirmed: u64, cured: u64, deaths: u64) -> RegionSummary {
        RegionSummary {
            region: region.to_string(),
            confirmed,
            cured,
            deaths,
            recovery_rate: crate::aggregate::recovery_rate(cured, confirmed),
        }
    }

    #[test]
    fn national_chart_has_four_panels() {
        let series = vec![series_point(0, 10, 5, 1), series_point(1, 20, 8, 2)];
        let html = national_trends(&series).to_inline_html(Some("t"));

        for name in ["Confirmed", "Deaths", "Cured", "Recovery Rate"] {
            assert!(html.contains(name), "missing trace {name}");
        }
        assert!(html.contains("Confirmed Cases Over Time"));
        assert!(html.contains("Recovery Rate Trend"));
    }

    #[test]
    fn zero_confirmed_rate_is_null_in_the_chart_data() {
        let series = vec![series_point(0, 0, 0, 0), series_point(1, 10, 5, 0)];
        let html = national_trends(&series).to_inline_html(Some("t"));
        assert!(html.contains("null"));
    }

    #[test]
    fn summary_bars_sort_descending_by_their_own_metric() {
        let summaries = vec![
            summary("A", 10, 9, 0),
            summary("B", 30, 3, 2),
            summary("C", 20, 18, 1),
        ];

        let by_confirmed = summary_bar(&summaries, SummaryMetric::Confirmed)
            .to_inline_html(Some("t"));
        let order = |html: &str, region: &str| html.find(&format!("\"{region}\"")).unwrap();
        assert!(order(&by_confirmed, "B") < order(&by_confirmed, "C"));
        assert!(order(&by_confirmed, "C") < order(&by_confirmed, "A"));

        // Recovery rate ranks A (90%) first despite its low case count.
        let by_rate = summary_bar(&summaries, SummaryMetric::RecoveryRate)
            .to_inline_html(Some("t"));
        assert!(order(&by_rate, "A") < order(&by_rate, "C"));
        assert!(order(&by_rate, "C") < order(&by_rate, "B"));
    }

    #[test]
    fn forecast_chart_names_the_region() {
        let points = vec![
            ForecastPoint {
                date: day(0),
                predicted: 10.0,
                lower: 8.0,
                upper: 12.0,
            },
            ForecastPoint {
                date: day(1),
                predicted: 11.0,
                lower: 9.0,
                upper: 13.0,
            },
        ];
        let html = forecast_band("Kerala", &points).to_inline_html(Some("t"));
        assert!(html.contains("30-Day Forecast of Confirmed Cases in Kerala"));
        assert!(html.contains("Upper Bound"));
    }
}
