//! Presentation shell: one linear HTML page with every chart in sequence.
//!
//! Chart specifications come in as plain [`Plot`] values and leave as inline
//! plotly divs; a failed forecast degrades to an explanatory placeholder
//! without taking the rest of the page down.

use plotly::Plot;
use tracing::warn;

use crate::aggregate;
use crate::charts::{self, SummaryMetric};
use crate::forecast::{Forecaster, HORIZON_DAYS};
use crate::records::CaseRecord;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Runs one render cycle over the filtered record set for `region` and
/// returns the complete dashboard page.
pub fn render_dashboard(
    records: &[CaseRecord],
    regions: &[String],
    region: &str,
    forecaster: &dyn Forecaster,
) -> String {
    let national = aggregate::national_daily(records);
    let regional = aggregate::regional_daily(records, region);
    let summaries = aggregate::region_summaries(records);

    let mut body = String::new();

    chart_div(&mut body, "national-trends", charts::national_trends(&national));

    heading(&mut body, "Overall Data Visualization");
    chart_div(&mut body, "overall-3d", charts::overall_3d(&national));

    heading(&mut body, &format!("Daily Trends in {}", escape(region)));
    chart_div(
        &mut body,
        "regional-trends",
        charts::regional_trends(region, &regional),
    );

    heading(&mut body, "National Summary by State");
    for (id, metric) in [
        ("summary-confirmed", SummaryMetric::Confirmed),
        ("summary-deaths", SummaryMetric::Deaths),
        ("summary-cured", SummaryMetric::Cured),
        ("summary-rate", SummaryMetric::RecoveryRate),
    ] {
        chart_div(&mut body, id, charts::summary_bar(&summaries, metric));
    }

    heading(
        &mut body,
        &format!("Forecasting COVID-19 Cases for {}", escape(region)),
    );
    let series: Vec<_> = regional.iter().map(|p| (p.date, p.confirmed)).collect();
    match forecaster.forecast(&series, HORIZON_DAYS) {
        Ok(points) => chart_div(&mut body, "forecast", charts::forecast_band(region, &points)),
        Err(err) => {
            warn!(region, error = %err, "skipping forecast chart");
            body.push_str(&format!(
                "<p class=\"notice\">Forecast unavailable for {}: {}.</p>\n",
                escape(region),
                escape(&err.to_string())
            ));
        }
    }

    page(region, regions, &body)
}

fn heading(body: &mut String, text: &str) {
    body.push_str(&format!("<h2>{text}</h2>\n"));
}

fn chart_div(body: &mut String, id: &str, plot: Plot) {
    body.push_str(&plot.to_inline_html(Some(id)));
    body.push('\n');
}

fn page(region: &str, regions: &[String], body: &str) -> String {
    let selector: Vec<String> = regions
        .iter()
        .map(|r| {
            if r == region {
                format!("<b>{}</b>", escape(r))
            } else {
                escape(r)
            }
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n\
         <html>\n<head>\n<meta charset=\"utf-8\"/>\n\
         <title>COVID-19 India Data Dashboard</title>\n\
         <script src=\"{PLOTLY_CDN}\"></script>\n\
         <style>body {{ font-family: sans-serif; margin: 2em; }} .notice {{ color: gray; }} .regions {{ color: gray; font-size: 0.9em; }}</style>\n\
         </head>\n<body>\n\
         <h1>COVID-19 India Data Dashboard</h1>\n\
         <p class=\"regions\">Regions: {}</p>\n\
         {body}\
         <p class=\"notice\">Data source: covid_19_india.csv</p>\n\
         </body>\n</html>\n",
        selector.join(" | ")
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{ForecastError, ForecastPoint};
    use chrono::NaiveDate;

    /// Deterministic stand-in for the statistical model.
    struct FlatForecast;

    impl Forecaster for FlatForecast {
        fn forecast(
            &self,
            series: &[(NaiveDate, u64)],
            horizon_days: usize,
        ) -> Result<Vec<ForecastPoint>, ForecastError> {
            let distinct = series.len();
            if distinct < 2 {
                return Err(ForecastError::InsufficientData(distinct));
            }
            let last = series[series.len() - 1].0;
            let level = series[series.len() - 1].1 as f64;
            let mut points: Vec<ForecastPoint> = series
                .iter()
                .map(|(date, value)| ForecastPoint {
                    date: *date,
                    predicted: *value as f64,
                    lower: *value as f64,
                    upper: *value as f64,
                })
                .collect();
            points.extend((1..=horizon_days).map(|k| ForecastPoint {
                date: last + chrono::Duration::days(k as i64),
                predicted: level,
                lower: level,
                upper: level,
            }));
            Ok(points)
        }
    }

    fn record(region: &str, day: u32, cured: u64, deaths: u64, confirmed: u64) -> CaseRecord {
        CaseRecord {
            region: region.to_string(),
            date: NaiveDate::from_ymd_opt(2021, 5, day).unwrap(),
            cured,
            deaths,
            confirmed,
        }
    }

    fn regions() -> Vec<String> {
        vec!["Delhi".to_string(), "Kerala".to_string()]
    }

    #[test]
    fn page_renders_every_chart_in_order() {
        let records = vec![
            record("Kerala", 1, 5, 1, 10),
            record("Kerala", 2, 6, 1, 12),
            record("Delhi", 1, 8, 2, 30),
            record("Delhi", 2, 9, 2, 31),
        ];

        let html = render_dashboard(&records, &regions(), "Kerala", &FlatForecast);

        let ids = [
            "national-trends",
            "overall-3d",
            "regional-trends",
            "summary-confirmed",
            "summary-deaths",
            "summary-cured",
            "summary-rate",
            "forecast",
        ];
        let mut previous = 0;
        for id in ids {
            let at = html.find(id).unwrap_or_else(|| panic!("missing chart {id}"));
            assert!(at > previous, "{id} out of order");
            previous = at;
        }
        assert!(html.contains("Daily Trends in Kerala"));
        assert!(html.contains("Forecasting COVID-19 Cases for Kerala"));
    }

    #[test]
    fn single_date_region_gets_a_placeholder_but_everything_else_renders() {
        let records = vec![
            record("Kerala", 1, 5, 1, 10),
            record("Delhi", 1, 8, 2, 30),
            record("Delhi", 2, 9, 2, 31),
        ];

        let html = render_dashboard(&records, &regions(), "Kerala", &FlatForecast);

        assert!(html.contains("Forecast unavailable for Kerala"));
        for id in ["national-trends", "overall-3d", "regional-trends", "summary-rate"] {
            assert!(html.contains(id), "missing chart {id}");
        }
        assert!(!html.contains("id=\"forecast\""));
    }

    #[test]
    fn selected_region_is_highlighted_in_the_region_line() {
        let records = vec![
            record("Kerala", 1, 5, 1, 10),
            record("Kerala", 2, 6, 1, 12),
        ];

        let html = render_dashboard(&records, &regions(), "Kerala", &FlatForecast);
        assert!(html.contains("<b>Kerala</b>"));
        assert!(!html.contains("<b>Delhi</b>"));
    }
}
