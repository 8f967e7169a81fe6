// Chart rendering for a month-indexed pivot (PNG via the plotters bitmap backend)

use crate::error::{Error, Result};
use crate::report::Pivot;
use plotters::prelude::*;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

const CHART_SIZE: (u32, u32) = (1200, 600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    /// Grouped bars, one per column within each month
    #[default]
    Bar,
    /// One line per column across months
    Line,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bar" => Ok(ChartKind::Bar),
            "line" => Ok(ChartKind::Line),
            other => Err(Error::Chart(format!("unsupported chart kind '{}'", other))),
        }
    }
}

fn chart_error(err: impl fmt::Display) -> Error {
    Error::Chart(err.to_string())
}

/// y-axis bounds that always include zero and never collapse to a point
fn value_range(pivot: &Pivot) -> (f64, f64) {
    let (mut low, mut high) = (0.0_f64, 0.0_f64);
    for value in pivot.values.iter().flatten() {
        low = low.min(*value);
        high = high.max(*value);
    }
    if high - low < f64::EPSILON {
        high = low + 1.0;
    }
    let pad = (high - low) * 0.05;
    (if low < 0.0 { low - pad } else { low }, high + pad)
}

/// Draw `pivot` and write it as a PNG at `path`.
///
/// The parent directory must already exist; a missing one is an I/O error.
pub fn render_pivot(pivot: &Pivot, kind: ChartKind, path: &Path, title: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("chart directory '{}' does not exist", parent.display()),
            )));
        }
    }

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let month_count = pivot.months.len().max(1);
    let (y_low, y_high) = value_range(pivot);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..month_count as f64, y_low..y_high)
        .map_err(chart_error)?;

    let month_labels: Vec<String> = pivot.months.iter().map(|m| m.to_string()).collect();
    let x_formatter = |x: &f64| {
        if *x < 0.0 {
            return String::new();
        }
        month_labels.get(x.floor() as usize).cloned().unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(month_count)
        .x_label_formatter(&x_formatter)
        .x_desc("Month")
        .y_desc("Amount")
        .draw()
        .map_err(chart_error)?;

    let column_count = pivot.columns.len().max(1);
    let bar_width = 0.8 / column_count as f64;

    for (col, label) in pivot.column_labels().into_iter().enumerate() {
        let color = Palette99::pick(col).to_rgba();

        let series = match kind {
            ChartKind::Bar => chart
                .draw_series(pivot.values.iter().enumerate().map(|(month, row)| {
                    let x0 = month as f64 + 0.1 + col as f64 * bar_width;
                    Rectangle::new([(x0, 0.0), (x0 + bar_width, row[col])], color.filled())
                }))
                .map_err(chart_error)?,
            ChartKind::Line => chart
                .draw_series(LineSeries::new(
                    pivot
                        .values
                        .iter()
                        .enumerate()
                        .map(|(month, row)| (month as f64 + 0.5, row[col])),
                    color.stroke_width(2),
                ))
                .map_err(chart_error)?,
        };

        series
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::YearMonth;

    fn sample_pivot() -> Pivot {
        Pivot {
            group_by: "category".to_string(),
            months: vec![YearMonth::new(2024, 1), YearMonth::new(2024, 2)],
            columns: vec![Some("Food".to_string()), None],
            values: vec![vec![150.0, 10.0], vec![30.0, 0.0]],
        }
    }

    #[test]
    fn test_chart_kind_parsing() {
        assert_eq!("bar".parse::<ChartKind>().unwrap(), ChartKind::Bar);
        assert_eq!("line".parse::<ChartKind>().unwrap(), ChartKind::Line);
        assert!("pie".parse::<ChartKind>().is_err());
        assert_eq!(ChartKind::default(), ChartKind::Bar);
    }

    #[test]
    fn test_value_range_includes_zero() {
        let (low, high) = value_range(&sample_pivot());
        assert_eq!(low, 0.0);
        assert!(high > 150.0);

        let mut negative = sample_pivot();
        negative.values[1][0] = -40.0;
        let (low, _) = value_range(&negative);
        assert!(low < -40.0);
    }

    #[test]
    fn test_value_range_of_empty_pivot() {
        let empty = Pivot {
            group_by: "category".to_string(),
            months: vec![],
            columns: vec![],
            values: vec![],
        };
        let (low, high) = value_range(&empty);
        assert!(high > low);
    }

    #[test]
    fn test_render_bar_and_line_charts() {
        let dir = tempfile::tempdir().unwrap();

        for kind in [ChartKind::Bar, ChartKind::Line] {
            let path = dir.path().join(format!("{}.png", kind));
            render_pivot(&sample_pivot(), kind, &path, "Monthly Spending").unwrap();

            let bytes = std::fs::read(&path).unwrap();
            assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
        }
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Images").join("chart.png");

        let err = render_pivot(&sample_pivot(), ChartKind::Bar, &path, "x").unwrap_err();

        assert!(matches!(err, Error::Io(_)), "got {:?}", err);
        assert!(!path.exists());
    }
}
