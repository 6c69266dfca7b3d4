use chrono::NaiveDate;
use folio_core::domain::ComparisonRun;
use ratatui::style::Color;

// matplotlib's default cycle, so lines keep familiar colours.
pub const PALETTE: [Color; 10] = [
    Color::Rgb(0x1f, 0x77, 0xb4),
    Color::Rgb(0xff, 0x7f, 0x0e),
    Color::Rgb(0x2c, 0xa0, 0x2c),
    Color::Rgb(0xd6, 0x27, 0x28),
    Color::Rgb(0x94, 0x67, 0xbd),
    Color::Rgb(0x8c, 0x56, 0x4b),
    Color::Rgb(0xe3, 0x77, 0xc2),
    Color::Rgb(0x7f, 0x7f, 0x7f),
    Color::Rgb(0xbc, 0xbd, 0x22),
    Color::Rgb(0x17, 0xbe, 0xcf),
];

const Y_LABELS: usize = 5;

#[derive(Debug, Clone)]
pub struct ChartLine {
    pub name: String,
    pub color: Color,
    /// (days since first date, cumulative return in percent), finite values only.
    pub points: Vec<(f64, f64)>,
    /// Percent at the last date, `None` when undefined.
    pub final_pct: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ChartModel {
    pub lines: Vec<ChartLine>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
}

impl ChartModel {
    /// One line per portfolio, labelled and coloured in input order.
    pub fn from_run(run: &ComparisonRun) -> Self {
        let dates = run.result.dates();
        let first = dates.first().copied();
        let x_of = |d: NaiveDate| first.map(|f| (d - f).num_days() as f64).unwrap_or(0.0);

        let lines: Vec<ChartLine> = run
            .spec
            .names()
            .enumerate()
            .map(|(i, name)| {
                let series = run.result.get(name);
                let values = series.map(|s| s.values.as_slice()).unwrap_or_default();
                let points = dates
                    .iter()
                    .zip(values)
                    .filter(|(_, v)| v.is_finite())
                    .map(|(d, v)| (x_of(*d), v * 100.0))
                    .collect();
                ChartLine {
                    name: name.to_string(),
                    color: PALETTE[i % PALETTE.len()],
                    points,
                    final_pct: series
                        .and_then(|s| s.last())
                        .filter(|v| v.is_finite())
                        .map(|v| v * 100.0),
                }
            })
            .collect();

        let x_max = dates.last().map(|d| x_of(*d)).unwrap_or(0.0);
        let x_bounds = if x_max > 0.0 { [0.0, x_max] } else { [0.0, 1.0] };

        let y_bounds = y_bounds(lines.iter().flat_map(|l| l.points.iter().map(|(_, y)| *y)));
        let y_labels = (0..Y_LABELS)
            .map(|i| {
                let y = y_bounds[0] + (y_bounds[1] - y_bounds[0]) * i as f64 / (Y_LABELS - 1) as f64;
                format_axis_pct(y)
            })
            .collect();

        Self {
            lines,
            x_bounds,
            y_bounds,
            x_labels: x_labels(dates),
            y_labels,
        }
    }
}

// Always includes zero and pads 5% so lines never sit on the frame.
fn y_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = hi - lo;
    if span <= f64::EPSILON {
        return [lo - 1.0, hi + 1.0];
    }
    let pad = span * 0.05;
    [lo - pad, hi + pad]
}

fn x_labels(dates: &[NaiveDate]) -> Vec<String> {
    let fmt = |d: &NaiveDate| d.format("%Y-%m-%d").to_string();
    match dates {
        [] => Vec::new(),
        [only] => vec![fmt(only)],
        [first, last] => vec![fmt(first), fmt(last)],
        _ => vec![
            fmt(&dates[0]),
            fmt(&dates[dates.len() / 2]),
            fmt(&dates[dates.len() - 1]),
        ],
    }
}

pub fn format_axis_pct(v: f64) -> String {
    // Avoid rendering "-0%".
    let rounded = v.round();
    if rounded == 0.0 {
        "0%".to_string()
    } else {
        format!("{rounded:.0}%")
    }
}

pub fn format_final_pct(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2}%"),
        None => "n/a".to_string(),
    }
}

/// Row (0 = top) for each line's end label inside a column `height` rows tall.
///
/// Labels are placed at their value's height and pushed to the nearest free row on
/// collision. Undefined values go to the first free row from the bottom.
pub fn annotation_rows(finals: &[Option<f64>], y_bounds: [f64; 2], height: u16) -> Vec<Option<u16>> {
    if height == 0 {
        return vec![None; finals.len()];
    }
    let max_row = height - 1;
    let span = y_bounds[1] - y_bounds[0];
    let mut taken = vec![false; height as usize];
    let mut out = Vec::with_capacity(finals.len());

    for value in finals {
        let wanted = match value {
            Some(v) if span > 0.0 => {
                let frac = ((y_bounds[1] - v) / span).clamp(0.0, 1.0);
                (frac * max_row as f64).round() as u16
            }
            _ => max_row,
        };
        let row = nearest_free(&taken, wanted);
        if let Some(r) = row {
            taken[r as usize] = true;
        }
        out.push(row);
    }
    out
}

fn nearest_free(taken: &[bool], wanted: u16) -> Option<u16> {
    let wanted = wanted as usize;
    for offset in 0..taken.len() {
        if wanted + offset < taken.len() && !taken[wanted + offset] {
            return Some((wanted + offset) as u16);
        }
        if offset <= wanted && !taken[wanted - offset] {
            return Some((wanted - offset) as u16);
        }
    }
    None
}
