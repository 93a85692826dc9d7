//! Text-mode line charts and CSV export.

use std::path::Path;

use crate::error::Result;

const GLYPHS: [char; 6] = ['*', '+', 'o', 'x', '#', '@'];

/// A named sequence plotted against its index.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Render `series` on a `width` x `height` character grid.
///
/// x is the sample index scaled to the longest series, y spans the overall
/// minimum and maximum. Later series draw over earlier ones.
pub fn render_line_chart(title: &str, series: &[Series], width: usize, height: usize) -> String {
    let width = width.max(2);
    let height = height.max(2);
    let mut out = format!("{}\n", title);

    let finite = || series.iter().flat_map(|s| s.values.iter().copied()).filter(|v| v.is_finite());
    let (lo, hi) = finite().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo > hi {
        out.push_str("(no data)\n");
        return out;
    }
    let span = if hi > lo { hi - lo } else { 1.0 };
    let longest = series.iter().map(|s| s.values.len()).max().unwrap_or(0);

    let mut grid = vec![vec![' '; width]; height];
    for (k, s) in series.iter().enumerate() {
        let glyph = GLYPHS[k % GLYPHS.len()];
        for (i, &v) in s.values.iter().enumerate() {
            if !v.is_finite() {
                continue;
            }
            let col = if longest > 1 {
                i * (width - 1) / (longest - 1)
            } else {
                0
            };
            let row = ((hi - v) / span * (height - 1) as f64).round() as usize;
            grid[row.min(height - 1)][col] = glyph;
        }
    }

    for (r, row) in grid.iter().enumerate() {
        let label = match r {
            0 => format!("{:>11.3e}", hi),
            r if r == height - 1 => format!("{:>11.3e}", lo),
            _ => " ".repeat(11),
        };
        out.push_str(&label);
        out.push_str(" |");
        out.extend(row.iter());
        out.push('\n');
    }
    out.push_str(&" ".repeat(12));
    out.push('+');
    out.push_str(&"-".repeat(width));
    out.push('\n');
    out.push_str(&format!(
        "{}0{:>w$}\n",
        " ".repeat(13),
        longest.saturating_sub(1),
        w = width - 1
    ));

    for (k, s) in series.iter().enumerate() {
        out.push_str(&format!("  {} {}\n", GLYPHS[k % GLYPHS.len()], s.name));
    }
    out
}

/// Write `series` as CSV columns indexed by iteration.
pub fn write_csv<P: AsRef<Path>>(path: P, series: &[Series]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["iteration".to_string()];
    header.extend(series.iter().map(|s| s.name.clone()));
    wtr.write_record(&header)?;

    let rows = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
    for i in 0..rows {
        let mut record = vec![i.to_string()];
        record.extend(
            series
                .iter()
                .map(|s| s.values.get(i).map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_has_title_rows_and_legend() {
        let s = [
            Series::new("learning rate", vec![0.01, 0.0055, 0.001]),
            Series::new("error rate", vec![0.001, 0.00055, 0.0001]),
        ];
        let chart = render_line_chart("Schedules", &s, 30, 8);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines[0], "Schedules");
        // title + 8 rows + axis + x labels + 2 legend lines
        assert_eq!(lines.len(), 13);
        assert!(lines[1].contains('*'));
        assert!(chart.contains("* learning rate"));
        assert!(chart.contains("+ error rate"));
    }

    #[test]
    fn descending_series_starts_top_left_and_ends_bottom_right() {
        let s = [Series::new("down", vec![3.0, 2.0, 1.0, 0.0])];
        let chart = render_line_chart("t", &s, 10, 4);
        let rows: Vec<&str> = chart.lines().skip(1).take(4).collect();
        let body = |r: &str| r.split_once('|').map(|(_, b)| b.to_string()).unwrap();
        assert_eq!(body(rows[0]).chars().next(), Some('*'));
        assert_eq!(body(rows[3]).chars().last(), Some('*'));
    }

    #[test]
    fn empty_input_renders_placeholder() {
        assert!(render_line_chart("t", &[], 10, 4).contains("(no data)"));
        let nan = [Series::new("nan", vec![f64::NAN])];
        assert!(render_line_chart("t", &nan, 10, 4).contains("(no data)"));
    }

    #[test]
    fn constant_series_does_not_divide_by_zero() {
        let s = [Series::new("flat", vec![0.5; 5])];
        let chart = render_line_chart("t", &s, 5, 3);
        let plotted: usize = chart
            .lines()
            .skip(1)
            .take(3)
            .map(|l| l.matches('*').count())
            .sum();
        assert_eq!(plotted, 5);
    }

    #[test]
    fn csv_columns_align_by_index() {
        let dir = std::env::temp_dir().join(format!("qml-trader-csv-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("series.csv");
        let s = [
            Series::new("a", vec![1.0, 2.0]),
            Series::new("b", vec![0.5]),
        ];
        write_csv(&path, &s).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "iteration,a,b\n0,1,0.5\n1,2,\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn csv_quotes_names_with_commas() {
        let dir = std::env::temp_dir().join(format!("qml-trader-csv-quote-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("series.csv");
        write_csv(&path, &[Series::new("rate, lr", vec![1.0])]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, vec!["iteration", "rate, lr"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(&rows[0][1], "1");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
