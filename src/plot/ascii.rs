//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - series line: `*`
//! - optional horizontal guide (e.g. R = 1): dashed `- - -`

use crate::domain::CountrySeries;
use crate::metrics::{new_cases_each_day, r_values_each_day};

/// Plot a sequence of values against their index.
pub fn render_series_plot(title: &str, values: &[f64], guide: Option<f64>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut out = String::new();
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        out.push_str(&format!("{title} | no data\n"));
        return out;
    }

    let (y_min, y_max) = y_range(&values, guide);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let x_max = (values.len() - 1).max(1) as f64;

    let mut grid = vec![vec![' '; width]; height];

    let mut prev = None;
    for (i, &v) in values.iter().enumerate() {
        let x = map_x(i as f64, 0.0, x_max, width);
        let y = map_y(v, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, y, '*'),
            None => grid[y][x] = '*',
        }
        prev = Some((x, y));
    }

    // The guide only fills empty cells so the series stays readable where they cross.
    if let Some(g) = guide {
        let y = map_y(g, y_min, y_max, height);
        for (x, cell) in grid[y].iter_mut().enumerate() {
            if x % 2 == 0 && *cell == ' ' {
                *cell = '-';
            }
        }
    }

    out.push_str(&format!(
        "{title} | days={} | y=[{y_min:.2}, {y_max:.2}]",
        values.len()
    ));
    if let Some(g) = guide {
        out.push_str(&format!(" | guide={g:.2}"));
    }
    out.push('\n');

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// New cases and R values of the last `days` days, one plot each.
pub fn render_country_plots(series: &CountrySeries, window: usize, days: usize, width: usize, height: usize) -> String {
    let new_cases: Vec<f64> = new_cases_each_day(series)
        .tail(days)
        .iter()
        .map(|&v| v as f64)
        .collect();
    let r_values = r_values_each_day(series, window);

    let mut out = render_series_plot(
        &format!("{}: new cases", series.country()),
        &new_cases,
        None,
        width,
        height,
    );
    out.push('\n');
    out.push_str(&render_series_plot(
        &format!("{}: R", series.country()),
        r_values.tail(days),
        Some(1.0),
        width,
        height,
    ));
    out
}

fn y_range(values: &[f64], guide: Option<f64>) -> (f64, f64) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &v in values.iter().chain(guide.iter()) {
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }
    if max_y > min_y { (min_y, max_y) } else { (min_y - 1.0, max_y + 1.0) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_series_plot("New cases", &[0.0, 10.0], None, 10, 5);
        let expected = concat!(
            "New cases | days=2 | y=[-0.50, 10.50]\n",
            "        **\n",
            "      **  \n",
            "    **    \n",
            "  **      \n",
            "**        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn guide_line_is_dashed_and_stays_behind_the_series() {
        let txt = render_series_plot("R", &[0.5, 1.5], Some(1.0), 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "R | days=2 | y=[0.45, 1.55] | guide=1.00");
        assert_eq!(lines[3], "- - **- - ");
    }

    #[test]
    fn empty_series_renders_placeholder() {
        assert_eq!(render_series_plot("R", &[], Some(1.0), 10, 5), "R | no data\n");
    }
}
