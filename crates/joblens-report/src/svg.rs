// SPDX-License-Identifier: Apache-2.0

//! Hand-rendered inline SVG charts. Everything is emitted as markup inside
//! the page, keeping the report self-contained with no script or image
//! fetches at view time.

use chrono::NaiveDate;

use crate::aggregate::DAY_LABELS;

pub const COLOR_PRIMARY: &str = "#4a90d9";
pub const COLOR_ALERT: &str = "#e74c3c";
pub const COLOR_GREEN: &str = "#27ae60";
pub const COLOR_ORANGE: &str = "#e67e22";
pub const COLOR_PURPLE: &str = "#9b59b6";

const TEXT_COLOR: &str = "#eeeeee";
const MUTED_COLOR: &str = "#888888";
const FONT: &str = "font-family=\"-apple-system, 'Segoe UI', Roboto, sans-serif\"";

/// Viridis anchor stops for the heatmap ramp.
const VIRIDIS: [(u8, u8, u8); 5] = [
    (0x44, 0x01, 0x54),
    (0x3b, 0x52, 0x8b),
    (0x21, 0x91, 0x8c),
    (0x5e, 0xc9, 0x62),
    (0xfd, 0xe7, 0x25),
];

pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let head: String = label.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

/// Interpolated viridis color for `t` in `[0, 1]`.
#[must_use]
pub fn viridis(t: f64) -> String {
    let t = t.clamp(0.0, 1.0);
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(VIRIDIS.len() - 1);
    let frac = scaled - lower as f64;
    let (r0, g0, b0) = VIRIDIS[lower];
    let (r1, g1, b1) = VIRIDIS[upper];
    let lerp = |a: u8, b: u8| -> u8 { (f64::from(a) + (f64::from(b) - f64::from(a)) * frac) as u8 };
    format!("#{:02x}{:02x}{:02x}", lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

fn svg_open(width: u32, height: u32, title: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {width} {height}\" \
         width=\"{width}\" height=\"{height}\" role=\"img\" aria-label=\"{}\">\n\
         <text x=\"{}\" y=\"22\" {FONT} font-size=\"16\" font-weight=\"bold\" \
         fill=\"{TEXT_COLOR}\" text-anchor=\"middle\">{}</text>\n",
        xml_escape(title),
        width / 2,
        xml_escape(title),
    )
}

/// Horizontal bar chart: labels on the left, counts at the bar ends.
pub fn h_bar_chart(title: &str, rows: &[(&str, u64)], color: &str, width: u32) -> String {
    let row_height = 24;
    let top = 40;
    let label_width = 190;
    let height = top + rows.len() as u32 * row_height + 10;
    let bar_area = width.saturating_sub(label_width + 70) as f64;
    let max = rows.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1) as f64;

    let mut out = svg_open(width, height, title);
    for (i, (label, count)) in rows.iter().enumerate() {
        let y = top + i as u32 * row_height;
        let bar = (*count as f64 / max * bar_area).max(1.0);
        out.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" {FONT} font-size=\"12\" fill=\"{TEXT_COLOR}\" \
             text-anchor=\"end\">{}</text>\n",
            label_width - 8,
            y + 16,
            xml_escape(&truncate_label(label, 26)),
        ));
        out.push_str(&format!(
            "<rect x=\"{label_width}\" y=\"{}\" width=\"{:.1}\" height=\"16\" fill=\"{color}\" rx=\"2\"/>\n",
            y + 4,
            bar,
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{}\" {FONT} font-size=\"11\" fill=\"{MUTED_COLOR}\">{count}</text>\n",
            label_width as f64 + bar + 6.0,
            y + 16,
        ));
    }
    out.push_str("</svg>\n");
    out
}

/// Vertical bar chart with per-bar highlight control.
pub fn v_bar_chart(
    title: &str,
    rows: &[(&str, u64)],
    base_color: &str,
    highlight_color: &str,
    highlight: impl Fn(&str) -> bool,
    width: u32,
    height: u32,
) -> String {
    let top = 40;
    let bottom = 40;
    let plot_height = height.saturating_sub(top + bottom) as f64;
    let max = rows.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1) as f64;
    let slot = if rows.is_empty() {
        0.0
    } else {
        f64::from(width - 40) / rows.len() as f64
    };
    let bar_width = (slot * 0.7).max(2.0);

    let mut out = svg_open(width, height, title);
    for (i, (label, count)) in rows.iter().enumerate() {
        let x = 20.0 + i as f64 * slot + (slot - bar_width) / 2.0;
        let bar = (*count as f64 / max * plot_height).max(1.0);
        let y = f64::from(top) + plot_height - bar;
        let color = if highlight(label) { highlight_color } else { base_color };
        out.push_str(&format!(
            "<rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_width:.1}\" height=\"{bar:.1}\" \
             fill=\"{color}\" rx=\"2\"/>\n",
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" {FONT} font-size=\"11\" fill=\"{MUTED_COLOR}\" \
             text-anchor=\"middle\">{}</text>\n",
            x + bar_width / 2.0,
            y - 4.0,
            count,
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{}\" {FONT} font-size=\"11\" fill=\"{TEXT_COLOR}\" \
             text-anchor=\"middle\">{}</text>\n",
            x + bar_width / 2.0,
            height - bottom + 16,
            xml_escape(&truncate_label(label, 10)),
        ));
    }
    out.push_str("</svg>\n");
    out
}

/// Daily time series as a line with point markers.
pub fn line_chart(title: &str, points: &[(NaiveDate, u64)], color: &str, width: u32, height: u32) -> String {
    let top = 40;
    let bottom = 30;
    let left = 50;
    let right = 20;
    let plot_w = f64::from(width - left - right);
    let plot_h = f64::from(height - top - bottom);
    let max = points.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1) as f64;

    let mut out = svg_open(width, height, title);
    out.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" {FONT} font-size=\"11\" fill=\"{MUTED_COLOR}\" \
         text-anchor=\"end\">{}</text>\n",
        left - 6,
        top + 12,
        max as u64,
    ));
    out.push_str(&format!(
        "<line x1=\"{left}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{MUTED_COLOR}\" stroke-width=\"1\"/>\n",
        top + plot_h as u32,
        width - right,
        top + plot_h as u32,
    ));

    let coords: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, (_, count))| {
            let x = if points.len() > 1 {
                f64::from(left) + i as f64 / (points.len() - 1) as f64 * plot_w
            } else {
                f64::from(left) + plot_w / 2.0
            };
            let y = f64::from(top) + plot_h - (*count as f64 / max * plot_h);
            (x, y)
        })
        .collect();

    if coords.len() > 1 {
        let path: Vec<String> = coords.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
        out.push_str(&format!(
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"/>\n",
            path.join(" "),
        ));
    }
    for (x, y) in &coords {
        out.push_str(&format!(
            "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"2.5\" fill=\"{color}\"/>\n",
        ));
    }

    if let (Some((first, _)), Some((last, _))) = (points.first(), points.last()) {
        out.push_str(&format!(
            "<text x=\"{left}\" y=\"{}\" {FONT} font-size=\"11\" fill=\"{TEXT_COLOR}\">{first}</text>\n",
            height - 8,
        ));
        out.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" {FONT} font-size=\"11\" fill=\"{TEXT_COLOR}\" \
             text-anchor=\"end\">{last}</text>\n",
            width - right,
            height - 8,
        ));
    }
    out.push_str("</svg>\n");
    out
}

/// Hour-of-day by day-of-week heatmap on the viridis ramp.
pub fn heatmap_chart(title: &str, grid: &[[u64; 24]; 7], width: u32) -> String {
    let top = 40;
    let left = 90;
    let cell_w = (width - left - 20) / 24;
    let cell_h = 20;
    let height = top + 7 * cell_h + 30;
    let max = grid
        .iter()
        .flat_map(|row| row.iter())
        .copied()
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let mut out = svg_open(width, height, title);
    for (day, row) in grid.iter().enumerate() {
        let y = top + day as u32 * cell_h;
        out.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" {FONT} font-size=\"11\" fill=\"{TEXT_COLOR}\" \
             text-anchor=\"end\">{}</text>\n",
            left - 8,
            y + 14,
            DAY_LABELS[day],
        ));
        for (hour, &count) in row.iter().enumerate() {
            let x = left + hour as u32 * cell_w;
            let color = viridis(count as f64 / max);
            out.push_str(&format!(
                "<rect x=\"{x}\" y=\"{y}\" width=\"{}\" height=\"{}\" fill=\"{color}\">\
                 <title>{} {hour:02}:00 = {count}</title></rect>\n",
                cell_w - 1,
                cell_h - 1,
                DAY_LABELS[day],
            ));
        }
    }
    for hour in (0..24).step_by(3) {
        out.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" {FONT} font-size=\"10\" fill=\"{MUTED_COLOR}\">{hour:02}</text>\n",
            left + hour as u32 * cell_w,
            top + 7 * cell_h + 16,
        ));
    }
    out.push_str("</svg>\n");
    out
}
