// SPDX-License-Identifier: Apache-2.0

//! Static HTML page rendering. Pages are fully self-contained: styles are
//! inlined and charts are embedded SVG, so the tree can be served as plain
//! files or opened from disk.

use joblens_model::safe_tool_filename;

use crate::aggregate::{AggregateView, ToolDetail, DAY_LABELS};
use crate::svg::{
    h_bar_chart, heatmap_chart, line_chart, v_bar_chart, xml_escape, COLOR_ALERT, COLOR_GREEN,
    COLOR_ORANGE, COLOR_PRIMARY, COLOR_PURPLE,
};
use crate::{TOP_EXIT_CODES, TOP_TOOLS, TOP_USERS};

const PAGE_CSS: &str = r#"
    :root { --bg: #1a1a2e; --card-bg: #16213e; --text: #eee; --text-muted: #888; --accent: #4a90d9; --border: #0f3460; }
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: var(--bg); color: var(--text); line-height: 1.6; padding: 20px; }
    .container { max-width: 1200px; margin: 0 auto; }
    header { text-align: center; padding: 30px 0; border-bottom: 1px solid var(--border); margin-bottom: 30px; }
    h1 { font-size: 2.5em; margin-bottom: 10px; }
    .subtitle { color: var(--text-muted); font-size: 1.1em; }
    .back { color: var(--accent); text-decoration: none; display: inline-block; margin-bottom: 20px; }
    .back:hover { text-decoration: underline; }
    .stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 20px; margin-bottom: 40px; }
    .stat-card { background: var(--card-bg); padding: 20px; border-radius: 10px; text-align: center; border: 1px solid var(--border); }
    .stat-value { font-size: 2em; font-weight: bold; color: var(--accent); }
    .stat-label { color: var(--text-muted); font-size: 0.9em; }
    section { background: var(--card-bg); border-radius: 10px; padding: 25px; margin-bottom: 30px; border: 1px solid var(--border); }
    h2 { color: var(--accent); margin-bottom: 20px; padding-bottom: 10px; border-bottom: 1px solid var(--border); }
    h3 { color: var(--text); margin: 20px 0 10px; }
    .chart { text-align: center; margin: 20px 0; }
    table { width: 100%; border-collapse: collapse; margin: 15px 0; font-size: 0.9em; }
    th, td { padding: 12px; text-align: left; border-bottom: 1px solid var(--border); }
    th { background: rgba(74, 144, 217, 0.2); color: var(--accent); }
    tr:hover { background: rgba(255,255,255,0.05); }
    code { background: rgba(0,0,0,0.3); padding: 2px 6px; border-radius: 4px; font-size: 0.85em; word-break: break-all; }
    .error-msg { font-family: monospace; font-size: 0.85em; white-space: pre-wrap; word-break: break-all; background: rgba(0,0,0,0.3); padding: 8px; border-radius: 4px; display: block; margin: 5px 0; }
    .grid-2 { display: grid; grid-template-columns: repeat(auto-fit, minmax(400px, 1fr)); gap: 20px; }
    .muted { color: var(--text-muted); }
    .timestamp { color: var(--text-muted); font-size: 0.8em; margin-top: 30px; text-align: center; }
    @media (max-width: 768px) { .grid-2 { grid-template-columns: 1fr; } h1 { font-size: 1.8em; } }
"#;

fn page_shell(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{}</title>\n<style>{PAGE_CSS}</style>\n</head>\n<body>\n\
         <div class=\"container\">\n{body}</div>\n</body>\n</html>\n",
        xml_escape(title),
    )
}

fn stat_card(value: &str, label: &str) -> String {
    format!(
        "<div class=\"stat-card\"><div class=\"stat-value\">{}</div>\
         <div class=\"stat-label\">{}</div></div>\n",
        xml_escape(value),
        xml_escape(label),
    )
}

fn count_table(header: (&str, &str), rows: &[(&str, u64)]) -> String {
    let mut out = format!(
        "<table>\n<tr><th>{}</th><th>{}</th></tr>\n",
        xml_escape(header.0),
        xml_escape(header.1),
    );
    for (label, count) in rows {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{count}</td></tr>\n",
            xml_escape(label),
        ));
    }
    out.push_str("</table>\n");
    out
}

pub fn render_overview(view: &AggregateView, generated_at: &str) -> String {
    let mut body = String::new();

    let date_range = match (view.date_min, view.date_max) {
        (Some(min), Some(max)) => format!("{min} to {max}"),
        _ => "no dated records".to_string(),
    };
    body.push_str(&format!(
        "<header>\n<h1>Failed Job Analysis</h1>\n<p class=\"subtitle\">{}</p>\n</header>\n",
        xml_escape(&date_range),
    ));

    body.push_str("<div class=\"stats\">\n");
    body.push_str(&stat_card(&view.total.to_string(), "Total Errors"));
    body.push_str(&stat_card(&view.distinct_tools().to_string(), "Unique Tools"));
    body.push_str(&stat_card(&view.distinct_users().to_string(), "Unique Users"));
    body.push_str(&stat_card(&view.peak_day().to_string(), "Peak Day Errors"));
    body.push_str("</div>\n");

    // 1. Tool failures
    let top_tools: Vec<(&str, u64)> = view.tools_by_count().into_iter().take(TOP_TOOLS).collect();
    body.push_str("<section>\n<h2>1. Tool Failure Analysis</h2>\n");
    body.push_str(&format!(
        "<div class=\"chart\">{}</div>\n",
        h_bar_chart("Top 20 Failing Tools", &top_tools, COLOR_PRIMARY, 700),
    ));
    body.push_str("<h3>Top 20 Failing Tools</h3>\n<table>\n<tr><th>Tool</th><th>Errors</th><th>Details</th></tr>\n");
    for (tool, count) in &top_tools {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{count}</td>\
             <td><a href=\"tools/{}.html\" style=\"color: var(--accent);\">View errors &rarr;</a></td></tr>\n",
            xml_escape(tool),
            safe_tool_filename(tool),
        ));
    }
    body.push_str("</table>\n</section>\n");

    // 2. Error classification
    let exit_codes: Vec<(&str, u64)> = view
        .exit_codes_by_count()
        .into_iter()
        .take(TOP_EXIT_CODES)
        .collect();
    let patterns: Vec<(&str, u64)> = view
        .pattern_counts
        .iter()
        .map(|(label, count)| (label.as_str(), *count))
        .collect();
    body.push_str("<section>\n<h2>2. Error Classification</h2>\n<div class=\"grid-2\">\n");
    body.push_str(&format!(
        "<div class=\"chart\">{}</div>\n",
        v_bar_chart(
            "Exit Code Distribution",
            &exit_codes,
            COLOR_PRIMARY,
            COLOR_ALERT,
            |label| label == "0",
            500,
            250,
        ),
    ));
    body.push_str(&format!(
        "<div class=\"chart\">{}</div>\n",
        h_bar_chart("Error Pattern Categories", &patterns, COLOR_PURPLE, 500),
    ));
    body.push_str("</div>\n</section>\n");

    // 2b. Per-tool brief
    body.push_str(
        "<section>\n<h2>2b. Per-Tool Error Breakdown</h2>\n\
         <p class=\"muted\">Click a tool name for its full error list</p>\n",
    );
    for (tool, count) in top_tools.iter().take(10) {
        body.push_str(&format!(
            "<h3><a href=\"tools/{}.html\" style=\"color: var(--accent); text-decoration: none;\">{}</a> ({count} errors)</h3>\n",
            safe_tool_filename(tool),
            xml_escape(tool),
        ));
        let Some(detail) = view.tools.get(*tool) else {
            continue;
        };
        body.push_str("<table>\n<tr><th>Count</th><th>Error Message</th></tr>\n");
        for group in detail.messages.iter().take(5) {
            let brief: String = group.key.chars().take(60).collect();
            body.push_str(&format!(
                "<tr><td>{}</td><td><code>{}</code></td></tr>\n",
                group.count,
                xml_escape(&brief),
            ));
        }
        body.push_str("</table>\n");
    }
    body.push_str("</section>\n");

    // 3. Infrastructure
    let destinations = view.destinations_by_count();
    body.push_str("<section>\n<h2>3. Infrastructure Analysis</h2>\n");
    body.push_str(&format!(
        "<div class=\"chart\">{}</div>\n",
        h_bar_chart("Failures by Destination", &destinations, COLOR_GREEN, 600),
    ));
    body.push_str("</section>\n");

    // 4. Temporal patterns
    let daily: Vec<(chrono::NaiveDate, u64)> =
        view.daily_counts.iter().map(|(&d, &c)| (d, c)).collect();
    let dow: Vec<(&str, u64)> = DAY_LABELS
        .iter()
        .zip(view.dow_counts.iter())
        .map(|(label, &count)| (*label, count))
        .collect();
    body.push_str("<section>\n<h2>4. Temporal Patterns</h2>\n");
    body.push_str(&format!(
        "<div class=\"chart\">{}</div>\n",
        line_chart("Daily Error Count", &daily, COLOR_ORANGE, 650, 250),
    ));
    body.push_str("<div class=\"grid-2\">\n");
    body.push_str(&format!(
        "<div class=\"chart\">{}</div>\n",
        v_bar_chart(
            "Errors by Day of Week",
            &dow,
            COLOR_PRIMARY,
            COLOR_ALERT,
            |label| label == "Saturday" || label == "Sunday",
            450,
            220,
        ),
    ));
    body.push_str(&format!(
        "<div class=\"chart\">{}</div>\n",
        heatmap_chart("Hour x Day Heatmap", &view.hour_dow, 620),
    ));
    body.push_str("</div>\n");
    if !view.spike_days.is_empty() {
        let spikes: Vec<(String, u64)> = view
            .spike_days
            .iter()
            .map(|(date, count)| (date.to_string(), *count))
            .collect();
        let spike_rows: Vec<(&str, u64)> =
            spikes.iter().map(|(date, count)| (date.as_str(), *count)).collect();
        body.push_str("<h3>Spike Days</h3>\n");
        body.push_str(&count_table(("Date", "Errors"), &spike_rows));
    }
    body.push_str("</section>\n");

    // 5. User impact
    let top_users: Vec<(&str, u64)> = view.users_by_count().into_iter().take(TOP_USERS).collect();
    body.push_str("<section>\n<h2>5. User Impact</h2>\n<h3>Top 10 Users by Error Count</h3>\n");
    body.push_str(&count_table(("User", "Errors"), &top_users));
    body.push_str(&format!(
        "<p class=\"muted\" style=\"margin-top: 15px;\">Anonymous errors (no user id): <strong>{}</strong></p>\n",
        view.anonymous,
    ));
    body.push_str("</section>\n");

    // 6. Anomalies
    body.push_str("<section>\n<h2>6. Anomalies</h2>\n<h3>Exit Code 0 Failures</h3>\n");
    body.push_str(&format!(
        "<p>{} jobs exited with code 0 but were marked as failed.</p>\n",
        view.exit_zero_count,
    ));
    if !view.exit_zero_tools.is_empty() {
        let zero_rows: Vec<(&str, u64)> = view
            .exit_zero_tools
            .iter()
            .map(|(tool, count)| (tool.as_str(), *count))
            .collect();
        body.push_str(&count_table(("Tool", "Count"), &zero_rows));
    }
    body.push_str("</section>\n");

    body.push_str(&format!(
        "<p class=\"timestamp\">Generated: {}</p>\n",
        xml_escape(generated_at),
    ));

    page_shell("Failed Job Analysis Dashboard", &body)
}

pub fn render_tool_page(tool: &str, detail: &ToolDetail) -> String {
    let mut body = String::new();
    body.push_str("<a href=\"../index.html\" class=\"back\">&larr; Back to Dashboard</a>\n");
    body.push_str(&format!("<h1>{}</h1>\n", xml_escape(tool)));

    body.push_str("<div class=\"stats\">\n");
    body.push_str(&stat_card(&detail.total.to_string(), "Total Errors"));
    body.push_str(&stat_card(&detail.messages.len().to_string(), "Unique Error Types"));
    body.push_str(&stat_card(&detail.affected_users.to_string(), "Affected Users"));
    body.push_str("</div>\n");

    let mut exit_rows: Vec<(&str, u64)> = detail
        .exit_codes
        .iter()
        .map(|(code, &count)| (code.as_str(), count))
        .collect();
    exit_rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    exit_rows.truncate(5);
    body.push_str("<h2 style=\"margin: 30px 0 15px;\">Exit Codes</h2>\n");
    body.push_str(&count_table(("Exit Code", "Count"), &exit_rows));

    let mut dest_rows: Vec<(&str, u64)> = detail
        .destinations
        .iter()
        .map(|(dest, &count)| (dest.as_str(), count))
        .collect();
    dest_rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    dest_rows.truncate(5);
    body.push_str("<h2 style=\"margin: 30px 0 15px;\">Destinations</h2>\n");
    body.push_str(&count_table(("Destination", "Count"), &dest_rows));

    body.push_str("<h2 style=\"margin: 30px 0 15px;\">All Unique Error Messages</h2>\n");
    body.push_str("<table>\n<tr><th style=\"width: 80px;\">Count</th><th>Error Message</th></tr>\n");
    for group in &detail.messages {
        body.push_str(&format!(
            "<tr><td>{}</td><td><span class=\"error-msg\">{}</span>",
            group.count,
            xml_escape(&group.key),
        ));
        if group.example.len() > group.key.len() + 20 {
            body.push_str(&format!(
                "<details><summary class=\"muted\" style=\"cursor: pointer; margin-top: 5px;\">Show full stderr</summary>\
                 <span class=\"error-msg\" style=\"margin-top: 10px;\">{}</span></details>",
                xml_escape(&group.example),
            ));
        }
        body.push_str("</td></tr>\n");
    }
    body.push_str("</table>\n");

    page_shell(&format!("{tool} Errors"), &body)
}
