// SPDX-License-Identifier: Apache-2.0

//! Report rendering entry point: reads the sanitized artifact, aggregates,
//! and writes the overview page plus one page per distinct tool. The output
//! tree is replaced, not merged with whatever a prior run left behind.

use std::fs;
use std::path::PathBuf;

use joblens_core::jsonio::load_json_array;
use joblens_core::stagelog::{PipelineStage, StageLog};
use joblens_model::{report_paths, safe_tool_filename, JobRecord};

use crate::aggregate::aggregate_records;
use crate::classify::ErrorPatternTable;
use crate::html::{render_overview, render_tool_page};
use crate::{ReportError, ReportOptions};

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ReportOutput {
    pub index_path: PathBuf,
    pub tool_pages: Vec<PathBuf>,
    pub records: usize,
}

pub fn generate_report(
    options: &ReportOptions,
    log: &mut StageLog,
) -> Result<ReportOutput, ReportError> {
    if !options.data_path.exists() {
        return Err(ReportError(format!(
            "sanitized artifact not found at {}; run the full pipeline (validate + sanitize) first",
            options.data_path.display()
        )));
    }

    log.emit(
        PipelineStage::Load,
        "report.load",
        [("path".to_string(), options.data_path.display().to_string())].into(),
    );
    let raw = load_json_array(&options.data_path)?;
    let mut records: Vec<JobRecord> = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        let record: JobRecord = serde_json::from_value(value).map_err(|e| {
            ReportError(format!(
                "record {index} does not match the sanitized record shape: {e}"
            ))
        })?;
        records.push(record);
    }
    log.emit_count(PipelineStage::Load, "report.loaded", records.len());

    let table = ErrorPatternTable::compile(&options.patterns)?;
    let view = aggregate_records(&records, &table);
    log.emit_count(PipelineStage::Aggregate, "report.tools", view.distinct_tools());

    let paths = report_paths(&options.report_dir);
    fs::create_dir_all(&paths.root)
        .map_err(|e| ReportError(format!("cannot create {}: {e}", paths.root.display())))?;
    if paths.tools_dir.exists() {
        fs::remove_dir_all(&paths.tools_dir)
            .map_err(|e| ReportError(format!("cannot clear {}: {e}", paths.tools_dir.display())))?;
    }
    fs::create_dir_all(&paths.tools_dir)
        .map_err(|e| ReportError(format!("cannot create {}: {e}", paths.tools_dir.display())))?;

    let generated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let overview = render_overview(&view, &generated_at);
    fs::write(&paths.index_html, overview)
        .map_err(|e| ReportError(format!("cannot write {}: {e}", paths.index_html.display())))?;

    let mut tool_pages = Vec::with_capacity(view.tools.len());
    for (tool, detail) in &view.tools {
        let page_path = paths
            .tools_dir
            .join(format!("{}.html", safe_tool_filename(tool)));
        fs::write(&page_path, render_tool_page(tool, detail))
            .map_err(|e| ReportError(format!("cannot write {}: {e}", page_path.display())))?;
        tool_pages.push(page_path);
    }
    log.emit_count(PipelineStage::Render, "report.pages", tool_pages.len() + 1);

    Ok(ReportOutput {
        index_path: paths.index_html,
        tool_pages,
        records: records.len(),
    })
}
