//! 集計レポートの出力（表示/CSV/TSV/Excel）

use crate::error::Result;
use clap::ValueEnum;
use kit_scan_common::export::{excel_core, to_csv, to_tsv};
use kit_scan_common::ConsolidatedReport;
use std::path::{Path, PathBuf};

/// 出力形式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// 端末に表として表示
    #[default]
    Table,
    Csv,
    Tsv,
    Xlsx,
}

impl ReportFormat {
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ReportFormat::Table => None,
            ReportFormat::Csv => Some("csv"),
            ReportFormat::Tsv => Some("tsv"),
            ReportFormat::Xlsx => Some("xlsx"),
        }
    }
}

const DEFAULT_STEM: &str = "consolidado";

fn output_path_for_format(output: Option<&Path>, extension: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() || path.extension().is_none() => {
            path.join(format!("{}.{}", DEFAULT_STEM, extension))
        }
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format!("{}.{}", DEFAULT_STEM, extension)),
    }
}

/// レポートを指定形式で出力。書き出したファイルのパスを返す
pub fn export_report(
    report: &ConsolidatedReport,
    format: ReportFormat,
    output: Option<&Path>,
    title: &str,
) -> Result<Option<PathBuf>> {
    let contents = match format {
        ReportFormat::Table => {
            print_report(report);
            return Ok(None);
        }
        ReportFormat::Csv => to_csv(&report.entries).into_bytes(),
        ReportFormat::Tsv => to_tsv(&report.entries).into_bytes(),
        ReportFormat::Xlsx => excel_core::generate_report_buffer(report, title)?,
    };

    let extension = format.extension().unwrap_or("txt");
    let output_path = output_path_for_format(output, extension);
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output_path, contents)?;

    Ok(Some(output_path))
}

/// 集計を表形式で表示
pub fn print_report(report: &ConsolidatedReport) {
    if report.is_empty() {
        println!("集計対象のセッションがありません");
        return;
    }

    println!("{:<14} {:<40} {:>10}", "Código", "Descrição", "Quantidade");
    println!("{}", "-".repeat(66));
    for entry in &report.entries {
        println!("{:<14} {:<40} {:>10}", entry.code, entry.name, entry.quantity);
    }
    println!("{}", "-".repeat(66));
    println!("{:<55} {:>10}", "Total", report.total_items);
    println!("Baseado em {} cartões", report.session_count);
}
