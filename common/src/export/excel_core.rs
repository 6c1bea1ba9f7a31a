//! Excel生成（共通ライブラリ）
//!
//! 集計レポートを1シートのExcelとしてバッファに生成する

use crate::error::{Error, Result};
use crate::report::ConsolidatedReport;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

const CODE_COL_WIDTH: f64 = 16.0;
const NAME_COL_WIDTH: f64 = 48.0;
const QTY_COL_WIDTH: f64 = 12.0;

/// 集計レポートのExcelをバッファに生成
///
/// # Arguments
/// * `report` - 集計レポート
/// * `title` - シート先頭に表示するタイトル
pub fn generate_report_buffer(report: &ConsolidatedReport, title: &str) -> Result<Vec<u8>> {
    build_workbook(report, title).map_err(Error::Export)
}

fn build_workbook(report: &ConsolidatedReport, title: &str) -> std::result::Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let title_format = Format::new()
        .set_bold()
        .set_font_size(14.0);

    let header_format = Format::new()
        .set_bold()
        .set_font_size(10.0)
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let text_format = Format::new()
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let qty_format = Format::new()
        .set_align(FormatAlign::Right)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let total_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Consolidado")
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    worksheet.set_column_width(0, CODE_COL_WIDTH)
        .map_err(|e| format!("列幅設定エラー: {}", e))?;
    worksheet.set_column_width(1, NAME_COL_WIDTH)
        .map_err(|e| format!("列幅設定エラー: {}", e))?;
    worksheet.set_column_width(2, QTY_COL_WIDTH)
        .map_err(|e| format!("列幅設定エラー: {}", e))?;

    worksheet.write_string_with_format(0, 0, title, &title_format)
        .map_err(|e| format!("タイトル書き込みエラー: {}", e))?;
    worksheet.write_string(1, 0, format!("Baseado em {} cartões digitalizados", report.session_count))
        .map_err(|e| format!("母数書き込みエラー: {}", e))?;

    let header_row: u32 = 3;
    for (col, label) in ["Código", "Descrição", "Quantidade"].iter().enumerate() {
        worksheet.write_string_with_format(header_row, col as u16, *label, &header_format)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
    }

    let mut row = header_row + 1;
    for entry in &report.entries {
        worksheet.write_string_with_format(row, 0, &entry.code, &text_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet.write_string_with_format(row, 1, &entry.name, &text_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet.write_number_with_format(row, 2, entry.quantity as f64, &qty_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        row += 1;
    }

    worksheet.write_string_with_format(row, 1, "Total", &total_format)
        .map_err(|e| format!("合計書き込みエラー: {}", e))?;
    worksheet.write_number_with_format(row, 2, report.total_items as f64, &total_format)
        .map_err(|e| format!("合計書き込みエラー: {}", e))?;

    workbook.save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}
