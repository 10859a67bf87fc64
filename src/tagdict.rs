/*
SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza
*/

//! Taxonomy dictionary loaders. Two source spreadsheets: the element tag
//! list (one sheet, `"9"`) and the per-industry account list (one sheet per
//! industry). Both are cleaned the same way: blanks forward-filled, parent
//! backreferences carried from the most recent depth-0 row, spreadsheet
//! carriage-return artifacts stripped from the free-text label columns.

use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use chrono::Local;
use log::info;

use crate::DbPool;
use crate::error::{IngestError, Result};
use crate::models::{AccountTagRow, TagRow};
use crate::store::Store;

const TAG_SHEET: &str = "9";

/// Table-of-contents sheets in the account list workbook.
const SKIP_SHEETS: &[&str] = &["目次", "勘定科目リストについて"];

/// Section-header literals repeated inside the account sheets' classification
/// column. Rows carrying one of these are structure, not elements.
const SECTION_HEADERS: &[&str] = &[
    "貸借対照表　科目一覧",
    "損益計算書　科目一覧",
    "包括利益計算書　科目一覧",
    "株主資本等変動計算書　科目一覧",
    "キャッシュ・フロー計算書　科目一覧",
    "社員資本等変動計算書　科目一覧",
    "投資主資本等変動計算書　科目一覧",
    "純資産変動計算書　科目一覧",
    "損益及び剰余金計算書　科目一覧",
    "科目分類",
];

/// Load the element tag dictionary spreadsheet, replacing the stored table.
pub fn load_tag_dictionary(pool: &DbPool, path: &Path) -> Result<usize> {
    info!("start: load_tag_dictionary {}", path.display());
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook.worksheet_range(TAG_SHEET)?;
    let table = SheetTable::from_range(&range).ok_or_else(|| {
        IngestError::Parse(format!("sheet `{TAG_SHEET}` has no header row"))
    })?;

    let rows = tag_rows(&table, &load_stamp());
    let count = Store::<TagRow>::new(pool.clone()).replace_all(&rows)?;
    info!("end: load_tag_dictionary rows={count}");
    Ok(count)
}

/// Load the per-industry account dictionary spreadsheet, replacing the
/// stored table. Every sheet is an industry except the table-of-contents
/// sheets.
pub fn load_account_dictionary(pool: &DbPool, path: &Path) -> Result<usize> {
    info!("start: load_account_dictionary {}", path.display());
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let stamp = load_stamp();

    let mut rows = Vec::new();
    for sheet in workbook.sheet_names() {
        if SKIP_SHEETS.contains(&sheet.as_str()) {
            continue;
        }
        let range = workbook.worksheet_range(&sheet)?;
        let Some(table) = SheetTable::from_range(&range) else {
            continue;
        };
        rows.extend(account_rows(&table, &sheet, &stamp));
    }

    let count = Store::<AccountTagRow>::new(pool.clone()).replace_all(&rows)?;
    info!("end: load_account_dictionary rows={count}");
    Ok(count)
}

fn load_stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A worksheet reduced to strings: the header row (second row of the used
/// range) and the data rows below it.
struct SheetTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl SheetTable {
    fn from_range(range: &Range<Data>) -> Option<Self> {
        let mut iter = range.rows();
        iter.next()?;
        let headers: Vec<String> = iter
            .next()?
            .iter()
            .map(|cell| cell_string(cell).unwrap_or_default())
            .collect();
        let rows = iter
            .map(|row| {
                let mut cells: Vec<Option<String>> = row.iter().map(cell_string).collect();
                cells.resize(headers.len(), None);
                cells
            })
            .collect();
        Some(SheetTable { headers, rows })
    }

    fn col(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    fn cell(&self, row: &[Option<String>], header: &str) -> Option<String> {
        self.col(header).and_then(|i| row.get(i).cloned().flatten())
    }
}

fn cell_string(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.clone(),
        other => other.to_string(),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Fill blank cells from the nearest non-blank cell above, per column.
fn forward_fill(rows: &mut [Vec<Option<String>>]) {
    let width = rows.first().map_or(0, Vec::len);
    for col in 0..width {
        let mut last: Option<String> = None;
        for row in rows.iter_mut() {
            match &row[col] {
                Some(v) => last = Some(v.clone()),
                None => row[col] = last.clone(),
            }
        }
    }
}

/// Strip `_x000D_` carriage-return artifacts and collapse whitespace runs.
fn clean_label(value: Option<String>) -> Option<String> {
    value.map(|v| {
        v.replace("_x000D_", " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    })
}

fn element_id(prefix: &Option<String>, name: &Option<String>) -> Option<String> {
    match (prefix, name) {
        (Some(p), Some(n)) => Some(format!("{p}:{n}")),
        _ => None,
    }
}

/// Parent backreference carry: a depth-0 row names the parent for itself and
/// every following row until the next depth-0 row.
struct ParentCarry<const N: usize> {
    current: [Option<String>; N],
}

impl<const N: usize> ParentCarry<N> {
    fn new() -> Self {
        ParentCarry {
            current: std::array::from_fn(|_| None),
        }
    }

    fn observe(&mut self, depth: Option<&str>, values: [Option<String>; N]) -> [Option<String>; N] {
        if depth == Some("0") {
            self.current = values;
        }
        self.current.clone()
    }
}

fn tag_rows(table: &SheetTable, stamp: &str) -> Vec<TagRow> {
    let element_name_col = table.col("要素名");
    let mut rows: Vec<Vec<Option<String>>> = table
        .rows
        .iter()
        .filter(|row| {
            element_name_col
                .and_then(|i| row.get(i).cloned().flatten())
                .is_some()
        })
        .cloned()
        .collect();
    forward_fill(&mut rows);

    let mut carry = ParentCarry::<3>::new();
    rows.iter()
        .map(|row| {
            let namespace_prefix = table.cell(row, "名前空間プレフィックス");
            let element_name = table.cell(row, "要素名");
            let standard_label_tree = table.cell(row, "様式ツリー-標準ラベル（日本語）");
            let detailed_label_tree = table.cell(row, "詳細ツリー-標準ラベル（日本語）");
            let depth = table.cell(row, "depth");
            let [parent_element_name, parent_standard_label_tree, parent_detailed_label_tree] =
                carry.observe(
                    depth.as_deref(),
                    [
                        element_name.clone(),
                        standard_label_tree.clone(),
                        detailed_label_tree.clone(),
                    ],
                );
            TagRow {
                id: None,
                element_id: element_id(&namespace_prefix, &element_name),
                standard_label_tree,
                detailed_label_tree,
                verbose_label_jp: table.cell(row, "冗長ラベル（日本語）"),
                standard_label_en: table.cell(row, "標準ラベル（英語）"),
                verbose_label_en: table.cell(row, "冗長ラベル（英語）"),
                classification_label_jp: clean_label(table.cell(
                    row,
                    "用途区分、財務諸表区分及び業種区分のラベル（日本語）",
                )),
                classification_label_en: clean_label(table.cell(
                    row,
                    "用途区分、財務諸表区分及び業種区分のラベル（英語）",
                )),
                namespace_prefix,
                element_name,
                element_type: table.cell(row, "type"),
                substitution_group: table.cell(row, "substitutionGroup"),
                period_type: table.cell(row, "periodType"),
                balance: table.cell(row, "balance"),
                abstract_flag: table.cell(row, "abstract"),
                depth,
                documentation_label_jp: table.cell(row, "documentationラベル（日本語）"),
                documentation_label_en: table.cell(row, "documentationラベル（英語）"),
                reference_link: clean_label(table.cell(row, "参照リンク")),
                parent_element_name,
                parent_standard_label_tree,
                parent_detailed_label_tree,
                loaded_at: Some(stamp.to_string()),
            }
        })
        .collect()
}

fn account_rows(table: &SheetTable, industry: &str, stamp: &str) -> Vec<AccountTagRow> {
    let classification_col = table.col("科目分類");
    let mut rows: Vec<Vec<Option<String>>> = table
        .rows
        .iter()
        .filter(|row| {
            let classification = classification_col.and_then(|i| row.get(i).cloned().flatten());
            match classification {
                Some(v) => !SECTION_HEADERS.contains(&v.as_str()),
                None => false,
            }
        })
        .cloned()
        .collect();
    forward_fill(&mut rows);

    let mut carry = ParentCarry::<2>::new();
    rows.iter()
        .map(|row| {
            let namespace_prefix = table.cell(row, "名前空間プレフィックス");
            let element_name = table.cell(row, "要素名");
            let standard_label = table.cell(row, "標準ラベル（日本語）");
            let depth = table.cell(row, "depth");
            let [parent_element_name, parent_standard_label] = carry.observe(
                depth.as_deref(),
                [element_name.clone(), standard_label.clone()],
            );
            AccountTagRow {
                id: None,
                account_classification: table.cell(row, "科目分類"),
                industry: Some(industry.to_string()),
                standard_label,
                verbose_label: table.cell(row, "冗長ラベル（日本語）"),
                standard_label_en: table.cell(row, "標準ラベル（英語）"),
                verbose_label_en: table.cell(row, "冗長ラベル（英語）"),
                classification_label_jp: clean_label(table.cell(
                    row,
                    "用途区分、財務諸表区分及び業種区分のラベル（日本語）",
                )),
                classification_label_en: clean_label(table.cell(
                    row,
                    "用途区分、財務諸表区分及び業種区分のラベル（英語）",
                )),
                element_id: element_id(&namespace_prefix, &element_name),
                namespace_prefix,
                element_name,
                element_type: table.cell(row, "type"),
                substitution_group: table.cell(row, "substitutionGroup"),
                period_type: table.cell(row, "periodType"),
                balance: table.cell(row, "balance"),
                abstract_flag: table.cell(row, "abstract"),
                depth,
                reference_link: clean_label(table.cell(row, "参照リンク")),
                parent_element_name,
                parent_standard_label,
                loaded_at: Some(stamp.to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    None
                } else {
                    Some(v.to_string())
                }
            })
            .collect()
    }

    fn tag_table(rows: &[Vec<Option<String>>]) -> SheetTable {
        SheetTable {
            headers: vec![
                "様式ツリー-標準ラベル（日本語）".to_string(),
                "名前空間プレフィックス".to_string(),
                "要素名".to_string(),
                "depth".to_string(),
                "用途区分、財務諸表区分及び業種区分のラベル（日本語）".to_string(),
            ],
            rows: rows.to_vec(),
        }
    }

    #[test]
    fn forward_fill_carries_the_last_value_down() {
        let mut rows = vec![
            cells(&["a", "x"]),
            cells(&["", "y"]),
            cells(&["b", ""]),
            cells(&["", ""]),
        ];
        forward_fill(&mut rows);
        assert_eq!(rows[1][0].as_deref(), Some("a"));
        assert_eq!(rows[2][1].as_deref(), Some("y"));
        assert_eq!(rows[3][0].as_deref(), Some("b"));
    }

    #[test]
    fn depth_zero_rows_name_the_parent_for_their_subtree() {
        let table = tag_table(&[
            cells(&["流動資産", "jppfs_cor", "CurrentAssets", "0", ""]),
            cells(&["現金及び預金", "jppfs_cor", "CashAndDeposits", "1", ""]),
            cells(&["固定資産", "jppfs_cor", "NoncurrentAssets", "0", ""]),
            cells(&["有形固定資産", "jppfs_cor", "PropertyPlantAndEquipment", "1", ""]),
        ]);
        let rows = tag_rows(&table, "2024-01-01 00:00:00");
        assert_eq!(rows[0].parent_element_name.as_deref(), Some("CurrentAssets"));
        assert_eq!(rows[1].parent_element_name.as_deref(), Some("CurrentAssets"));
        assert_eq!(rows[1].parent_standard_label_tree.as_deref(), Some("流動資産"));
        assert_eq!(rows[3].parent_element_name.as_deref(), Some("NoncurrentAssets"));
    }

    #[test]
    fn rows_without_an_element_name_are_dropped() {
        let table = tag_table(&[
            cells(&["見出し", "", "", "", ""]),
            cells(&["流動資産", "jppfs_cor", "CurrentAssets", "0", ""]),
        ]);
        let rows = tag_rows(&table, "2024-01-01 00:00:00");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].element_id.as_deref(), Some("jppfs_cor:CurrentAssets"));
    }

    #[test]
    fn classification_labels_are_cleaned() {
        let table = tag_table(&[cells(&[
            "流動資産",
            "jppfs_cor",
            "CurrentAssets",
            "0",
            "一般_x000D_商工業\n銀行",
        ])]);
        let rows = tag_rows(&table, "2024-01-01 00:00:00");
        assert_eq!(
            rows[0].classification_label_jp.as_deref(),
            Some("一般 商工業 銀行")
        );
    }

    #[test]
    fn section_header_and_blank_classification_rows_are_dropped() {
        let table = SheetTable {
            headers: vec![
                "科目分類".to_string(),
                "標準ラベル（日本語）".to_string(),
                "名前空間プレフィックス".to_string(),
                "要素名".to_string(),
                "depth".to_string(),
            ],
            rows: vec![
                cells(&["貸借対照表　科目一覧", "", "", "", ""]),
                cells(&["科目分類", "", "", "", ""]),
                cells(&["", "", "", "", ""]),
                cells(&["資産", "流動資産", "jppfs_cor", "CurrentAssets", "0"]),
            ],
        };
        let rows = account_rows(&table, "一般商工業", "2024-01-01 00:00:00");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].industry.as_deref(), Some("一般商工業"));
        assert_eq!(rows[0].parent_standard_label.as_deref(), Some("流動資産"));
    }
}
