/*
SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza
*/

//! Archive extraction and schema reconciliation: select catalog entries for a
//! scope, download each document's CSV export package, pick the one embedded
//! export the prefix rules accept, parse it (UTF-16LE, tab-separated), tag it
//! with period/fiscal metadata derived from the filename, and normalize
//! everything into the canonical fact schema.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::sync::LazyLock;

use encoding_rs::UTF_16LE;
use log::{error, info, warn};
use polars::prelude::*;
use regex::Regex;
use ::zip::ZipArchive;

use crate::DbPool;
use crate::catalog::listed_filer_codes;
use crate::error::{IngestError, Result};
use crate::facts::merge_rows;
use crate::models::{CatalogEntry, FactRow};
use crate::registry::{DownloadKind, RegistryClient};
use crate::store::{FieldFilter, FilterMap, Store};

/// Scope value meaning "every filer in the catalog".
pub const ALL_FILERS: &str = "all";

/// Doc-type codes extracted by default: annual, half-year and quarterly
/// securities reports.
pub const DEFAULT_DOC_TYPES: &[&str] = &["120", "140", "160"];

/// Accepted export filename prefixes, in priority order. The first prefix
/// with a matching archive entry wins and scanning stops.
pub const EXPORT_PREFIXES: &[&str] = &["jpcrp030000", "jpcrp040300", "jpcrp050000"];

const PREFIX_ANNUAL: &str = "jpcrp030000";
const PREFIX_QUARTERLY: &str = "jpcrp040300";
const PREFIX_HALF_YEAR: &str = "jpcrp050000";

/// The canonical fact columns, in output order.
pub const FACT_COLUMNS: &[&str] = &[
    "docID",
    "edinetCode",
    "docTypeCode",
    "fiscalYear",
    "period",
    "filePrefix",
    "elementId",
    "itemName",
    "contextId",
    "relativeFiscalYear",
    "consolidatedOrIndividual",
    "periodOrPointInTime",
    "unitId",
    "unit",
    "value",
    "submitDateTime",
];

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid date pattern"));

/// Catalog entries matching a filer scope, submission-date range and doc-type
/// set. `ALL_FILERS` widens the scope to every filer.
pub fn catalog_scope(
    pool: &DbPool,
    filer: &str,
    date_start: &str,
    date_end: &str,
    doc_types: &[String],
) -> Result<Vec<CatalogEntry>> {
    let mut filters = FilterMap::new();
    filters.insert(
        "submitDateTime".into(),
        FieldFilter::date_between(date_start, date_end),
    );
    filters.insert(
        "docTypeCode".into(),
        FieldFilter::is_in(doc_types.iter().cloned()),
    );
    if filer != ALL_FILERS {
        filters.insert("edinetCode".into(), FieldFilter::eq(filer));
    }
    Store::<CatalogEntry>::new(pool.clone()).query(&filters)
}

/// Extract fact rows for one filer scope. Each document is an independently
/// failable unit: download errors, missing exports and malformed filenames
/// are logged and the loop continues.
pub fn extract_rows(
    client: &RegistryClient,
    pool: &DbPool,
    filer: &str,
    date_start: &str,
    date_end: &str,
    doc_types: &[String],
) -> Result<Vec<FactRow>> {
    info!("start: extract_rows filer={filer} range={date_start}..{date_end}");
    let entries = catalog_scope(pool, filer, date_start, date_end, doc_types)?;

    let mut rows = Vec::new();
    for entry in &entries {
        info!(
            "doc_id={} edinet_code={:?} doc_type={:?} submitted={:?}",
            entry.doc_id, entry.edinet_code, entry.doc_type_code, entry.submit_date_time
        );
        let Some(edinet_code) = entry.edinet_code.as_deref() else {
            warn!("doc {} has no filer code, skipping", entry.doc_id);
            continue;
        };

        let path = match client.download_document(&entry.doc_id, edinet_code, DownloadKind::Csv) {
            Ok(path) => path,
            Err(e) => {
                error!("download failed for doc {}: {e}", entry.doc_id);
                continue;
            }
        };

        match extract_from_package(&path, entry) {
            Ok(doc_rows) => rows.extend(doc_rows),
            Err(e) => error!("extraction failed for doc {}: {e}", entry.doc_id),
        }
    }

    dedup_exact(&mut rows);
    info!("end: extract_rows rows={}", rows.len());
    Ok(rows)
}

/// Like [`extract_rows`] but projected to the canonical fact frame.
pub fn extract_facts(
    client: &RegistryClient,
    pool: &DbPool,
    filer: &str,
    date_start: &str,
    date_end: &str,
    doc_types: &[String],
) -> Result<DataFrame> {
    let rows = extract_rows(client, pool, filer, date_start, date_end, doc_types)?;
    facts_frame(&rows)
}

/// Full sweep over every listed domestic filer, flushing through the merger
/// every `batch_size` filers to bound peak memory. A failing filer is logged
/// and skipped.
pub fn extract_all(
    client: &RegistryClient,
    pool: &DbPool,
    date_start: &str,
    date_end: &str,
    batch_size: usize,
) -> Result<()> {
    info!("start: extract_all range={date_start}..{date_end} batch_size={batch_size}");
    let doc_types: Vec<String> = DEFAULT_DOC_TYPES.iter().map(|s| s.to_string()).collect();
    let codes = listed_filer_codes(pool)?;

    let mut pending: Vec<FactRow> = Vec::new();
    for (index, code) in codes.iter().enumerate() {
        if (index + 1) % batch_size.max(1) == 0 {
            flush_pending(pool, &mut pending);
        }
        match extract_rows(client, pool, code, date_start, date_end, &doc_types) {
            Ok(rows) => {
                info!("filer {code}: {} rows", rows.len());
                pending.extend(rows);
            }
            Err(e) => {
                error!("filer {code} failed: {e}");
                continue;
            }
        }
    }
    flush_pending(pool, &mut pending);
    info!("end: extract_all");
    Ok(())
}

/// Merge the pending batch and drop it. A failed merge loses only this
/// batch; the sweep keeps going.
fn flush_pending(pool: &DbPool, pending: &mut Vec<FactRow>) {
    if pending.is_empty() {
        return;
    }
    match merge_rows(pool, pending) {
        Ok(appended) => info!("flushed batch: {appended} new rows"),
        Err(e) => error!("merge flush failed, batch dropped: {e}"),
    }
    pending.clear();
}

/// Open a downloaded package and extract its one accepted export.
fn extract_from_package(path: &Path, entry: &CatalogEntry) -> Result<Vec<FactRow>> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    extract_from_archive(&mut archive, entry)
}

/// The per-archive step: select the export, derive period/fiscal metadata
/// from its filename, parse and normalize. Split from the download so it can
/// run against any readable archive.
pub fn extract_from_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    entry: &CatalogEntry,
) -> Result<Vec<FactRow>> {
    let names = entry_names(archive)?;
    let (entry_name, prefix) = select_export(&names, EXPORT_PREFIXES).ok_or_else(|| {
        IngestError::Parse(format!("doc {}: no entry matches an accepted prefix", entry.doc_id))
    })?;

    let base = basename(&entry_name);
    let period = period_tag(&prefix, base)?;
    let dates = filename_dates(base);
    if dates.len() < 2 {
        return Err(IngestError::Parse(format!(
            "doc {}: expected two dates in export filename `{base}`",
            entry.doc_id
        )));
    }

    let mut raw = Vec::new();
    archive.by_name(&entry_name)?.read_to_end(&mut raw)?;
    let df = parse_export_tsv(&raw)?;

    Ok(rows_from_export(
        &df,
        entry,
        &dates[0],
        &dates[1],
        &period,
        &prefix,
    ))
}

fn entry_names<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    (0..archive.len())
        .map(|i| Ok(archive.by_index(i)?.name().to_string()))
        .collect()
}

/// Pick the single export to extract: prefixes in priority order, archive
/// entries in archive order within each prefix, first hit wins.
pub fn select_export(names: &[String], prefixes: &[&str]) -> Option<(String, String)> {
    for prefix in prefixes {
        for name in names {
            if basename(name).starts_with(prefix) {
                return Some((name.clone(), prefix.to_string()));
            }
        }
    }
    None
}

fn basename(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Reporting-period tag for an export filename.
///
/// Annual reports are always `full` and half-year reports always `half`; the
/// quarterly prefix encodes the quarter in the second `-`-separated filename
/// component (e.g. `q2r`).
pub fn period_tag(prefix: &str, filename: &str) -> Result<String> {
    match prefix {
        PREFIX_QUARTERLY => filename
            .split('-')
            .nth(1)
            .map(str::to_string)
            .ok_or_else(|| {
                IngestError::Parse(format!("no period component in quarterly export `{filename}`"))
            }),
        PREFIX_HALF_YEAR => Ok("half".to_string()),
        _ => Ok("full".to_string()),
    }
}

/// All ISO dates appearing in an export filename, in order. The first is the
/// fiscal-year marker, the second the submission timestamp.
pub fn filename_dates(filename: &str) -> Vec<String> {
    ISO_DATE
        .find_iter(filename)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Parse a UTF-16LE, tab-separated export into a frame with every column as
/// a string.
pub fn parse_export_tsv(raw: &[u8]) -> Result<DataFrame> {
    let (text, _, _) = UTF_16LE.decode(raw);
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_separator(b'\t'))
        .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
        .finish()?;
    Ok(df)
}

/// Map the export's source-language columns to the canonical schema and
/// attach the document-level metadata columns. Rows without the element or
/// context identifier cannot satisfy the merge key and are dropped.
fn rows_from_export(
    df: &DataFrame,
    entry: &CatalogEntry,
    fiscal_year: &str,
    submitted: &str,
    period: &str,
    prefix: &str,
) -> Vec<FactRow> {
    let element_ids = utf8_values(df, "要素ID");
    let item_names = utf8_values(df, "項目名");
    let context_ids = utf8_values(df, "コンテキストID");
    let relative_years = utf8_values(df, "相対年度");
    let consolidated = utf8_values(df, "連結・個別");
    let period_or_point = utf8_values(df, "期間・時点");
    let unit_ids = utf8_values(df, "ユニットID");
    let units = utf8_values(df, "単位");
    let values = utf8_values(df, "値");

    let edinet_code = entry.edinet_code.clone().unwrap_or_default();
    let mut out = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let (Some(element_id), Some(context_id)) = (element_ids[i].clone(), context_ids[i].clone())
        else {
            warn!("doc {}: row {i} lacks element/context id, dropped", entry.doc_id);
            continue;
        };
        out.push(FactRow {
            id: None,
            doc_id: entry.doc_id.clone(),
            edinet_code: edinet_code.clone(),
            doc_type_code: entry.doc_type_code.clone(),
            fiscal_year: Some(fiscal_year.to_string()),
            period: Some(period.to_string()),
            file_prefix: Some(prefix.to_string()),
            element_id,
            item_name: item_names[i].clone(),
            context_id,
            relative_fiscal_year: relative_years[i].clone(),
            consolidated_or_individual: consolidated[i].clone(),
            period_or_point_in_time: period_or_point[i].clone(),
            unit_id: unit_ids[i].clone(),
            unit: units[i].clone(),
            value: values[i].clone(),
            submit_date_time: Some(submitted.to_string()),
        });
    }
    out
}

/// Drop exact-duplicate rows, keeping the first occurrence.
fn dedup_exact(rows: &mut Vec<FactRow>) {
    let mut seen = HashSet::new();
    rows.retain(|r| seen.insert(r.clone()));
}

/// One frame with exactly the canonical columns in canonical order.
pub fn facts_frame(rows: &[FactRow]) -> Result<DataFrame> {
    let df = df![
        "docID" => rows.iter().map(|r| r.doc_id.clone()).collect::<Vec<_>>(),
        "edinetCode" => rows.iter().map(|r| r.edinet_code.clone()).collect::<Vec<_>>(),
        "docTypeCode" => rows.iter().map(|r| r.doc_type_code.clone()).collect::<Vec<_>>(),
        "fiscalYear" => rows.iter().map(|r| r.fiscal_year.clone()).collect::<Vec<_>>(),
        "period" => rows.iter().map(|r| r.period.clone()).collect::<Vec<_>>(),
        "filePrefix" => rows.iter().map(|r| r.file_prefix.clone()).collect::<Vec<_>>(),
        "elementId" => rows.iter().map(|r| r.element_id.clone()).collect::<Vec<_>>(),
        "itemName" => rows.iter().map(|r| r.item_name.clone()).collect::<Vec<_>>(),
        "contextId" => rows.iter().map(|r| r.context_id.clone()).collect::<Vec<_>>(),
        "relativeFiscalYear" => rows.iter().map(|r| r.relative_fiscal_year.clone()).collect::<Vec<_>>(),
        "consolidatedOrIndividual" => rows.iter().map(|r| r.consolidated_or_individual.clone()).collect::<Vec<_>>(),
        "periodOrPointInTime" => rows.iter().map(|r| r.period_or_point_in_time.clone()).collect::<Vec<_>>(),
        "unitId" => rows.iter().map(|r| r.unit_id.clone()).collect::<Vec<_>>(),
        "unit" => rows.iter().map(|r| r.unit.clone()).collect::<Vec<_>>(),
        "value" => rows.iter().map(|r| r.value.clone()).collect::<Vec<_>>(),
        "submitDateTime" => rows.iter().map(|r| r.submit_date_time.clone()).collect::<Vec<_>>(),
    ]?;
    Ok(df)
}

/// String values of one column, `None`-filled when the column is absent or
/// not textual.
pub(crate) fn utf8_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    let Ok(col) = df.column(name) else {
        return vec![None; df.height()];
    };
    match col.as_materialized_series().str() {
        Ok(ca) => ca.into_iter().map(|v| v.map(str::to_string)).collect(),
        Err(_) => vec![None; df.height()],
    }
}

/// Native XBRL parsing is intentionally not implemented; the CSV export
/// pipeline covers the same data at far lower cost.
pub fn parse_xbrl(_path: &Path) -> Result<DataFrame> {
    Err(IngestError::Unsupported("native XBRL parsing".to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ::zip::write::FileOptions;

    use super::*;
    use crate::testutil::{sample_entry, sample_fact, temp_pool};

    fn utf16le(text: &str) -> Vec<u8> {
        let mut out = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            out.extend(unit.to_le_bytes());
        }
        out
    }

    fn archive_with(entries: &[(&str, &[u8])]) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut writer = ::zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(bytes).unwrap();
        }
        let mut buf = writer.finish().unwrap();
        buf.set_position(0);
        ZipArchive::new(buf).unwrap()
    }

    const EXPORT_HEADER: &str =
        "要素ID\t項目名\tコンテキストID\t相対年度\t連結・個別\t期間・時点\tユニットID\t単位\t値\n";

    fn export_tsv(rows: &[&str]) -> Vec<u8> {
        let mut text = EXPORT_HEADER.to_string();
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        utf16le(&text)
    }

    #[test]
    fn quarterly_prefix_derives_period_from_filename() {
        let period = period_tag(
            "jpcrp040300",
            "jpcrp040300-q2r-001_E00015-000_2023-11-14_01_2023-09-30.csv",
        )
        .unwrap();
        assert_eq!(period, "q2r");
    }

    #[test]
    fn half_year_prefix_is_always_half() {
        let period = period_tag(
            "jpcrp050000",
            "jpcrp050000-q2r-001_E00015-000_2023-11-14_01_2023-09-30.csv",
        )
        .unwrap();
        assert_eq!(period, "half");
    }

    #[test]
    fn annual_prefix_is_always_full() {
        let period = period_tag(
            "jpcrp030000",
            "jpcrp030000-asr-001_E00015-000_2023-06-29_01_2023-03-31.csv",
        )
        .unwrap();
        assert_eq!(period, "full");
    }

    #[test]
    fn filename_dates_in_order() {
        let dates =
            filename_dates("jpcrp030000-asr-001_E00015-000_2023-06-29_01_2023-03-31.csv");
        assert_eq!(dates, vec!["2023-06-29".to_string(), "2023-03-31".to_string()]);
        assert!(filename_dates("no-dates-here.csv").is_empty());
    }

    #[test]
    fn higher_priority_prefix_wins_even_when_listed_later() {
        let names = vec![
            "XBRL_TO_CSV/jpcrp040300-q2r-001_E00015-000_2023-11-14_01_2023-09-30.csv".to_string(),
            "XBRL_TO_CSV/jpcrp030000-asr-001_E00015-000_2023-06-29_01_2023-03-31.csv".to_string(),
        ];
        let (name, prefix) = select_export(&names, EXPORT_PREFIXES).unwrap();
        assert_eq!(prefix, "jpcrp030000");
        assert!(name.contains("jpcrp030000"));
    }

    #[test]
    fn no_matching_prefix_selects_nothing() {
        let names = vec!["XBRL_TO_CSV/jpaud000000-report.csv".to_string()];
        assert!(select_export(&names, EXPORT_PREFIXES).is_none());
    }

    #[test]
    fn archive_extraction_attaches_metadata() {
        let tsv = export_tsv(&[
            "jppfs_cor:NetSales\t売上高\tCurrentYearDuration\t当期\t連結\t期間\tJPY\t円\t1000000",
            "jppfs_cor:Assets\t資産\tCurrentYearInstant\t当期\t連結\t時点\tJPY\t円\t5000000",
        ]);
        let mut archive = archive_with(&[(
            "XBRL_TO_CSV/jpcrp030000-asr-001_E00015-000_2023-06-29_01_2023-03-31.csv",
            tsv.as_slice(),
        )]);
        let entry = sample_entry("S100AAAA", "E00015", "2023-06-29 15:00", "120");
        let rows = extract_from_archive(&mut archive, &entry).unwrap();
        assert_eq!(rows.len(), 2);
        let first = &rows[0];
        assert_eq!(first.doc_id, "S100AAAA");
        assert_eq!(first.edinet_code, "E00015");
        assert_eq!(first.element_id, "jppfs_cor:NetSales");
        assert_eq!(first.context_id, "CurrentYearDuration");
        assert_eq!(first.fiscal_year.as_deref(), Some("2023-06-29"));
        assert_eq!(first.submit_date_time.as_deref(), Some("2023-03-31"));
        assert_eq!(first.period.as_deref(), Some("full"));
        assert_eq!(first.file_prefix.as_deref(), Some("jpcrp030000"));
        assert_eq!(first.value.as_deref(), Some("1000000"));
    }

    #[test]
    fn missing_filename_dates_fail_that_document() {
        let tsv = export_tsv(&["jppfs_cor:NetSales\t売上高\tCtx\t当期\t連結\t期間\tJPY\t円\t1"]);
        let mut archive =
            archive_with(&[("XBRL_TO_CSV/jpcrp030000-asr-001_E00015.csv", tsv.as_slice())]);
        let entry = sample_entry("S100AAAA", "E00015", "2023-06-29 15:00", "120");
        let err = extract_from_archive(&mut archive, &entry).unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn missing_export_fails_that_document() {
        let mut archive = archive_with(&[("XBRL_TO_CSV/readme.txt", b"hi".as_slice())]);
        let entry = sample_entry("S100AAAA", "E00015", "2023-06-29 15:00", "120");
        let err = extract_from_archive(&mut archive, &entry).unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn facts_frame_has_canonical_columns_in_order() {
        let rows = vec![crate::testutil::sample_fact("D1", "E00015", "jppfs_cor:NetSales", "Ctx")];
        let df = facts_frame(&rows).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, FACT_COLUMNS.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn export_missing_optional_columns_is_null_filled() {
        // no unit columns in this export variant
        let text = "要素ID\t項目名\tコンテキストID\t相対年度\t連結・個別\t期間・時点\t値\n\
jppfs_cor:NetSales\t売上高\tCtx\t当期\t連結\t期間\t123\n";
        let df = parse_export_tsv(&utf16le(text)).unwrap();
        let entry = sample_entry("S100AAAA", "E00015", "2023-06-29 15:00", "120");
        let rows = super::rows_from_export(&df, &entry, "2023-06-29", "2023-03-31", "full", "jpcrp030000");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].unit_id, None);
        assert_eq!(rows[0].value.as_deref(), Some("123"));
    }

    #[test]
    fn failed_merge_flush_drops_the_batch_and_continues() {
        let pool = temp_pool();
        {
            use diesel::RunQueryDsl;
            let mut conn = pool.get().unwrap();
            diesel::sql_query("DROP TABLE financial_facts")
                .execute(&mut conn)
                .unwrap();
        }
        let mut pending = vec![sample_fact("D1", "E00015", "jppfs_cor:NetSales", "Ctx")];
        flush_pending(&pool, &mut pending);
        assert!(pending.is_empty());
    }

    #[test]
    fn xbrl_parsing_is_an_explicit_stub() {
        let err = parse_xbrl(Path::new("whatever.xbrl")).unwrap_err();
        assert!(matches!(err, IngestError::Unsupported(_)));
    }
}
