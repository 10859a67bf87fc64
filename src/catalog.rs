/*
SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza
*/

//! Filing catalog ingestion: paginate the daily listing endpoint backward
//! over a day range, flatten the pages into one deduplicated catalog, and
//! replace the catalog table. Also refreshes the filer registry from the
//! static EDINET code list.

use std::collections::HashSet;
use std::io::{Cursor, Read};

use chrono::{Duration, Local};
use encoding_rs::SHIFT_JIS;
use log::{error, info, warn};
use polars::prelude::*;
use serde_json::Value;
use ::zip::ZipArchive;

use crate::DbPool;
use crate::error::Result;
use crate::extract::utf8_values;
use crate::models::{CatalogEntry, FilerEntry};
use crate::registry::RegistryClient;
use crate::store::{FieldFilter, FilterMap, Store};

/// Submitter-type value marking domestic corporations in the code list.
pub const SUBMITTER_TYPE_DOMESTIC: &str = "内国法人・組合";
/// Listing-section value marking listed filers.
pub const LISTED_SECTION_LISTED: &str = "上場";

const CODE_LIST_CSV: &str = "EdinetcodeDlInfo.csv";

/// Fetch `days` days of listings backward from today and replace the catalog
/// table with the flattened, deduplicated result. A failed day is logged and
/// skipped; if every day fails the catalog is replaced with an empty one.
pub fn refresh_catalog(
    client: &RegistryClient,
    pool: &DbPool,
    days: u32,
    doc_info_type: u8,
) -> Result<usize> {
    info!("start: refresh_catalog days={days}");
    let today = Local::now().date_naive();

    let mut pages = Vec::new();
    for x in 0..days {
        let target = today - Duration::days(x as i64);
        match client.list_filings(target, doc_info_type) {
            Ok(page) => {
                if x % 10 == 0 {
                    info!("listing fetched, days done: {}, current date: {target}", x + 1);
                }
                pages.push(page);
            }
            Err(e) => error!("listing failed for {target}: {e}"),
        }
    }

    let entries = flatten_pages(&pages);
    let store: Store<CatalogEntry> = Store::new(pool.clone());
    let n = store.replace_all(&entries)?;
    info!("end: refresh_catalog rows={n}");
    Ok(n)
}

/// Flatten listing pages into catalog entries, deduplicated by document id.
/// First occurrence wins, in page order (most recent day first).
pub fn flatten_pages(pages: &[Value]) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for page in pages {
        let Some(results) = page.get("results").and_then(Value::as_array) else {
            continue;
        };
        for item in results {
            match serde_json::from_value::<CatalogEntry>(item.clone()) {
                Ok(entry) => {
                    if seen.insert(entry.doc_id.clone()) {
                        out.push(entry);
                    }
                }
                Err(e) => warn!("skipping malformed listing entry: {e}"),
            }
        }
    }
    out
}

/// Download the EDINET code list and replace the filer registry table.
pub fn refresh_filer_codes(client: &RegistryClient, pool: &DbPool) -> Result<usize> {
    info!("start: refresh_filer_codes");
    let bytes = client.fetch_code_list()?;
    let entries = parse_code_list(&bytes)?;
    let n = Store::<FilerEntry>::new(pool.clone()).replace_all(&entries)?;
    info!("end: refresh_filer_codes rows={n}");
    Ok(n)
}

/// Distinct codes of listed domestic filers: the universe for the all-filers
/// fact sweep.
pub fn listed_filer_codes(pool: &DbPool) -> Result<Vec<String>> {
    let mut filters = FilterMap::new();
    filters.insert(
        "submitterType".into(),
        FieldFilter::eq(SUBMITTER_TYPE_DOMESTIC),
    );
    filters.insert(
        "listedSection".into(),
        FieldFilter::eq(LISTED_SECTION_LISTED),
    );
    Store::<FilerEntry>::new(pool.clone()).distinct_strings("edinetCode", &filters)
}

/// Parse the code-list ZIP: one cp932 CSV with a one-line preamble before the
/// header, source-language column names.
pub fn parse_code_list(zip_bytes: &[u8]) -> Result<Vec<FilerEntry>> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))?;
    let mut raw = Vec::new();
    archive.by_name(CODE_LIST_CSV)?.read_to_end(&mut raw)?;
    let (text, _, _) = SHIFT_JIS.decode(&raw);

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_skip_rows(1)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
        .finish()?;

    let codes = utf8_values(&df, "ＥＤＩＮＥＴコード");
    let submitter_types = utf8_values(&df, "提出者種別");
    let listed_sections = utf8_values(&df, "上場区分");
    let consolidations = utf8_values(&df, "連結の有無");
    let capitals = utf8_values(&df, "資本金");
    let fiscal_year_ends = utf8_values(&df, "決算日");
    let names = utf8_values(&df, "提出者名");
    let names_en = utf8_values(&df, "提出者名（英字）");
    let names_kana = utf8_values(&df, "提出者名（ヨミ）");
    let addresses = utf8_values(&df, "所在地");
    let industries = utf8_values(&df, "提出者業種");
    let security_codes = utf8_values(&df, "証券コード");
    let corporate_numbers = utf8_values(&df, "提出者法人番号");

    let mut out = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let Some(code) = codes[i].clone().filter(|c| !c.is_empty()) else {
            continue;
        };
        out.push(FilerEntry {
            edinet_code: code,
            submitter_type: submitter_types[i].clone(),
            listed_section: listed_sections[i].clone(),
            consolidation: consolidations[i].clone(),
            capital: capitals[i].clone(),
            fiscal_year_end: fiscal_year_ends[i].clone(),
            submitter_name: names[i].clone(),
            submitter_name_en: names_en[i].clone(),
            submitter_name_kana: names_kana[i].clone(),
            address: addresses[i].clone(),
            industry: industries[i].clone(),
            security_code: security_codes[i].clone(),
            corporate_number: corporate_numbers[i].clone(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use ::zip::write::FileOptions;

    use super::*;
    use crate::store::Filterable;
    use crate::testutil::temp_pool;

    fn listing_page(entries: &[(&str, &str)]) -> Value {
        let results: Vec<Value> = entries
            .iter()
            .map(|(doc_id, code)| {
                json!({
                    "seqNumber": 1,
                    "docID": doc_id,
                    "edinetCode": code,
                    "docTypeCode": "120",
                    "submitDateTime": "2023-06-30 15:00",
                    "csvFlag": "1"
                })
            })
            .collect();
        json!({ "results": results })
    }

    #[test]
    fn repeated_document_id_keeps_first_occurrence() {
        let pages = vec![
            listing_page(&[("S100AAAA", "E00015"), ("S100BBBB", "E00016")]),
            listing_page(&[("S100AAAA", "E99999"), ("S100CCCC", "E00017")]),
        ];
        let entries = flatten_pages(&pages);
        assert_eq!(entries.len(), 3);
        let first = entries.iter().find(|e| e.doc_id == "S100AAAA").unwrap();
        // the page fetched first (most recent day) wins
        assert_eq!(first.edinet_code.as_deref(), Some("E00015"));
    }

    #[test]
    fn seq_number_is_dropped() {
        let entries = flatten_pages(&[listing_page(&[("S100AAAA", "E00015")])]);
        let v = serde_json::to_value(&entries[0]).unwrap();
        assert!(v.get("seqNumber").is_none());
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let page = json!({ "results": [ {"edinetCode": "E00015"}, {
            "docID": "S100AAAA", "edinetCode": "E00015"
        } ] });
        let entries = flatten_pages(&[page]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].doc_id, "S100AAAA");
    }

    fn code_list_zip(csv: &str) -> Vec<u8> {
        let (encoded, _, _) = SHIFT_JIS.encode(csv);
        let mut writer = ::zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(CODE_LIST_CSV, FileOptions::default())
            .unwrap();
        writer.write_all(&encoded).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn code_list_parses_cp932_and_renames_headers() {
        let csv = "ダウンロード実行日,2024-04-01\n\
ＥＤＩＮＥＴコード,提出者種別,上場区分,連結の有無,資本金,決算日,提出者名,提出者名（英字）,提出者名（ヨミ）,所在地,提出者業種,証券コード,提出者法人番号\n\
E00015,内国法人・組合,上場,有,1000,3月31日,テスト株式会社,Test Co.,テスト,東京都,食料品,12340,1234567890123\n\
E00016,内国法人・組合,非上場,無,500,12月31日,ほか株式会社,Other Co.,ホカ,大阪府,小売業,,9876543210987\n";
        let entries = parse_code_list(&code_list_zip(csv)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].edinet_code, "E00015");
        assert_eq!(entries[0].submitter_type.as_deref(), Some("内国法人・組合"));
        assert_eq!(entries[0].listed_section.as_deref(), Some("上場"));
        assert_eq!(entries[0].submitter_name.as_deref(), Some("テスト株式会社"));
        assert_eq!(entries[1].security_code, None);
    }

    #[test]
    fn listed_filer_codes_filters_universe() {
        let pool = temp_pool();
        let entries = parse_code_list(&code_list_zip(
            "preamble,x\n\
ＥＤＩＮＥＴコード,提出者種別,上場区分,連結の有無,資本金,決算日,提出者名,提出者名（英字）,提出者名（ヨミ）,所在地,提出者業種,証券コード,提出者法人番号\n\
E00015,内国法人・組合,上場,有,1000,3月31日,ア,A,ア,東京都,食料品,12340,1\n\
E00016,内国法人・組合,非上場,無,500,12月31日,イ,B,イ,大阪府,小売業,,2\n\
E00017,個人,上場,無,1,1月1日,ウ,C,ウ,福岡県,その他,,3\n",
        ))
        .unwrap();
        {
            let mut conn = pool.get().unwrap();
            FilerEntry::replace_all(&mut conn, &entries).unwrap();
        }
        let codes = listed_filer_codes(&pool).unwrap();
        assert_eq!(codes, vec!["E00015".to_string()]);
    }
}
