/*
SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza
*/

//! Fact-table merge and lookup. The merge key is (docID, edinetCode,
//! elementId, contextId), enforced by a unique index; re-merging the same
//! rows appends nothing and keeps the stored version.

use diesel::prelude::*;
use log::info;
use polars::prelude::DataFrame;

use crate::DbPool;
use crate::error::Result;
use crate::extract::{FACT_COLUMNS, utf8_values};
use crate::models::FactRow;
use crate::store::{FieldFilter, FilterMap, INSERT_CHUNK, Store};

/// The periods a lookup spans when the caller does not narrow them.
pub const ALL_PERIODS: &[&str] = &["full", "half", "q1r", "q2r", "q3r"];

/// Relative fiscal year most lookups want: the filing's current period.
pub const CURRENT_PERIOD: &str = "当期";

/// Merge a batch of fact rows into the store. Rows whose merge key already
/// exists are left untouched. Returns the number of rows actually appended.
pub fn merge_rows(pool: &DbPool, rows: &[FactRow]) -> Result<usize> {
    use crate::schema::financial_facts::dsl::*;

    let mut conn = pool.get()?;
    let appended = conn.transaction::<usize, diesel::result::Error, _>(|conn| {
        let mut appended = 0;
        for chunk in rows.chunks(INSERT_CHUNK) {
            appended += diesel::insert_into(financial_facts)
                .values(chunk)
                .on_conflict((doc_id, edinet_code, element_id, context_id))
                .do_nothing()
                .execute(conn)?;
        }
        Ok(appended)
    })?;
    info!(
        "merge: {} rows in, {} appended, {} already present",
        rows.len(),
        appended,
        rows.len() - appended
    );
    Ok(appended)
}

/// Merge a canonical fact frame, as produced by the extraction engine.
pub fn merge_frame(pool: &DbPool, df: &DataFrame) -> Result<usize> {
    merge_rows(pool, &rows_from_frame(df))
}

/// Reassemble fact rows from a canonical frame. The key columns are never
/// null in a frame the extraction engine built; absent values become empty
/// strings rather than dropping the row.
fn rows_from_frame(df: &DataFrame) -> Vec<FactRow> {
    let columns: Vec<Vec<Option<String>>> =
        FACT_COLUMNS.iter().map(|name| utf8_values(df, name)).collect();

    (0..df.height())
        .map(|i| {
            let get = |c: usize| columns[c][i].clone();
            FactRow {
                id: None,
                doc_id: get(0).unwrap_or_default(),
                edinet_code: get(1).unwrap_or_default(),
                doc_type_code: get(2),
                fiscal_year: get(3),
                period: get(4),
                file_prefix: get(5),
                element_id: get(6).unwrap_or_default(),
                item_name: get(7),
                context_id: get(8).unwrap_or_default(),
                relative_fiscal_year: get(9),
                consolidated_or_individual: get(10),
                period_or_point_in_time: get(11),
                unit_id: get(12),
                unit: get(13),
                value: get(14),
                submit_date_time: get(15),
            }
        })
        .collect()
}

/// Facts for one element in one filer's fiscal year, narrowed by period set
/// and relative fiscal year, optionally pinned to one document.
pub fn lookup_facts(
    pool: &DbPool,
    element: &str,
    fiscal_year: &str,
    filer: &str,
    periods: &[String],
    doc: Option<&str>,
    relative_fiscal_year: &str,
) -> Result<Vec<FactRow>> {
    let mut filters = FilterMap::new();
    filters.insert("elementId".into(), FieldFilter::eq(element));
    filters.insert("fiscalYear".into(), FieldFilter::eq(fiscal_year));
    filters.insert("edinetCode".into(), FieldFilter::eq(filer));
    filters.insert("period".into(), FieldFilter::is_in(periods.iter().cloned()));
    filters.insert(
        "relativeFiscalYear".into(),
        FieldFilter::eq(relative_fiscal_year),
    );
    if let Some(doc) = doc {
        filters.insert("docID".into(), FieldFilter::eq(doc));
    }
    Store::<FactRow>::new(pool.clone()).query(&filters)
}
