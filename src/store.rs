/*
SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza
*/

//! Generic conjunctive-filter query/write layer over one entity type.
//!
//! Filters are a closed set of operations (`FilterOp`); dispatch is an
//! exhaustive match, so an unrecognized `filter_type` can only appear at the
//! JSON boundary, where deserialization rejects it before any row is fetched.
//! An unknown column name fails with a configuration error for the same
//! reason: a bad filter must never silently match all rows.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sql_types::{Bool, Nullable, Text};
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};

use crate::DbPool;
use crate::error::{IngestError, Result};

diesel::define_sql_function! {
    /// SQLite `date()`; collapses a stored timestamp to its calendar day so
    /// range filters ignore the time-of-day component.
    fn date(ts: Nullable<Text>) -> Nullable<Text>;
}

/// How the stored value is treated before comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Date,
}

/// The closed set of filter operations. All filters supplied for one call are
/// combined with AND; OR is deliberately not supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filter_type", rename_all = "snake_case")]
pub enum FilterOp {
    Eq { value: String },
    In { values: Vec<String> },
    /// Inclusive on both ends.
    Between { start: String, end: String },
    Like { value: String },
    NotLike { value: String },
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
    #[serde(flatten)]
    pub op: FilterOp,
}

impl FieldFilter {
    pub fn eq(value: impl Into<String>) -> Self {
        Self::string(FilterOp::Eq {
            value: value.into(),
        })
    }

    pub fn is_in<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::string(FilterOp::In {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::string(FilterOp::Between {
            start: start.into(),
            end: end.into(),
        })
    }

    /// `between` with the stored value coerced to a calendar date first.
    pub fn date_between(start: impl Into<String>, end: impl Into<String>) -> Self {
        FieldFilter {
            value_type: ValueType::Date,
            op: FilterOp::Between {
                start: start.into(),
                end: end.into(),
            },
        }
    }

    pub fn like(pattern: impl Into<String>) -> Self {
        Self::string(FilterOp::Like {
            value: pattern.into(),
        })
    }

    pub fn not_like(pattern: impl Into<String>) -> Self {
        Self::string(FilterOp::NotLike {
            value: pattern.into(),
        })
    }

    pub fn is_null() -> Self {
        Self::string(FilterOp::IsNull)
    }

    pub fn is_not_null() -> Self {
        Self::string(FilterOp::IsNotNull)
    }

    fn string(op: FilterOp) -> Self {
        FieldFilter {
            value_type: ValueType::String,
            op,
        }
    }
}

/// Column name → filter descriptor. BTreeMap keeps the generated SQL stable.
pub type FilterMap = BTreeMap<String, FieldFilter>;

/// Parse a JSON filter mapping. An unknown `filter_type` fails here,
/// synchronously, before any query runs.
pub fn filters_from_json(v: &serde_json::Value) -> Result<FilterMap> {
    serde_json::from_value(v.clone())
        .map_err(|e| IngestError::Config(format!("invalid filter descriptor: {e}")))
}

/// A filter compiled against one table.
pub type BoxedPred<QS> = Box<dyn BoxableExpression<QS, Sqlite, SqlType = Nullable<Bool>>>;

/// Entities that a [`Store`] can query and mutate through filter maps.
/// Implemented per table by `filterable_store!`.
pub trait Filterable: Sized {
    fn load_where(conn: &mut SqliteConnection, filters: &FilterMap) -> Result<Vec<Self>>;

    /// Distinct non-null values of one column, projected as strings.
    fn distinct_strings(
        conn: &mut SqliteConnection,
        column: &str,
        filters: &FilterMap,
    ) -> Result<Vec<String>>;

    fn insert(&self, conn: &mut SqliteConnection) -> Result<usize>;

    fn insert_batch(conn: &mut SqliteConnection, rows: &[Self]) -> Result<usize>;

    /// Delete everything, then bulk-insert, in one transaction. On failure the
    /// previous contents stay visible.
    fn replace_all(conn: &mut SqliteConnection, rows: &[Self]) -> Result<usize>;

    fn update_where(
        conn: &mut SqliteConnection,
        filters: &FilterMap,
        assignments: &[(String, String)],
    ) -> Result<usize>;

    fn delete_where(conn: &mut SqliteConnection, filters: &FilterMap) -> Result<usize>;
}

/// Rows per INSERT, sized under SQLite's default bind-parameter limit for the
/// widest table (28 columns).
pub(crate) const INSERT_CHUNK: usize = 32;

/// Compile one `FieldFilter` against a column.
macro_rules! column_predicate {
    ($col:expr, $filter:expr, $tbl_ty:ty) => {{
        let filter: &$crate::store::FieldFilter = $filter;
        match filter.value_type {
            $crate::store::ValueType::Date => {
                op_predicate!(date($col.nullable()), &filter.op, $tbl_ty)
            }
            $crate::store::ValueType::String => op_predicate!($col, &filter.op, $tbl_ty),
        }
    }};
}

macro_rules! op_predicate {
    ($target:expr, $op:expr, $tbl_ty:ty) => {{
        // bindings carry explicit names: the caller's dsl glob puts column
        // unit structs like `value` in scope, which would capture a
        // shorthand pattern
        let pred: $crate::store::BoxedPred<$tbl_ty> = match $op {
            $crate::store::FilterOp::Eq { value: v } => {
                Box::new($target.eq(v.clone()).nullable())
            }
            $crate::store::FilterOp::In { values: vs } => {
                Box::new($target.eq_any(vs.clone()).nullable())
            }
            $crate::store::FilterOp::Between { start: lo, end: hi } => {
                Box::new($target.between(lo.clone(), hi.clone()).nullable())
            }
            $crate::store::FilterOp::Like { value: v } => {
                Box::new($target.like(v.clone()).nullable())
            }
            $crate::store::FilterOp::NotLike { value: v } => {
                Box::new($target.not_like(v.clone()).nullable())
            }
            $crate::store::FilterOp::IsNull => Box::new($target.is_null().nullable()),
            $crate::store::FilterOp::IsNotNull => Box::new($target.is_not_null().nullable()),
        };
        pred
    }};
}

/// Generate the [`Filterable`] impl for one entity. Invoke inside a module
/// that has the table's `dsl` glob-imported; `$tbl` is the dsl table alias,
/// `$tbl_ty` its type, and each `$name => $col` pair maps the wire column
/// name to the dsl column.
macro_rules! filterable_store {
    ($entity:ty, $tbl:ident, $tbl_ty:ty, { $($name:literal => $col:ident),+ $(,)? }) => {
        fn field_predicate(
            field: &str,
            filter: &$crate::store::FieldFilter,
        ) -> $crate::error::Result<$crate::store::BoxedPred<$tbl_ty>> {
            match field {
                $( $name => Ok(column_predicate!($col, filter, $tbl_ty)), )+
                other => Err($crate::error::IngestError::Config(format!(
                    "unknown filter column `{other}` for {}",
                    stringify!($entity)
                ))),
            }
        }

        fn combined_predicate(
            filters: &$crate::store::FilterMap,
        ) -> $crate::error::Result<Option<$crate::store::BoxedPred<$tbl_ty>>> {
            let mut preds = Vec::with_capacity(filters.len());
            for (field, filter) in filters {
                preds.push(field_predicate(field, filter)?);
            }
            Ok(preds
                .into_iter()
                .reduce(|a, b| Box::new(a.and(b)) as $crate::store::BoxedPred<$tbl_ty>))
        }

        impl $crate::store::Filterable for $entity {
            fn load_where(
                conn: &mut diesel::SqliteConnection,
                filters: &$crate::store::FilterMap,
            ) -> $crate::error::Result<Vec<Self>> {
                match combined_predicate(filters)? {
                    Some(p) => Ok($tbl.filter(p).load::<$entity>(conn)?),
                    None => Ok($tbl.load::<$entity>(conn)?),
                }
            }

            fn distinct_strings(
                conn: &mut diesel::SqliteConnection,
                column: &str,
                filters: &$crate::store::FilterMap,
            ) -> $crate::error::Result<Vec<String>> {
                let pred = combined_predicate(filters)?;
                match column {
                    $( $name => {
                        let mut q = $tbl.select($col.nullable()).distinct().into_boxed();
                        if let Some(p) = pred {
                            q = q.filter(p);
                        }
                        let rows: Vec<Option<String>> = q.load(conn)?;
                        Ok(rows.into_iter().flatten().collect())
                    } )+
                    other => Err($crate::error::IngestError::Config(format!(
                        "unknown column `{other}` for {}",
                        stringify!($entity)
                    ))),
                }
            }

            fn insert(&self, conn: &mut diesel::SqliteConnection) -> $crate::error::Result<usize> {
                Ok(diesel::insert_into($tbl).values(self).execute(conn)?)
            }

            fn insert_batch(
                conn: &mut diesel::SqliteConnection,
                rows: &[Self],
            ) -> $crate::error::Result<usize> {
                conn.transaction::<usize, $crate::error::IngestError, _>(|conn| {
                    let mut n = 0;
                    for chunk in rows.chunks($crate::store::INSERT_CHUNK) {
                        n += diesel::insert_into($tbl)
                            .values(chunk.iter().collect::<Vec<_>>())
                            .execute(conn)?;
                    }
                    Ok(n)
                })
            }

            fn replace_all(
                conn: &mut diesel::SqliteConnection,
                rows: &[Self],
            ) -> $crate::error::Result<usize> {
                conn.transaction::<usize, $crate::error::IngestError, _>(|conn| {
                    diesel::delete($tbl).execute(conn)?;
                    let mut n = 0;
                    for chunk in rows.chunks($crate::store::INSERT_CHUNK) {
                        n += diesel::insert_into($tbl)
                            .values(chunk.iter().collect::<Vec<_>>())
                            .execute(conn)?;
                    }
                    Ok(n)
                })
            }

            fn update_where(
                conn: &mut diesel::SqliteConnection,
                filters: &$crate::store::FilterMap,
                assignments: &[(String, String)],
            ) -> $crate::error::Result<usize> {
                conn.transaction::<usize, $crate::error::IngestError, _>(|conn| {
                    // every assignment hits the same filtered row set, so the
                    // matched count is the max over assignments
                    let mut touched = 0;
                    for (field, new_value) in assignments {
                        let pred = combined_predicate(filters)?;
                        let n = match field.as_str() {
                            $( $name => match pred {
                                Some(p) => diesel::update($tbl.filter(p))
                                    .set($col.eq(new_value.clone()))
                                    .execute(conn)?,
                                None => diesel::update($tbl)
                                    .set($col.eq(new_value.clone()))
                                    .execute(conn)?,
                            }, )+
                            other => {
                                return Err($crate::error::IngestError::Config(format!(
                                    "unknown column `{other}` in update for {}",
                                    stringify!($entity)
                                )));
                            }
                        };
                        touched = touched.max(n);
                    }
                    Ok(touched)
                })
            }

            fn delete_where(
                conn: &mut diesel::SqliteConnection,
                filters: &$crate::store::FilterMap,
            ) -> $crate::error::Result<usize> {
                match combined_predicate(filters)? {
                    Some(p) => Ok(diesel::delete($tbl.filter(p)).execute(conn)?),
                    None => Ok(diesel::delete($tbl).execute(conn)?),
                }
            }
        }
    };
}

mod catalog_impl {
    use diesel::prelude::*;

    use super::date;
    use crate::models::CatalogEntry;
    use crate::schema::document_catalog::dsl::*;

    filterable_store!(CatalogEntry, document_catalog, crate::schema::document_catalog::table, {
        "docID" => doc_id,
        "edinetCode" => edinet_code,
        "secCode" => sec_code,
        "JCN" => jcn,
        "filerName" => filer_name,
        "fundCode" => fund_code,
        "ordinanceCode" => ordinance_code,
        "formCode" => form_code,
        "docTypeCode" => doc_type_code,
        "periodStart" => period_start,
        "periodEnd" => period_end,
        "submitDateTime" => submit_date_time,
        "docDescription" => doc_description,
        "issuerEdinetCode" => issuer_edinet_code,
        "subjectEdinetCode" => subject_edinet_code,
        "subsidiaryEdinetCode" => subsidiary_edinet_code,
        "currentReportReason" => current_report_reason,
        "parentDocID" => parent_doc_id,
        "opeDateTime" => ope_date_time,
        "withdrawalStatus" => withdrawal_status,
        "docInfoEditStatus" => doc_info_edit_status,
        "disclosureStatus" => disclosure_status,
        "xbrlFlag" => xbrl_flag,
        "pdfFlag" => pdf_flag,
        "attachDocFlag" => attach_doc_flag,
        "englishDocFlag" => english_doc_flag,
        "csvFlag" => csv_flag,
        "legalStatus" => legal_status,
    });
}

mod filer_impl {
    use diesel::prelude::*;

    use super::date;
    use crate::models::FilerEntry;
    use crate::schema::edinet_codes::dsl::*;

    filterable_store!(FilerEntry, edinet_codes, crate::schema::edinet_codes::table, {
        "edinetCode" => edinet_code,
        "submitterType" => submitter_type,
        "listedSection" => listed_section,
        "consolidation" => consolidation,
        "capital" => capital,
        "fiscalYearEnd" => fiscal_year_end,
        "submitterName" => submitter_name,
        "submitterNameEn" => submitter_name_en,
        "submitterNameKana" => submitter_name_kana,
        "address" => address,
        "industry" => industry,
        "securityCode" => security_code,
        "corporateNumber" => corporate_number,
    });
}

mod fact_impl {
    use diesel::prelude::*;

    use super::date;
    use crate::models::FactRow;
    use crate::schema::financial_facts::dsl::*;

    filterable_store!(FactRow, financial_facts, crate::schema::financial_facts::table, {
        "docID" => doc_id,
        "edinetCode" => edinet_code,
        "docTypeCode" => doc_type_code,
        "fiscalYear" => fiscal_year,
        "period" => period,
        "filePrefix" => file_prefix,
        "elementId" => element_id,
        "itemName" => item_name,
        "contextId" => context_id,
        "relativeFiscalYear" => relative_fiscal_year,
        "consolidatedOrIndividual" => consolidated_or_individual,
        "periodOrPointInTime" => period_or_point_in_time,
        "unitId" => unit_id,
        "unit" => unit,
        "value" => value,
        "submitDateTime" => submit_date_time,
    });
}

mod tag_impl {
    use diesel::prelude::*;

    use super::date;
    use crate::models::TagRow;
    use crate::schema::tag_dictionary::dsl::*;

    filterable_store!(TagRow, tag_dictionary, crate::schema::tag_dictionary::table, {
        "standardLabelTree" => standard_label_tree,
        "detailedLabelTree" => detailed_label_tree,
        "verboseLabelJp" => verbose_label_jp,
        "standardLabelEn" => standard_label_en,
        "verboseLabelEn" => verbose_label_en,
        "classificationLabelJp" => classification_label_jp,
        "classificationLabelEn" => classification_label_en,
        "namespacePrefix" => namespace_prefix,
        "elementName" => element_name,
        "elementId" => element_id,
        "type" => element_type,
        "substitutionGroup" => substitution_group,
        "periodType" => period_type,
        "balance" => balance,
        "abstract" => abstract_flag,
        "depth" => depth,
        "documentationLabelJp" => documentation_label_jp,
        "documentationLabelEn" => documentation_label_en,
        "referenceLink" => reference_link,
        "parentElementName" => parent_element_name,
        "parentStandardLabelTree" => parent_standard_label_tree,
        "parentDetailedLabelTree" => parent_detailed_label_tree,
        "loadedAt" => loaded_at,
    });
}

mod account_tag_impl {
    use diesel::prelude::*;

    use super::date;
    use crate::models::AccountTagRow;
    use crate::schema::account_tag_dictionary::dsl::*;

    filterable_store!(AccountTagRow, account_tag_dictionary, crate::schema::account_tag_dictionary::table, {
        "accountClassification" => account_classification,
        "industry" => industry,
        "standardLabel" => standard_label,
        "verboseLabel" => verbose_label,
        "standardLabelEn" => standard_label_en,
        "verboseLabelEn" => verbose_label_en,
        "classificationLabelJp" => classification_label_jp,
        "classificationLabelEn" => classification_label_en,
        "namespacePrefix" => namespace_prefix,
        "elementName" => element_name,
        "elementId" => element_id,
        "type" => element_type,
        "substitutionGroup" => substitution_group,
        "periodType" => period_type,
        "balance" => balance,
        "abstract" => abstract_flag,
        "depth" => depth,
        "referenceLink" => reference_link,
        "parentElementName" => parent_element_name,
        "parentStandardLabel" => parent_standard_label,
        "loadedAt" => loaded_at,
    });
}

/// Filter-map facade over one entity's table, holding the shared pool.
pub struct Store<T> {
    pool: DbPool,
    _entity: PhantomData<T>,
}

impl<T: Filterable> Store<T> {
    pub fn new(pool: DbPool) -> Self {
        Store {
            pool,
            _entity: PhantomData,
        }
    }

    #[inline]
    fn conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
        Ok(self.pool.get()?)
    }

    pub fn query(&self, filters: &FilterMap) -> Result<Vec<T>> {
        let mut conn = self.conn()?;
        T::load_where(&mut conn, filters)
    }

    pub fn all(&self) -> Result<Vec<T>> {
        let mut conn = self.conn()?;
        T::load_where(&mut conn, &FilterMap::new())
    }

    pub fn distinct_strings(&self, column: &str, filters: &FilterMap) -> Result<Vec<String>> {
        let mut conn = self.conn()?;
        T::distinct_strings(&mut conn, column, filters)
    }

    pub fn insert(&self, row: &T) -> Result<usize> {
        let mut conn = self.conn()?;
        row.insert(&mut conn)
    }

    pub fn insert_batch(&self, rows: &[T]) -> Result<usize> {
        let mut conn = self.conn()?;
        T::insert_batch(&mut conn, rows)
    }

    pub fn replace_all(&self, rows: &[T]) -> Result<usize> {
        let mut conn = self.conn()?;
        T::replace_all(&mut conn, rows)
    }

    pub fn update_where(
        &self,
        filters: &FilterMap,
        assignments: &[(String, String)],
    ) -> Result<usize> {
        let mut conn = self.conn()?;
        T::update_where(&mut conn, filters, assignments)
    }

    pub fn delete_where(&self, filters: &FilterMap) -> Result<usize> {
        let mut conn = self.conn()?;
        T::delete_where(&mut conn, filters)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::{CatalogEntry, FactRow};
    use crate::testutil::{sample_entry, sample_fact, temp_pool};

    #[test]
    fn unknown_filter_type_is_a_config_error() {
        let err = filters_from_json(&json!({
            "docDescription": {"type": "string", "filter_type": "contains", "value": "x"}
        }))
        .unwrap_err();
        assert!(matches!(err, IngestError::Config(_)), "got {err:?}");
    }

    #[test]
    fn unknown_column_is_a_config_error() {
        let pool = temp_pool();
        let store: Store<CatalogEntry> = Store::new(pool);
        let mut filters = FilterMap::new();
        filters.insert("noSuchColumn".into(), FieldFilter::eq("x"));
        let err = store.query(&filters).unwrap_err();
        assert!(matches!(err, IngestError::Config(_)), "got {err:?}");
    }

    // `value` is also a column unit struct in the fact table's dsl; the
    // predicate builder must not confuse it with the filter's payload
    #[test]
    fn filters_on_a_column_named_value() {
        let pool = temp_pool();
        let store: Store<FactRow> = Store::new(pool);
        let mut cheap = sample_fact("D1", "E00015", "jppfs_cor:NetSales", "Ctx1");
        cheap.value = Some("100".to_string());
        let mut dear = sample_fact("D2", "E00015", "jppfs_cor:NetSales", "Ctx2");
        dear.value = Some("900".to_string());
        store.insert_batch(&[cheap, dear]).unwrap();

        let mut filters = FilterMap::new();
        filters.insert("value".into(), FieldFilter::eq("900"));
        let hits = store.query(&filters).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "D2");
    }

    #[test]
    fn date_between_is_inclusive_and_ignores_time_of_day() {
        let pool = temp_pool();
        let store: Store<CatalogEntry> = Store::new(pool);
        let rows = vec![
            sample_entry("D1", "E00001", "2022-10-31 17:00", "120"),
            sample_entry("D2", "E00002", "2022-11-01 09:00", "120"),
            sample_entry("D3", "E00003", "2022-11-15 23:59", "120"),
            sample_entry("D4", "E00004", "2022-11-16 00:00", "120"),
        ];
        store.insert_batch(&rows).unwrap();

        let filters = filters_from_json(&json!({
            "submitDateTime": {
                "type": "date",
                "filter_type": "between",
                "start": "2022-11-01",
                "end": "2022-11-15"
            }
        }))
        .unwrap();
        let mut hits: Vec<String> = store
            .query(&filters)
            .unwrap()
            .into_iter()
            .map(|e| e.doc_id)
            .collect();
        hits.sort();
        assert_eq!(hits, vec!["D2".to_string(), "D3".to_string()]);
    }

    #[test]
    fn filters_and_combine() {
        let pool = temp_pool();
        let store: Store<CatalogEntry> = Store::new(pool);
        store
            .insert_batch(&[
                sample_entry("D1", "E00015", "2023-06-01 10:00", "120"),
                sample_entry("D2", "E00015", "2023-06-01 10:00", "180"),
                sample_entry("D3", "E09999", "2023-06-01 10:00", "120"),
            ])
            .unwrap();

        let mut filters = FilterMap::new();
        filters.insert("edinetCode".into(), FieldFilter::eq("E00015"));
        filters.insert(
            "docTypeCode".into(),
            FieldFilter::is_in(["120", "140", "160"]),
        );
        let hits = store.query(&filters).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "D1");
    }

    #[test]
    fn distinct_strings_deduplicates() {
        let pool = temp_pool();
        let store: Store<CatalogEntry> = Store::new(pool);
        store
            .insert_batch(&[
                sample_entry("D1", "E00015", "2023-06-01 10:00", "120"),
                sample_entry("D2", "E00015", "2023-06-02 10:00", "140"),
                sample_entry("D3", "E09999", "2023-06-03 10:00", "120"),
            ])
            .unwrap();
        let mut codes = store
            .distinct_strings("edinetCode", &FilterMap::new())
            .unwrap();
        codes.sort();
        assert_eq!(codes, vec!["E00015".to_string(), "E09999".to_string()]);
    }

    #[test]
    fn update_and_delete_are_filter_scoped() {
        let pool = temp_pool();
        let store: Store<CatalogEntry> = Store::new(pool);
        store
            .insert_batch(&[
                sample_entry("D1", "E00015", "2023-06-01 10:00", "120"),
                sample_entry("D2", "E09999", "2023-06-01 10:00", "120"),
            ])
            .unwrap();

        let mut filters = FilterMap::new();
        filters.insert("edinetCode".into(), FieldFilter::eq("E00015"));
        let touched = store
            .update_where(
                &filters,
                &[
                    ("withdrawalStatus".into(), "1".into()),
                    ("disclosureStatus".into(), "2".into()),
                ],
            )
            .unwrap();
        // rows matched, not a per-assignment tally
        assert_eq!(touched, 1);

        let deleted = store.delete_where(&filters).unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.all().unwrap().len(), 1);
    }

    #[test]
    fn failed_replace_keeps_previous_contents() {
        let pool = temp_pool();
        let store: Store<CatalogEntry> = Store::new(pool);
        store
            .insert(&sample_entry("OLD", "E00001", "2020-01-01 00:00", "120"))
            .unwrap();

        // duplicate primary key makes the bulk insert fail mid-replace
        let result = store.replace_all(&[
            sample_entry("NEW", "E00002", "2024-01-01 00:00", "120"),
            sample_entry("NEW", "E00003", "2024-01-02 00:00", "120"),
        ]);
        assert!(result.is_err());

        let rows = store.all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].doc_id, "OLD");
    }

    #[test]
    fn replace_all_swaps_contents() {
        let pool = temp_pool();
        let store: Store<CatalogEntry> = Store::new(pool);
        store
            .insert(&sample_entry("OLD", "E00001", "2020-01-01 00:00", "120"))
            .unwrap();
        store
            .replace_all(&[sample_entry("NEW", "E00002", "2024-01-01 00:00", "120")])
            .unwrap();
        let rows = store.all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].doc_id, "NEW");
    }
}
