/*
SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza
*/

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// One listed filing, as returned by the registry's daily listing endpoint.
///
/// The registry also sends a `seqNumber` per result row; it is internal to the
/// listing pagination and is deliberately absent here, so deserializing a
/// result object drops it.
#[derive(Queryable, Insertable, Selectable)]
#[diesel(table_name = crate::schema::document_catalog)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_default_value = false)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "docID")]
    pub doc_id: String,
    #[serde(rename = "edinetCode")]
    pub edinet_code: Option<String>,
    #[serde(rename = "secCode")]
    pub sec_code: Option<String>,
    #[serde(rename = "JCN")]
    pub jcn: Option<String>,
    #[serde(rename = "filerName")]
    pub filer_name: Option<String>,
    #[serde(rename = "fundCode")]
    pub fund_code: Option<String>,
    #[serde(rename = "ordinanceCode")]
    pub ordinance_code: Option<String>,
    #[serde(rename = "formCode")]
    pub form_code: Option<String>,
    #[serde(rename = "docTypeCode")]
    pub doc_type_code: Option<String>,
    #[serde(rename = "periodStart")]
    pub period_start: Option<String>,
    #[serde(rename = "periodEnd")]
    pub period_end: Option<String>,
    #[serde(rename = "submitDateTime")]
    pub submit_date_time: Option<String>,
    #[serde(rename = "docDescription")]
    pub doc_description: Option<String>,
    #[serde(rename = "issuerEdinetCode")]
    pub issuer_edinet_code: Option<String>,
    #[serde(rename = "subjectEdinetCode")]
    pub subject_edinet_code: Option<String>,
    #[serde(rename = "subsidiaryEdinetCode")]
    pub subsidiary_edinet_code: Option<String>,
    #[serde(rename = "currentReportReason")]
    pub current_report_reason: Option<String>,
    #[serde(rename = "parentDocID")]
    pub parent_doc_id: Option<String>,
    #[serde(rename = "opeDateTime")]
    pub ope_date_time: Option<String>,
    #[serde(rename = "withdrawalStatus")]
    pub withdrawal_status: Option<String>,
    #[serde(rename = "docInfoEditStatus")]
    pub doc_info_edit_status: Option<String>,
    #[serde(rename = "disclosureStatus")]
    pub disclosure_status: Option<String>,
    #[serde(rename = "xbrlFlag")]
    pub xbrl_flag: Option<String>,
    #[serde(rename = "pdfFlag")]
    pub pdf_flag: Option<String>,
    #[serde(rename = "attachDocFlag")]
    pub attach_doc_flag: Option<String>,
    #[serde(rename = "englishDocFlag")]
    pub english_doc_flag: Option<String>,
    #[serde(rename = "csvFlag")]
    pub csv_flag: Option<String>,
    #[serde(rename = "legalStatus")]
    pub legal_status: Option<String>,
}

/// One known filer from the EDINET code list.
#[derive(Queryable, Insertable, Selectable)]
#[diesel(table_name = crate::schema::edinet_codes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_default_value = false)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilerEntry {
    pub edinet_code: String,
    pub submitter_type: Option<String>,
    pub listed_section: Option<String>,
    pub consolidation: Option<String>,
    pub capital: Option<String>,
    pub fiscal_year_end: Option<String>,
    pub submitter_name: Option<String>,
    pub submitter_name_en: Option<String>,
    pub submitter_name_kana: Option<String>,
    pub address: Option<String>,
    pub industry: Option<String>,
    pub security_code: Option<String>,
    pub corporate_number: Option<String>,
}

/// One (element, context) data point extracted from a CSV export.
///
/// `id` is the SQLite rowid; rows produced by the extraction engine carry
/// `None` and get their id at insert. (`doc_id`, `edinet_code`, `element_id`,
/// `context_id`) is the merge key and is UNIQUE in the fact table.
#[derive(Queryable, Insertable, Selectable)]
#[diesel(table_name = crate::schema::financial_facts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_default_value = false)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactRow {
    pub id: Option<i32>,
    pub doc_id: String,
    pub edinet_code: String,
    pub doc_type_code: Option<String>,
    pub fiscal_year: Option<String>,
    pub period: Option<String>,
    pub file_prefix: Option<String>,
    pub element_id: String,
    pub item_name: Option<String>,
    pub context_id: String,
    pub relative_fiscal_year: Option<String>,
    pub consolidated_or_individual: Option<String>,
    pub period_or_point_in_time: Option<String>,
    pub unit_id: Option<String>,
    pub unit: Option<String>,
    pub value: Option<String>,
    pub submit_date_time: Option<String>,
}

/// One taxonomy element from the generic tag list spreadsheet.
#[derive(Queryable, Insertable, Selectable)]
#[diesel(table_name = crate::schema::tag_dictionary)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_default_value = false)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagRow {
    pub id: Option<i32>,
    pub standard_label_tree: Option<String>,
    pub detailed_label_tree: Option<String>,
    pub verbose_label_jp: Option<String>,
    pub standard_label_en: Option<String>,
    pub verbose_label_en: Option<String>,
    pub classification_label_jp: Option<String>,
    pub classification_label_en: Option<String>,
    pub namespace_prefix: Option<String>,
    pub element_name: Option<String>,
    pub element_id: Option<String>,
    pub element_type: Option<String>,
    pub substitution_group: Option<String>,
    pub period_type: Option<String>,
    pub balance: Option<String>,
    pub abstract_flag: Option<String>,
    pub depth: Option<String>,
    pub documentation_label_jp: Option<String>,
    pub documentation_label_en: Option<String>,
    pub reference_link: Option<String>,
    pub parent_element_name: Option<String>,
    pub parent_standard_label_tree: Option<String>,
    pub parent_detailed_label_tree: Option<String>,
    pub loaded_at: Option<String>,
}

/// One taxonomy element from the per-industry account list spreadsheet.
#[derive(Queryable, Insertable, Selectable)]
#[diesel(table_name = crate::schema::account_tag_dictionary)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_default_value = false)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountTagRow {
    pub id: Option<i32>,
    pub account_classification: Option<String>,
    pub industry: Option<String>,
    pub standard_label: Option<String>,
    pub verbose_label: Option<String>,
    pub standard_label_en: Option<String>,
    pub verbose_label_en: Option<String>,
    pub classification_label_jp: Option<String>,
    pub classification_label_en: Option<String>,
    pub namespace_prefix: Option<String>,
    pub element_name: Option<String>,
    pub element_id: Option<String>,
    pub element_type: Option<String>,
    pub substitution_group: Option<String>,
    pub period_type: Option<String>,
    pub balance: Option<String>,
    pub abstract_flag: Option<String>,
    pub depth: Option<String>,
    pub reference_link: Option<String>,
    pub parent_element_name: Option<String>,
    pub parent_standard_label: Option<String>,
    pub loaded_at: Option<String>,
}
