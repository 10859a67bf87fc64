// Table definitions for the EDINET store. Column names keep the registry's
// wire names (camelCase) so filter maps written against the API schema can be
// applied to the store directly.

diesel::table! {
    document_catalog (doc_id) {
        #[sql_name = "docID"]
        doc_id -> Text,
        #[sql_name = "edinetCode"]
        edinet_code -> Nullable<Text>,
        #[sql_name = "secCode"]
        sec_code -> Nullable<Text>,
        #[sql_name = "JCN"]
        jcn -> Nullable<Text>,
        #[sql_name = "filerName"]
        filer_name -> Nullable<Text>,
        #[sql_name = "fundCode"]
        fund_code -> Nullable<Text>,
        #[sql_name = "ordinanceCode"]
        ordinance_code -> Nullable<Text>,
        #[sql_name = "formCode"]
        form_code -> Nullable<Text>,
        #[sql_name = "docTypeCode"]
        doc_type_code -> Nullable<Text>,
        #[sql_name = "periodStart"]
        period_start -> Nullable<Text>,
        #[sql_name = "periodEnd"]
        period_end -> Nullable<Text>,
        #[sql_name = "submitDateTime"]
        submit_date_time -> Nullable<Text>,
        #[sql_name = "docDescription"]
        doc_description -> Nullable<Text>,
        #[sql_name = "issuerEdinetCode"]
        issuer_edinet_code -> Nullable<Text>,
        #[sql_name = "subjectEdinetCode"]
        subject_edinet_code -> Nullable<Text>,
        #[sql_name = "subsidiaryEdinetCode"]
        subsidiary_edinet_code -> Nullable<Text>,
        #[sql_name = "currentReportReason"]
        current_report_reason -> Nullable<Text>,
        #[sql_name = "parentDocID"]
        parent_doc_id -> Nullable<Text>,
        #[sql_name = "opeDateTime"]
        ope_date_time -> Nullable<Text>,
        #[sql_name = "withdrawalStatus"]
        withdrawal_status -> Nullable<Text>,
        #[sql_name = "docInfoEditStatus"]
        doc_info_edit_status -> Nullable<Text>,
        #[sql_name = "disclosureStatus"]
        disclosure_status -> Nullable<Text>,
        #[sql_name = "xbrlFlag"]
        xbrl_flag -> Nullable<Text>,
        #[sql_name = "pdfFlag"]
        pdf_flag -> Nullable<Text>,
        #[sql_name = "attachDocFlag"]
        attach_doc_flag -> Nullable<Text>,
        #[sql_name = "englishDocFlag"]
        english_doc_flag -> Nullable<Text>,
        #[sql_name = "csvFlag"]
        csv_flag -> Nullable<Text>,
        #[sql_name = "legalStatus"]
        legal_status -> Nullable<Text>,
    }
}

diesel::table! {
    edinet_codes (edinet_code) {
        #[sql_name = "edinetCode"]
        edinet_code -> Text,
        #[sql_name = "submitterType"]
        submitter_type -> Nullable<Text>,
        #[sql_name = "listedSection"]
        listed_section -> Nullable<Text>,
        consolidation -> Nullable<Text>,
        capital -> Nullable<Text>,
        #[sql_name = "fiscalYearEnd"]
        fiscal_year_end -> Nullable<Text>,
        #[sql_name = "submitterName"]
        submitter_name -> Nullable<Text>,
        #[sql_name = "submitterNameEn"]
        submitter_name_en -> Nullable<Text>,
        #[sql_name = "submitterNameKana"]
        submitter_name_kana -> Nullable<Text>,
        address -> Nullable<Text>,
        industry -> Nullable<Text>,
        #[sql_name = "securityCode"]
        security_code -> Nullable<Text>,
        #[sql_name = "corporateNumber"]
        corporate_number -> Nullable<Text>,
    }
}

diesel::table! {
    financial_facts (id) {
        id -> Nullable<Integer>,
        #[sql_name = "docID"]
        doc_id -> Text,
        #[sql_name = "edinetCode"]
        edinet_code -> Text,
        #[sql_name = "docTypeCode"]
        doc_type_code -> Nullable<Text>,
        #[sql_name = "fiscalYear"]
        fiscal_year -> Nullable<Text>,
        period -> Nullable<Text>,
        #[sql_name = "filePrefix"]
        file_prefix -> Nullable<Text>,
        #[sql_name = "elementId"]
        element_id -> Text,
        #[sql_name = "itemName"]
        item_name -> Nullable<Text>,
        #[sql_name = "contextId"]
        context_id -> Text,
        #[sql_name = "relativeFiscalYear"]
        relative_fiscal_year -> Nullable<Text>,
        #[sql_name = "consolidatedOrIndividual"]
        consolidated_or_individual -> Nullable<Text>,
        #[sql_name = "periodOrPointInTime"]
        period_or_point_in_time -> Nullable<Text>,
        #[sql_name = "unitId"]
        unit_id -> Nullable<Text>,
        unit -> Nullable<Text>,
        value -> Nullable<Text>,
        #[sql_name = "submitDateTime"]
        submit_date_time -> Nullable<Text>,
    }
}

diesel::table! {
    tag_dictionary (id) {
        id -> Nullable<Integer>,
        #[sql_name = "standardLabelTree"]
        standard_label_tree -> Nullable<Text>,
        #[sql_name = "detailedLabelTree"]
        detailed_label_tree -> Nullable<Text>,
        #[sql_name = "verboseLabelJp"]
        verbose_label_jp -> Nullable<Text>,
        #[sql_name = "standardLabelEn"]
        standard_label_en -> Nullable<Text>,
        #[sql_name = "verboseLabelEn"]
        verbose_label_en -> Nullable<Text>,
        #[sql_name = "classificationLabelJp"]
        classification_label_jp -> Nullable<Text>,
        #[sql_name = "classificationLabelEn"]
        classification_label_en -> Nullable<Text>,
        #[sql_name = "namespacePrefix"]
        namespace_prefix -> Nullable<Text>,
        #[sql_name = "elementName"]
        element_name -> Nullable<Text>,
        #[sql_name = "elementId"]
        element_id -> Nullable<Text>,
        #[sql_name = "type"]
        element_type -> Nullable<Text>,
        #[sql_name = "substitutionGroup"]
        substitution_group -> Nullable<Text>,
        #[sql_name = "periodType"]
        period_type -> Nullable<Text>,
        balance -> Nullable<Text>,
        #[sql_name = "abstract"]
        abstract_flag -> Nullable<Text>,
        depth -> Nullable<Text>,
        #[sql_name = "documentationLabelJp"]
        documentation_label_jp -> Nullable<Text>,
        #[sql_name = "documentationLabelEn"]
        documentation_label_en -> Nullable<Text>,
        #[sql_name = "referenceLink"]
        reference_link -> Nullable<Text>,
        #[sql_name = "parentElementName"]
        parent_element_name -> Nullable<Text>,
        #[sql_name = "parentStandardLabelTree"]
        parent_standard_label_tree -> Nullable<Text>,
        #[sql_name = "parentDetailedLabelTree"]
        parent_detailed_label_tree -> Nullable<Text>,
        #[sql_name = "loadedAt"]
        loaded_at -> Nullable<Text>,
    }
}

diesel::table! {
    account_tag_dictionary (id) {
        id -> Nullable<Integer>,
        #[sql_name = "accountClassification"]
        account_classification -> Nullable<Text>,
        industry -> Nullable<Text>,
        #[sql_name = "standardLabel"]
        standard_label -> Nullable<Text>,
        #[sql_name = "verboseLabel"]
        verbose_label -> Nullable<Text>,
        #[sql_name = "standardLabelEn"]
        standard_label_en -> Nullable<Text>,
        #[sql_name = "verboseLabelEn"]
        verbose_label_en -> Nullable<Text>,
        #[sql_name = "classificationLabelJp"]
        classification_label_jp -> Nullable<Text>,
        #[sql_name = "classificationLabelEn"]
        classification_label_en -> Nullable<Text>,
        #[sql_name = "namespacePrefix"]
        namespace_prefix -> Nullable<Text>,
        #[sql_name = "elementName"]
        element_name -> Nullable<Text>,
        #[sql_name = "elementId"]
        element_id -> Nullable<Text>,
        #[sql_name = "type"]
        element_type -> Nullable<Text>,
        #[sql_name = "substitutionGroup"]
        substitution_group -> Nullable<Text>,
        #[sql_name = "periodType"]
        period_type -> Nullable<Text>,
        balance -> Nullable<Text>,
        #[sql_name = "abstract"]
        abstract_flag -> Nullable<Text>,
        depth -> Nullable<Text>,
        #[sql_name = "referenceLink"]
        reference_link -> Nullable<Text>,
        #[sql_name = "parentElementName"]
        parent_element_name -> Nullable<Text>,
        #[sql_name = "parentStandardLabel"]
        parent_standard_label -> Nullable<Text>,
        #[sql_name = "loadedAt"]
        loaded_at -> Nullable<Text>,
    }
}
