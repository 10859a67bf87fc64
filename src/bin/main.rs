/*
SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza
*/

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use edinet_ingest::config::Config;
use edinet_ingest::establish_connection;
use edinet_ingest::extract::{ALL_FILERS, DEFAULT_DOC_TYPES};
use edinet_ingest::facts::{ALL_PERIODS, CURRENT_PERIOD};
use edinet_ingest::registry::RegistryClient;
use edinet_ingest::{catalog, extract, facts, tagdict};

#[derive(Debug, Parser)]
#[command(author, version, about = "EDINET filing ingestion pipeline")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rebuild the document catalog from the registry's daily listings
    RefreshCatalog {
        /// How many days back from today to ingest
        #[arg(long, default_value_t = 7)]
        days: u32,

        /// Listing payload variant requested from the registry
        #[arg(long, default_value_t = 2)]
        doc_info_type: u8,
    },

    /// Rebuild the filer code table from the published code list
    RefreshFilerCodes,

    /// Extract facts for one filer (or `all`) and merge them into the store
    Extract {
        /// EDINET filer code, or `all`
        #[arg(long, default_value = ALL_FILERS)]
        filer: String,

        /// Submission date range start (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Submission date range end (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Doc-type codes to extract
        #[arg(long, value_delimiter = ',')]
        doc_types: Option<Vec<String>>,
    },

    /// Sweep every listed domestic filer, merging in batches
    ExtractAll {
        /// Submission date range start (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Submission date range end (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Filers per merge flush
        #[arg(long, default_value_t = 100)]
        batch_size: usize,
    },

    /// Load the element tag dictionary spreadsheet
    LoadTags {
        /// Path to the tag list workbook
        path: PathBuf,
    },

    /// Load the per-industry account dictionary spreadsheet
    LoadAccountTags {
        /// Path to the account list workbook
        path: PathBuf,
    },

    /// Look up stored facts for one element
    Lookup {
        /// Element id, e.g. jppfs_cor:NetSales
        #[arg(long)]
        element_id: String,

        /// Fiscal-year marker date of the filing (YYYY-MM-DD)
        #[arg(long)]
        fiscal_year: String,

        /// EDINET filer code
        #[arg(long)]
        filer: String,

        /// Period tags to include
        #[arg(long, value_delimiter = ',')]
        periods: Option<Vec<String>>,

        /// Pin the lookup to one document
        #[arg(long)]
        doc_id: Option<String>,

        /// Relative fiscal year label
        #[arg(long, default_value = CURRENT_PERIOD)]
        relative_fiscal_year: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let pool = establish_connection(&config.db_path);

    match args.command {
        Command::RefreshCatalog {
            days,
            doc_info_type,
        } => {
            let client = RegistryClient::new(&config)?;
            let n = catalog::refresh_catalog(&client, &pool, days, doc_info_type)?;
            info!("catalog refreshed: {n} documents");
        }
        Command::RefreshFilerCodes => {
            let client = RegistryClient::new(&config)?;
            let n = catalog::refresh_filer_codes(&client, &pool)?;
            info!("filer codes refreshed: {n} entries");
        }
        Command::Extract {
            filer,
            from,
            to,
            doc_types,
        } => {
            let client = RegistryClient::new(&config)?;
            let doc_types = doc_types.unwrap_or_else(|| {
                DEFAULT_DOC_TYPES.iter().map(|s| s.to_string()).collect()
            });
            let rows = extract::extract_rows(&client, &pool, &filer, &from, &to, &doc_types)?;
            let appended = facts::merge_rows(&pool, &rows)?;
            info!("extracted {} rows, {appended} new", rows.len());
        }
        Command::ExtractAll {
            from,
            to,
            batch_size,
        } => {
            let client = RegistryClient::new(&config)?;
            extract::extract_all(&client, &pool, &from, &to, batch_size)?;
        }
        Command::LoadTags { path } => {
            let n = tagdict::load_tag_dictionary(&pool, &path)?;
            info!("tag dictionary loaded: {n} rows");
        }
        Command::LoadAccountTags { path } => {
            let n = tagdict::load_account_dictionary(&pool, &path)?;
            info!("account dictionary loaded: {n} rows");
        }
        Command::Lookup {
            element_id,
            fiscal_year,
            filer,
            periods,
            doc_id,
            relative_fiscal_year,
        } => {
            let periods = periods
                .unwrap_or_else(|| ALL_PERIODS.iter().map(|s| s.to_string()).collect());
            let hits = facts::lookup_facts(
                &pool,
                &element_id,
                &fiscal_year,
                &filer,
                &periods,
                doc_id.as_deref(),
                &relative_fiscal_year,
            )?;
            for fact in &hits {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    fact.doc_id,
                    fact.fiscal_year.as_deref().unwrap_or("-"),
                    fact.period.as_deref().unwrap_or("-"),
                    fact.context_id,
                    fact.item_name.as_deref().unwrap_or("-"),
                    fact.value.as_deref().unwrap_or("-"),
                );
            }
            info!("{} facts", hits.len());
        }
    }
    Ok(())
}
