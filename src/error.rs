/*
SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza
*/

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("registry request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx from the registry. Recoverable: the enclosing loop logs and
    /// moves on to the next day / document / filer.
    #[error("registry returned status {status} for {context}")]
    UnexpectedStatus { status: u16, context: String },

    #[error("database error: {0}")]
    Db(#[from] diesel::result::Error),

    #[error("database pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("dataframe error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed input from the registry: missing export, missing filename
    /// dates, unreadable tabular content. Recoverable like `UnexpectedStatus`.
    #[error("parse error: {0}")]
    Parse(String),

    /// Caller error: unknown filter kind or column, missing required setting.
    /// Never swallowed.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0} is not implemented")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
