use thiserror::Error;

/// Rejected before anything is persisted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invoice must contain at least one line item")]
    EmptyInvoice,
    #[error("rate and quantity must be non-negative")]
    NegativeAmount,
}

/// Rendering failures never touch persisted ledger state; a stored invoice
/// can always be re-rendered later.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("could not write artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("'typst' compiler not found on PATH")]
    CompilerMissing,
    #[error("typst compilation failed for {0}")]
    CompileFailed(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not access {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("collection {name} is unreadable: {source}")]
    Corrupt {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything a command handler can fail with. Reported at the dispatch
/// boundary; the process keeps running.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("client '{0}' not found")]
    ClientNotFound(String),
    #[error("invoice '{0}' not found")]
    InvoiceNotFound(String),
    #[error("invoice {invoice_id} references client {client_id}, which no longer exists")]
    DanglingClient { invoice_id: String, client_id: u64 },
    #[error("operation cancelled")]
    Cancelled,
}

impl From<inquire::InquireError> for AppError {
    fn from(_: inquire::InquireError) -> Self {
        AppError::Cancelled
    }
}
