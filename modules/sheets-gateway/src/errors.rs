//! Error catalog for the sheets gateway REST API.

use sheets_errors::{ErrDef, Problem, finalize};

macro_rules! type_url {
    ($code:literal) => {
        concat!("https://errors.sheets-gateway.dev/", $code)
    };
}

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    InvalidCellAddress,
    InvalidRowNumber,
    InvalidColumnLetter,
    InvalidPageBounds,
    EmptyValues,
    InvalidRequest,
    WorksheetNotFound,
    AuthFailed,
    ProviderInvalidRequest,
    ProviderUnauthenticated,
    PermissionDenied,
    NotFound,
    RateLimited,
    ProviderError,
    ProviderTimeout,
    ProviderUnavailable,
    MalformedProviderResponse,
    RequestTimeout,
    PayloadTooLarge,
    Internal,
}

impl ErrorCode {
    #[must_use]
    pub const fn def(self) -> ErrDef {
        match self {
            Self::InvalidCellAddress => ErrDef {
                status: 400,
                title: "Invalid cell address",
                code: "SHEETS_INVALID_CELL_ADDRESS",
                type_url: type_url!("SHEETS_INVALID_CELL_ADDRESS"),
            },
            Self::InvalidRowNumber => ErrDef {
                status: 400,
                title: "Invalid row number",
                code: "SHEETS_INVALID_ROW_NUMBER",
                type_url: type_url!("SHEETS_INVALID_ROW_NUMBER"),
            },
            Self::InvalidColumnLetter => ErrDef {
                status: 400,
                title: "Invalid column letter",
                code: "SHEETS_INVALID_COLUMN_LETTER",
                type_url: type_url!("SHEETS_INVALID_COLUMN_LETTER"),
            },
            Self::InvalidPageBounds => ErrDef {
                status: 400,
                title: "Invalid page bounds",
                code: "SHEETS_INVALID_PAGE_BOUNDS",
                type_url: type_url!("SHEETS_INVALID_PAGE_BOUNDS"),
            },
            Self::EmptyValues => ErrDef {
                status: 400,
                title: "Invalid values",
                code: "SHEETS_INVALID_VALUES",
                type_url: type_url!("SHEETS_INVALID_VALUES"),
            },
            Self::InvalidRequest => ErrDef {
                status: 400,
                title: "Invalid request",
                code: "SHEETS_INVALID_REQUEST",
                type_url: type_url!("SHEETS_INVALID_REQUEST"),
            },
            Self::WorksheetNotFound => ErrDef {
                status: 404,
                title: "Worksheet not found",
                code: "SHEETS_WORKSHEET_NOT_FOUND",
                type_url: type_url!("SHEETS_WORKSHEET_NOT_FOUND"),
            },
            Self::AuthFailed => ErrDef {
                status: 401,
                title: "Provider authentication failed",
                code: "SHEETS_AUTH_FAILED",
                type_url: type_url!("SHEETS_AUTH_FAILED"),
            },
            Self::ProviderInvalidRequest => ErrDef {
                status: 400,
                title: "Request rejected by provider",
                code: "SHEETS_PROVIDER_INVALID_REQUEST",
                type_url: type_url!("SHEETS_PROVIDER_INVALID_REQUEST"),
            },
            Self::ProviderUnauthenticated => ErrDef {
                status: 401,
                title: "Provider credentials rejected",
                code: "SHEETS_PROVIDER_UNAUTHENTICATED",
                type_url: type_url!("SHEETS_PROVIDER_UNAUTHENTICATED"),
            },
            Self::PermissionDenied => ErrDef {
                status: 403,
                title: "Permission denied",
                code: "SHEETS_PERMISSION_DENIED",
                type_url: type_url!("SHEETS_PERMISSION_DENIED"),
            },
            Self::NotFound => ErrDef {
                status: 404,
                title: "Not found",
                code: "SHEETS_NOT_FOUND",
                type_url: type_url!("SHEETS_NOT_FOUND"),
            },
            Self::RateLimited => ErrDef {
                status: 429,
                title: "Provider quota exceeded",
                code: "SHEETS_RATE_LIMITED",
                type_url: type_url!("SHEETS_RATE_LIMITED"),
            },
            Self::ProviderError => ErrDef {
                status: 502,
                title: "Provider error",
                code: "SHEETS_PROVIDER_ERROR",
                type_url: type_url!("SHEETS_PROVIDER_ERROR"),
            },
            Self::ProviderTimeout => ErrDef {
                status: 504,
                title: "Provider timeout",
                code: "SHEETS_PROVIDER_TIMEOUT",
                type_url: type_url!("SHEETS_PROVIDER_TIMEOUT"),
            },
            Self::ProviderUnavailable => ErrDef {
                status: 502,
                title: "Provider unavailable",
                code: "SHEETS_PROVIDER_UNAVAILABLE",
                type_url: type_url!("SHEETS_PROVIDER_UNAVAILABLE"),
            },
            Self::MalformedProviderResponse => ErrDef {
                status: 500,
                title: "Unexpected provider response",
                code: "SHEETS_MALFORMED_PROVIDER_RESPONSE",
                type_url: type_url!("SHEETS_MALFORMED_PROVIDER_RESPONSE"),
            },
            Self::RequestTimeout => ErrDef {
                status: 504,
                title: "Request timeout",
                code: "SHEETS_REQUEST_TIMEOUT",
                type_url: type_url!("SHEETS_REQUEST_TIMEOUT"),
            },
            Self::PayloadTooLarge => ErrDef {
                status: 413,
                title: "Payload too large",
                code: "SHEETS_PAYLOAD_TOO_LARGE",
                type_url: type_url!("SHEETS_PAYLOAD_TOO_LARGE"),
            },
            Self::Internal => ErrDef {
                status: 500,
                title: "Internal server error",
                code: "SHEETS_INTERNAL",
                type_url: type_url!("SHEETS_INTERNAL"),
            },
        }
    }

    #[must_use]
    pub const fn status(self) -> u16 {
        self.def().status
    }

    #[must_use]
    pub fn as_problem(self, detail: impl Into<String>) -> Problem {
        self.def().as_problem(detail)
    }

    /// Problem with `instance` and optional `trace_id` attached.
    #[must_use]
    pub fn with_context(
        self,
        detail: impl Into<String>,
        instance: &str,
        trace_id: Option<String>,
    ) -> Problem {
        finalize(self.as_problem(detail), instance, trace_id)
    }
}
