use std::fmt;

/// Errors raised by access checks and guard handlers.
///
/// Each carries a precise internal reason for operator logs. What the caller
/// sees is deliberately coarser: see [`AccessError::error_page`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The resource should appear absent to this caller.
    #[error("not found: {reason}")]
    NotFound {
        /// Internal reason.
        reason: String,
    },

    /// A role check refused the request.
    #[error("forbidden: {reason}")]
    Forbidden {
        /// Internal reason.
        reason: String,
    },

    /// A precondition in our own code was violated.
    #[error("server error: {reason}")]
    Server {
        /// Internal reason.
        reason: String,
    },
}

/// Result type for access checks.
pub type AccessResult<T> = Result<T, AccessError>;

/// Classification of an [`AccessError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`AccessError::NotFound`].
    NotFound,
    /// See [`AccessError::Forbidden`].
    Forbidden,
    /// See [`AccessError::Server`].
    Server,
}

/// The page rendered for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorPage {
    /// Generic "not found" page.
    NotFound,
    /// Generic error page.
    Server,
}

impl ErrorPage {
    /// HTTP status code of the rendered page.
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Server => 500,
        }
    }
}

impl AccessError {
    /// Create a not-found error.
    #[must_use]
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound {
            reason: reason.into(),
        }
    }

    /// Create a forbidden error.
    #[must_use]
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(reason: impl Into<String>) -> Self {
        Self::Server {
            reason: reason.into(),
        }
    }

    /// The error's kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Server { .. } => ErrorKind::Server,
        }
    }

    /// The internal reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::NotFound { reason } | Self::Forbidden { reason } | Self::Server { reason } => {
                reason
            },
        }
    }

    /// Precise status code for logs: 404, 403 or 500.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::Forbidden => 403,
            ErrorKind::Server => 500,
        }
    }

    /// The page shown to the caller. Forbidden renders as not found so that
    /// unauthorised viewers cannot tell which prisoners exist.
    #[must_use]
    pub fn error_page(&self) -> ErrorPage {
        match self.kind() {
            ErrorKind::NotFound | ErrorKind::Forbidden => ErrorPage::NotFound,
            ErrorKind::Server => ErrorPage::Server,
        }
    }

    /// Status code of the page shown to the caller.
    #[must_use]
    pub fn public_status(&self) -> u16 {
        self.error_page().status_code()
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Server => "server",
        };
        f.write_str(name)
    }
}
