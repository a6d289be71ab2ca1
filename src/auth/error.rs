use thiserror::Error;

/// Authentication failures. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // Sign in
    #[error("Invalid email or password. Please try again.")]
    InvalidCredential,
    #[error("No account found with this email. Please sign up first.")]
    UserNotFound,
    #[error("Incorrect password. Please try again.")]
    WrongPassword,
    #[error("Too many failed attempts. Please try again later or reset your password.")]
    TooManyRequests,
    #[error("This account has been disabled. Please contact support.")]
    UserDisabled,

    // Sign up
    #[error("An account with this email already exists. Please sign in instead.")]
    EmailAlreadyInUse,
    #[error(
        "Password is too weak. Please use at least 6 characters with a mix of letters, numbers, and symbols."
    )]
    WeakPassword,
    #[error("Please enter a valid email address.")]
    InvalidEmail,

    // Google sign in
    #[error("Sign in was cancelled. Please try again.")]
    PopupClosedByUser,
    #[error("Sign in popup was blocked. Please allow popups for this site.")]
    PopupBlocked,
    #[error("The sign in process was cancelled. Please try again.")]
    CancelledPopupRequest,

    // Network
    #[error("Network error. Please check your internet connection and try again.")]
    NetworkRequestFailed,
    #[error("Request timeout. Please try again.")]
    Timeout,

    /// Input rejected before reaching the provider.
    #[error("{0}")]
    Validation(String),
    #[error("Sign in is not configured. Set FIREBASE_API_KEY or run `emojify config set firebase_api_key <key>`.")]
    NotConfigured,
    #[error("Please sign in first.")]
    NotSignedIn,
    /// Anything unmapped; the detail is logged, never shown.
    #[error("An unexpected error occurred. Please try again.")]
    Unexpected(String),
}

impl AuthError {
    /// Provider-neutral error code, e.g. `auth/wrong-password`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "auth/invalid-credential",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::UserDisabled => "auth/user-disabled",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::WeakPassword => "auth/weak-password",
            Self::InvalidEmail => "auth/invalid-email",
            Self::PopupClosedByUser => "auth/popup-closed-by-user",
            Self::PopupBlocked => "auth/popup-blocked",
            Self::CancelledPopupRequest => "auth/cancelled-popup-request",
            Self::NetworkRequestFailed => "auth/network-request-failed",
            Self::Timeout => "auth/timeout",
            Self::Validation(_) => "auth/validation",
            Self::NotConfigured => "auth/not-configured",
            Self::NotSignedIn => "auth/not-signed-in",
            Self::Unexpected(_) => "auth/unknown",
        }
    }

    /// Map a provider-neutral code back to an error.
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/invalid-credential" => Self::InvalidCredential,
            "auth/user-not-found" => Self::UserNotFound,
            "auth/wrong-password" => Self::WrongPassword,
            "auth/too-many-requests" => Self::TooManyRequests,
            "auth/user-disabled" => Self::UserDisabled,
            "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "auth/weak-password" => Self::WeakPassword,
            "auth/invalid-email" => Self::InvalidEmail,
            "auth/popup-closed-by-user" => Self::PopupClosedByUser,
            "auth/popup-blocked" => Self::PopupBlocked,
            "auth/cancelled-popup-request" => Self::CancelledPopupRequest,
            "auth/network-request-failed" => Self::NetworkRequestFailed,
            "auth/timeout" => Self::Timeout,
            other => unhandled(other),
        }
    }

    /// Map an Identity Toolkit REST error message such as `EMAIL_EXISTS` or
    /// `WEAK_PASSWORD : Password should be at least 6 characters`.
    pub fn from_provider_message(message: &str) -> Self {
        let code = message.split(':').next().unwrap_or_default().trim();
        match code {
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => Self::InvalidCredential,
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => Self::UserNotFound,
            "INVALID_PASSWORD" => Self::WrongPassword,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyRequests,
            "USER_DISABLED" => Self::UserDisabled,
            "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            _ => unhandled(message),
        }
    }

    /// Classify a transport failure.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() || err.is_request() {
            Self::NetworkRequestFailed
        } else {
            unhandled(&err.to_string())
        }
    }

    /// Whether retrying later could succeed without user action.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NetworkRequestFailed | Self::Timeout)
    }
}

fn unhandled(detail: &str) -> AuthError {
    tracing::error!(detail, "unhandled auth error");
    AuthError::Unexpected(detail.to_string())
}
