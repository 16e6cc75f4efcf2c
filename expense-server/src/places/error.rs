//! Nearby-place lookup error types.

use serde::Serialize;

/// Errors from a nearby-place provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Provider answered but refused the query
    #[error("provider rejected request: {0}")]
    Rejected(String),

    /// Mock data could not be loaded
    #[error("mock data error: {message}")]
    Mock { message: String },
}

/// Why the device position could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("位置情報の利用が拒否されました。ブラウザ設定をご確認ください。")]
    PermissionDenied,

    #[error("位置情報を取得できませんでした。GPS や Wi-Fi が有効か確認してください。")]
    PositionUnavailable,

    #[error("位置情報の取得がタイムアウトしました。もう一度お試しください。")]
    Timeout,

    #[error("お使いのブラウザは位置情報機能に対応していません。")]
    NotSupported,

    /// A Geolocation error code outside the known three.
    #[error("位置情報の取得中にエラーが発生しました。")]
    Unknown,
}

impl PositionError {
    /// Map a Geolocation API `PositionError.code`.
    ///
    /// 1 is permission denied, 2 position unavailable and 3 timeout.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => PositionError::PermissionDenied,
            2 => PositionError::PositionUnavailable,
            3 => PositionError::Timeout,
            _ => PositionError::Unknown,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            PositionError::PermissionDenied => ErrorCode::PermissionDenied,
            PositionError::PositionUnavailable | PositionError::Unknown => {
                ErrorCode::PositionUnavailable
            }
            PositionError::Timeout => ErrorCode::Timeout,
            PositionError::NotSupported => ErrorCode::NotSupported,
        }
    }
}

/// Machine-readable category of a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    NotSupported,
    ApiError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PermissionDenied => "permission-denied",
            ErrorCode::PositionUnavailable => "position-unavailable",
            ErrorCode::Timeout => "timeout",
            ErrorCode::NotSupported => "not-supported",
            ErrorCode::ApiError => "api-error",
        }
    }
}

/// Message shown when the provider call fails, whatever the cause.
pub const API_ERROR_MESSAGE: &str =
    "最寄り駅情報の取得に失敗しました。ネットワーク接続をご確認ください。";

/// A lookup failure as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct ResolverError {
    pub code: ErrorCode,
    pub message: String,
}

impl ResolverError {
    /// The provider failed. The detail goes to the log, not to the user.
    pub fn api() -> Self {
        Self {
            code: ErrorCode::ApiError,
            message: API_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<PositionError> for ResolverError {
    fn from(err: PositionError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geolocation_codes() {
        assert_eq!(PositionError::from_code(1), PositionError::PermissionDenied);
        assert_eq!(PositionError::from_code(2), PositionError::PositionUnavailable);
        assert_eq!(PositionError::from_code(3), PositionError::Timeout);
        assert_eq!(PositionError::from_code(0), PositionError::Unknown);
        assert_eq!(PositionError::from_code(99), PositionError::Unknown);
        assert_eq!(PositionError::Unknown.code(), ErrorCode::PositionUnavailable);
    }

    #[test]
    fn codes_serialize_kebab_case() {
        for code in [
            ErrorCode::PermissionDenied,
            ErrorCode::PositionUnavailable,
            ErrorCode::Timeout,
            ErrorCode::NotSupported,
            ErrorCode::ApiError,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, code.as_str());
        }
    }

    #[test]
    fn resolver_error_from_position() {
        let err = ResolverError::from(PositionError::PermissionDenied);
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(
            err.message,
            "位置情報の利用が拒否されました。ブラウザ設定をご確認ください。"
        );

        let unknown = ResolverError::from(PositionError::from_code(7));
        assert_eq!(unknown.code, ErrorCode::PositionUnavailable);
        assert_eq!(unknown.message, "位置情報の取得中にエラーが発生しました。");
    }

    #[test]
    fn api_error_hides_provider_detail() {
        let err = ResolverError::api();
        assert_eq!(err.code, ErrorCode::ApiError);
        assert_eq!(
            err.message,
            "最寄り駅情報の取得に失敗しました。ネットワーク接続をご確認ください。"
        );
    }
}
