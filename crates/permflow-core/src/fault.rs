//! Categorized fault taxonomy
//!
//! A closed classification of failure causes surfaced to callers: one
//! variant per category, each carrying an inner reason code. UI layers turn
//! faults into displayable text through [`Fault::ui_message`] and a host
//! [`crate::text::MessageCatalog`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::UiMessage;

/// Top-level fault classification
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "category", content = "reason", rename_all = "snake_case")]
pub enum Fault {
    #[error("network fault: {0}")]
    Network(#[from] NetworkFault),

    #[error("local storage fault: {0}")]
    Local(#[from] LocalFault),

    #[error("device fault: {0}")]
    Device(#[from] DeviceFault),

    #[error("permission fault: {0}")]
    Permission(#[from] PermissionFault),

    #[error("auth fault: {0}")]
    Auth(#[from] AuthFault),

    #[error("render fault: {0}")]
    Render(#[from] RenderFault),

    #[error("general fault: {0}")]
    General(#[from] GeneralFault),
}

/// Network-related faults
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkFault {
    #[error("request timed out")]
    RequestTimeout,
    #[error("rate limited")]
    TooManyRequests,
    #[error("no internet connection")]
    NoInternet,
    #[error("server error")]
    ServerError,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("bad request")]
    BadRequest,
    #[error("unknown host")]
    UnknownHost,
    #[error("ssl handshake failed")]
    SslHandshake,
    #[error("network io error")]
    NetworkIo,
    #[error("payload serialization failed")]
    Serialization,
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("connect timed out")]
    ConnectTimeout,
    #[error("unknown network error")]
    Unknown,
}

/// Local storage faults
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalFault {
    #[error("disk full")]
    DiskFull,
    #[error("file not found")]
    FileNotFound,
    #[error("io error")]
    Io,
    #[error("security restriction")]
    Security,
    #[error("database error")]
    Database,
    #[error("serialization failed")]
    Serialization,
    #[error("deserialization failed")]
    Deserialization,
    #[error("out of memory")]
    OutOfMemory,
    #[error("storage unavailable")]
    StorageUnavailable,
}

/// Device and hardware faults
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceFault {
    #[error("battery too low")]
    LowBattery,
    #[error("device overheated")]
    Overheated,
    #[error("hardware failure")]
    HardwareFailure,
    #[error("camera failure")]
    Camera,
    #[error("sensor failure")]
    Sensor,
    #[error("gps unavailable")]
    GpsUnavailable,
}

/// Permission faults
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionFault {
    /// The user denied the permission
    #[error("permission denied")]
    Denied,
    /// Repeated denials; only a settings change can grant it now
    #[error("permission permanently denied")]
    PermanentlyDenied,
    /// Denied by device policy rather than the user
    #[error("permission restricted")]
    Restricted,
}

/// Authentication faults
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFault {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("session expired")]
    SessionExpired,
    #[error("biometric failure")]
    Biometric,
    #[error("account locked")]
    AccountLocked,
    #[error("auth token invalid")]
    TokenInvalid,
}

/// UI rendering faults
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderFault {
    #[error("view not attached")]
    ViewNotAttached,
    #[error("invalid view state")]
    InvalidViewState,
    #[error("layout inflation failed")]
    LayoutInflation,
}

/// General faults
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneralFault {
    #[error("unknown error")]
    Unknown,
    #[error("not implemented")]
    NotImplemented,
    #[error("illegal state")]
    IllegalState,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("concurrent modification")]
    ConcurrentModification,
}

impl Fault {
    /// Category slug for this fault
    pub fn category(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Local(_) => "local",
            Self::Device(_) => "device",
            Self::Permission(_) => "permission",
            Self::Auth(_) => "auth",
            Self::Render(_) => "render",
            Self::General(_) => "general",
        }
    }

    /// Resource key for this fault's user-facing message
    /// (`error.<category>.<reason>`)
    pub fn message_key(&self) -> String {
        format!("error.{}.{}", self.category(), self.reason_slug())
    }

    /// Resource-keyed message for this fault
    pub fn ui_message(&self) -> UiMessage {
        UiMessage::keyed(self.message_key())
    }

    fn reason_slug(&self) -> &'static str {
        match self {
            Self::Network(reason) => match reason {
                NetworkFault::RequestTimeout => "request_timeout",
                NetworkFault::TooManyRequests => "too_many_requests",
                NetworkFault::NoInternet => "no_internet",
                NetworkFault::ServerError => "server_error",
                NetworkFault::Unauthorized => "unauthorized",
                NetworkFault::Forbidden => "forbidden",
                NetworkFault::NotFound => "not_found",
                NetworkFault::BadRequest => "bad_request",
                NetworkFault::UnknownHost => "unknown_host",
                NetworkFault::SslHandshake => "ssl_handshake",
                NetworkFault::NetworkIo => "io",
                NetworkFault::Serialization => "serialization",
                NetworkFault::PayloadTooLarge => "payload_too_large",
                NetworkFault::ConnectTimeout => "connect_timeout",
                NetworkFault::Unknown => "unknown",
            },
            Self::Local(reason) => match reason {
                LocalFault::DiskFull => "disk_full",
                LocalFault::FileNotFound => "file_not_found",
                LocalFault::Io => "io",
                LocalFault::Security => "security",
                LocalFault::Database => "database",
                LocalFault::Serialization => "serialization",
                LocalFault::Deserialization => "deserialization",
                LocalFault::OutOfMemory => "out_of_memory",
                LocalFault::StorageUnavailable => "storage_unavailable",
            },
            Self::Device(reason) => match reason {
                DeviceFault::LowBattery => "low_battery",
                DeviceFault::Overheated => "overheated",
                DeviceFault::HardwareFailure => "hardware_failure",
                DeviceFault::Camera => "camera",
                DeviceFault::Sensor => "sensor",
                DeviceFault::GpsUnavailable => "gps_unavailable",
            },
            Self::Permission(reason) => match reason {
                PermissionFault::Denied => "denied",
                PermissionFault::PermanentlyDenied => "permanently_denied",
                PermissionFault::Restricted => "restricted",
            },
            Self::Auth(reason) => match reason {
                AuthFault::InvalidCredentials => "invalid_credentials",
                AuthFault::SessionExpired => "session_expired",
                AuthFault::Biometric => "biometric",
                AuthFault::AccountLocked => "account_locked",
                AuthFault::TokenInvalid => "token_invalid",
            },
            Self::Render(reason) => match reason {
                RenderFault::ViewNotAttached => "view_not_attached",
                RenderFault::InvalidViewState => "invalid_view_state",
                RenderFault::LayoutInflation => "layout_inflation",
            },
            Self::General(reason) => match reason {
                GeneralFault::Unknown => "unknown",
                GeneralFault::NotImplemented => "not_implemented",
                GeneralFault::IllegalState => "illegal_state",
                GeneralFault::InvalidArgument => "invalid_argument",
                GeneralFault::ConcurrentModification => "concurrent_modification",
            },
        }
    }
}
