use anyhow::anyhow;

pub type Result<T> = std::result::Result<T, LibError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Api,
    Decode,
    InvalidInput,
    NotFound,
    Unknown,
}

#[derive(Debug)]
pub struct LibError {
    pub kind: ErrorKind,
    pub code: &'static str,
    pub public: &'static str,
    /// HTTP status of the backend response, when one was received.
    pub status: Option<u16>,
    pub source: anyhow::Error,
}

impl LibError {
    pub fn transport(public: &'static str, source: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::Transport,
            code: "transport_error",
            public,
            status: None,
            source,
        }
    }

    pub fn api(public: &'static str, status: u16, source: anyhow::Error) -> Self {
        let (kind, code) = if status == 404 {
            (ErrorKind::NotFound, "not_found")
        } else {
            (ErrorKind::Api, "api_error")
        };
        Self {
            kind,
            code,
            public,
            status: Some(status),
            source,
        }
    }

    pub fn decode(public: &'static str, source: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::Decode,
            code: "decode_error",
            public,
            status: None,
            source,
        }
    }

    pub fn invalid(public: &'static str, source: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::InvalidInput,
            code: "invalid_input",
            public,
            status: None,
            source,
        }
    }

    pub fn invalid_with_code(
        code: &'static str,
        public: &'static str,
        source: anyhow::Error,
    ) -> Self {
        Self {
            kind: ErrorKind::InvalidInput,
            code,
            public,
            status: None,
            source,
        }
    }

    pub fn not_found(public: &'static str, source: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            code: "not_found",
            public,
            status: None,
            source,
        }
    }

    pub fn unknown(public: &'static str, source: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            code: "unknown_error",
            public,
            status: None,
            source,
        }
    }
}

impl std::fmt::Display for LibError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.public, self.code, self.source)
    }
}

impl std::error::Error for LibError {}

#[cfg(feature = "client")]
impl From<reqwest::Error> for LibError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Self::api("Backend request failed", status.as_u16(), anyhow!(value)),
            None if value.is_decode() => {
                Self::decode("Backend response could not be decoded", anyhow!(value))
            }
            None => Self::transport("Backend request failed", anyhow!(value)),
        }
    }
}

impl From<serde_json::Error> for LibError {
    fn from(value: serde_json::Error) -> Self {
        Self::decode("Backend response could not be decoded", anyhow!(value))
    }
}
