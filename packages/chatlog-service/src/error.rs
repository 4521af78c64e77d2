pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid range: begin {begin} is after end {end}.")]
	InvalidRange { begin: i64, end: i64 },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Backend unavailable: {message}")]
	BackendUnavailable { message: String },
	#[error("Decode error: {message}")]
	Decode { message: String },
	#[error("Deadline of {deadline_ms} ms exceeded.")]
	DeadlineExceeded { deadline_ms: u64 },
}
impl From<chatlog_domain::Error> for Error {
	fn from(err: chatlog_domain::Error) -> Self {
		match err {
			chatlog_domain::Error::InvalidRange { begin, end } => Self::InvalidRange { begin, end },
			chatlog_domain::Error::OutOfRange { message } => Self::InvalidRequest { message },
		}
	}
}

impl From<chatlog_backend::Error> for Error {
	fn from(err: chatlog_backend::Error) -> Self {
		Self::BackendUnavailable { message: err.to_string() }
	}
}

impl From<chatlog_config::Error> for Error {
	fn from(err: chatlog_config::Error) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
