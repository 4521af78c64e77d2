pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
	#[error("Begin time {begin} is after end time {end}.")]
	InvalidRange { begin: i64, end: i64 },
	#[error("Timestamp is outside the supported calendar range: {message}")]
	OutOfRange { message: String },
}
impl From<time::error::ComponentRange> for Error {
	fn from(err: time::error::ComponentRange) -> Self {
		Self::OutOfRange { message: err.to_string() }
	}
}
