//!
//! Library for comparing workload measurements across host environments.
//!
//! ## Scoring
//! Measurements arrive as delimited text, one row per host sample. Load them
//! into a [`Session`] and ask for a leaderboard of the selected metric.
//! ```
//! use tin_metrics::{Metric, Session};
//!
//! let text = "timestamp,container_name,code_execution_time_seconds\n\
//!             2024-01-01 10:00:00,Ubuntu20.04,1.0\n\
//!             2024-01-01 10:00:00,Debian11,2.0";
//!
//! let mut session = Session::new();
//! session.load(text);
//! session.select_metric(Metric::CodeExecutionTime);
//!
//! let board = session.leaderboard();
//! let winner = board.winner().unwrap();
//! assert_eq!(winner.host_id, "Ubuntu20.04");
//! assert_eq!(winner.score, 100.0);
//! ```
//!
//! ## Asking questions
//! The loaded measurements can be sent, together with a question, to an
//! answering service. Failures end up in the transcript as assistant turns.
//! ```no_run
//! #[tokio::main]
//! async fn main() -> Result<(), tin_metrics::Error> {
//!     use tin_metrics::{relay::Reply, RelayClient, Session};
//!
//!     let relay = RelayClient::builder()
//!         .timeout(std::time::Duration::from_secs(60))
//!         .build("http://localhost:5000/chat")?;
//!
//!     let mut session = Session::new();
//!     session.load(&std::fs::read_to_string("tin-report.csv")?);
//!
//!     match session.ask(&relay, "Which distribution finished first?").await? {
//!         Reply::Answer(answer) => println!("{answer}"),
//!         Reply::Failed(e) => eprintln!("{e}"),
//!         Reply::Skipped => {}
//!     }
//!     Ok(())
//! }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod metric;
pub mod ranking;
pub mod record;
pub mod relay;
pub mod scoring;
pub mod session;
pub mod table;

#[cfg(feature = "workload")]
pub mod workload;

#[cfg(feature = "env-helper")]
pub mod env_helper;

pub use metric::{Metric, MetricDescriptor};
pub use ranking::{rank, Leaderboard, RankedHost};
pub use record::{Dataset, MeasurementRecord};
pub use relay::{Conversation, ConversationTurn, RelayClient, Role};
pub use scoring::{score, MetricRange};
pub use session::Session;
pub use table::{ingest, serialize};

/// Error returned by library functions
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A row of the measurement table could not be used
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow {
        /// 1-based line number of the row in the input
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// A question was asked before any measurements were loaded
    #[error("No data available to analyze")]
    EmptyDataset,

    /// Failed returned by the HTTP server
    #[error("Server error {0}: {1}")]
    WebServer(u16, String),

    /// HTTP client error
    #[error("Reqwest: {0}")]
    HTTPClient(#[from] reqwest::Error),

    /// The answering service replied, but not with something we understand
    #[error("Invalid response from server: {0}")]
    MalformedResponse(String),

    /// JSON serialization/deserialization error
    #[error("Serde JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL: {0}")]
    URL(#[from] url::ParseError),

    /// Metric key not in the catalog
    #[error("Unknown metric '{0}'")]
    UnknownMetric(String),

    /// Machine name not in the catalog
    #[error("Unknown machine '{0}'")]
    UnknownMachine(String),

    /// A required environment variable is not set
    #[error("Missing environment variable '{0}'")]
    MissingEnv(String),

    /// IO Errors
    #[error("IO error {0}")]
    IO(#[from] std::io::Error),

    /// General Error
    #[error("Error {0}")]
    General(String),
}

impl Error {
    /// Create a general error
    #[must_use]
    pub fn general(err: &str) -> Self {
        Self::General(err.to_string())
    }

    /// True when the answering service could not be reached or refused the request
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::WebServer(..) | Self::HTTPClient(_))
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
