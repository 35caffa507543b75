//! # Services
//!
//! External collaborators of the runtime: the third-party challenge widget
//! and the submission transport, with HTTP and scripted implementations.

pub mod challenge;
pub mod mock;
pub mod transport;

pub use challenge::{ChallengeWidget, HttpChallengeWidget};
pub use mock::{MockChallengeWidget, MockTransport};
pub use transport::{
    HttpTransport, SubmissionValues, SubmitReceipt, Transport, TOKEN_EXPIRED_CODE,
};
