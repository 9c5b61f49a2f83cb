//! Client side of the external triage service: HTTP transport, the backend
//! seam, and per-interaction session state.

pub mod backend;
pub mod http;
pub mod mock;
pub mod session;

pub use backend::TriageBackend;
pub use http::{ClientError, GENERIC_FAILURE, TriageClient};
pub use mock::ScriptedBackend;
pub use session::{DraftTrigger, Outcome, RequestSeq, SessionError, TriageSession};
