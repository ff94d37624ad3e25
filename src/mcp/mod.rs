pub mod correlate;
pub mod envelope;
pub mod session;
pub mod sse;
pub mod sse_client;
pub mod stream;
pub mod streamable;
pub mod transport;
pub mod types;

pub use correlate::{correlate, Correlator};
pub use sse::{FieldStyle, SseDemux, SseFrame};
pub use stream::FrameStream;
pub use types::{SessionId, ToolOutput};
