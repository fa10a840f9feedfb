mod error;

pub mod emitter;
pub mod payload;
pub mod session;
pub mod sink;
pub mod store;

#[cfg(feature = "net")]
pub mod net;

pub use error::{PeriphError, Result};
pub use emitter::Emitter;
pub use payload::TelemetryPayload;
pub use session::{Session, SessionEvent};
pub use sink::{NullSink, TelemetrySink, WriterSink};
pub use store::JsonMacroStore;

#[cfg(feature = "net")]
pub use net::{spawn_key_listener, TcpSink};
