//! Turn a labelled phishing email CSV into JSON training, testing and
//! size-bounded learning files.

pub mod config;
pub mod error;
pub mod loader;
pub mod partition;
pub mod pipeline;
pub mod record;
pub mod writer;

pub use config::{ConvertConfig, LabelPolicy, LoaderConfig};
pub use error::{ConvertError, OutputTarget, Stage};
pub use partition::{partition, Partition};
pub use pipeline::{run, Summary};
pub use record::EmailRecord;
pub use writer::{ChunkStrategy, WrittenFile};
