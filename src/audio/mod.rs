pub mod block;
pub mod capture;
pub mod codec;
pub mod playback;
pub mod sink;
pub mod source;

pub use block::RawBlock;
pub use capture::AudioCapture;
pub use playback::AudioPlayback;
pub use sink::{BlockSink, DeviceSink, MemorySink, WavFileSink};
pub use source::{BlockSource, DeviceSource, MemorySource, WavFileSource};
