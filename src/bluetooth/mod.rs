pub mod advertisement;
pub mod event;
pub mod filter;
pub mod framer;
pub mod scanner;

pub use filter::FilterConfig;
pub use framer::FrameAssembler;
