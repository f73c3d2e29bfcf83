//! Protocol module containing the frame codec and its async stream helpers.

pub mod frame;
pub mod stream;

pub use frame::{decode_frame, encode_frame, FrameError, FRAME_HEADER_SIZE, MAX_FRAME_SIZE};
pub use stream::{read_frame, write_frame};
