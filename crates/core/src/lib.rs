//! Removes chosen people from group photos: each person's reference portrait
//! is matched against the faces found in the photo, and only a confidently
//! identified face is blurred.

pub mod detection;
pub mod imaging;
pub mod matching;
pub mod pipeline;
pub mod redaction;
pub mod shared;
