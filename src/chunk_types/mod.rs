//! On-disk AVI structures, read via `binrw`.

mod strh;
mod strf;
mod indx;
mod idx1;
mod dmlh;

pub use strh::Strh;
pub use strf::{BitmapInfoHeader, RgbQuad, WaveFormatEx};
pub use indx::{SuperIndex, SuperIndexEntry, StdIndex, StdIndexHeader, StdIndexEntry};
pub use idx1::{Idx1, Idx1Entry};
pub use dmlh::Dmlh;
