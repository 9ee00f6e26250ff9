//! Terrarium elevation tiles
//!
//! Terrarium PNGs pack a signed elevation in meters into the red, green and
//! blue channels of each pixel:
//!
//! ```text
//! elevation = R * 256 + G + B / 256 - 32768
//! ```
//!
//! The alpha channel carries no information.

mod decode;
mod tile;

pub use decode::{decode_pixel, decode_tile, encode_pixel, DecodeError};
pub use tile::{ElevationTile, TILE_SIZE};
