#![cfg_attr(not(feature = "std"), no_std)]

pub mod amounts;
pub mod assets;
pub mod ecosystem;

pub use amounts::*;
pub use assets::*;
pub use ecosystem::*;
