#![no_std]

mod devlog;
pub mod util;

pub use log as __log;

/// Distance from `$older` to `$newer` on a circle of `$max + 1`
/// positions. Equal positions are taken as a full lap.
#[macro_export]
macro_rules! diff_wrapped {
    ($max:expr, $newer:expr, $older:expr) => {
        if ($newer) > ($older) {
            ($newer) - ($older)
        } else {
            (($max) + 1) - ($older) + ($newer)
        }
    };
}
