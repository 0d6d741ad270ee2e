/*! Fixed-capacity circular buffers for targets without an allocator.

 The crate is split in two cooperating pieces:

 - [`Pool`]: a fixed set of `N` buffer slots handed out one at a
   time. A slot is either free (on the pool's free stack) or claimed
   by exactly one caller, who addresses it through a [`SlotId`].
 - [`CircularBuffer`]: the read/write cursor engine working over a
   caller-owned backing slice. It never allocates; it only indexes
   into the slice it was given through a [`BufferDescriptor`].

 Each buffer runs either in [`BufferMode::Fifo`], where a write to a
 full buffer is rejected, or in [`BufferMode::Ring`], where it
 replaces the oldest unread element. The mode can be switched at any
 time and takes effect on the next write.

 ```
 use cbuf_core::{BufferDescriptor, BufferMode, Pool};

 let mut storage = [0u16; 4];
 let mut pool: Pool<'_, u16, 2> = Pool::new();

 let slot = pool.claim_and_init(BufferDescriptor::new(&mut storage)).unwrap();
 let buffer = pool.get_mut(slot).unwrap();
 buffer.set_mode(BufferMode::Ring);
 for i in 0..6 {
     buffer.add(i).unwrap();
 }
 assert_eq!(buffer.read(), Some(2));
 pool.return_slot(slot).unwrap();
 ```

 No operation blocks and none of them is reentrant. Sharing a pool or
 a buffer with an interrupt handler requires the caller to provide
 mutual exclusion; on Cortex-M targets the `cortex-m` feature offers
 [`SharedPool`] for that.
*/

#![no_std]

mod buffer;
mod config;
mod descriptor;
mod error;
mod mode;
mod pool;
#[cfg(feature = "cortex-m")]
mod shared;

pub use buffer::*;
pub use config::*;
pub use descriptor::*;
pub use error::*;
pub use mode::*;
pub use pool::*;
#[cfg(feature = "cortex-m")]
pub use shared::*;
