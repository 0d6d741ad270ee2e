use std::fmt::Write;

use cbuf_core::{
    BufferDescriptor, BufferMode, CircularBuffer, DefaultPool, IntoStatus, SlotId, Status,
};
use log::info;

use crate::command::{Command, HELP};

/// What the caller should do after a command ran.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// A pool of `i32` buffers driven by tester commands.
///
/// Storage for each init is leaked, since the pool needs it to outlive
/// every claim and the tester only lives for one session.
pub struct Session {
    pool: DefaultPool<'static, i32>,
    capacity: usize,
    default_mode: BufferMode,
    /// Backing slices handed out so far.
    leaked: usize,
}

impl Session {
    pub fn new(capacity: usize, default_mode: BufferMode) -> Self {
        info!("Session with buffers of {} elements, {:?} mode", capacity, default_mode);
        Self {
            pool: DefaultPool::new(),
            capacity,
            default_mode,
            leaked: 0,
        }
    }

    pub fn execute(&mut self, cmd: Command) -> Reply {
        let text = match cmd {
            Command::Claim => match self.pool.claim() {
                Some(slot) => format!("slot {}", slot.index()),
                None => format!("{:?}: no slot available", Status::Null),
            },
            Command::Init(slot) => {
                let slot = SlotId::from_raw(slot);
                if !self.pool.is_claimed(slot) {
                    return Reply::Text(format!("{:?}", Status::Null));
                }
                let storage = self.new_storage();
                let res = self.pool.init(slot, storage);
                if res.is_ok() {
                    self.apply_default_mode(slot);
                }
                format!("{:?}", res.into_status())
            }
            Command::ClaimInit => {
                if self.pool.free_slot_count() == 0 {
                    return Reply::Text(format!("{:?}: no slot available", Status::Null));
                }
                let storage = self.new_storage();
                match self.pool.claim_and_init(storage) {
                    Some(slot) => {
                        self.apply_default_mode(slot);
                        format!("slot {}", slot.index())
                    }
                    None => format!("{:?}: no slot available", Status::Null),
                }
            }
            Command::Return(slot) => {
                format!("{:?}", self.pool.return_slot(SlotId::from_raw(slot)).into_status())
            }
            Command::Add(slot, value) => match self.buffer(slot) {
                Some(buffer) => format!("{:?}", buffer.add(value).into_status()),
                None => Self::no_buffer(slot),
            },
            Command::Read(slot) => match self.buffer(slot) {
                Some(buffer) => match buffer.read() {
                    Some(value) => value.to_string(),
                    None => format!("{:?}", Status::Empty),
                },
                None => Self::no_buffer(slot),
            },
            Command::Mode(slot, mode) => match self.buffer(slot) {
                Some(buffer) => {
                    if let Some(mode) = mode {
                        buffer.set_mode(mode);
                    }
                    format!("{:?}", buffer.mode())
                }
                None => Self::no_buffer(slot),
            },
            Command::Fill(slot, from, to) => match self.buffer(slot) {
                Some(buffer) => {
                    // A full i32 range holds 2^32 values.
                    let mut added: u64 = 0;
                    let mut rejected: u64 = 0;
                    for value in from..=to {
                        if buffer.add(value).is_ok() {
                            added += 1;
                        } else if buffer.mode() == BufferMode::Fifo {
                            // A full FIFO buffer rejects the rest unchanged.
                            rejected = (i64::from(to) - i64::from(value) + 1) as u64;
                            break;
                        }
                    }
                    format!("added {}, rejected {}", added, rejected)
                }
                None => Self::no_buffer(slot),
            },
            Command::Dump(slot) => match self.buffer(slot) {
                Some(buffer) => {
                    buffer.dump();
                    render(buffer)
                }
                None => Self::no_buffer(slot),
            },
            Command::Stats => {
                let stats = self.pool.stats();
                format!(
                    "slots {} used {} claims {} returns {}",
                    stats.slot_count, stats.used, stats.claim_count, stats.return_count
                )
            }
            Command::Reset => {
                self.pool.init_pool();
                format!("{:?}", Status::Ok)
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Reply::Quit,
        };
        Reply::Text(text)
    }

    fn buffer(&mut self, slot: usize) -> Option<&mut CircularBuffer<'static, i32>> {
        self.pool.get_mut(SlotId::from_raw(slot))
    }

    fn apply_default_mode(&mut self, slot: SlotId) {
        if let Some(buffer) = self.pool.get_mut(slot) {
            buffer.set_mode(self.default_mode);
        }
    }

    fn new_storage(&mut self) -> BufferDescriptor<'static, i32> {
        self.leaked += 1;
        BufferDescriptor::new(Box::leak(vec![0; self.capacity].into_boxed_slice()))
    }

    fn no_buffer(slot: usize) -> String {
        format!("{:?}: slot {} is not claimed or not initialised", Status::Null, slot)
    }
}

fn render(buffer: &CircularBuffer<'_, i32>) -> String {
    let mut out = format!("{:?}", buffer);
    for (row, chunk) in buffer.backing().chunks(10).enumerate() {
        let _ = write!(out, "\n[{:>4}]", row * 10);
        for value in chunk {
            let _ = write!(out, " {}", value);
        }
    }
    out
}
