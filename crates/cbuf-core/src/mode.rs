/// Fill policy of a circular buffer once it is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BufferMode {
    /// Reject writes to a full buffer.
    #[default]
    Fifo,
    /// Overwrite the oldest unread element, keeping the newest
    /// `capacity` writes.
    Ring,
}

impl BufferMode {
    pub const fn from_overwrite(allow_overwrite: bool) -> Self {
        match allow_overwrite {
            true => BufferMode::Ring,
            false => BufferMode::Fifo,
        }
    }

    pub const fn allows_overwrite(self) -> bool {
        match self {
            BufferMode::Fifo => false,
            BufferMode::Ring => true,
        }
    }
}
