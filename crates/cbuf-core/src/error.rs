/// Why a slot could not be handed back to its pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnError {
    /// The id does not name any slot of this pool.
    NotOwned,
    /// The slot is already on the free stack.
    AlreadyFree,
}

/// Why a buffer could not be initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// The target slot does not exist or is not currently claimed.
    InvalidTarget,
    /// The backing slice has no room for a single element.
    EmptyBacking,
}

/// A write rejected by a full FIFO buffer. The element is handed back
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddError<T> {
    Full(T),
}

impl<T> AddError<T> {
    pub fn into_inner(self) -> T {
        match self {
            AddError::Full(element) => element,
        }
    }
}

/// Flat status code for callers that cannot carry a `Result` across
/// their boundary (FFI, ISR mailboxes, logs).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    Ok = 0,
    Full = 1,
    Empty = 2,
    Null = 3,
    Duplicate = 4,
}

impl From<ReturnError> for Status {
    fn from(value: ReturnError) -> Self {
        match value {
            ReturnError::NotOwned => Status::Null,
            ReturnError::AlreadyFree => Status::Duplicate,
        }
    }
}

impl From<InitError> for Status {
    fn from(_: InitError) -> Self {
        Status::Null
    }
}

impl<T> From<AddError<T>> for Status {
    fn from(_: AddError<T>) -> Self {
        Status::Full
    }
}

pub trait IntoStatus {
    fn into_status(self) -> Status;
}

impl<E: Into<Status>> IntoStatus for Result<(), E> {
    fn into_status(self) -> Status {
        match self {
            Ok(()) => Status::Ok,
            Err(e) => e.into(),
        }
    }
}
