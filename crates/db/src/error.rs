#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Input violated one of the schema's check constraints.
    BadInput,
    /// The row does not exist or is no longer in the required state.
    NotFound,
    /// A uniqueness rule was violated, such as submitting twice for one slot.
    AlreadyExists,
    /// Unrecoverable error.
    Fatal,
}

pub type Result<T> = core::result::Result<T, Error>;
