/// Discriminant of [`Error`], for callers that only care about the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownInstruction,
    InvalidRegister,
    UndefinedLabel,
    DuplicateLabel,
    OperandCount,
    InvalidImmediate,
    InvalidOperand,
    InvalidLabel,
    InvalidMask,
    Unaligned,
    OutOfBounds,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown instruction `{mnemonic}`")]
    UnknownInstruction { mnemonic: String },
    #[error("invalid register `{name}`")]
    InvalidRegister { name: String },
    #[error("undefined label `{label}`")]
    UndefinedLabel { label: String },
    #[error("label `{label}` defined more than once")]
    DuplicateLabel { label: String },
    #[error("`{mnemonic}` expects {expected} operand(s), found {found}")]
    OperandCount {
        mnemonic: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid immediate `{text}`")]
    InvalidImmediate { text: String },
    #[error("malformed operand `{operand}`, expected offset(register)")]
    InvalidOperand { operand: String },
    #[error("invalid label name `{name}`")]
    InvalidLabel { name: String },
    #[error("invalid byte mask `{text}`, expected four 0/1 digits")]
    InvalidMask { text: String },
    #[error("unaligned access at {addr:#010x}")]
    Unaligned { addr: u32 },
    #[error("address {addr:#010x} is out of bounds")]
    OutOfBounds { addr: u32 },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownInstruction { .. } => ErrorKind::UnknownInstruction,
            Error::InvalidRegister { .. } => ErrorKind::InvalidRegister,
            Error::UndefinedLabel { .. } => ErrorKind::UndefinedLabel,
            Error::DuplicateLabel { .. } => ErrorKind::DuplicateLabel,
            Error::OperandCount { .. } => ErrorKind::OperandCount,
            Error::InvalidImmediate { .. } => ErrorKind::InvalidImmediate,
            Error::InvalidOperand { .. } => ErrorKind::InvalidOperand,
            Error::InvalidLabel { .. } => ErrorKind::InvalidLabel,
            Error::InvalidMask { .. } => ErrorKind::InvalidMask,
            Error::Unaligned { .. } => ErrorKind::Unaligned,
            Error::OutOfBounds { .. } => ErrorKind::OutOfBounds,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
