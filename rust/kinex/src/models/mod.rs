pub mod family;
pub mod regulation;
pub mod sequence;
pub mod token;

pub use family::SequenceType;
pub use regulation::{
    InputSite,
    Regulation,
};
pub use sequence::{
    CentralSequence,
    PhosphoSite,
    Separator,
    SeparatorSequence,
    Sequence,
};
pub use token::{
    Token,
    TokenParsingError,
};
