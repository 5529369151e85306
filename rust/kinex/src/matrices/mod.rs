mod pssm;
mod reference;

pub use pssm::{
    PSSM_RESIDUES,
    PssmTable,
};
pub use reference::ReferenceDistribution;
