pub mod anchor;
pub mod consts;
pub mod proposal;
pub mod protocol_instance;
pub mod utils;

pub use anchor::*;
pub use consts::*;
pub use proposal::*;
pub use protocol_instance::*;
pub use utils::*;

use thiserror_no_std::Error as ThisError;

#[derive(ThisError, Debug)]
#[error(transparent)]
struct AbiEncodeError(#[from] alloy_sol_types::Error);
