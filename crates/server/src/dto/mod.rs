mod analysis;
mod trip;
mod visible;

pub use analysis::*;
pub use trip::*;
pub use visible::*;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDto {
    pub error: String,
}
