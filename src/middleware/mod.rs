pub mod gate;
pub mod response;
pub mod session;

pub use gate::gate_middleware;
pub use response::{redirect_found, ApiResponse, ApiResult};
pub use session::session_middleware;
