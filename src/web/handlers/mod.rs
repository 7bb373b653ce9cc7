pub mod helpers;
pub mod session_handlers;
pub mod system_handlers;
pub mod template_handlers;

pub use session_handlers::*;
pub use system_handlers::*;
pub use template_handlers::*;
