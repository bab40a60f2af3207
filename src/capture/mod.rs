pub mod camera;
pub mod session;

pub use camera::{Camera, FacingMode, Frame, MediaStream};
pub use session::{CaptureSession, SessionState};
