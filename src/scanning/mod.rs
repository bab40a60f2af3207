pub mod controller;
pub mod dismissal;
pub mod loop_worker;
pub mod state;

pub use controller::{ScanController, ScanWidget};
pub use dismissal::{ArmedDismissal, DismissCallback, DismissalController, UiEvent};
pub use loop_worker::{scan_loop, LoopConfig, LoopExit};
pub use state::{ControllerState, ScanInvocation};
