pub mod gesture;
pub mod pointer;

pub use gesture::{GesturePhase, GestureTracker};
pub use pointer::{PointerInput, PointerSignal};
