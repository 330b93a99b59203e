use crate::error::ObserverError;
use crate::frame::Frame;

/// Per-frame observer, typically a UI preview
///
/// Called once per tick with the computed frame, before it is written.
/// Errors are logged and never stop the animation.
pub trait FrameObserver {
    fn on_frame(&self, frame: &Frame) -> Result<(), ObserverError>;
}

impl<F> FrameObserver for F
where
    F: Fn(&Frame) -> Result<(), ObserverError>,
{
    fn on_frame(&self, frame: &Frame) -> Result<(), ObserverError> {
        self(frame)
    }
}

/// Borrowed observer handed to the engine when a run starts
pub type ObserverRef<'a> = &'a (dyn FrameObserver + Sync);
