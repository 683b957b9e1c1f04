use thiserror::Error;

/// Failures while wiring the engine to the browser.
#[derive(Debug, Error)]
pub enum CanvasError {
	#[error("no global `window` is available")]
	NoWindow,
	#[error("2d rendering context is unavailable: {0}")]
	Context(String),
	#[error("could not schedule an animation frame: {0}")]
	Schedule(String),
	#[error("could not attach `{event}` listener: {reason}")]
	Listener { event: &'static str, reason: String },
}
