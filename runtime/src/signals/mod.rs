#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use self::windows::WindowsSignal as Signal;

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use self::unix::UnixSignal as Signal;

/// Broadcast on the system broker when the process is asked to stop.
#[derive(Debug, Clone, Copy, actix::Message)]
#[rtype(result = "()")]
pub struct Term;
