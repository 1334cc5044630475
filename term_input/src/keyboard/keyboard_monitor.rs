// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words EINTR EAGAIN

//! The [`Monitor`] that feeds terminal bytes into a [`KeyDecoder`].

use super::{KeyDecoder, MAX_INPUT_BUFFER_CAPACITY};
use crate::{Continuation, EventLoopError, LoopControl, Monitor, Readiness, TimerHandle};
use rustix::{fs::{OFlags, fcntl_getfl, fcntl_setfl},
             io::Errno};
use std::{cell::RefCell,
          fmt::{self, Debug},
          io,
          os::fd::{AsRawFd as _, OwnedFd, RawFd},
          rc::Rc,
          time::Duration};

/// Verbose logging for keyboard reads.
pub const DEBUG_KEYBOARD_MONITOR: bool = false;

/// Shared between the [`KeyboardMonitor`], the disambiguation timer's handler and the
/// owner that pulls decoded events. Only ever touched from the loop thread.
pub type SharedKeyDecoder = Rc<RefCell<KeyDecoder>>;

/// Reads the terminal when it is readable and feeds the bytes to a [`KeyDecoder`].
///
/// - Each trigger performs at most one non-blocking read, sized to the room left in the
///   decoder's buffer. A read that fills the request, or any read after the peer hung
///   up, returns [`Continuation::MoreAvailable`] so the loop comes back for the rest.
/// - "No data right now" (`EAGAIN`) leaves the decoder untouched, pending prefix
///   included.
/// - After every read, the disambiguation timer is armed if the decoder holds a pending
///   prefix, and disarmed otherwise.
/// - End of input (a zero byte read) or a read error finalizes the pending prefix,
///   marks the decoder's input closed, and unregisters this monitor.
pub struct KeyboardMonitor {
    fd: OwnedFd,
    decoder: SharedKeyDecoder,
    disambiguation: Option<(TimerHandle, Duration)>,
    scratch: Box<[u8]>,
}

impl KeyboardMonitor {
    /// Take ownership of `fd` and switch it to non-blocking mode.
    ///
    /// # Errors
    ///
    /// [`EventLoopError::InvalidHandle`] if the descriptor's flags can't be changed.
    pub fn new(fd: OwnedFd, decoder: SharedKeyDecoder) -> Result<Self, EventLoopError> {
        set_non_blocking(&fd).map_err(|errno| EventLoopError::InvalidHandle {
            fd: fd.as_raw_fd(),
            source: io::Error::from(errno),
        })?;

        Ok(Self {
            fd,
            decoder,
            disambiguation: None,
            scratch: vec![0; MAX_INPUT_BUFFER_CAPACITY].into_boxed_slice(),
        })
    }

    /// Arm `timer` for `timeout` whenever a read leaves an ambiguous prefix behind. The
    /// timer's handler is expected to call [`KeyDecoder::finalize_pending`]. Without a
    /// timer, a pending prefix waits until more bytes arrive.
    #[must_use]
    pub fn with_disambiguation_timer(mut self, timer: TimerHandle, timeout: Duration) -> Self {
        self.disambiguation = Some((timer, timeout));
        self
    }

    #[must_use]
    pub fn decoder(&self) -> &SharedKeyDecoder { &self.decoder }

    fn update_disambiguation_timer(&self, decoder: &mut KeyDecoder) {
        let Some((timer, timeout)) = &self.disambiguation else {
            return;
        };

        if !decoder.has_pending_prefix() {
            timer.disarm();
            return;
        }

        if let Err(error) = timer.arm_once(*timeout) {
            // Without a timer the prefix could wait forever; resolve it now instead.
            tracing::warn!(
                message = "keyboard: can't arm disambiguation timer, finalizing",
                error = %error
            );
            decoder.finalize_pending();
        }
    }

    fn close_input(&self, decoder: &mut KeyDecoder, control: &mut LoopControl) {
        decoder.mark_input_closed();
        if let Some((timer, _)) = &self.disambiguation {
            timer.disarm();
        }
        if let Some(id) = control.current_monitor() {
            control.unregister(id);
        }
    }
}

fn set_non_blocking(fd: &OwnedFd) -> Result<(), Errno> {
    let flags = fcntl_getfl(fd)?;
    if !flags.contains(OFlags::NONBLOCK) {
        fcntl_setfl(fd, flags | OFlags::NONBLOCK)?;
    }
    Ok(())
}

impl Monitor for KeyboardMonitor {
    fn raw_fd(&self) -> RawFd { self.fd.as_raw_fd() }

    fn trigger(&mut self, readiness: Readiness, control: &mut LoopControl) -> Continuation {
        let decoder_rc = Rc::clone(&self.decoder);
        let Ok(mut decoder) = decoder_rc.try_borrow_mut() else {
            // Someone is holding the decoder across a loop pass; try again next pass.
            tracing::warn!(message = "keyboard: decoder busy, deferring read");
            return Continuation::MoreAvailable;
        };

        let request = decoder.free_space().clamp(1, self.scratch.len());
        match rustix::io::read(&self.fd, &mut self.scratch[..request]) {
            Ok(0) => {
                tracing::debug!(message = "keyboard: end of input", readiness = ?readiness);
                self.close_input(&mut decoder, control);
                Continuation::Continue
            }
            Ok(count) => {
                DEBUG_KEYBOARD_MONITOR.then(|| {
                    tracing::debug!(
                        message = "keyboard: read bytes",
                        bytes = ?&self.scratch[..count]
                    );
                });
                decoder.feed(&self.scratch[..count]);
                self.update_disambiguation_timer(&mut decoder);
                // A full read may have left bytes behind. After a hangup no new edge
                // will come, so come back for the end of input.
                if count == request || readiness.is_hangup() {
                    Continuation::MoreAvailable
                } else {
                    Continuation::Continue
                }
            }
            // Interrupted before anything was read: the data is still there.
            Err(errno) if errno == Errno::INTR => Continuation::MoreAvailable,
            // Spurious wakeup.
            Err(errno) if errno == Errno::AGAIN => Continuation::Continue,
            Err(errno) => {
                tracing::warn!(message = "keyboard: read failed", error = %errno);
                self.close_input(&mut decoder, control);
                Continuation::Continue
            }
        }
    }

    fn name(&self) -> &'static str { "KeyboardMonitor" }
}

impl Debug for KeyboardMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardMonitor")
            .field("fd", &self.fd.as_raw_fd())
            .field("disambiguation", &self.disambiguation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventLoop, KeyCode, KeyEvent, KeyMap, KeyModifiers};
    use pretty_assertions::assert_eq;
    use rustix::{io::write, pipe::pipe};

    const WAIT: Option<Duration> = Some(Duration::from_millis(500));

    fn keyboard_in_loop() -> (EventLoop, SharedKeyDecoder, OwnedFd) {
        let (reader, writer) = pipe().unwrap();
        let decoder = Rc::new(RefCell::new(KeyDecoder::new(KeyMap::xterm())));
        let monitor = KeyboardMonitor::new(reader, Rc::clone(&decoder)).unwrap();
        let mut event_loop = EventLoop::new().unwrap();
        event_loop.register(Box::new(monitor)).unwrap();
        (event_loop, decoder, writer)
    }

    #[test]
    fn test_bytes_are_decoded() {
        let (mut event_loop, decoder, writer) = keyboard_in_loop();
        write(&writer, b"\x1b[Aq").unwrap();

        assert_eq!(event_loop.run_once(WAIT).unwrap(), 1);
        let events: Vec<_> = decoder.borrow_mut().drain_events().collect();
        assert_eq!(
            events,
            vec![
                KeyEvent::press(KeyCode::Up, KeyModifiers::NONE),
                KeyEvent::char('q'),
            ]
        );
    }

    #[test]
    fn test_end_of_input_finalizes_and_unregisters() {
        let (mut event_loop, decoder, writer) = keyboard_in_loop();
        write(&writer, b"\x1b").unwrap();
        event_loop.run_once(WAIT).unwrap();
        assert!(decoder.borrow().has_pending_prefix());

        drop(writer);
        event_loop.run_once(WAIT).unwrap();

        let mut decoder = decoder.borrow_mut();
        assert!(decoder.is_input_closed());
        assert_eq!(
            decoder.next_event(),
            Some(KeyEvent::press(KeyCode::Escape, KeyModifiers::NONE))
        );
        assert!(event_loop.is_empty());
    }

    #[test]
    fn test_descriptor_is_made_non_blocking() {
        let (reader, _writer) = pipe().unwrap();
        let decoder = Rc::new(RefCell::new(KeyDecoder::new(KeyMap::xterm())));
        let monitor = KeyboardMonitor::new(reader, decoder).unwrap();
        assert!(fcntl_getfl(&monitor.fd).unwrap().contains(OFlags::NONBLOCK));
    }
}
