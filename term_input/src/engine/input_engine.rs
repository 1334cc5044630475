// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The context object that owns a whole input stack. See [`InputEngine`].

use crate::{Continuation, DecodeDiscard, EventLoop, EventLoopError, InputConfig,
            KeyDecoder, KeyEvent, KeyMap, KeyboardMonitor, LoopStopHandle, MonitorId,
            SharedKeyDecoder, TimerError, TimerHandle, TimerSource};
use miette::Diagnostic;
use std::{cell::RefCell, os::fd::OwnedFd, rc::Rc, time::Duration};

/// Names the disambiguation timer's worker thread.
pub const ESC_TIMER_NAME: &str = "esc-disambiguation";

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum InputEngineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    EventLoop(#[from] EventLoopError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Timer(#[from] TimerError),
}

/// Owns an [`EventLoop`], the [`KeyboardMonitor`] reading the terminal, the
/// [`KeyDecoder`] it feeds, and the [`TimerSource`] that resolves ambiguous prefixes.
///
/// All of the input state lives here rather than in process-wide statics. Dropping the
/// engine tears it down: the timer thread is joined and the keyboard descriptor closed.
///
/// ```text
/// keyboard fd ──► KeyboardMonitor ──feed──► KeyDecoder ──► next_event()
///                       │ pending prefix?        ▲
///                       ▼                        │ finalize_pending()
///                 TimerHandle::arm_once ──► TimerSource
/// ```
///
/// The keyboard monitor is registered first and the timer second, so within one pass
/// newly read bytes are always decoded before a disambiguation tick is looked at.
///
/// Applications can register their own monitors through [`event_loop_mut`]; they are
/// triggered after the two built-in ones.
///
/// [`event_loop_mut`]: InputEngine::event_loop_mut
#[derive(Debug)]
pub struct InputEngine {
    event_loop: EventLoop,
    decoder: SharedKeyDecoder,
    esc_timer: TimerHandle,
    keyboard_id: MonitorId,
    timer_id: MonitorId,
    config: InputConfig,
}

impl InputEngine {
    /// Build the stack around `keyboard`, which is switched to non-blocking mode.
    ///
    /// # Errors
    ///
    /// Any [`EventLoopError`] or [`TimerError`] raised while creating the loop, the
    /// timer, or registering the two monitors.
    pub fn new(
        keyboard: OwnedFd,
        key_map: KeyMap,
        config: InputConfig,
    ) -> Result<Self, InputEngineError> {
        let mut event_loop = EventLoop::new()?;
        let decoder: SharedKeyDecoder = Rc::new(RefCell::new(config.build_decoder(key_map)));

        let decoder_for_timer = Rc::clone(&decoder);
        let (timer_source, esc_timer) = TimerSource::new(ESC_TIMER_NAME, move |_tick, _control| {
            match decoder_for_timer.try_borrow_mut() {
                Ok(mut decoder) => decoder.finalize_pending(),
                Err(_) => tracing::warn!(
                    message = "input engine: decoder busy, disambiguation tick dropped"
                ),
            }
            Continuation::Continue
        })?;

        let keyboard_monitor = KeyboardMonitor::new(keyboard, Rc::clone(&decoder))?
            .with_disambiguation_timer(esc_timer.clone(), config.esc_timeout);

        let keyboard_id = event_loop.register(Box::new(keyboard_monitor))?;
        let timer_id = event_loop.register(Box::new(timer_source))?;

        tracing::debug!(
            message = "input engine: ready",
            keyboard = %keyboard_id,
            timer = %timer_id,
            config = ?config
        );

        Ok(Self {
            event_loop,
            decoder,
            esc_timer,
            keyboard_id,
            timer_id,
            config,
        })
    }

    /// One wait-and-dispatch pass. See [`EventLoop::run_once`].
    ///
    /// # Errors
    ///
    /// [`EventLoopError::EventLoopFault`] if the wait fails.
    pub fn run_once(&mut self, timeout: Option<Duration>) -> Result<usize, InputEngineError> {
        Ok(self.event_loop.run_once(timeout)?)
    }

    /// Dispatch until a stop is requested (through [`stop_handle`] or a monitor) or the
    /// keyboard reaches end of input. Decoded events stay queued for [`next_event`].
    ///
    /// # Errors
    ///
    /// [`EventLoopError::EventLoopFault`] if a wait fails.
    ///
    /// [`next_event`]: Self::next_event
    /// [`stop_handle`]: Self::stop_handle
    pub fn run(&mut self) -> Result<(), InputEngineError> {
        loop {
            if self.event_loop.take_stop_request() || self.is_input_closed() {
                return Ok(());
            }
            self.event_loop.run_once(None)?;
        }
    }

    #[must_use]
    pub fn stop_handle(&self) -> LoopStopHandle { self.event_loop.stop_handle() }

    /// For registering application monitors on the same loop.
    pub fn event_loop_mut(&mut self) -> &mut EventLoop { &mut self.event_loop }

    #[must_use]
    pub fn keyboard_monitor_id(&self) -> MonitorId { self.keyboard_id }

    #[must_use]
    pub fn timer_monitor_id(&self) -> MonitorId { self.timer_id }

    #[must_use]
    pub fn config(&self) -> &InputConfig { &self.config }

    /// The shared decoder, for callers that need its full API. Don't hold a borrow
    /// across [`run_once`](Self::run_once).
    #[must_use]
    pub fn decoder(&self) -> &SharedKeyDecoder { &self.decoder }

    pub fn next_event(&mut self) -> Option<KeyEvent> { self.decoder.borrow_mut().next_event() }

    pub fn drain_events(&mut self) -> Vec<KeyEvent> {
        self.decoder.borrow_mut().drain_events().collect()
    }

    pub fn drain_discards(&mut self) -> Vec<DecodeDiscard> {
        self.decoder.borrow_mut().drain_discards().collect()
    }

    /// Stop waiting for the disambiguation timeout and resolve the pending prefix now,
    /// exactly as if the timer had fired.
    pub fn cancel_pending_resolution(&mut self) {
        self.esc_timer.disarm();
        self.decoder.borrow_mut().finalize_pending();
    }

    #[must_use]
    pub fn has_pending_prefix(&self) -> bool { self.decoder.borrow().has_pending_prefix() }

    #[must_use]
    pub fn is_input_closed(&self) -> bool { self.decoder.borrow().is_input_closed() }

    /// Apply a decoder setting without rebuilding the engine. Takes effect for bytes
    /// decoded after the call.
    pub fn with_decoder_mut<R>(&mut self, f: impl FnOnce(&mut KeyDecoder) -> R) -> R {
        f(&mut *self.decoder.borrow_mut())
    }
}
