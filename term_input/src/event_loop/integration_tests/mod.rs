// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Dispatch behavior across several monitors on real pipes: removal during a pass,
//! re-arming after a partial read, hangup, interrupted waits, writable interest, and
//! stopping from another thread.

mod test_hangup;
mod test_interrupted_wait;
mod test_more_available;
mod test_removal_during_dispatch;
mod test_stop_handle;
mod test_writable_interest;
