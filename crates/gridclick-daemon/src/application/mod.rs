//! Application layer use cases for the GridClick daemon.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure rules in `gridclick-core`) and the infrastructure (OS hooks, event
//! synthesis, files).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "put the
//!   pointer in cell GK and hold the button down").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so every OS adapter can be replaced by a recording mock in tests.
//! - **Contain no OS calls and no file system access**.
//!
//! # Sub-modules
//!
//! - **`handle_keys`** – The overlay state machine.  It runs inline in the
//!   global keyboard hook, so it decides swallow/pass-through for every
//!   keystroke the user types.
//!
//! - **`synthesize_pointer`** – The port through which the state machine
//!   moves the pointer, clicks, drags, scrolls and sends the copy chord.
//!
//! - **`present_overlay`** – The port through which the state machine tells
//!   the overlay what to draw.
//!
//! - **`locate_display`** – Picks the display the grid is laid over.

pub mod handle_keys;
pub mod locate_display;
pub mod present_overlay;
pub mod synthesize_pointer;
