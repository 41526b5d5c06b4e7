//! Memory-locked, self-wiping byte buffers for short-lived secrets.
//!
//! This crate provides a single primitive, [`SecureBuffer`], for holding
//! secret byte material (symmetric keys, nonces, derived secrets) so that it
//! is never left resident in swappable memory and is deterministically
//! overwritten at end-of-life — whether that end is reached by scope exit,
//! early return, or an error path.
//!
//! The backing memory comes straight from the operating system (anonymous
//! `mmap` on unix, `VirtualAlloc` on windows) and is locked into physical
//! RAM (`mlock` / `VirtualLock`) for the buffer's whole lifetime. Release
//! always wipes the full extent through the non-elidable [`wipe`] primitive
//! before unlocking and unmapping it.
//!
//! This crate does not perform encryption, key derivation, or randomness
//! generation, and it does not defend against a local attacker with
//! debugger or kernel access, cold-boot attacks, or speculative-execution
//! side channels. It removes exactly two residual-memory risks: secrets
//! being swapped to persistent storage, and secrets surviving in process
//! memory past their intended lifetime.
//!
//! ```
//! use secure_buf::SecureBuffer;
//!
//! # fn main() -> Result<(), secure_buf::Error> {
//! let mut key = SecureBuffer::new(32)?;
//! key.write(0, b"an example 256-bit secret value!")?;
//!
//! // ... hand the slice to a cipher ...
//! let _ = key.as_slice()?;
//!
//! // Wiped, unlocked, and freed here even on early return or panic.
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod alloc;
mod buffer;
mod error;
mod wipe;

pub use buffer::SecureBuffer;
pub use error::Error;
pub use wipe::wipe;
