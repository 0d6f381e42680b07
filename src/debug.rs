//! Real-time safe event log.
//!
//! The audio thread must not format into the global logger, so `eq_log!`
//! writes into a preallocated ring of fixed-size messages instead. A
//! non-real-time context calls [`drain`] to forward them to the `log` facade.
//! Without the `debug` feature everything here compiles to nothing.

use std::fmt;

#[cfg(feature = "debug")]
mod ring {
    use std::cell::UnsafeCell;
    use std::fmt;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::OnceLock;

    const SLOTS: usize = 128;
    const MESSAGE_BYTES: usize = 240;

    #[derive(Clone, Copy)]
    struct Message {
        len: usize,
        bytes: [u8; MESSAGE_BYTES],
    }

    impl Message {
        const EMPTY: Message = Message {
            len: 0,
            bytes: [0; MESSAGE_BYTES],
        };

        fn as_str(&self) -> &str {
            // truncation may split a code point
            match std::str::from_utf8(&self.bytes[..self.len]) {
                Ok(s) => s,
                Err(e) => std::str::from_utf8(&self.bytes[..e.valid_up_to()]).unwrap_or(""),
            }
        }
    }

    impl fmt::Write for Message {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            let n = s.len().min(MESSAGE_BYTES - self.len);
            self.bytes[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
            self.len += n;
            Ok(())
        }
    }

    /// Single-consumer ring. Producers take `writing` as a try-lock and drop
    /// the message when it is held or the ring is full.
    struct EventRing {
        slots: Box<[UnsafeCell<Message>]>,
        head: AtomicUsize,
        tail: AtomicUsize,
        writing: AtomicBool,
        reading: AtomicBool,
    }

    // Slot access is serialized by the head/tail protocol and the two flags.
    unsafe impl Sync for EventRing {}

    impl EventRing {
        fn new() -> Self {
            Self {
                slots: (0..SLOTS).map(|_| UnsafeCell::new(Message::EMPTY)).collect(),
                head: AtomicUsize::new(0),
                tail: AtomicUsize::new(0),
                writing: AtomicBool::new(false),
                reading: AtomicBool::new(false),
            }
        }

        fn push(&self, args: fmt::Arguments) {
            if self.writing.swap(true, Ordering::Acquire) {
                return;
            }
            let head = self.head.load(Ordering::Relaxed);
            let next = (head + 1) % SLOTS;
            if next != self.tail.load(Ordering::Acquire) {
                let mut message = Message::EMPTY;
                let _ = fmt::write(&mut message, args);
                unsafe {
                    *self.slots[head].get() = message;
                }
                self.head.store(next, Ordering::Release);
            }
            self.writing.store(false, Ordering::Release);
        }

        fn drain(&self, mut sink: impl FnMut(&str)) -> usize {
            if self.reading.swap(true, Ordering::Acquire) {
                return 0;
            }
            let mut drained = 0;
            loop {
                let tail = self.tail.load(Ordering::Relaxed);
                if tail == self.head.load(Ordering::Acquire) {
                    break;
                }
                let message = unsafe { *self.slots[tail].get() };
                self.tail.store((tail + 1) % SLOTS, Ordering::Release);
                sink(message.as_str());
                drained += 1;
            }
            self.reading.store(false, Ordering::Release);
            drained
        }
    }

    static RING: OnceLock<EventRing> = OnceLock::new();

    /// Allocates the ring. Call from a non-real-time context before processing.
    pub fn init() {
        let _ = RING.get_or_init(EventRing::new);
    }

    pub fn record(args: fmt::Arguments) {
        if let Some(ring) = RING.get() {
            ring.push(args);
        }
    }

    pub fn drain() -> usize {
        match RING.get() {
            Some(ring) => ring.drain(|msg| log::debug!("{}", msg)),
            None => 0,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn messages_come_out_in_order() {
            let ring = EventRing::new();
            ring.push(format_args!("first {}", 1));
            ring.push(format_args!("second {}", 2));
            let mut seen = Vec::new();
            assert_eq!(ring.drain(|m| seen.push(m.to_string())), 2);
            assert_eq!(seen, ["first 1", "second 2"]);
        }

        #[test]
        fn full_ring_drops_new_messages() {
            let ring = EventRing::new();
            for i in 0..SLOTS * 2 {
                ring.push(format_args!("{}", i));
            }
            assert_eq!(ring.drain(|_| {}), SLOTS - 1);
        }

        #[test]
        fn long_messages_are_truncated() {
            let ring = EventRing::new();
            let long = "x".repeat(MESSAGE_BYTES * 2);
            ring.push(format_args!("{}", long));
            let mut len = 0;
            ring.drain(|m| len = m.len());
            assert_eq!(len, MESSAGE_BYTES);
        }
    }
}

#[cfg(feature = "debug")]
pub(crate) fn init() {
    ring::init();
}

#[cfg(not(feature = "debug"))]
pub(crate) fn init() {}

#[cfg(feature = "debug")]
pub(crate) fn eq_log_inner(args: fmt::Arguments) {
    ring::record(args);
}

#[cfg(not(feature = "debug"))]
pub(crate) fn eq_log_inner(_args: fmt::Arguments) {}

/// Forward queued real-time messages to the `log` facade. Returns how many
/// were forwarded.
#[cfg(feature = "debug")]
pub fn drain() -> usize {
    ring::drain()
}

#[cfg(not(feature = "debug"))]
pub fn drain() -> usize {
    0
}

#[macro_export]
macro_rules! eq_log {
    ($($arg:tt)*) => {
        $crate::debug::eq_log_inner(format_args!($($arg)*))
    };
}
