//! Feature-gated logging that tolerates being called from the audio path.
//!
//! `hz_log!` formats directly into a fixed slot of a lock-free journal, so the
//! processing thread never allocates or blocks; a non-realtime thread drains
//! the journal to any writer (the render tool drains to `/tmp/horizon.log`).
//! With the `debug` feature off the macro compiles to nothing.

use std::fmt;

#[cfg(feature = "debug")]
pub mod logger {
    use std::cell::UnsafeCell;
    use std::fmt::{self, Write as _};
    use std::fs::OpenOptions;
    use std::io::{self, Write};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::OnceLock;

    const SLOTS: usize = 128;
    const SLOT_BYTES: usize = 240;

    struct Slot {
        len: u16,
        text: [u8; SLOT_BYTES],
    }

    /// SPSC journal: the audio thread reserves the head slot, formats into it
    /// in place, then publishes; the drain thread consumes from the tail.
    /// A full journal drops the message rather than waiting.
    struct Journal {
        write_pos: AtomicUsize,
        read_pos: AtomicUsize,
        slots: Box<[UnsafeCell<Slot>]>,
    }

    unsafe impl Sync for Journal {}

    struct SlotWriter<'a>(&'a mut Slot);

    impl fmt::Write for SlotWriter<'_> {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            let len = self.0.len as usize;
            let avail = SLOT_BYTES - len;
            let n = s.len().min(avail);
            self.0.text[len..len + n].copy_from_slice(&s.as_bytes()[..n]);
            self.0.len = (len + n) as u16;
            Ok(())
        }
    }

    impl Journal {
        fn with_capacity(slots: usize) -> Self {
            let mut v = Vec::with_capacity(slots);
            for _ in 0..slots {
                v.push(UnsafeCell::new(Slot {
                    len: 0,
                    text: [0; SLOT_BYTES],
                }));
            }
            Self {
                write_pos: AtomicUsize::new(0),
                read_pos: AtomicUsize::new(0),
                slots: v.into_boxed_slice(),
            }
        }

        fn record(&self, args: fmt::Arguments) {
            let cap = self.slots.len();
            let head = self.write_pos.load(Ordering::Relaxed);
            let next = (head + 1) % cap;
            if next == self.read_pos.load(Ordering::Acquire) {
                return;
            }
            let slot = unsafe { &mut *self.slots[head].get() };
            slot.len = 0;
            let _ = SlotWriter(slot).write_fmt(args);
            self.write_pos.store(next, Ordering::Release);
        }

        fn drain<W: io::Write>(&self, out: &mut W) {
            let cap = self.slots.len();
            loop {
                let tail = self.read_pos.load(Ordering::Relaxed);
                if tail == self.write_pos.load(Ordering::Acquire) {
                    return;
                }
                let slot = unsafe { &*self.slots[tail].get() };
                let len = slot.len as usize;
                if len > 0 {
                    let msg = std::str::from_utf8(&slot.text[..len]).unwrap_or("<invalid>");
                    let _ = writeln!(out, "{}", msg);
                }
                self.read_pos.store((tail + 1) % cap, Ordering::Release);
            }
        }
    }

    static JOURNAL: OnceLock<Journal> = OnceLock::new();
    static ACTIVE: AtomicBool = AtomicBool::new(false);

    /// Arms the journal. Until this runs, `hz_log!` is a cheap no-op.
    pub fn init() {
        let _ = JOURNAL.get_or_init(|| Journal::with_capacity(SLOTS));
        ACTIVE.store(true, Ordering::Relaxed);
    }

    pub fn record(args: fmt::Arguments) {
        if !ACTIVE.load(Ordering::Relaxed) {
            return;
        }
        if let Some(journal) = JOURNAL.get() {
            journal.record(args);
        }
    }

    /// Drains pending messages into `out`. Call from a non-realtime thread.
    pub fn drain<W: io::Write>(out: &mut W) {
        if let Some(journal) = JOURNAL.get() {
            journal.drain(out);
        }
    }

    pub fn drain_to_file() {
        let mut file = match OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/horizon.log")
        {
            Ok(f) => f,
            Err(_) => return,
        };
        drain(&mut file);
    }
}

#[cfg(feature = "debug")]
pub(crate) fn hz_log_inner(args: fmt::Arguments) {
    logger::record(args);
}

#[cfg(not(feature = "debug"))]
pub(crate) fn hz_log_inner(_args: fmt::Arguments) {}

#[macro_export]
macro_rules! hz_log {
    ($($arg:tt)*) => {
        $crate::debug::hz_log_inner(format_args!($($arg)*))
    };
}

#[cfg(all(test, feature = "debug"))]
mod tests {
    use super::logger;

    // Single test: the journal is global, and concurrent tests would observe
    // each other's entries.
    #[test]
    fn messages_survive_the_journal_round_trip() {
        logger::init();
        hz_log!("retune: rate={:.0} block={}", 48000.0, 256);
        hz_log!("second entry");

        let mut out = Vec::new();
        logger::drain(&mut out);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("retune: rate=48000 block=256"));
        assert!(text.contains("second entry"));

        // Journal is empty after a drain.
        let mut again = Vec::new();
        logger::drain(&mut again);
        assert!(again.is_empty());

        // Oversized messages truncate at the slot boundary instead of spilling.
        let long = "x".repeat(4096);
        hz_log!("{}", long);
        let mut truncated = Vec::new();
        logger::drain(&mut truncated);
        assert!(!truncated.is_empty());
        assert!(truncated.len() < 512);
    }
}
