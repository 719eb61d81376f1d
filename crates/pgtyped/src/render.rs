//! Render context shared by every node of one render pass, and the scratch
//! buffer pool used by `build()`.

use crate::param::{Param, ParamList};
use std::fmt::Write as _;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

/// Whether a statement is rendered as a complete statement or inside another one.
///
/// Only top-level statements receive the `;` terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    TopLevel,
    Embedded,
}

/// Mutable state threaded through one render pass.
///
/// Placeholders are numbered from 1 in the order they are written. Every node,
/// including nested sub-queries, writes into the same buffer and argument list,
/// so numbering never restarts inside a pass.
pub struct RenderCtx<'a> {
    buf: &'a mut String,
    args: &'a mut ParamList,
    next: usize,
}

impl<'a> RenderCtx<'a> {
    pub fn new(buf: &'a mut String, args: &'a mut ParamList) -> Self {
        Self { buf, args, next: 1 }
    }

    /// Append SQL text verbatim.
    pub fn push_sql(&mut self, sql: &str) {
        self.buf.push_str(sql);
    }

    pub fn push_char(&mut self, c: char) {
        self.buf.push(c);
    }

    /// Write the next `$n` marker without binding a value.
    pub fn push_placeholder(&mut self) -> usize {
        let n = self.next;
        // Writing into a String cannot fail.
        let _ = write!(self.buf, "${n}");
        self.next += 1;
        n
    }

    /// Write the next `$n` marker and bind `param` to it.
    pub fn bind(&mut self, param: Param) -> usize {
        let n = self.push_placeholder();
        self.args.push(param);
        n
    }

    /// Append raw SQL, turning each `?` into the next placeholder, then `args`.
    ///
    /// The template is not parsed: a `?` inside a string literal is still
    /// treated as a marker.
    ///
    /// # Panics
    ///
    /// If the number of `?` markers differs from `args.len()`; later
    /// placeholders would otherwise bind to the wrong values.
    pub fn push_raw(&mut self, sql: &str, args: &[Param]) {
        let markers = sql.matches('?').count();
        assert_eq!(
            markers,
            args.len(),
            "placeholder mismatch in raw sql {sql:?}: {markers} markers, {} args",
            args.len()
        );
        for (i, part) in sql.split('?').enumerate() {
            if i > 0 {
                self.push_placeholder();
            }
            self.buf.push_str(part);
        }
        self.args.extend(args.iter().cloned());
    }

    /// Index the next placeholder will receive.
    pub fn next_index(&self) -> usize {
        self.next
    }
}

const MAX_POOLED: usize = 64;
const MAX_RETAINED_CAPACITY: usize = 16 * 1024;

/// Free list of reusable `String` buffers.
///
/// Buffers are handed out as [`ScratchBuf`] guards: cleared on acquisition,
/// owned exclusively by the holder, and given back when the guard drops. Text is
/// copied out before the guard goes away, so no reference into a pooled buffer
/// survives its return.
pub struct ScratchPool {
    free: Mutex<Vec<String>>,
}

impl ScratchPool {
    pub const fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
        }
    }

    pub fn acquire(&self, capacity: usize) -> ScratchBuf<'_> {
        let reused = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        let mut buf = reused.unwrap_or_default();
        buf.clear();
        buf.reserve(capacity);
        ScratchBuf { pool: self, buf }
    }

    /// Number of idle buffers.
    pub fn idle(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn release(&self, mut buf: String) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.clear();
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < MAX_POOLED {
            free.push(buf);
        }
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive loan of a pooled buffer.
pub struct ScratchBuf<'p> {
    pool: &'p ScratchPool,
    buf: String,
}

impl Deref for ScratchBuf<'_> {
    type Target = String;

    fn deref(&self) -> &String {
        &self.buf
    }
}

impl DerefMut for ScratchBuf<'_> {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buf
    }
}

impl Drop for ScratchBuf<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

static SCRATCH: ScratchPool = ScratchPool::new();

/// Borrow a buffer from the process-wide pool.
pub fn scratch(capacity: usize) -> ScratchBuf<'static> {
    SCRATCH.acquire(capacity)
}
