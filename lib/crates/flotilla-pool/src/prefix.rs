//! Per-host output decoration.
//!
//! Child output is streamed live into caller-supplied sinks, with every line
//! tagged `@<host> ` (stdout) or `@<host>-err ` (stderr) so fan-out across a
//! pool stays attributable. Sinks are shared behind a mutex: concurrent
//! connections interleave at whole-line granularity, never mid-line, though
//! cross-host line ordering is not guaranteed.

use std::io::Write;
use std::sync::{Arc, Mutex};

/// A writable destination for decorated output lines.
///
/// The same sink may be handed to several connections; writes are serialized
/// per line by the interior mutex.
pub type OutputSink = Arc<Mutex<dyn Write + Send>>;

/// Wraps a writer into an [`OutputSink`].
pub fn sink<W: Write + Send + 'static>(writer: W) -> OutputSink {
    Arc::new(Mutex::new(writer))
}

/// Prefixes every line written through it before forwarding to the sink.
///
/// Chunks may split lines arbitrarily; the incomplete tail is carried until
/// its newline arrives. [`LinePrefixer::finish`] emits a trailing
/// unterminated line (newline appended) so terminal sinks are never left
/// mid-line.
pub struct LinePrefixer {
    prefix: String,
    sink: OutputSink,
    tail: Vec<u8>,
}

impl LinePrefixer {
    pub fn new(prefix: impl Into<String>, sink: OutputSink) -> Self {
        Self {
            prefix: prefix.into(),
            sink,
            tail: Vec::new(),
        }
    }

    /// Feeds a chunk of raw child output, forwarding each completed line.
    pub fn push(&mut self, chunk: &[u8]) {
        self.tail.extend_from_slice(chunk);
        while let Some(pos) = self.tail.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.tail.drain(..=pos).collect();
            self.write_line(&line[..pos]);
        }
    }

    /// Flushes the unterminated tail, if any.
    pub fn finish(&mut self) {
        if !self.tail.is_empty() {
            let tail = std::mem::take(&mut self.tail);
            self.write_line(&tail);
        }
    }

    fn write_line(&self, line: &[u8]) {
        // Decoration is best-effort: a broken or poisoned sink must not fail
        // the command that produced the output.
        if let Ok(mut w) = self.sink.lock() {
            let _ = w.write_all(self.prefix.as_bytes());
            let _ = w.write_all(line);
            let _ = w.write_all(b"\n");
            let _ = w.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture() -> (Arc<Mutex<Vec<u8>>>, OutputSink) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink: OutputSink = buf.clone();
        (buf, sink)
    }

    fn contents(buf: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(buf.lock().expect("lock").clone()).expect("utf8")
    }

    #[test]
    fn prefixes_each_complete_line() {
        let (buf, sink) = capture();
        let mut p = LinePrefixer::new("@web ", sink);
        p.push(b"one\ntwo\n");
        assert_eq!(contents(&buf), "@web one\n@web two\n");
    }

    #[test]
    fn carries_partial_lines_across_chunks() {
        let (buf, sink) = capture();
        let mut p = LinePrefixer::new("@web ", sink);
        p.push(b"hel");
        assert_eq!(contents(&buf), "");
        p.push(b"lo\nwor");
        assert_eq!(contents(&buf), "@web hello\n");
        p.push(b"ld\n");
        assert_eq!(contents(&buf), "@web hello\n@web world\n");
    }

    #[test]
    fn finish_emits_unterminated_tail_with_newline() {
        let (buf, sink) = capture();
        let mut p = LinePrefixer::new("@web ", sink);
        p.push(b"no newline");
        p.finish();
        assert_eq!(contents(&buf), "@web no newline\n");
    }

    #[test]
    fn finish_with_empty_tail_writes_nothing() {
        let (buf, sink) = capture();
        let mut p = LinePrefixer::new("@web ", sink);
        p.push(b"done\n");
        p.finish();
        assert_eq!(contents(&buf), "@web done\n");
    }

    #[test]
    fn empty_lines_are_still_prefixed() {
        let (buf, sink) = capture();
        let mut p = LinePrefixer::new("@web ", sink);
        p.push(b"\n\n");
        assert_eq!(contents(&buf), "@web \n@web \n");
    }

    #[test]
    fn two_prefixers_sharing_a_sink_interleave_whole_lines() {
        let (buf, sink) = capture();
        let mut a = LinePrefixer::new("@h1 ", sink.clone());
        let mut b = LinePrefixer::new("@h2 ", sink);
        a.push(b"first");
        b.push(b"second\n");
        a.push(b" half\n");
        let out = contents(&buf);
        assert_eq!(out, "@h2 second\n@h1 first half\n");
    }
}
