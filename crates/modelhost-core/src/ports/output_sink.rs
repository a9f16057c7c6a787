//! Output sink port for live server output and progress messages.

/// Receives server output lines and progress messages as they arrive.
///
/// This is a side channel for display; nothing is returned through it.
/// Any `Fn(&str) + Send + Sync` closure is a sink.
pub trait OutputSink: Send + Sync {
    fn emit(&self, line: &str);
}

impl<F> OutputSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn emit(&self, line: &str) {
        self(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_is_a_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |line: &str| seen.lock().unwrap().push(line.to_string());
        sink.emit("hello");
        let dyn_sink: &dyn OutputSink = &sink;
        dyn_sink.emit("world");
        assert_eq!(*seen.lock().unwrap(), vec!["hello", "world"]);
    }
}
