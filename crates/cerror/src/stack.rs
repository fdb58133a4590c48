//! Call-site stack snapshots.
//!
//! Every constructor is `#[track_caller]`, so the first frame of a
//! snapshot is always the exact source location that built the error.
//! With the `backtrace` feature the rest of the live call stack is
//! walked outward from that frame.
//!
//! ```text
//! frames[0]  src/users.rs:42      <- call site (innermost)
//! frames[1]  src/handler.rs:17
//! frames[2]  src/main.rs:9        <- outermost recorded
//! ```

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

use crate::config::capture_config;

/// One `(file, line)` entry of a stack snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    file: Cow<'static, str>,
    line: u32,
}

impl Frame {
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self { file: file.into(), line }
    }

    #[inline]
    pub fn file(&self) -> &str {
        &self.file
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl From<&'static Location<'static>> for Frame {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: Cow::Borrowed(location.file()),
            line: location.line(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// An immutable snapshot of frames, innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    /// A snapshot with no frames.
    pub const fn empty() -> Self {
        Self { frames: Vec::new() }
    }

    /// Capture the stack of the caller.
    ///
    /// Never fails: returns an empty snapshot when capture is disabled
    /// (the `production` feature, `CERROR_CAPTURE=0`) and a caller-only
    /// snapshot when frames cannot be resolved.
    #[track_caller]
    pub fn capture() -> Self {
        let config = capture_config();
        if !config.enabled {
            return Self::empty();
        }
        imp::capture(Location::caller(), config.depth)
    }

    /// Build a snapshot from frames already ordered innermost first.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The innermost frame: where the error was created.
    #[inline]
    pub fn location(&self) -> Option<&Frame> {
        self.frames.first()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:>4}: {}", i, frame)?;
        }
        Ok(())
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "production")] {
        mod imp {
            use super::{Location, Stack};

            pub(super) fn capture(_caller: &'static Location<'static>, _depth: usize) -> Stack {
                Stack::empty()
            }
        }
    } else if #[cfg(feature = "backtrace")] {
        mod imp {
            use std::borrow::Cow;

            use super::{Frame, Location, Stack};

            /// Walk the live stack and keep frames from the caller outward.
            ///
            /// Leading frames that belong to the unwinder or to this crate
            /// are skipped by symbol name. The first frame past them is the
            /// function that built the error; its resolved line is replaced by
            /// the exact `#[track_caller]` location. A frame resolving to the
            /// caller's `file:line` ends the skip early. Without symbols the
            /// snapshot degrades to the caller frame alone.
            pub(super) fn capture(caller: &'static Location<'static>, depth: usize) -> Stack {
                let mut frames: Vec<Frame> = Vec::new();
                let mut skipping = true;

                backtrace::trace(|raw| {
                    backtrace::resolve_frame(raw, |symbol| {
                        if frames.len() >= depth {
                            return;
                        }
                        let resolved = symbol.filename().zip(symbol.lineno());
                        if skipping {
                            let at_caller = resolved.map_or(false, |(path, line)| {
                                line == caller.line() && path.ends_with(caller.file())
                            });
                            let internal = symbol
                                .name()
                                .map_or(true, |name| is_internal(&format!("{:#}", name)));
                            if internal && !at_caller {
                                return;
                            }
                            skipping = false;
                            frames.push(Frame::from(caller));
                            return;
                        }
                        if let Some((path, line)) = resolved {
                            frames.push(Frame {
                                file: Cow::Owned(path.display().to_string()),
                                line,
                            });
                        }
                    });
                    frames.len() < depth
                });

                if frames.is_empty() {
                    frames.push(Frame::from(caller));
                }
                Stack { frames }
            }

            const RUNTIME_PREFIXES: [&str; 4] = ["backtrace::", "core::", "std::", "alloc::"];

            /// Whether a demangled symbol sits between the capture call and
            /// the code that raised the error.
            pub(super) fn is_internal(name: &str) -> bool {
                let name = name.trim_start_matches('<');
                if RUNTIME_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
                    return true;
                }
                !name.contains("::tests::") && mentions_crate(name)
            }

            fn mentions_crate(name: &str) -> bool {
                name.match_indices("cerror::").any(|(at, _)| {
                    name[..at]
                        .chars()
                        .next_back()
                        .map_or(true, |c| !(c.is_alphanumeric() || c == '_'))
                })
            }
        }
    } else {
        mod imp {
            use super::{Frame, Location, Stack};

            pub(super) fn capture(caller: &'static Location<'static>, _depth: usize) -> Stack {
                Stack { frames: vec![Frame::from(caller)] }
            }
        }
    }
}
