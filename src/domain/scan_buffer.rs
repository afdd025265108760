//! Assembles barcode labels from a keyboard-wedge scanner.
//!
//! Scanners type a label much faster than a person does and finish it with
//! Enter. The buffer keeps the characters typed since the last Enter and
//! drops them once the pause between two keystrokes exceeds the configured
//! gap, so stray human keystrokes never merge with a label.

use std::time::{Duration, Instant};

/// Pause after which buffered characters are discarded.
pub const DEFAULT_KEY_GAP: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Other,
}

impl Key {
    /// Maps a raw ASCII terminal byte to a key. Bytes of multi-byte
    /// characters go through [`KeyDecoder`].
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'\n' | b'\r' => Key::Enter,
            0x20..=0x7e => Key::Char(byte as char),
            _ => Key::Other,
        }
    }
}

/// Turns a terminal byte stream into keys, joining UTF-8 sequences.
///
/// Broken sequences come out as U+FFFD so a label never loses characters
/// silently; the parser or the storage lookup rejects it instead.
#[derive(Debug, Default)]
pub struct KeyDecoder {
    pending: Vec<u8>,
}

impl KeyDecoder {
    pub fn feed(&mut self, byte: u8) -> Vec<Key> {
        let mut keys = Vec::new();

        if byte.is_ascii() {
            if !self.pending.is_empty() {
                self.pending.clear();
                keys.push(Key::Char(char::REPLACEMENT_CHARACTER));
            }
            keys.push(Key::from_byte(byte));
            return keys;
        }

        self.pending.push(byte);
        match std::str::from_utf8(&self.pending) {
            Ok(decoded) => {
                keys.extend(decoded.chars().map(Key::Char));
                self.pending.clear();
            }
            Err(err) if err.error_len().is_some() => {
                self.pending.clear();
                keys.push(Key::Char(char::REPLACEMENT_CHARACTER));
            }
            // Incomplete sequence; wait for the rest of it.
            Err(_) => {}
        }
        keys
    }
}

/// Where the keystroke was delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyTarget {
    /// Nothing editable has focus; keystrokes may belong to the scanner.
    Document,
    /// An input field has focus; the operator is typing.
    TextInput,
}

#[derive(Clone, Copy, Debug)]
pub struct KeyStroke {
    pub key: Key,
    pub target: KeyTarget,
    pub at: Instant,
}

#[derive(Debug)]
pub struct ScanBuffer {
    buffer: String,
    last_key_at: Option<Instant>,
    max_gap: Duration,
}

impl ScanBuffer {
    pub fn new(max_gap: Duration) -> Self {
        Self {
            buffer: String::new(),
            last_key_at: None,
            max_gap,
        }
    }

    /// Feeds one keystroke and returns a complete label on Enter.
    pub fn push(&mut self, stroke: KeyStroke) -> Option<String> {
        if stroke.target == KeyTarget::TextInput {
            return None;
        }

        if let Some(last) = self.last_key_at
            && stroke.at.saturating_duration_since(last) > self.max_gap
        {
            self.buffer.clear();
        }
        self.last_key_at = Some(stroke.at);

        match stroke.key {
            Key::Char(c) => {
                self.buffer.push(c);
                None
            }
            Key::Enter => {
                let label = std::mem::take(&mut self.buffer);
                if label.trim().is_empty() {
                    None
                } else {
                    Some(label)
                }
            }
            Key::Other => None,
        }
    }

    /// Characters collected since the last label.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_key_at = None;
    }
}

impl Default for ScanBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_GAP)
    }
}
