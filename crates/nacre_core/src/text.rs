//! Optimized string type with small string optimization.

use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::str;

const INLINE_CAP: usize = 22;
const CHAR_COUNT_UNKNOWN: u32 = u32::MAX;

#[derive(Clone)]
pub enum Text {
    Inline { len: u8, buf: [u8; INLINE_CAP] },
    Heap { data: Rc<String>, char_count: Cell<u32> },
}

impl Text {
    pub fn new() -> Self {
        Self::Inline {
            len: 0,
            buf: [0u8; INLINE_CAP],
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Text::Inline { len, buf } => {
                let s = &buf[..*len as usize];
                unsafe { str::from_utf8_unchecked(s) }
            }
            Text::Heap { data, .. } => data.as_str(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Text::Inline { len, .. } => *len as usize,
            Text::Heap { data, .. } => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of Unicode characters (not bytes)
    pub fn char_count(&self) -> usize {
        match self {
            Text::Inline { len, buf } => {
                let byte_len = *len as usize;
                // Fast path: if all bytes are ASCII, char count equals byte count
                let s = &buf[..byte_len];
                if s.iter().all(|&b| b < 128) {
                    byte_len
                } else {
                    let s = unsafe { str::from_utf8_unchecked(s) };
                    s.chars().count()
                }
            }
            Text::Heap { data, char_count } => {
                let cached = char_count.get();
                if cached != CHAR_COUNT_UNKNOWN {
                    cached as usize
                } else {
                    let count = data.chars().count() as u32;
                    char_count.set(count);
                    count as usize
                }
            }
        }
    }

    pub fn from_str(s: &str) -> Self {
        if s.len() <= INLINE_CAP {
            let mut buf = [0u8; INLINE_CAP];
            buf[..s.len()].copy_from_slice(s.as_bytes());
            return Self::Inline {
                len: s.len() as u8,
                buf,
            };
        }
        Self::Heap { data: Rc::new(s.to_string()), char_count: Cell::new(CHAR_COUNT_UNKNOWN) }
    }

    pub fn from_string(s: String) -> Self {
        if s.len() <= INLINE_CAP {
            let mut buf = [0u8; INLINE_CAP];
            buf[..s.len()].copy_from_slice(s.as_bytes());
            return Self::Inline {
                len: s.len() as u8,
                buf,
            };
        }
        Self::Heap { data: Rc::new(s), char_count: Cell::new(CHAR_COUNT_UNKNOWN) }
    }

    pub fn into_string(self) -> String {
        match self {
            Text::Inline { len, buf } => {
                let s = &buf[..len as usize];
                let ss = unsafe { str::from_utf8_unchecked(s) };
                ss.to_string()
            }
            Text::Heap { data, .. } => match Rc::try_unwrap(data) {
                Ok(s) => s,
                Err(r) => (*r).clone(),
            },
        }
    }

    pub fn push_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        match self {
            Text::Inline { len, buf } => {
                let cur = *len as usize;
                let new_len = cur + s.len();
                if new_len <= INLINE_CAP {
                    buf[cur..new_len].copy_from_slice(s.as_bytes());
                    *len = new_len as u8;
                    return;
                }
                let mut out = String::with_capacity(new_len);
                out.push_str(unsafe { str::from_utf8_unchecked(&buf[..cur]) });
                out.push_str(s);
                *self = Text::Heap { data: Rc::new(out), char_count: Cell::new(CHAR_COUNT_UNKNOWN) };
            }
            Text::Heap { data, char_count } => {
                let hm = Rc::make_mut(data);
                hm.reserve(s.len());
                hm.push_str(s);
                // Invalidate cached char count
                char_count.set(CHAR_COUNT_UNKNOWN);
            }
        }
    }

    pub fn push_i64(&mut self, i: i64) {
        let mut buf = itoa::Buffer::new();
        self.push_str(buf.format(i));
    }

    pub fn push_f64(&mut self, f: f64) {
        if f.fract() == 0.0 && f.abs() < 1e15 {
            self.push_i64(f as i64);
        } else {
            let mut buf = ryu::Buffer::new();
            self.push_str(buf.format(f));
        }
    }

    pub fn concat2(a: &Text, b: &Text) -> Text {
        let al = a.len();
        let bl = b.len();
        let total = al + bl;
        if total <= INLINE_CAP {
            let mut buf = [0u8; INLINE_CAP];
            buf[..al].copy_from_slice(a.as_str().as_bytes());
            buf[al..total].copy_from_slice(b.as_str().as_bytes());
            return Text::Inline {
                len: total as u8,
                buf,
            };
        }

        let mut out = String::with_capacity(total);
        out.push_str(a.as_str());
        out.push_str(b.as_str());
        Text::Heap { data: Rc::new(out), char_count: Cell::new(CHAR_COUNT_UNKNOWN) }
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Text::from_str(s)
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Text {}

impl Hash for Text {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}
