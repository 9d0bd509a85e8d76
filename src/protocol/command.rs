//! Command definitions
//!
//! A command is an ordered list of binary-safe byte strings: the keyword
//! followed by its arguments. Numeric arguments are rendered to their
//! decimal text before they join the list.

use std::fmt;

/// A command ready to be encoded
#[derive(Clone, PartialEq, Eq)]
pub struct Command {
    /// Keyword first, then arguments, all verbatim
    parts: Vec<Vec<u8>>,
}

impl Command {
    /// Start a command with the given keyword
    pub fn new(keyword: impl AsRef<[u8]>) -> Self {
        Self {
            parts: vec![keyword.as_ref().to_vec()],
        }
    }

    /// Append a binary argument
    pub fn arg(mut self, arg: impl AsRef<[u8]>) -> Self {
        self.parts.push(arg.as_ref().to_vec());
        self
    }

    /// Append every argument of an iterator, in order
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        self.parts
            .extend(args.into_iter().map(|a| a.as_ref().to_vec()));
        self
    }

    /// Append an integer argument as decimal text
    pub fn arg_int(self, value: i64) -> Self {
        self.arg(value.to_string())
    }

    /// Append a floating-point argument as decimal text
    ///
    /// Uses the shortest text that parses back to the same `f64`. Infinities
    /// become `inf` / `-inf`; NaN is sent as `NaN`, which the remote side
    /// will reject.
    pub fn arg_double(self, value: f64) -> Self {
        self.arg(value.to_string())
    }

    /// Append an argument only when `cond` holds
    pub fn arg_if(self, cond: bool, arg: impl AsRef<[u8]>) -> Self {
        if cond {
            self.arg(arg)
        } else {
            self
        }
    }

    /// The keyword (first element)
    pub fn keyword(&self) -> &[u8] {
        &self.parts[0]
    }

    /// All elements, keyword included
    pub fn parts(&self) -> &[Vec<u8>] {
        &self.parts
    }

    /// Arguments after the keyword
    pub fn arguments(&self) -> &[Vec<u8>] {
        &self.parts[1..]
    }

    /// Number of elements, keyword included
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Always false: a command has at least its keyword
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Exact number of bytes the encoded form occupies
    pub fn encoded_len(&self) -> usize {
        let header = 1 + decimal_len(self.parts.len()) + 2;
        self.parts
            .iter()
            .map(|p| 1 + decimal_len(p.len()) + 2 + p.len() + 2)
            .sum::<usize>()
            + header
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for part in &self.parts {
            list.entry(&String::from_utf8_lossy(part));
        }
        list.finish()
    }
}

fn decimal_len(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}
