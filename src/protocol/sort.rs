//! SORT parameters
//!
//! Optional clauses of the SORT command, assembled in the order the remote
//! side expects them.

use super::Command;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Builder for `SORT key [BY p] [LIMIT s c] [GET p] [ASC|DESC] [ALPHA] [STORE dst]`
#[derive(Debug, Clone, Default)]
pub struct SortParams {
    by: Option<Vec<u8>>,
    limit: Option<(i64, i64)>,
    get: Option<Vec<u8>>,
    order: Option<SortOrder>,
    alpha: bool,
    store: Option<Vec<u8>>,
}

impl SortParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort by the values of keys matching `pattern`
    pub fn by(mut self, pattern: impl AsRef<[u8]>) -> Self {
        self.by = Some(pattern.as_ref().to_vec());
        self
    }

    pub fn limit(mut self, start: i64, count: i64) -> Self {
        self.limit = Some((start, count));
        self
    }

    /// Return the values of keys matching `pattern` instead of the elements
    pub fn get(mut self, pattern: impl AsRef<[u8]>) -> Self {
        self.get = Some(pattern.as_ref().to_vec());
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Compare lexicographically instead of numerically
    pub fn alpha(mut self) -> Self {
        self.alpha = true;
        self
    }

    /// Store the result under `key` instead of returning it
    pub fn store(mut self, key: impl AsRef<[u8]>) -> Self {
        self.store = Some(key.as_ref().to_vec());
        self
    }

    /// Whether the result is stored rather than returned
    pub fn stores(&self) -> bool {
        self.store.is_some()
    }

    pub fn build_command(&self, key: impl AsRef<[u8]>) -> Command {
        let mut cmd = Command::new("SORT").arg(key);

        if let Some(pattern) = &self.by {
            cmd = cmd.arg("BY").arg(pattern);
        }
        if let Some((start, count)) = self.limit {
            cmd = cmd.arg("LIMIT").arg_int(start).arg_int(count);
        }
        if let Some(pattern) = &self.get {
            cmd = cmd.arg("GET").arg(pattern);
        }
        if let Some(order) = self.order {
            cmd = cmd.arg(order.keyword());
        }
        cmd = cmd.arg_if(self.alpha, "ALPHA");
        if let Some(dst) = &self.store {
            cmd = cmd.arg("STORE").arg(dst);
        }

        cmd
    }
}
