use std::collections::BTreeMap;

use crate::NotReady;

/// Snapshot of one HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: String,
    headers: BTreeMap<String, Vec<String>>,
}

impl Response {
    /// Header names are stored lower-cased; values keep their arrival order.
    pub fn new<I, K, V>(status: u16, body: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in headers {
            map.entry(name.as_ref().to_ascii_lowercase())
                .or_default()
                .push(value.into());
        }
        Self {
            status,
            body: body.into(),
            headers: map,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn headers(&self) -> &BTreeMap<String, Vec<String>> {
        &self.headers
    }

    /// First value of a header, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_all(name).first().map(String::as_str)
    }

    /// All values of a header in arrival order, case-insensitive.
    pub fn header_all(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Classification of one probe attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Ready(String),
    NotReady(NotReady),
}

impl Verdict {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Converts into the shape expected by [`crate::retry`].
    pub fn into_result(self) -> Result<String, NotReady> {
        match self {
            Self::Ready(message) => Ok(message),
            Self::NotReady(reason) => Err(reason),
        }
    }
}
