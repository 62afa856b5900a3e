//! Resolved handler arguments.
//!
//! The executor resolves every declared parameter of an action into an
//! [`Arg`] and hands the handler an ordered [`Args`] list: position `i`
//! holds the parameter declared at the `i`-th smallest index.

use crate::{
    error::ArgError,
    socket::{RootRef, SocketRef},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{collections::BTreeSet, fmt, sync::Arc};

/// A single resolved parameter value.
#[derive(Clone)]
pub enum Arg {
    /// The connection the event arrived on.
    Socket(SocketRef),
    /// The messaging root.
    Root(RootRef),
    /// The connection's upgrade request.
    Request(Arc<http::Request<()>>),
    /// Rooms the connection has joined.
    Rooms(BTreeSet<String>),
    /// A data value. `None` means the value was absent.
    Value(Option<Value>),
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Socket(socket) => f.debug_tuple("Socket").field(&socket.id()).finish(),
            Arg::Root(_) => f.write_str("Root"),
            Arg::Request(req) => f.debug_tuple("Request").field(req.uri()).finish(),
            Arg::Rooms(rooms) => f.debug_tuple("Rooms").field(rooms).finish(),
            Arg::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(Some(value))
    }
}

impl From<Option<Value>> for Arg {
    fn from(value: Option<Value>) -> Self {
        Arg::Value(value)
    }
}

/// The ordered argument list passed to a handler.
#[derive(Debug, Clone, Default)]
pub struct Args(Vec<Arg>);

impl Args {
    /// Wrap an already ordered list.
    pub fn new(args: Vec<Arg>) -> Self {
        Self(args)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the action declared no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw access to one argument.
    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.0.get(index)
    }

    /// Iterate in declared-index order.
    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.0.iter()
    }

    /// Take the underlying list.
    pub fn into_vec(self) -> Vec<Arg> {
        self.0
    }

    fn arg(&self, index: usize) -> Result<&Arg, ArgError> {
        self.0.get(index).ok_or(ArgError::Missing(index))
    }

    /// The connection handle at `index`.
    pub fn socket(&self, index: usize) -> Result<&SocketRef, ArgError> {
        match self.arg(index)? {
            Arg::Socket(socket) => Ok(socket),
            _ => Err(ArgError::Mismatch {
                index,
                expected: "socket",
            }),
        }
    }

    /// The messaging root at `index`.
    pub fn root(&self, index: usize) -> Result<&RootRef, ArgError> {
        match self.arg(index)? {
            Arg::Root(root) => Ok(root),
            _ => Err(ArgError::Mismatch {
                index,
                expected: "messaging root",
            }),
        }
    }

    /// The upgrade request at `index`.
    pub fn request(&self, index: usize) -> Result<&http::Request<()>, ArgError> {
        match self.arg(index)? {
            Arg::Request(req) => Ok(&**req),
            _ => Err(ArgError::Mismatch {
                index,
                expected: "request",
            }),
        }
    }

    /// The room set at `index`.
    pub fn rooms(&self, index: usize) -> Result<&BTreeSet<String>, ArgError> {
        match self.arg(index)? {
            Arg::Rooms(rooms) => Ok(rooms),
            _ => Err(ArgError::Mismatch {
                index,
                expected: "room set",
            }),
        }
    }

    /// The data value at `index`; `Ok(None)` when it was absent.
    pub fn value(&self, index: usize) -> Result<Option<&Value>, ArgError> {
        match self.arg(index)? {
            Arg::Value(value) => Ok(value.as_ref()),
            _ => Err(ArgError::Mismatch {
                index,
                expected: "value",
            }),
        }
    }

    /// The text value at `index`; `Ok(None)` when absent or not a string.
    pub fn str(&self, index: usize) -> Result<Option<&str>, ArgError> {
        Ok(self.value(index)?.and_then(Value::as_str))
    }

    /// Deserialize the data value at `index` into `T`.
    ///
    /// An absent value deserializes from JSON null, so `Option<T>` targets
    /// accept it.
    pub fn json<T: DeserializeOwned>(&self, index: usize) -> Result<T, ArgError> {
        let value = self.value(index)?.cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|source| ArgError::Deserialize { index, source })
    }
}

impl From<Vec<Arg>> for Args {
    fn from(args: Vec<Arg>) -> Self {
        Self(args)
    }
}

impl IntoIterator for Args {
    type Item = Arg;
    type IntoIter = std::vec::IntoIter<Arg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
