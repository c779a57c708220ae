use std::{
    fmt::{self, Debug},
    io::BufReader,
    path::PathBuf,
};

use anyhow::Context;
use derive_more::{AsRef, Display, From};
use fs_err::File;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

#[derive(Debug, TypedBuilder, Serialize, Deserialize)]
pub struct Credentials {
    #[builder(setter(into))]
    pub username: Username,
    #[builder(setter(into))]
    pub password: Password,
}

#[derive(Clone, Debug, From, AsRef, Display, Serialize, Deserialize)]
#[as_ref(forward)]
pub struct Username(String);

#[derive(Clone, From, AsRef, Serialize, Deserialize)]
#[as_ref(forward)]
pub struct Password(String);

impl Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(****)")
    }
}

impl Username {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Password {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Username {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<&str> for Password {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.username.as_str().is_empty() && !self.password.as_str().is_empty()
    }

    /// Reads `{"username": ..., "password": ...}` from a JSON file.
    pub fn load<P: Into<PathBuf> + Debug>(path: P) -> anyhow::Result<Self> {
        let path = path.into();
        let file = File::open(&path)?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("While trying to load credentials from {path:?}"))
    }
}
