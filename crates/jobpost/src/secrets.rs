//! Bearer-token resolution.
//!
//! A token can come from three places, tried in order:
//!
//! 1. **Direct value** - handy for local testing
//! 2. **File reference** - Docker secrets style (`/run/secrets/jobpost_token`)
//! 3. **Env var reference** - e.g. `JOBPOST_TOKEN`

use std::path::PathBuf;

use secrecy::SecretString;

pub const TOKEN_ENV_VAR: &str = "JOBPOST_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No token source configured")]
    NoSource,

    #[error("Cannot read token file '{path}': {source}")]
    TokenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Token variable '{name}' is not set")]
    EnvVarMissing { name: String },

    #[error("Token variable '{name}' is not valid UTF-8")]
    EnvVarNotUnicode { name: String },

    #[error("Token from {source_kind} is blank")]
    Empty { source_kind: &'static str },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Where a token is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource<'a> {
    Direct(&'a str),
    File(&'a str),
    Env(&'a str),
}

impl<'a> TokenSource<'a> {
    /// The first non-empty source, in direct → file → env order.
    pub fn first(
        direct: Option<&'a str>,
        file_path: Option<&'a str>,
        env_var: Option<&'a str>,
    ) -> Option<Self> {
        let some = |v: Option<&'a str>| v.filter(|v| !v.is_empty());
        some(direct)
            .map(TokenSource::Direct)
            .or_else(|| some(file_path).map(TokenSource::File))
            .or_else(|| some(env_var).map(TokenSource::Env))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TokenSource::Direct(_) => "direct value",
            TokenSource::File(_) => "file",
            TokenSource::Env(_) => "environment",
        }
    }

    pub fn read(&self) -> Result<SecretString> {
        let raw = match *self {
            TokenSource::Direct(value) => value.to_string(),
            TokenSource::File(path) => {
                let path = expand_home(path);
                std::fs::read_to_string(&path)
                    .map_err(|source| SecretError::TokenFile { path, source })?
            }
            TokenSource::Env(name) => std::env::var(name).map_err(|e| match e {
                std::env::VarError::NotPresent => SecretError::EnvVarMissing {
                    name: name.to_string(),
                },
                std::env::VarError::NotUnicode(_) => SecretError::EnvVarNotUnicode {
                    name: name.to_string(),
                },
            })?,
        };

        let token = raw.trim();
        if token.is_empty() {
            return Err(SecretError::Empty {
                source_kind: self.kind(),
            });
        }
        Ok(SecretString::from(token.to_string()))
    }
}

/// Reads a secret from the first configured source. A configured source that
/// fails does not fall through to the next one.
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    TokenSource::first(direct, file_path, env_var)
        .ok_or(SecretError::NoSource)?
        .read()
}

/// Resolves the API bearer token. No source at all means unauthenticated
/// requests, which the catalogue endpoints accept.
pub fn resolve_token(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<Option<SecretString>> {
    TokenSource::first(direct, file_path, env_var)
        .map(|source| source.read())
        .transpose()
}

/// `~` and `~/...` are expanded against the home directory; `~user/...` is not.
fn expand_home(path: &str) -> PathBuf {
    let rest = match path {
        "~" => "",
        p => match p.strip_prefix("~/") {
            Some(rest) => rest,
            None => return PathBuf::from(path),
        },
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}
