//! A CLI-provided path to a seed file, resolved against a list of default search locations if the
//! user doesn't provide one explicitly.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to read file at {path:?}"))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display(
        "failed to locate a required file in any of the following locations: {search_path:?}"
    ))]
    RequiredFileMissing { search_path: Vec<PathBuf> },
}

/// A path to a seed file (for example a bootstrap `ComponentDefinition`/`TraitDefinition` bundle
/// applied on startup), resolved against a default search path when the user doesn't provide one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedFilePath {
    path: Option<PathBuf>,
}

impl From<&OsStr> for SeedFilePath {
    fn from(s: &OsStr) -> Self {
        Self {
            // clap doesn't let us hook in to see the underlying `Option<&str>`, so we treat the
            // otherwise-invalid `""` as a sentinel for using the default instead.
            path: if s.is_empty() { None } else { Some(s.into()) },
        }
    }
}

impl SeedFilePath {
    /// Reads the file from the given path, falling back to the first path that exists from
    /// `default_search_paths` if none is given by the user.
    pub fn load(&self, default_search_paths: &[impl AsRef<Path>]) -> Result<String> {
        let resolved_path = Self::resolve_path(self.path.as_deref(), default_search_paths)?;
        fs::read_to_string(resolved_path).context(ReadFileSnafu {
            path: resolved_path.to_owned(),
        })
    }

    /// Check if the path can be found anywhere.
    ///
    /// 1. User provides path `user_provided_path` to file. Return [`Error`] if not existing.
    /// 2. User does not provide path to file -> search in `default_paths` and take the first
    ///    existing file.
    /// 3. Return [`Error`] if nothing was found.
    fn resolve_path<'a>(
        user_provided_path: Option<&'a Path>,
        default_paths: &'a [impl AsRef<Path> + 'a],
    ) -> Result<&'a Path> {
        let search_paths = if let Some(path) = user_provided_path {
            vec![path]
        } else {
            default_paths.iter().map(|path| path.as_ref()).collect()
        };
        for path in &search_paths {
            if path.exists() {
                return Ok(path);
            }
        }
        RequiredFileMissingSnafu {
            search_path: search_paths
                .into_iter()
                .map(PathBuf::from)
                .collect::<Vec<_>>(),
        }
        .fail()
    }
}
