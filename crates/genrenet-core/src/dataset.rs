//! # Dataset Module
//!
//! Named dataset resources and the working table.
//!
//! - `Resource` / `DatasetHandle`: what to fetch, from where, into which file
//! - `for_each_row`: column-selecting reader over a cached tab-separated file
//! - `load_working_table`: the inner join of titles with ratings on `tconst`
//!
//! Cached files are tab-separated, first row = headers, no quoting. The
//! literal `\N` marks an unknown field.

use crate::config::DatasetSettings;
use crate::primitives::{
    COLUMN_SEPARATOR, GENRE_DELIMITER, GENRES_COLUMN, ID_COLUMN, RATING_COLUMN, UNKNOWN_MARKER,
    YEAR_COLUMN,
};
use crate::{GenreNetError, TitleRecord};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

// =============================================================================
// RESOURCES
// =============================================================================

/// The named resources of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    Titles,
    Ratings,
    Crew,
}

impl Resource {
    /// Every resource, in fetch order.
    pub const ALL: [Resource; 3] = [Resource::Titles, Resource::Ratings, Resource::Crew];

    /// Short name used in logs and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Titles => "titles",
            Resource::Ratings => "ratings",
            Resource::Crew => "crew",
        }
    }

    /// File name of the compressed remote copy.
    #[must_use]
    pub fn remote_file(&self) -> &'static str {
        match self {
            Resource::Titles => "title.basics.tsv.gz",
            Resource::Ratings => "title.ratings.tsv.gz",
            Resource::Crew => "title.crew.tsv.gz",
        }
    }

    /// File name of the decompressed cached copy.
    #[must_use]
    pub fn cache_file(&self) -> &'static str {
        match self {
            Resource::Titles => "titles.tsv",
            Resource::Ratings => "ratings.tsv",
            Resource::Crew => "crew.tsv",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A resource bound to its remote locator and its local cache path.
///
/// Created from configuration, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetHandle {
    resource: Resource,
    locator: String,
    cache_path: PathBuf,
}

impl DatasetHandle {
    #[must_use]
    pub fn new(resource: Resource, locator: impl Into<String>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            resource,
            locator: locator.into(),
            cache_path: cache_path.into(),
        }
    }

    /// Handle for `resource` under `base_url` and `cache_dir`.
    #[must_use]
    pub fn standard(resource: Resource, base_url: &str, cache_dir: &Path) -> Self {
        let locator = format!("{}/{}", base_url.trim_end_matches('/'), resource.remote_file());
        Self::new(resource, locator, cache_dir.join(resource.cache_file()))
    }

    #[must_use]
    pub fn resource(&self) -> Resource {
        self.resource
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.resource.name()
    }

    #[must_use]
    pub fn locator(&self) -> &str {
        &self.locator
    }

    #[must_use]
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }
}

/// The set of handles a run works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogue {
    cache_dir: PathBuf,
    handles: Vec<DatasetHandle>,
}

impl Catalogue {
    /// Titles and ratings, plus crew when `include_crew` is set.
    #[must_use]
    pub fn from_settings(settings: &DatasetSettings) -> Self {
        let handles = Resource::ALL
            .iter()
            .filter(|r| **r != Resource::Crew || settings.include_crew)
            .map(|r| DatasetHandle::standard(*r, &settings.base_url, &settings.cache_dir))
            .collect();
        Self {
            cache_dir: settings.cache_dir.clone(),
            handles,
        }
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    #[must_use]
    pub fn handles(&self) -> &[DatasetHandle] {
        &self.handles
    }

    /// Handle of `resource`, if it is part of this catalogue.
    #[must_use]
    pub fn get(&self, resource: Resource) -> Option<&DatasetHandle> {
        self.handles.iter().find(|h| h.resource == resource)
    }

    /// Handle of `resource`, or a configuration error when it is absent.
    pub fn require(&self, resource: Resource) -> Result<&DatasetHandle, GenreNetError> {
        self.get(resource).ok_or_else(|| {
            GenreNetError::Configuration(format!("resource '{}' is not configured", resource))
        })
    }
}

// =============================================================================
// TSV READER
// =============================================================================

/// Visit every data row of a cached file, handing `visit` the values of
/// `columns` in the requested order. Returns the number of data rows.
pub fn for_each_row<F>(
    handle: &DatasetHandle,
    columns: &[&str],
    mut visit: F,
) -> Result<usize, GenreNetError>
where
    F: FnMut(&[&str]) -> Result<(), GenreNetError>,
{
    let file = File::open(handle.cache_path()).map_err(|e| {
        GenreNetError::Io(format!(
            "Cannot open '{}' at {}: {}",
            handle.name(),
            handle.cache_path().display(),
            e
        ))
    })?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => line.map_err(|e| io_error(handle, &e))?,
        None => {
            return Err(GenreNetError::Parse {
                resource: handle.name().to_string(),
                line: 1,
                reason: "missing header row".to_string(),
            });
        }
    };
    let header: Vec<&str> = header.split(COLUMN_SEPARATOR).collect();
    let width = header.len();

    let mut positions = Vec::with_capacity(columns.len());
    for column in columns {
        let position = header.iter().position(|h| h == column).ok_or_else(|| {
            GenreNetError::Parse {
                resource: handle.name().to_string(),
                line: 1,
                reason: format!("missing column '{}'", column),
            }
        })?;
        positions.push(position);
    }

    let mut rows = 0usize;
    for (index, line) in lines.enumerate() {
        let line = line.map_err(|e| io_error(handle, &e))?;
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(COLUMN_SEPARATOR).collect();
        if fields.len() != width {
            return Err(GenreNetError::Parse {
                resource: handle.name().to_string(),
                line: index + 2,
                reason: format!("expected {} columns, found {}", width, fields.len()),
            });
        }

        let selected: Vec<&str> = positions.iter().map(|p| fields[*p]).collect();
        visit(&selected).map_err(|e| match e {
            GenreNetError::Parse { resource, reason, .. } => GenreNetError::Parse {
                resource,
                line: index + 2,
                reason,
            },
            other => other,
        })?;
        rows += 1;
    }

    Ok(rows)
}

/// Number of data rows of a cached file.
pub fn count_rows(handle: &DatasetHandle) -> Result<usize, GenreNetError> {
    for_each_row(handle, &[], |_| Ok(()))
}

fn io_error(handle: &DatasetHandle, e: &std::io::Error) -> GenreNetError {
    GenreNetError::Io(format!("Read '{}': {}", handle.name(), e))
}

// =============================================================================
// FIELD PARSING
// =============================================================================

/// `None` for the unknown marker, otherwise the parsed value.
fn parse_known<T: std::str::FromStr>(
    handle: &DatasetHandle,
    column: &str,
    raw: &str,
) -> Result<Option<T>, GenreNetError> {
    if raw == UNKNOWN_MARKER {
        return Ok(None);
    }
    raw.trim().parse::<T>().map(Some).map_err(|_| GenreNetError::Parse {
        resource: handle.name().to_string(),
        line: 0,
        reason: format!("invalid {} '{}'", column, raw),
    })
}

/// Split a genre field into labels, in order, without duplicates.
///
/// Returns `None` for the unknown marker.
#[must_use]
pub fn parse_genres(raw: &str) -> Option<Vec<String>> {
    if raw == UNKNOWN_MARKER {
        return None;
    }
    let mut labels: Vec<String> = Vec::new();
    for label in raw.split(GENRE_DELIMITER).map(str::trim) {
        if !label.is_empty() && !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    Some(labels)
}

// =============================================================================
// WORKING TABLE
// =============================================================================

/// Average rating of every rated title.
///
/// A non-finite rating such as `NaN` or `inf` is a parse error.
pub fn load_ratings(handle: &DatasetHandle) -> Result<BTreeMap<String, Option<f64>>, GenreNetError> {
    let mut ratings = BTreeMap::new();
    for_each_row(handle, &[ID_COLUMN, RATING_COLUMN], |row| {
        let rating = parse_known::<f64>(handle, RATING_COLUMN, row[1])?;
        if rating.is_some_and(|r| !r.is_finite()) {
            return Err(GenreNetError::Parse {
                resource: handle.name().to_string(),
                line: 0,
                reason: format!("invalid {} '{}'", RATING_COLUMN, row[1]),
            });
        }
        ratings.insert(row[0].to_string(), rating);
        Ok(())
    })?;
    Ok(ratings)
}

/// Join titles with ratings on the title identifier.
///
/// Titles without a ratings row are dropped. Rows keep titles-file order.
pub fn load_working_table(
    titles: &DatasetHandle,
    ratings: &DatasetHandle,
) -> Result<Vec<TitleRecord>, GenreNetError> {
    let ratings = load_ratings(ratings)?;
    let mut records = Vec::with_capacity(ratings.len());

    for_each_row(titles, &[ID_COLUMN, YEAR_COLUMN, GENRES_COLUMN], |row| {
        let Some(rating) = ratings.get(row[0]) else {
            return Ok(());
        };
        let start_year = parse_known::<i32>(titles, YEAR_COLUMN, row[1])?;
        records.push(TitleRecord::new(
            row[0],
            start_year,
            *rating,
            parse_genres(row[2]),
        ));
        Ok(())
    })?;

    Ok(records)
}

// =============================================================================
// TESTS
// =============================================================================
