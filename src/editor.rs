//! In-place attribute editor.
//!
//! Works on the raw source text only. Nothing is parsed beyond locating lines, and
//! every byte outside the replaced value is written back untouched.
use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use tempfile::NamedTempFile;
use tracing::info;

use crate::{
    error::EditError,
    parser::{Directive, locate_value},
};

struct SourceLine<'a> {
    number: usize,
    /// Byte offset of the line in the whole source.
    start: usize,
    /// Line content without its terminator.
    text: &'a str,
}

impl<'a> SourceLine<'a> {
    fn body(&self) -> &'a str {
        self.text.trim_start_matches([' ', '\t'])
    }

    fn indent(&self) -> usize {
        self.text.len() - self.body().len()
    }

    fn directive(&self) -> Option<Directive> {
        Directive::match_line(self.body())
    }

    fn value(&self) -> Option<&'a str> {
        let body = self.body();
        locate_value(body).map(|span| &body[span.value..])
    }

    fn opens(&self, id: &str) -> bool {
        self.directive() == Some(Directive::ObjectId) && self.value() == Some(id)
    }
}

fn split_lines(source: &str) -> Vec<SourceLine<'_>> {
    let mut start = 0;
    source
        .split_inclusive('\n')
        .enumerate()
        .map(|(index, raw)| {
            let text = raw.strip_suffix('\n').unwrap_or(raw);
            let text = text.strip_suffix('\r').unwrap_or(text);
            let line = SourceLine {
                number: index + 1,
                start,
                text,
            };
            start += raw.len();
            line
        })
        .collect()
}

/// Returns `source` with the value of `attribute` in service `id` replaced by `value`.
///
/// The first `ObjectID` line naming `id` opens the search, the next `ObjectID` line
/// closes it. The delimiter of the matched line is kept exactly as written.
pub fn edit_source(
    source: &str,
    id: &str,
    attribute: Directive,
    value: &str,
) -> Result<String, EditError> {
    if source.is_empty() {
        return Err(EditError::Empty);
    }
    if value.contains(['\n', '\r']) {
        return Err(EditError::MultiLineValue {
            attribute: attribute.keyword().to_string(),
        });
    }

    let lines = split_lines(source);
    let opening = lines
        .iter()
        .position(|line| line.opens(id))
        .ok_or_else(|| EditError::ServiceNotFound(id.to_string()))?;

    let target = if attribute == Directive::ObjectId {
        &lines[opening]
    } else {
        lines[opening + 1..]
            .iter()
            .take_while(|line| line.directive() != Some(Directive::ObjectId))
            .find(|line| line.directive() == Some(attribute))
            .ok_or_else(|| EditError::AttributeNotFound {
                id: id.to_string(),
                attribute: attribute.keyword().to_string(),
            })?
    };

    let span = locate_value(target.body())
        .ok_or(EditError::MalformedLine { line: target.number })?;
    let value_start = target.start + target.indent() + span.value;
    let value_end = target.start + target.text.len();

    let mut edited = String::with_capacity(source.len() + value.len());
    edited.push_str(&source[..value_start]);
    edited.push_str(value);
    edited.push_str(&source[value_end..]);
    Ok(edited)
}

/// Replaces `path` with `contents` through a sibling temp file and a rename, keeping
/// the original permissions. The target is never seen half written.
fn replace_file(path: &Path, contents: &str) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(contents.as_bytes())?;
    staged.as_file().sync_all()?;
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(staged.path(), metadata.permissions())?;
    }
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Edits the file at `path` in place. On any error the file is left as it was.
pub fn edit_attribute(
    path: &Path,
    id: &str,
    attribute: Directive,
    value: &str,
) -> Result<(), EditError> {
    let source = fs::read_to_string(path).map_err(EditError::Read)?;
    let edited = edit_source(&source, id, attribute, value)?;
    replace_file(path, &edited).map_err(EditError::Write)?;

    info!(
        service = id,
        attribute = attribute.keyword(),
        "Configuration attribute updated in {:?}",
        path
    );
    Ok(())
}
