//! Capability-based filesystem helpers shared by the converters.

use std::io::{self, Read, Write};

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

/// Read an entire UTF-8 file into a string using ambient authority.
pub(crate) fn read_utf8_file(path: &Utf8Path) -> io::Result<String> {
    let mut file = fs_utf8::File::open_ambient(path, ambient_authority())?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Create (or truncate) a file and write `contents` to it.
pub(crate) fn write_utf8_file(path: &Utf8Path, contents: &str) -> io::Result<()> {
    let (dir, file_name) = open_dir_and_file(path)?;
    let mut file = dir.create(file_name.as_str())?;
    file.write_all(contents.as_bytes())
}

/// Resolve an ambient directory for the given path and return the
/// directory with the file name.
fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    let parent = if parent.as_str().is_empty() {
        Utf8Path::new(".")
    } else {
        parent
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}
