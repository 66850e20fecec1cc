/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::fs::{self,File};
use std::io::{self,Read,Write};
use std::path::{Path,PathBuf};
use tempfile::NamedTempFile;
use io::ErrorKind::*;

use crate::macros::io_error;

type Result<T> = std::result::Result<T,std::io::Error>;

pub fn filename<'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().file_name().and_then(|ostr| ostr.to_str())
}

pub fn extension<'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().extension().and_then(|ostr| ostr.to_str())
}

pub fn filestem <'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().file_stem().and_then(|ostr| ostr.to_str())
}

/// lowercase extension of path, if any
pub fn lowercase_extension (path: impl AsRef<Path>)->Option<String> {
    extension( &path.as_ref()).map( |e| e.to_ascii_lowercase())
}

pub fn path_to_lossy_string (path: impl AsRef<Path>) -> String {
    path.as_ref().to_string_lossy().as_ref().to_string()
}

/// the directory that contains `path`. A bare filename resolves to the current dir
pub fn parent_dir (path: impl AsRef<Path>)->PathBuf {
    match path.as_ref().parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from(".")
    }
}

/// a file next to `path` that has the same stem extended by `suffix` and the given extension, e.g.
/// `sibling_path("out/iss.gpkg", "_points", "gpkg")` is `out/iss_points.gpkg`
pub fn sibling_path (path: impl AsRef<Path>, suffix: &str, ext: &str)->PathBuf {
    let path = path.as_ref();
    let stem = filestem(&path).unwrap_or("");
    let fname = if ext.is_empty() { format!("{stem}{suffix}") } else { format!("{stem}{suffix}.{ext}") };
    path.with_file_name( fname)
}

/// check if dir exists and is writable. If it does not exist and `create` is set we try to create it,
/// otherwise this is a NotFound error
pub fn check_writable_dir (path: impl AsRef<Path>, create: bool) -> io::Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        let md = fs::metadata(&path)?;
        if md.permissions().readonly() {
            Err(io_error!(PermissionDenied, "dir {:?} not writable", &path))
        } else {
            Ok(())
        }

    } else if path.exists() {
        Err(io_error!(NotADirectory, "{:?} is not a directory", &path))

    } else if create {
        fs::create_dir_all(path)

    } else {
        Err(io_error!(NotFound, "dir {:?} does not exist", &path))
    }
}

pub fn file_contents_as_string (file: &mut fs::File) -> Result<String> {
    let len = file.metadata()?.len();
    let mut contents = String::with_capacity(len as usize);
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

pub fn filepath_contents_as_string <P: AsRef<Path>> (path: &P) -> Result<String> {
    let mut file = File::open(path)?;
    file_contents_as_string( &mut file)
}

/// create a named temp file in the dir of `path` (so that we can later rename on the same filesystem)
pub fn temp_file_for (path: impl AsRef<Path>)->Result<NamedTempFile> {
    NamedTempFile::new_in( parent_dir(path))
}

/// write contents to a temp file and then move it into place so that readers never see a partial file
pub fn write_file_atomic (path: impl AsRef<Path>, contents: &[u8])->Result<()> {
    let path = path.as_ref();
    let mut tmp = temp_file_for(path)?;
    tmp.write_all( contents)?;
    tmp.flush()?;
    tmp.persist( path).map_err(|e| e.error)?;
    Ok(())
}

/// check that `path` can be created or replaced as a regular file
pub fn check_replaceable_file (path: impl AsRef<Path>)->Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        Err(io_error!(IsADirectory, "{:?} is a directory", path))
    } else if path.file_name().is_none() {
        Err(io_error!(InvalidFilename, "not a valid filename {:?}", path))
    } else {
        Ok(())
    }
}

/// move a set of staged files to their targets as one unit. Replaced targets are first moved into
/// `backup_dir` (same file system), and if any move fails the completed ones are reverted and the
/// original targets restored. Targets that are directories are never replaced. Backups are left in
/// `backup_dir` on success
pub fn replace_files (moves: &[(PathBuf,PathBuf)], backup_dir: &Path)->Result<()> {
    let mut done: Vec<(&Path,Option<PathBuf>)> = Vec::with_capacity( moves.len());

    for (i,(src,tgt)) in moves.iter().enumerate() {
        if tgt.is_dir() {
            revert_moves( &done);
            return Err( io_error!(IsADirectory, "{:?} is a directory", tgt))
        }

        let backup = if tgt.exists() {
            let bak = backup_dir.join( format!("{i}.bak"));
            if let Err(e) = fs::rename( tgt, &bak) {
                revert_moves( &done);
                return Err(e)
            }
            Some(bak)
        } else {
            None
        };

        if let Err(e) = fs::rename( src, tgt) {
            if let Some(bak) = &backup { let _ = fs::rename( bak, tgt); }
            revert_moves( &done);
            return Err(e)
        }
        done.push( (tgt.as_path(), backup));
    }
    Ok(())
}

fn revert_moves (done: &[(&Path,Option<PathBuf>)]) {
    for (tgt,backup) in done.iter().rev() {
        let _ = fs::remove_file( tgt);
        if let Some(bak) = backup { let _ = fs::rename( bak, tgt); }
    }
}
