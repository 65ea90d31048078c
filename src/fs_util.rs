use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::GeoDatasetsError;

/// Extracts the entries named by `members` from `zip_path` into `target_dir`
/// and returns the extracted file paths, grouped by member in the order
/// given. A member ending in `/` selects every file below that directory.
/// An empty `members` slice extracts the whole archive.
pub fn extract_members(
    zip_path: &Path,
    target_dir: &Path,
    members: &[&str],
) -> Result<Vec<PathBuf>, GeoDatasetsError> {
    let file = fs::File::open(zip_path).map_err(|err| {
        GeoDatasetsError::Filesystem(format!("open zip {}: {err}", zip_path.display()))
    })?;
    let mut archive =
        ZipArchive::new(file).map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))?;

    let mut extracted: Vec<Vec<PathBuf>> = vec![Vec::new(); members.len().max(1)];
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        let slot = if members.is_empty() {
            Some(0)
        } else {
            members
                .iter()
                .position(|member| member_selects(member, entry.name()))
        };
        let Some(slot) = slot else {
            continue;
        };

        let entry_path = match entry.enclosed_name() {
            Some(path) => target_dir.join(path),
            None => {
                return Err(GeoDatasetsError::Filesystem(
                    "zip entry path traversal detected".to_string(),
                ));
            }
        };
        if let Some(parent) = entry_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))?;
        }
        let mut outfile = fs::File::create(&entry_path)
            .map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))?;
        extracted[slot].push(entry_path);
    }

    for (member, files) in members.iter().zip(&extracted) {
        if files.is_empty() {
            return Err(GeoDatasetsError::ArchiveMemberMissing {
                archive: zip_path.display().to_string(),
                member: member.to_string(),
            });
        }
    }

    Ok(extracted.into_iter().flatten().collect())
}

fn member_selects(member: &str, entry_name: &str) -> bool {
    if member.ends_with('/') {
        entry_name.starts_with(member)
    } else {
        entry_name == member
    }
}

/// Reads every entry to the end so that a truncated archive fails here
/// rather than halfway through extraction.
pub fn validate_zip(zip_path: &Path) -> Result<(), GeoDatasetsError> {
    let file = fs::File::open(zip_path).map_err(|err| {
        GeoDatasetsError::Filesystem(format!("open zip {}: {err}", zip_path.display()))
    })?;
    let mut archive =
        ZipArchive::new(file).map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        io::copy(&mut entry, &mut io::sink())
            .map_err(|err| GeoDatasetsError::Filesystem(err.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;
    use zip::write::SimpleFileOptions;

    use super::*;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, body) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_only_requested_members_in_order() {
        let temp = tempfile::tempdir().unwrap();
        let zip_path = temp.path().join("a.zip");
        write_zip(
            &zip_path,
            &[("a.dbf", b"dbf"), ("a.shp", b"shp"), ("readme.txt", b"txt")],
        );

        let files =
            extract_members(&zip_path, &temp.path().join("out"), &["a.shp", "a.dbf"]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.shp"));
        assert!(files[1].ends_with("a.dbf"));
        assert!(!temp.path().join("out/readme.txt").exists());
    }

    #[test]
    fn directory_member_expands() {
        let temp = tempfile::tempdir().unwrap();
        let zip_path = temp.path().join("a.zip");
        write_zip(&zip_path, &[("dir/x.shp", b"1"), ("dir/x.shx", b"2"), ("y", b"3")]);

        let files = extract_members(&zip_path, &temp.path().join("out"), &["dir/"]).unwrap();
        assert_eq!(files.len(), 2);
        validate_zip(&zip_path).unwrap();
    }

    #[test]
    fn missing_member_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let zip_path = temp.path().join("a.zip");
        write_zip(&zip_path, &[("a.shp", b"shp")]);

        let err = extract_members(&zip_path, &temp.path().join("out"), &["b.shp"]).unwrap_err();
        assert_matches!(err, GeoDatasetsError::ArchiveMemberMissing { member, .. } if member == "b.shp");
    }
}
