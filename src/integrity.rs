use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use crate::domain::{HashAlgorithm, KnownHash};
use crate::error::GeoDatasetsError;

/// Hex digest of the file at `path`.
pub fn file_digest(path: &Path, algorithm: HashAlgorithm) -> Result<String, GeoDatasetsError> {
    let mut file = File::open(path).map_err(|err| {
        GeoDatasetsError::Filesystem(format!("open {}: {err}", path.display()))
    })?;
    let digest = match algorithm {
        HashAlgorithm::Md5 => digest_reader::<Md5>(&mut file),
        HashAlgorithm::Sha1 => digest_reader::<Sha1>(&mut file),
        HashAlgorithm::Sha256 => digest_reader::<Sha256>(&mut file),
        HashAlgorithm::Sha512 => digest_reader::<Sha512>(&mut file),
    };
    digest.map_err(|err| GeoDatasetsError::Filesystem(format!("hash {}: {err}", path.display())))
}

pub fn matches(path: &Path, known: &KnownHash) -> Result<bool, GeoDatasetsError> {
    let actual = file_digest(path, known.algorithm())?;
    Ok(known.matches(&actual))
}

/// Fails with `Integrity` unless the file at `path` has the `known` digest.
pub fn verify(path: &Path, known: &KnownHash, filename: &str) -> Result<(), GeoDatasetsError> {
    let actual = file_digest(path, known.algorithm())?;
    if known.matches(&actual) {
        return Ok(());
    }
    Err(GeoDatasetsError::Integrity {
        filename: filename.to_string(),
        expected: known.to_string(),
        actual: format!("{}:{actual}", known.algorithm()),
    })
}

fn digest_reader<D: Digest + Write>(reader: &mut impl Read) -> io::Result<String> {
    let mut hasher = D::new();
    io::copy(reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn known_digests() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("abc.txt");
        std::fs::write(&path, b"abc").unwrap();

        assert_eq!(
            file_digest(&path, HashAlgorithm::Sha256).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            file_digest(&path, HashAlgorithm::Sha1).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            file_digest(&path, HashAlgorithm::Md5).unwrap(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn verify_reports_mismatch() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("abc.txt");
        std::fs::write(&path, b"abc").unwrap();

        let known: KnownHash = format!("sha1:{}", "0".repeat(40)).parse().unwrap();
        assert!(!matches(&path, &known).unwrap());
        assert_matches!(
            verify(&path, &known, "abc.txt"),
            Err(GeoDatasetsError::Integrity { filename, .. }) if filename == "abc.txt"
        );
    }
}
