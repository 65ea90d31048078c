use geodatasets::domain::{GeometryType, HashAlgorithm, KnownHash, normalize_name};

#[test]
fn normalize_drops_only_separators() {
    assert_eq!(normalize_name("  Geo.Da,Air-Bnb_/ "), "geodaairbnb");
    assert_eq!(normalize_name("naturalearth.land"), "naturalearthland");
    assert_eq!(normalize_name("abs:australia"), "abs:australia");
}

#[test]
fn geometry_types_parse_loosely() {
    assert_eq!("point".parse::<GeometryType>().unwrap(), GeometryType::Point);
    assert_eq!("Line String".parse::<GeometryType>().unwrap(), GeometryType::LineString);
    assert!("circle".parse::<GeometryType>().is_err());
}

#[test]
fn known_hash_defaults_to_sha256() {
    let digest = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
    let hash: KnownHash = digest.parse().unwrap();
    assert_eq!(hash.algorithm(), HashAlgorithm::Sha256);
    assert_eq!(hash.to_string(), format!("sha256:{digest}"));

    let md5: KnownHash = "MD5:900150983CD24FB0D6963F7D28E17F72".parse().unwrap();
    assert_eq!(md5.algorithm(), HashAlgorithm::Md5);
    assert!(md5.matches("900150983cd24fb0d6963f7d28e17f72"));
}
