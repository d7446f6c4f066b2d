//! Tests for catalog CSV parsing and writing

#[cfg(test)]
mod tests {
    use crate::record;
    use std::path::Path;
    use tilemosaic::MosaicError;
    use tilemosaic::catalog::FeatureRecord;
    use tilemosaic::catalog::loader::{load_catalog, parse_catalog, write_catalog};

    const PATH: &str = "imagedata.csv";

    // Tests well-formed rows with surrounding whitespace and blank lines
    #[test]
    fn test_parse_valid_rows() {
        let text = "0,tiles/a.png,1,2,3\n\n 1 , tiles/b.png , 4.5 , 5 , 6 \n";
        let catalog = parse_catalog(text, Path::new(PATH), 3).expect("valid catalog");

        assert_eq!(catalog.len(), 2);
        let second = catalog.get(1).expect("second record");
        assert_eq!(second.id, 1);
        assert_eq!(second.path(), Path::new("tiles/b.png"));
        assert_eq!(second.vector, vec![4.5, 5.0, 6.0]);
    }

    // Tests malformed rows report the offending line
    // Verified by numbering lines from zero
    #[test]
    fn test_parse_malformed_rows() {
        let bad_id = parse_catalog("0,a.png,1,2,3\nx,b.png,1,2,3", Path::new(PATH), 3);
        assert!(matches!(bad_id, Err(MosaicError::CatalogParse { line: 2, .. })));

        let no_path = parse_catalog("0", Path::new(PATH), 3);
        assert!(matches!(no_path, Err(MosaicError::CatalogParse { line: 1, .. })));

        let bad_value = parse_catalog("0,a.png,1,NaN,3", Path::new(PATH), 3);
        assert!(matches!(bad_value, Err(MosaicError::CatalogParse { line: 1, .. })));

        let not_number = parse_catalog("0,a.png,1,two,3", Path::new(PATH), 3);
        assert!(matches!(not_number, Err(MosaicError::CatalogParse { .. })));
    }

    // Tests rows with the wrong number of values
    #[test]
    fn test_parse_dimension_mismatch() {
        let result = parse_catalog("0,a.png,1,2,3,4", Path::new(PATH), 3);
        assert!(matches!(
            result,
            Err(MosaicError::DimensionMismatch {
                expected: 3,
                actual: 4
            })
        ));
    }

    // Tests a file with only blank lines is an empty catalog
    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            parse_catalog("\n  \n", Path::new(PATH), 3),
            Err(MosaicError::EmptyCatalog)
        ));
    }

    // Tests written catalogs load back with the same records
    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("catalog.csv");
        let records = vec![record(0, &[0.25, 128.0, 255.0]), record(1, &[3.0, 2.0, 1.0])];

        write_catalog(&path, &records).expect("write");
        let catalog = load_catalog(&path, 3).expect("load");

        assert_eq!(catalog.records(), records.as_slice());
    }

    // Tests paths holding a row separator are refused instead of written
    // Verified by writing rows without checking the path
    #[test]
    fn test_write_rejects_separator_paths() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("catalog.csv");

        for name in ["sunset, beach.png", "two\nlines.png", "carriage\rreturn.png"] {
            let records = vec![
                record(0, &[1.0, 2.0, 3.0]),
                FeatureRecord::new(1, name, vec![4.0, 5.0, 6.0]),
            ];
            let result = write_catalog(&path, &records);
            assert!(
                matches!(
                    result,
                    Err(MosaicError::InvalidParameter {
                        parameter: "path",
                        ..
                    })
                ),
                "{name:?} was written"
            );
        }
        assert!(!path.exists());
    }

    // Tests a missing catalog file is a file system error
    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = load_catalog(&dir.path().join("absent.csv"), 3);
        assert!(matches!(result, Err(MosaicError::FileSystem { .. })));
    }
}
