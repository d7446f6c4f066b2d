//! Tests for catalog generation from tile directories

#[cfg(test)]
mod tests {
    use crate::solid_image;
    use tilemosaic::MosaicError;
    use tilemosaic::catalog::builder::CatalogBuilder;
    use tilemosaic::catalog::loader::{load_catalog, write_catalog};
    use tilemosaic::io::configuration::ChannelOrder;

    // Tests only image files are collected, sorted by name
    // Verified by removing the extension filter
    #[test]
    fn test_collect_tile_paths() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in ["b.png", "a.PNG", "c.jpg"] {
            solid_image(2, 2, [1, 2, 3])
                .save(dir.path().join(name))
                .expect("save tile");
        }
        std::fs::write(dir.path().join("notes.txt"), "skip").expect("write");
        std::fs::create_dir(dir.path().join("sub.png")).expect("mkdir");

        let paths = CatalogBuilder::collect_tile_paths(dir.path()).expect("collect");
        let names: Vec<String> = paths
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();

        assert_eq!(names, vec!["a.PNG", "b.png", "c.jpg"]);
    }

    // Tests tiles get sequential ids and their sampled vectors
    #[test]
    fn test_build_records() {
        let dir = tempfile::tempdir().expect("temp dir");
        solid_image(4, 4, [255, 0, 0])
            .save(dir.path().join("0_red.png"))
            .expect("save");
        solid_image(4, 4, [0, 0, 255])
            .save(dir.path().join("1_blue.png"))
            .expect("save");

        let build = CatalogBuilder::new(2, ChannelOrder::Rgb)
            .build_from_dir(dir.path())
            .expect("build");

        assert!(build.skipped.is_empty());
        assert_eq!(build.records.len(), 2);
        let blue = build.records.get(1).expect("blue record");
        assert_eq!(blue.id, 1);
        assert_eq!(blue.vector.len(), 12);
        assert_eq!(blue.vector.get(0..3), Some([0.0, 0.0, 255.0].as_slice()));
    }

    // Tests undecodable files are skipped without shifting later ids
    // Verified by assigning ids before filtering failures
    #[test]
    fn test_build_skips_broken_tiles() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("0_broken.png"), b"not an image").expect("write");
        solid_image(2, 2, [9, 9, 9])
            .save(dir.path().join("1_gray.png"))
            .expect("save");

        let build = CatalogBuilder::new(1, ChannelOrder::Bgr)
            .build_from_dir(dir.path())
            .expect("build");

        assert_eq!(build.skipped.len(), 1);
        assert_eq!(build.records.len(), 1);
        assert_eq!(build.records.first().map(|r| r.id), Some(0));
    }

    // Tests a tile whose name holds a comma is skipped and the rest round-trips
    // Verified by sampling tiles before checking their paths
    #[test]
    fn test_build_skips_unstorable_paths() {
        let dir = tempfile::tempdir().expect("temp dir");
        solid_image(2, 2, [200, 100, 0])
            .save(dir.path().join("0_sunset, beach.png"))
            .expect("save");
        solid_image(2, 2, [0, 100, 200])
            .save(dir.path().join("1_sea.png"))
            .expect("save");

        let build = CatalogBuilder::new(1, ChannelOrder::Rgb)
            .build_from_dir(dir.path())
            .expect("build");

        assert_eq!(build.records.len(), 1);
        assert!(matches!(
            build.skipped.as_slice(),
            [MosaicError::InvalidParameter {
                parameter: "path",
                ..
            }]
        ));

        let csv = dir.path().join("imagedata.csv");
        write_catalog(&csv, &build.records).expect("write");
        let catalog = load_catalog(&csv, 3).expect("load");
        assert_eq!(catalog.records(), build.records.as_slice());
    }

    // Tests a missing directory is reported
    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(CatalogBuilder::collect_tile_paths(&dir.path().join("absent")).is_err());
    }
}
