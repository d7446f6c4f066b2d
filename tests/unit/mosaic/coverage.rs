//! Tests for filled-cell tracking

#[cfg(test)]
mod tests {
    use tilemosaic::mosaic::coverage::CellMask;

    // Tests marking cells and listing the blanks row-major
    // Verified by swapping row and column in the index
    #[test]
    fn test_mark_and_blank_cells() {
        let mut mask = CellMask::new(3, 2);
        mask.mark([0, 0]);
        mask.mark([2, 0]);
        mask.mark([1, 1]);

        assert_eq!(mask.len(), 6);
        assert_eq!(mask.filled_count(), 3);
        assert!(mask.is_filled([2, 0]));
        assert!(!mask.is_filled([0, 1]));
        assert_eq!(mask.blank_cells(), vec![[1, 0], [0, 1], [2, 1]]);
        assert!(!mask.is_complete());
    }

    // Tests a fully marked mask is complete
    #[test]
    fn test_complete() {
        let mut mask = CellMask::new(2, 2);
        for row in 0..2 {
            for col in 0..2 {
                mask.mark([col, row]);
            }
        }
        assert!(mask.is_complete());
        assert!(mask.blank_cells().is_empty());
    }

    // Tests coordinates outside the mask are ignored
    #[test]
    fn test_out_of_range() {
        let mut mask = CellMask::new(2, 2);
        mask.mark([2, 0]);
        mask.mark([0, 5]);
        assert_eq!(mask.filled_count(), 0);
        assert!(!mask.is_filled([2, 0]));

        let empty = CellMask::new(0, 0);
        assert!(empty.is_empty());
        assert!(empty.blank_cells().is_empty());
    }
}
