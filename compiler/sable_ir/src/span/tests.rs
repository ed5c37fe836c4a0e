use super::*;

#[test]
fn merge_covers_both() {
    let merged = Span::new(20, 30).merge(Span::new(10, 25));
    assert_eq!(merged, Span::new(10, 30));
    assert_eq!(merged.len(), 20);
}

#[test]
fn try_from_range_rejects_oversized_offsets() {
    let large = u32::MAX as usize + 1;
    assert!(matches!(
        Span::try_from_range(large..large + 1),
        Err(SpanError::StartTooLarge(_))
    ));
    assert!(matches!(
        Span::try_from_range(0..large),
        Err(SpanError::EndTooLarge(_))
    ));
    assert_eq!(Span::try_from_range(4..9), Ok(Span::new(4, 9)));
}

#[test]
fn dummy_is_empty_default() {
    assert!(Span::DUMMY.is_empty());
    assert_eq!(Span::default(), Span::DUMMY);
}

#[test]
fn orders_by_start_then_end() {
    assert!(Span::new(1, 9) < Span::new(2, 3));
    assert!(Span::new(2, 3) < Span::new(2, 4));
    assert_eq!(format!("{:?}", Span::new(3, 7)), "3..7");
}
