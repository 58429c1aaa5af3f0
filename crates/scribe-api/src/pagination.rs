use std::num::NonZeroU32;

/// Navigation info for one page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub has_prev: bool,
    pub has_next: bool,
    /// Zero when there is nothing to list.
    pub last_page: u64,
    /// Rows to skip before this page starts.
    pub offset: u64,
}

/// Page numbers past `last_page` are allowed; the page is simply empty.
pub fn paginate(total_count: u64, page_size: NonZeroU32, page_number: NonZeroU32) -> Pagination {
    let size = u64::from(page_size.get());
    let number = u64::from(page_number.get());

    let last_page = total_count.div_ceil(size);
    let offset = (number - 1) * size;

    Pagination {
        has_prev: last_page > 1 && number != 1,
        has_next: last_page > 1 && number != last_page,
        last_page,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: u64, size: u32, number: u32) -> Pagination {
        paginate(
            total,
            NonZeroU32::new(size).unwrap(),
            NonZeroU32::new(number).unwrap(),
        )
    }

    #[test]
    fn last_page_is_ceiling() {
        for size in 1..=12u32 {
            for total in 0..=50u64 {
                let expected = (total as f64 / size as f64).ceil() as u64;
                let p = page(total, size, 1);
                assert_eq!(p.last_page, expected, "total {} size {}", total, size);
                assert_eq!(p.last_page == 0, total == 0);
            }
        }
    }

    #[test]
    fn single_page_has_no_navigation() {
        for (total, size) in [(0, 5), (1, 5), (5, 5)] {
            let p = page(total, size, 1);
            assert!(!p.has_prev);
            assert!(!p.has_next);
        }
    }

    #[test]
    fn middle_first_and_last_pages() {
        let first = page(10, 3, 1);
        assert_eq!((first.has_prev, first.has_next, first.last_page, first.offset), (false, true, 4, 0));

        let middle = page(10, 3, 2);
        assert_eq!((middle.has_prev, middle.has_next, middle.offset), (true, true, 3));

        let last = page(10, 3, 4);
        assert_eq!((last.has_prev, last.has_next, last.offset), (true, false, 9));
    }

    #[test]
    fn past_the_end_is_not_an_error() {
        let p = page(10, 5, 7);
        assert_eq!(p.last_page, 2);
        assert_eq!(p.offset, 30);
        assert!(p.has_prev);
        assert!(p.has_next);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let p = page(3, u32::MAX, u32::MAX);
        assert_eq!(p.last_page, 1);
        assert_eq!(p.offset, u64::from(u32::MAX - 1) * u64::from(u32::MAX));
        assert!(!p.has_prev && !p.has_next);

        let p = page(10_000, 1000, 3_000_000_000);
        assert_eq!(p.offset, 2_999_999_999_000);
        assert!(p.has_prev && p.has_next);
    }
}
