// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::PageRequest;

#[test]
fn test_defaults_to_first_page_of_twenty() {
    let page: PageRequest = PageRequest::new(None, None);
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, 20);
    assert_eq!(page.offset(), 0);
}

#[test]
fn test_zero_page_is_first_page() {
    assert_eq!(PageRequest::new(Some(0), Some(10)).page, 1);
}

#[test]
fn test_page_size_is_clamped() {
    assert_eq!(PageRequest::new(Some(1), Some(0)).per_page, 1);
    assert_eq!(PageRequest::new(Some(1), Some(1000)).per_page, 100);
}

#[test]
fn test_offset_and_total_pages() {
    let page: PageRequest = PageRequest::new(Some(3), Some(20));
    assert_eq!(page.offset(), 40);
    assert_eq!(page.limit(), 20);
    assert_eq!(page.total_pages(0), 0);
    assert_eq!(page.total_pages(20), 1);
    assert_eq!(page.total_pages(21), 2);
    assert_eq!(page.total_pages(41), 3);
}
