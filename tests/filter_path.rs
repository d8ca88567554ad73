//! Filter path resolution against deployment descriptors and under concurrency.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;

use resource_filter::config::FilterConfig;
use resource_filter::filter::web_xml::unique_filter_path_from_file;
use resource_filter::filter::{FilterPath, FilterPathError, FilterPathSource};

mod common;

#[test]
fn test_filter_path_from_web1() {
    let path = unique_filter_path_from_file(false, "FilterTestApplication", &common::fixture("web1.xml")).unwrap();
    assert_eq!(path, "filtertest/");
}

#[test]
fn test_filter_path_from_web2() {
    let path = unique_filter_path_from_file(false, "FilterTestApplication", &common::fixture("web2.xml")).unwrap();
    assert_eq!(path, "filtertest/");

    let other = unique_filter_path_from_file(false, "OtherApplication", &common::fixture("web2.xml")).unwrap();
    assert_eq!(other, "other/");
}

#[test]
fn test_servlet_path_from_web2() {
    let path = unique_filter_path_from_file(true, "FilterTestApplication", &common::fixture("web2.xml")).unwrap();
    assert_eq!(path, "servlettest/");
}

#[test]
fn test_unknown_filter_name() {
    let err = unique_filter_path_from_file(false, "Missing", &common::fixture("web1.xml")).unwrap_err();
    assert!(matches!(err, FilterPathError::NotFound { .. }));
}

#[test]
fn test_lazy_resolution_from_config() {
    let config = FilterConfig {
        filter_name: "FilterTestApplication".into(),
        context_path: "/ctx".into(),
        web_xml: Some(common::fixture("web2.xml").to_string_lossy().into_owned()),
        ..FilterConfig::default()
    };
    let filter = FilterPath::from_config(&config);

    assert!(!filter.is_resolved());
    assert_eq!(
        filter.check_if_redirect_required("/ctx/filtertest", "").as_deref(),
        Some("/ctx/filtertest/")
    );
    assert!(filter.is_resolved());
    assert_eq!(filter.filter_path(), "filtertest/");
}

#[test]
fn test_explicit_path_wins_over_descriptor() {
    let config = FilterConfig {
        filter_path: Some("/explicit".into()),
        filter_mapping_url_pattern: Some("/pattern/*".into()),
        web_xml: Some(common::fixture("web1.xml").to_string_lossy().into_owned()),
        ..FilterConfig::default()
    };
    assert_eq!(FilterPath::from_config(&config).filter_path(), "explicit/");

    let config = FilterConfig { filter_path: None, ..config };
    assert_eq!(FilterPath::from_config(&config).filter_path(), "pattern/");
}

#[test]
fn test_root_mount_never_redirects() {
    let filter = FilterPath::new("");
    filter.set_filter_path("").unwrap();
    assert_eq!(filter.check_if_redirect_required("/", ""), None);
}

#[test]
fn test_parallel_check_redirect() {
    for _ in 0..1000 {
        parallel_check_redirect(8);
    }
}

/// All threads race the first resolution of an unresolved filter path.
fn parallel_check_redirect(thread_count: usize) {
    let filter = FilterPath::with_source("", FilterPathSource::Explicit("filter/".into()));
    let barrier = Barrier::new(thread_count);
    let successes = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..thread_count {
            scope.spawn(|| {
                barrier.wait();
                if filter.check_if_redirect_required("/filter", "").as_deref() == Some("/filter/") {
                    successes.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(successes.load(Ordering::SeqCst), thread_count, "all redirects correct");
}
