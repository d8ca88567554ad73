//! Deployment descriptor (`web.xml`) reader.
//!
//! Finds the `<url-pattern>`s of the `<filter-mapping>` (or
//! `<servlet-mapping>`) entries naming a given filter (or servlet) and turns
//! them into a filter path.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::filter::error::FilterPathError;
use crate::filter::path::url_pattern_to_filter_path;

/// The single filter path mapped to `name`.
///
/// Fails when nothing is mapped or when the mappings disagree.
pub fn unique_filter_path<R: BufRead>(
    is_servlet: bool,
    name: &str,
    reader: R,
) -> Result<String, FilterPathError> {
    let mut paths = filter_paths(is_servlet, name, reader)?;
    match paths.len() {
        0 => Err(FilterPathError::NotFound {
            name: name.to_string(),
        }),
        1 => Ok(paths.remove(0)),
        _ => Err(FilterPathError::Ambiguous {
            name: name.to_string(),
            paths,
        }),
    }
}

/// [`unique_filter_path`] for a descriptor on disk.
pub fn unique_filter_path_from_file(
    is_servlet: bool,
    name: &str,
    path: &Path,
) -> Result<String, FilterPathError> {
    let file = File::open(path)?;
    unique_filter_path(is_servlet, name, BufReader::new(file))
}

/// All distinct filter paths mapped to `name`, in document order.
pub fn filter_paths<R: BufRead>(
    is_servlet: bool,
    name: &str,
    reader: R,
) -> Result<Vec<String>, FilterPathError> {
    let (mapping_tag, name_tag): (&[u8], &[u8]) = if is_servlet {
        (b"servlet-mapping", b"servlet-name")
    } else {
        (b"filter-mapping", b"filter-name")
    };

    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_mapping = false;
    let mut element: Option<Vec<u8>> = None;
    let mut mapped_name: Option<String> = None;
    let mut patterns: Vec<String> = Vec::new();
    let mut paths: Vec<String> = Vec::new();

    loop {
        let event = xml
            .read_event_into(&mut buf)
            .map_err(|e| FilterPathError::Xml(format!("at byte {}: {}", xml.buffer_position(), e)))?;

        match event {
            Event::Start(start) => {
                let local = start.local_name();
                if local.as_ref() == mapping_tag {
                    in_mapping = true;
                    mapped_name = None;
                    patterns.clear();
                } else if in_mapping {
                    element = Some(local.as_ref().to_vec());
                }
            }
            Event::Text(text) if in_mapping => {
                let value = text
                    .unescape()
                    .map_err(|e| FilterPathError::Xml(e.to_string()))?
                    .trim()
                    .to_string();
                match element.as_deref() {
                    Some(tag) if tag == name_tag => mapped_name = Some(value),
                    Some(b"url-pattern") => patterns.push(value),
                    _ => {}
                }
            }
            Event::End(end) => {
                if end.local_name().as_ref() == mapping_tag {
                    in_mapping = false;
                    if mapped_name.as_deref() == Some(name) {
                        for pattern in patterns.drain(..) {
                            let path = url_pattern_to_filter_path(&pattern)?;
                            if !paths.contains(&path) {
                                paths.push(path);
                            }
                        }
                    }
                }
                element = None;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    tracing::debug!(name = %name, servlet = is_servlet, paths = ?paths, "Deployment descriptor scanned");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<web-app>
    <filter>
        <filter-name>Shop</filter-name>
        <filter-class>example.ShopFilter</filter-class>
    </filter>
    <filter-mapping>
        <filter-name>Other</filter-name>
        <url-pattern>/other/*</url-pattern>
    </filter-mapping>
    <filter-mapping>
        <filter-name>Shop</filter-name>
        <url-pattern>/shop/*</url-pattern>
        <dispatcher>REQUEST</dispatcher>
    </filter-mapping>
    <servlet-mapping>
        <servlet-name>Shop</servlet-name>
        <url-pattern>/servlet/shop/*</url-pattern>
    </servlet-mapping>
</web-app>"#;

    #[test]
    fn test_filter_mapping() {
        let path = unique_filter_path(false, "Shop", DESCRIPTOR.as_bytes()).unwrap();
        assert_eq!(path, "shop/");
    }

    #[test]
    fn test_servlet_mapping() {
        let path = unique_filter_path(true, "Shop", DESCRIPTOR.as_bytes()).unwrap();
        assert_eq!(path, "servlet/shop/");
    }

    #[test]
    fn test_unknown_name() {
        let err = unique_filter_path(false, "Nobody", DESCRIPTOR.as_bytes()).unwrap_err();
        assert!(matches!(err, FilterPathError::NotFound { .. }));
    }

    #[test]
    fn test_root_and_duplicate_mappings() {
        let xml = r#"<web-app>
            <filter-mapping><filter-name>A</filter-name><url-pattern>/*</url-pattern></filter-mapping>
            <filter-mapping><url-pattern>/*</url-pattern><filter-name>A</filter-name></filter-mapping>
        </web-app>"#;
        assert_eq!(unique_filter_path(false, "A", xml.as_bytes()).unwrap(), "");
    }

    #[test]
    fn test_ambiguous_mappings() {
        let xml = r#"<web-app>
            <filter-mapping>
                <filter-name>A</filter-name>
                <url-pattern>/one/*</url-pattern>
                <url-pattern>/two/*</url-pattern>
            </filter-mapping>
        </web-app>"#;
        match unique_filter_path(false, "A", xml.as_bytes()) {
            Err(FilterPathError::Ambiguous { paths, .. }) => assert_eq!(paths, vec!["one/", "two/"]),
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_pattern() {
        let xml = r#"<web-app><filter-mapping><filter-name>A</filter-name><url-pattern>*.do</url-pattern></filter-mapping></web-app>"#;
        let err = unique_filter_path(false, "A", xml.as_bytes()).unwrap_err();
        assert!(matches!(err, FilterPathError::InvalidUrlPattern(p) if p == "*.do"));
    }

    #[test]
    fn test_malformed_xml() {
        let xml = "<web-app><filter-mapping><filter-name>A</filter-name></web-app>";
        let err = unique_filter_path(false, "A", xml.as_bytes()).unwrap_err();
        assert!(matches!(err, FilterPathError::Xml(_)));
    }
}
