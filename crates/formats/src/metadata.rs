//! `metadata.xml` as written by photogrammetry exporters next to a tileset.
//!
//! Only the `SRSOrigin` element is read, so this is a tag scanner rather than
//! an XML parser.

use foundation::math::Vec3;

use crate::error::DatasetError;

pub const METADATA_FILE_NAME: &str = "metadata.xml";

const SRS_ORIGIN_TAG: &str = "SRSOrigin";

/// Text content of the first element named `tag`, entity references left as-is.
fn element_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut search_from = 0;
    while let Some(rel) = xml[search_from..].find(&open) {
        let start = search_from + rel;
        let after_name = start + open.len();
        // Reject longer names sharing the prefix, e.g. `<SRSOriginX>`.
        match xml[after_name..].chars().next() {
            Some('>') | Some('/') => {}
            Some(c) if c.is_whitespace() => {}
            _ => {
                search_from = after_name;
                continue;
            }
        }
        let tag_end = after_name + xml[after_name..].find('>')?;
        if xml[..tag_end].ends_with('/') {
            return None;
        }
        let body_start = tag_end + 1;
        let body_len = xml[body_start..].find(&close)?;
        return Some(&xml[body_start..body_start + body_len]);
    }
    None
}

/// Parses `"x,y,z"`; exactly three finite numbers are accepted.
pub fn parse_srs_origin_text(text: &str) -> Result<Vec3, DatasetError> {
    let invalid = || DatasetError::InvalidSrsOrigin {
        text: text.to_string(),
    };
    let coords = text
        .split(',')
        .map(|part| part.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(invalid)?;
    match coords.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(invalid()),
    }
}

pub fn parse_srs_origin(xml: &str) -> Result<Vec3, DatasetError> {
    let text = element_text(xml, SRS_ORIGIN_TAG)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(DatasetError::MissingSrsOrigin)?;
    parse_srs_origin_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ModelMetadata version="1">
	<!--Spatial Reference System-->
	<SRS>EPSG:4547</SRS>
	<!--Origin in Spatial Reference System-->
	<SRSOrigin>500000.5,3400000.25,12</SRSOrigin>
	<Texture>
		<ColorSource>Visible</ColorSource>
	</Texture>
</ModelMetadata>"#;

    #[test]
    fn reads_origin_triplet() {
        assert_eq!(
            parse_srs_origin(METADATA).unwrap(),
            Vec3::new(500000.5, 3400000.25, 12.0)
        );
    }

    #[test]
    fn tolerates_whitespace_and_attributes() {
        let xml = r#"<M><SRSOrigin unit="m"> 1, 2 ,3 </SRSOrigin></M>"#;
        assert_eq!(parse_srs_origin(xml).unwrap(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn prefix_named_elements_are_skipped() {
        let xml = "<M><SRSOriginNote>x</SRSOriginNote><SRSOrigin>4,5,6</SRSOrigin></M>";
        assert_eq!(parse_srs_origin(xml).unwrap(), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn missing_or_empty_origin() {
        assert!(matches!(
            parse_srs_origin("<M><SRS>EPSG:4326</SRS></M>"),
            Err(DatasetError::MissingSrsOrigin)
        ));
        assert!(matches!(
            parse_srs_origin("<M><SRSOrigin/></M>"),
            Err(DatasetError::MissingSrsOrigin)
        ));
        assert!(matches!(
            parse_srs_origin("<M><SRSOrigin>  </SRSOrigin></M>"),
            Err(DatasetError::MissingSrsOrigin)
        ));
    }

    #[test]
    fn wrong_arity_or_garbage_is_invalid() {
        for text in ["1,2", "1,2,3,4", "1,b,3", "1,,3"] {
            assert!(
                matches!(parse_srs_origin_text(text), Err(DatasetError::InvalidSrsOrigin { .. })),
                "{text}"
            );
        }
    }
}
