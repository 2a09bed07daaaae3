//! OOXML packages: zip containers of XML parts

pub(crate) mod docx;
pub(crate) mod xlsx;

use crate::error::Failure;
use std::io::{Cursor, Read};
use zip::ZipArchive;

pub(crate) type Package<'a> = ZipArchive<Cursor<&'a [u8]>>;

/// Open `bytes` as a zip package. Anything else (legacy binary office
/// formats included) is reported as unsupported.
pub(crate) fn open_package<'a>(bytes: &'a [u8], kind: &str) -> Result<Package<'a>, Failure> {
    if !bytes.starts_with(b"PK") {
        return Err(Failure::UnsupportedFeature(format!(
            "Only {} files in Office Open XML format are supported",
            kind
        )));
    }
    ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Failure::InvalidInput(format!("Corrupt {} package: {}", kind, e)))
}

/// Read a part as UTF-8 text
pub(crate) fn read_part(package: &mut Package<'_>, name: &str) -> Result<String, Failure> {
    let mut file = package
        .by_name(name)
        .map_err(|_| Failure::InvalidInput(format!("Missing package part {}", name)))?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Failure::InvalidInput(format!("Cannot read {}: {}", name, e)))?;
    Ok(content)
}

/// Like [`read_part`], but a missing part is `None`
pub(crate) fn read_optional_part(
    package: &mut Package<'_>,
    name: &str,
) -> Result<Option<String>, Failure> {
    if package.index_for_name(name).is_none() {
        return Ok(None);
    }
    read_part(package, name).map(Some)
}

pub(crate) fn parse_xml<'a>(xml: &'a str, part: &str) -> Result<roxmltree::Document<'a>, Failure> {
    roxmltree::Document::parse(xml)
        .map_err(|e| Failure::InvalidInput(format!("Malformed XML in {}: {}", part, e)))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_zip_is_unsupported() {
        let err = open_package(b"\xd0\xcf\x11\xe0 legacy", "Word").unwrap_err();
        assert!(matches!(err, Failure::UnsupportedFeature(_)));
    }

    #[test]
    fn test_missing_part() {
        let bytes = fixtures::package(&[("a.xml", "<a/>")]);
        let mut package = open_package(&bytes, "Word").unwrap();
        assert!(read_part(&mut package, "b.xml").is_err());
        assert_eq!(read_optional_part(&mut package, "b.xml").unwrap(), None);
        assert_eq!(read_part(&mut package, "a.xml").unwrap(), "<a/>");
    }
}
