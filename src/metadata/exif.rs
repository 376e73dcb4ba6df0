//! EXIF field reading for images

use crate::error::{Error, Result};
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// Raw capture fields as stored in the file, before any interpretation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    pub date_time_original: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
}

/// Open `path` as an image and read its capture fields.
///
/// Files that cannot be opened or are not a recognised image container
/// yield [`Error::NotAnImage`]; an image without an EXIF block yields
/// [`Error::MissingMetadataField`].
pub fn read_fields(path: &Path) -> Result<RawFields> {
    let not_an_image = |message: String| Error::NotAnImage {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|e| not_an_image(e.to_string()))?;
    let mut reader = BufReader::new(file);

    let exif = match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => {
            return Err(Error::MissingMetadataField {
                path: path.to_path_buf(),
                field: "EXIF",
            });
        }
        Err(e) => return Err(not_an_image(e.to_string())),
    };

    let fields = RawFields {
        date_time_original: ascii_field(&exif, Tag::DateTimeOriginal),
        make: ascii_field(&exif, Tag::Make),
        model: ascii_field(&exif, Tag::Model),
    };
    trace!(?path, ?fields, "Read EXIF fields");

    Ok(fields)
}

/// First string of an ASCII field, with trailing NULs and padding removed
fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Ascii(ref parts) => parts
            .first()
            .map(|bytes| {
                String::from_utf8_lossy(bytes)
                    .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
                    .to_string()
            })
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Writes a minimal TIFF container carrying the given capture fields
#[cfg(test)]
pub(crate) fn write_fixture(
    path: &Path,
    make: Option<&str>,
    model: Option<&str>,
    date_time_original: Option<&str>,
) {
    use exif::Field;
    use exif::experimental::Writer;
    use std::io::Cursor;

    let ascii = |tag: Tag, text: &str| Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    };

    let fields: Vec<Field> = [
        make.map(|v| ascii(Tag::Make, v)),
        model.map(|v| ascii(Tag::Model, v)),
        date_time_original.map(|v| ascii(Tag::DateTimeOriginal, v)),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).unwrap();
    std::fs::write(path, buf.into_inner()).unwrap();
}
